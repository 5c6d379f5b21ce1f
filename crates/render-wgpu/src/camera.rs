use glam::{Mat4, Vec3};
use walkabout_locomotion::{CameraRig, RigPose};

/// First-person camera: a locomotion rig pose plus projection parameters.
/// Camera motion comes from the locomotion integrator and mouse look.
pub struct FirstPersonCamera {
    pub pose: RigPose,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Radians of rotation per pixel of mouse motion.
    pub sensitivity: f32,
}

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self {
            pose: RigPose::default(),
            fov: 75.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
            sensitivity: 0.002,
        }
    }
}

impl FirstPersonCamera {
    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    /// Mouse look from a raw pointer delta in pixels. Moving the pointer
    /// up looks up.
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.pose.rotate(dx * self.sensitivity, -dy * self.sensitivity);
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.pose.position;
        Mat4::look_at_rh(eye, eye + self.pose.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl CameraRig for FirstPersonCamera {
    fn move_right(&mut self, distance: f32) {
        self.pose.move_right(distance);
    }

    fn move_forward(&mut self, distance: f32) {
        self.pose.move_forward(distance);
    }

    fn set_eye_height(&mut self, height: f32) {
        self.pose.set_eye_height(height);
    }

    fn translate(&mut self, offset: Vec3) {
        self.pose.translate(offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use walkabout_locomotion::RigMotion;

    #[test]
    fn default_camera() {
        let cam = FirstPersonCamera::default();
        assert_eq!(cam.position().y, 1.6);
        let vp = cam.view_projection();
        // Should produce a valid matrix (no NaN)
        assert!(!vp.is_nan());
    }

    #[test]
    fn point_ahead_projects_to_centre() {
        let cam = FirstPersonCamera::default();
        let clip = cam.view_projection() * Vec3::new(0.0, 1.6, -10.0).extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn mouse_up_looks_up() {
        let mut cam = FirstPersonCamera::default();
        cam.look(0.0, -100.0);
        assert!(cam.pose.forward().y > 0.0);
    }

    #[test]
    fn viewport_sets_aspect() {
        let mut cam = FirstPersonCamera::default();
        cam.set_viewport(800, 400);
        assert_eq!(cam.aspect, 2.0);
        cam.set_viewport(800, 0);
        assert!(cam.aspect.is_finite());
    }

    #[test]
    fn walk_motion_moves_camera() {
        let mut cam = FirstPersonCamera::default();
        RigMotion::Walk {
            right: 0.0,
            forward: 1.0,
            eye_height: 1.6,
        }
        .apply(&mut cam);
        assert!((cam.position() - Vec3::new(0.0, 1.6, -1.0)).length() < 1e-5);
    }
}
