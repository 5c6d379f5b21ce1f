use glam::{EulerRot, Quat, Vec3};
use std::f32::consts::FRAC_PI_2;

/// Pitch stays just inside straight up/down so `right()` is always defined.
const PITCH_LIMIT: f32 = FRAC_PI_2 - 1.0e-3;

/// Something locomotion can move: the camera rig root.
///
/// Walking uses yaw-relative moves; XR glide translates in world space.
pub trait CameraRig {
    /// Strafe along the horizontal right vector.
    fn move_right(&mut self, distance: f32);
    /// Walk along the horizontal look direction.
    fn move_forward(&mut self, distance: f32);
    fn set_eye_height(&mut self, height: f32);
    fn translate(&mut self, offset: Vec3);
}

/// Position and yaw/pitch of a first-person viewpoint.
///
/// Yaw is measured from +X towards +Z; the default yaw looks down -Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigPose {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for RigPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.6, 0.0),
            yaw: -FRAC_PI_2,
            pitch: 0.0,
        }
    }
}

impl RigPose {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Full look direction including pitch.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    /// Look direction flattened onto the ground plane.
    pub fn horizontal_forward(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin())
    }

    pub fn right(&self) -> Vec3 {
        self.horizontal_forward().cross(Vec3::Y).normalize()
    }

    /// Apply a yaw/pitch change in radians. Pitch is clamped.
    pub fn rotate(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Orientation that maps -Z onto `forward()`. Used as the emulated
    /// controller pose.
    pub fn look_rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, -(self.yaw + FRAC_PI_2), self.pitch, 0.0)
    }
}

impl CameraRig for RigPose {
    fn move_right(&mut self, distance: f32) {
        self.position += self.right() * distance;
    }

    fn move_forward(&mut self, distance: f32) {
        self.position += self.horizontal_forward() * distance;
    }

    fn set_eye_height(&mut self, height: f32) {
        self.position.y = height;
    }

    fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }
}

/// The rig update produced by one locomotion frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RigMotion {
    /// Desktop walking: yaw-relative moves, then pin the eye height.
    Walk {
        right: f32,
        forward: f32,
        eye_height: f32,
    },
    /// XR glide: a world-space offset added to the rig root.
    Glide { offset: Vec3 },
    /// No movement this frame.
    Idle,
}

impl RigMotion {
    pub fn apply<R: CameraRig + ?Sized>(&self, rig: &mut R) {
        match *self {
            RigMotion::Walk {
                right,
                forward,
                eye_height,
            } => {
                rig.move_right(right);
                rig.move_forward(forward);
                rig.set_eye_height(eye_height);
            }
            RigMotion::Glide { offset } => rig.translate(offset),
            RigMotion::Idle => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn default_looks_down_negative_z() {
        let pose = RigPose::default();
        assert!(approx(pose.forward(), Vec3::NEG_Z));
        assert!(approx(pose.right(), Vec3::X));
        assert_eq!(pose.position.y, 1.6);
    }

    #[test]
    fn forward_move_ignores_pitch() {
        let mut pose = RigPose::at(Vec3::ZERO);
        pose.rotate(0.0, 1.0);
        pose.move_forward(2.0);
        assert!(approx(pose.position, Vec3::new(0.0, 0.0, -2.0)));
    }

    #[test]
    fn move_right_follows_yaw() {
        let mut pose = RigPose::at(Vec3::ZERO);
        pose.rotate(FRAC_PI_2, 0.0);
        // Yaw 0 looks down +X, so right is +Z.
        pose.move_right(1.0);
        assert!(approx(pose.position, Vec3::Z));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut pose = RigPose::default();
        pose.rotate(0.0, 10.0);
        assert!(pose.pitch < FRAC_PI_2);
        pose.rotate(0.0, -20.0);
        assert!(pose.pitch > -FRAC_PI_2);
        assert!(!pose.right().is_nan());
    }

    #[test]
    fn look_rotation_matches_forward() {
        for (yaw, pitch) in [(0.0, 0.0), (-FRAC_PI_2, 0.3), (2.0, -0.7), (-3.0, 1.2)] {
            let pose = RigPose {
                position: Vec3::ZERO,
                yaw,
                pitch,
            };
            assert!(
                approx(pose.look_rotation() * Vec3::NEG_Z, pose.forward()),
                "yaw={yaw} pitch={pitch}"
            );
        }
    }

    #[test]
    fn walk_pins_eye_height() {
        let mut pose = RigPose::at(Vec3::new(0.0, 7.0, 0.0));
        RigMotion::Walk {
            right: 0.5,
            forward: -0.25,
            eye_height: 1.6,
        }
        .apply(&mut pose);
        assert!(approx(pose.position, Vec3::new(0.5, 1.6, 0.25)));
    }

    #[test]
    fn glide_and_idle() {
        let mut pose = RigPose::at(Vec3::ZERO);
        RigMotion::Glide {
            offset: Vec3::new(1.0, 0.0, 2.0),
        }
        .apply(&mut pose);
        RigMotion::Idle.apply(&mut pose);
        assert_eq!(pose.position, Vec3::new(1.0, 0.0, 2.0));
    }
}
