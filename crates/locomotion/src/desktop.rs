use crate::config::LocomotionConfig;
use crate::rig::RigMotion;
use glam::Vec2;
use walkabout_input::InputState;

/// Keyboard walking with inertia.
///
/// Velocity is stored in rig-local axes: `x` lateral, `y` longitudinal,
/// with the negative-forward sign convention of the move step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DesktopLocomotion {
    velocity: Vec2,
}

impl DesktopLocomotion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Integrate one frame: damp, accumulate held input, emit the move.
    ///
    /// Held input is added on top of the damped residual, so velocity
    /// compounds while a key stays down.
    pub fn step(&mut self, config: &LocomotionConfig, input: &InputState, delta: f32) -> RigMotion {
        self.velocity -= self.velocity * config.friction * delta;

        let direction = input.move_vector();
        let speed = config.speed(input.running);

        if input.longitudinal_held() {
            self.velocity.y -= direction.longitudinal() * speed * delta;
        }
        if input.lateral_held() {
            self.velocity.x -= direction.lateral() * speed * delta;
        }

        RigMotion::Walk {
            right: -self.velocity.x * delta,
            forward: -self.velocity.y * delta,
            eye_height: config.eye_height,
        }
    }
}
