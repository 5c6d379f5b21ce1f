use crate::config::LocomotionConfig;
use crate::rig::RigMotion;
use glam::{Quat, Vec3};
use walkabout_input::XrEvent;

/// Point-and-glide movement while an XR session presents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VrLocomotion {
    trigger_held: bool,
}

impl VrLocomotion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger_held(&self) -> bool {
        self.trigger_held
    }

    pub fn set_trigger(&mut self, held: bool) {
        self.trigger_held = held;
    }

    /// Select edges from any controller drive the single trigger flag.
    pub fn handle_event(&mut self, event: XrEvent) {
        match event {
            XrEvent::SelectStart { controller } => {
                tracing::debug!(controller, "select start");
                self.trigger_held = true;
            }
            XrEvent::SelectEnd { controller } => {
                tracing::debug!(controller, "select end");
                self.trigger_held = false;
            }
        }
    }

    /// Glide along the controller's horizontal pointing direction.
    ///
    /// Idle when the trigger is up, when the controller is untracked, or
    /// when it points straight up or down.
    pub fn step(&self, config: &LocomotionConfig, controller: Option<Quat>, delta: f32) -> RigMotion {
        if !self.trigger_held {
            return RigMotion::Idle;
        }
        let Some(orientation) = controller else {
            return RigMotion::Idle;
        };
        let direction = glide_direction(orientation);
        if direction == Vec3::ZERO {
            return RigMotion::Idle;
        }
        RigMotion::Glide {
            offset: direction * config.vr_speed * delta,
        }
    }
}

/// Controller forward (-Z) projected onto the ground plane, unit length or zero.
pub fn glide_direction(orientation: Quat) -> Vec3 {
    let mut direction = orientation * Vec3::NEG_Z;
    direction.y = 0.0;
    let length_sq = direction.length_squared();
    if length_sq.is_nan() || length_sq <= MIN_HORIZONTAL_SQ {
        return Vec3::ZERO;
    }
    direction.normalize()
}

/// Below this squared horizontal length the controller is treated as vertical.
const MIN_HORIZONTAL_SQ: f32 = 1.0e-8;
