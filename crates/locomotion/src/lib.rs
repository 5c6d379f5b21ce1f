//! First-person locomotion integrator.
//!
//! Converts held keys, or an XR trigger and controller pose, plus the
//! frame delta into a [`RigMotion`] that the host applies to its camera rig.
//!
//! # Invariants
//! - Exactly one mode runs per frame, chosen by XR presentation status.
//! - Desktop order is damp, then accumulate, then move, then pin eye height.
//! - A zero move vector is never normalized; no NaN enters velocity.
//! - Desktop velocity persists across XR sessions untouched.

pub mod clock;
pub mod config;
pub mod desktop;
pub mod integrator;
pub mod rig;
pub mod vr;

pub use clock::FrameClock;
pub use config::{ConfigError, LocomotionConfig};
pub use desktop::DesktopLocomotion;
pub use integrator::{FrameInput, Locomotion, Mode};
pub use rig::{CameraRig, RigMotion, RigPose};
pub use vr::{VrLocomotion, glide_direction};

pub fn crate_info() -> &'static str {
    "walkabout-locomotion v0.1.0"
}
