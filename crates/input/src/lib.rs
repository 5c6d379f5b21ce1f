//! Embodiment input: held desktop keys and an optional XR session.
//!
//! # Invariants
//! - Key state changes only on press/release edges.
//! - Opposing keys cancel to a zero axis, never to NaN.
//! - XR presentation status is read per frame, not cached.

pub mod action;
pub mod state;
pub mod xr;

pub use action::Action;
pub use state::{InputState, MoveVector};
pub use xr::{EmulatedXr, MAX_CONTROLLERS, NoXr, PRIMARY_CONTROLLER, XrEvent, XrSession};

pub fn crate_info() -> &'static str {
    "walkabout-input v0.1.0"
}
