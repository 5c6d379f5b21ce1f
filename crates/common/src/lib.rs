//! Shared value types used across the walkabout crates.

mod types;

pub use types::{Color, Transform};
