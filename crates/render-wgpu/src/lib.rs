//! wgpu render backend for the walkabout demo.
//!
//! Draws every scene object as an instance of a unit mesh (plane, box,
//! cylinder, cone) with lambert lighting and linear fog. The camera is a
//! first-person rig moved by the locomotion integrator.
//!
//! # Invariants
//! - The renderer never mutates the scene.
//! - Camera motion comes only from locomotion and mouse look.

mod camera;
mod gpu;
mod shaders;

pub use camera::FirstPersonCamera;
pub use gpu::WgpuRenderer;
