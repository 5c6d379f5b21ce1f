//! Scene description for the walkabout demo.
//!
//! # Invariants
//! - The same seed always yields the same tree layout.
//! - Object ids are assigned sequentially and never reused.
//! - Renderers read the scene; nothing here depends on a GPU.

pub mod rng;
pub mod scene;

pub use rng::SplitMix64;
pub use scene::{
    AmbientLight, DEMO_TREE_COUNT, DEMO_TREE_SPREAD, DirectionalLight, Fog, MeshKind, ObjectId,
    Scene, SceneObject, Shape,
};

pub fn crate_info() -> &'static str {
    "walkabout-scene v0.1.0"
}
