//! Scene graph collaborator: loads level models and exposes their meshes.
//!
//! Only what interaction and collision need is kept per mesh: its node name,
//! world transform, world-space bounds and material factors.

pub mod error;
pub mod graph;
pub mod gltf_loader;
pub mod loader;

pub use error::*;
pub use graph::*;
pub use gltf_loader::*;
pub use loader::*;
