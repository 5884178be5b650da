//! Core engine types and utilities for the dungeon walkthrough.
//!
//! This crate provides the foundational types used across all engine systems:
//! - Transform, camera and bounding volumes
//! - Fixed-timestep simulation clock and time-driven fades
//! - Appearance components shared by the scene and interaction layers

pub mod bounds;
pub mod camera;
pub mod components;
pub mod fade;
pub mod time;
pub mod transform;

pub use bounds::*;
pub use camera::*;
pub use components::*;
pub use fade::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
pub use hecs::{Entity, World};
