//! Loaded scene contents.

use engine_core::{Aabb, Material, Transform};
use std::path::{Path, PathBuf};

/// One renderable mesh node of a loaded model, in world space.
#[derive(Debug, Clone)]
pub struct SceneMesh {
    pub name: String,
    pub transform: Transform,
    pub bounds: Aabb,
    pub material: Material,
}

impl SceneMesh {
    pub fn new(name: impl Into<String>, bounds: Aabb, material: Material) -> Self {
        Self {
            name: name.into(),
            transform: Transform::from_position(bounds.center()),
            bounds,
            material,
        }
    }
}

/// Meshes of one loaded model, in traversal order.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    source: PathBuf,
    meshes: Vec<SceneMesh>,
}

impl SceneGraph {
    pub fn new(source: impl Into<PathBuf>, meshes: Vec<SceneMesh>) -> Self {
        Self {
            source: source.into(),
            meshes,
        }
    }

    /// File the graph was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Visit meshes in depth-first traversal order.
    pub fn traverse(&self) -> impl Iterator<Item = &SceneMesh> {
        self.meshes.iter()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Bounds of the whole model.
    pub fn bounds(&self) -> Aabb {
        self.meshes
            .iter()
            .fold(Aabb::EMPTY, |acc, m| acc.union(&m.bounds))
    }
}
