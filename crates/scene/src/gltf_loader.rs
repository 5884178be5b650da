//! glTF model loading.

use crate::{SceneError, SceneGraph, SceneMesh};
use engine_core::{Aabb, Material, Transform};
use glam::{Mat4, Vec3};
use std::path::Path;

/// Load the default scene of a glTF/GLB file, placed with its root at `position`.
///
/// Only the document is read; vertex buffers are not needed because bounds come
/// from the accessor min/max every position attribute carries.
pub fn load_model(path: &Path, position: Vec3) -> Result<SceneGraph, SceneError> {
    let gltf = gltf::Gltf::open(path).map_err(|source| SceneError::Gltf {
        path: path.to_path_buf(),
        source,
    })?;
    let document = &gltf.document;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| SceneError::NoScene {
            path: path.to_path_buf(),
        })?;

    let root = Mat4::from_translation(position);
    let mut meshes = Vec::new();
    for node in scene.nodes() {
        visit(&node, root, &mut meshes);
    }

    log::info!("Loaded {:?}: {} meshes", path, meshes.len());
    Ok(SceneGraph::new(path, meshes))
}

fn visit(node: &gltf::Node, parent: Mat4, out: &mut Vec<SceneMesh>) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let mut local = Aabb::EMPTY;
        let mut material = None;
        for primitive in mesh.primitives() {
            let bb = primitive.bounding_box();
            local = local.union(&Aabb::new(Vec3::from(bb.min), Vec3::from(bb.max)));
            material.get_or_insert_with(|| material_of(&primitive.material()));
        }

        let name = node
            .name()
            .or_else(|| mesh.name())
            .map(str::to_owned)
            .unwrap_or_else(|| format!("node_{}", node.index()));

        out.push(SceneMesh {
            name,
            transform: Transform::from_matrix(world),
            bounds: local.transformed(&world),
            material: material.unwrap_or_default(),
        });
    }

    for child in node.children() {
        visit(&child, world, out);
    }
}

fn material_of(material: &gltf::Material) -> Material {
    Material::new(
        material.pbr_metallic_roughness().base_color_factor(),
        material.emissive_factor(),
    )
}
