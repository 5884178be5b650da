//! Raycasting for interaction hit tests and queries.

use crate::{CollisionGroup, PhysicsWorld};
use engine_core::{Ray, Vec3};
use rapier3d::prelude::*;

/// Result of a raycast query.
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    /// The collider that was hit.
    pub collider: ColliderHandle,
    /// Distance along the ray to the hit point.
    pub distance: f32,
    /// World position of the hit.
    pub point: Vec3,
    /// Surface normal at the hit point.
    pub normal: Vec3,
}

impl PhysicsWorld {
    /// Cast a ray against colliders accepted by `filter` and return the nearest hit.
    pub fn raycast_filtered(
        &self,
        ray: &engine_core::Ray,
        max_distance: f32,
        filter: QueryFilter,
    ) -> Option<RaycastHit> {
        let origin = ray.origin;
        let direction = ray.direction;
        let ray = rapier3d::prelude::Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(collider, intersection)| {
                let point = ray.point_at(intersection.time_of_impact);
                RaycastHit {
                    collider,
                    distance: intersection.time_of_impact,
                    point: Vec3::new(point.x, point.y, point.z),
                    normal: Vec3::new(
                        intersection.normal.x,
                        intersection.normal.y,
                        intersection.normal.z,
                    ),
                }
            })
    }

    /// Cast a ray against every collider and return the first hit.
    pub fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RaycastHit> {
        self.raycast_filtered(ray, max_distance, QueryFilter::default())
    }

    /// Cast a ray against interactive volumes only, ignoring walls and floors.
    pub fn raycast_interactive(&self, ray: &Ray, max_distance: f32) -> Option<RaycastHit> {
        let filter = QueryFilter::default().groups(CollisionGroup::interactive_query());
        self.raycast_filtered(ray, max_distance, filter)
    }
}
