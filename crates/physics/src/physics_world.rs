//! Physics world management with Rapier3D.

use crate::collision::{CollisionGroup, StaticBody};
use engine_core::{Aabb, Vec3};
use rapier3d::prelude::*;

/// Smallest half extent given to a box collider. Flat meshes (planes, door
/// panels) would otherwise produce degenerate cuboids.
pub const MIN_HALF_EXTENT: f32 = 0.001;

/// Gravity used when a level does not ask for any (the main dungeon).
pub const ZERO_GRAVITY: Vec3 = Vec3::ZERO;
/// Earth gravity as used by the bucket-sort room.
pub const EARTH_GRAVITY: Vec3 = Vec3::new(0.0, -9.82, 0.0);

fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn half_extents_of(bounds: &Aabb) -> Vec3 {
    bounds.half_extents().max(Vec3::splat(MIN_HALF_EXTENT))
}

/// Main physics world containing all simulation state.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
    steps: u64,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(ZERO_GRAVITY)
    }
}

impl PhysicsWorld {
    /// Create a new physics world with the given gravity.
    pub fn new(gravity: Vec3) -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: to_vector(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            steps: 0,
        }
    }

    /// Advance the simulation by exactly `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
        self.steps += 1;
    }

    /// Number of steps taken since creation.
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Update query pipeline for raycasting. Needed after adding colliders
    /// outside of [`PhysicsWorld::step`].
    pub fn update_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add a zero-mass static box sized to `bounds` and centred on its centre.
    ///
    /// The box is an axis-aligned approximation of the mesh; concave shapes
    /// such as archways are filled in.
    pub fn add_static_box(&mut self, bounds: &Aabb) -> StaticBody {
        let center = bounds.center();
        let half = half_extents_of(bounds);
        let rigid_body = RigidBodyBuilder::fixed().translation(to_vector(center)).build();
        let rigid_body = self.rigid_body_set.insert(rigid_body);
        let collider = ColliderBuilder::cuboid(half.x, half.y, half.z)
            .density(0.0)
            .collision_groups(CollisionGroup::environment())
            .build();
        let collider =
            self.collider_set
                .insert_with_parent(collider, rigid_body, &mut self.rigid_body_set);
        StaticBody {
            rigid_body,
            collider,
        }
    }

    /// Add a sensor box used only for interaction hit tests.
    pub fn add_interactive_box(&mut self, bounds: &Aabb) -> ColliderHandle {
        let half = half_extents_of(bounds);
        let collider = ColliderBuilder::cuboid(half.x, half.y, half.z)
            .translation(to_vector(bounds.center()))
            .sensor(true)
            .collision_groups(CollisionGroup::interactive())
            .build();
        self.collider_set.insert(collider)
    }

    /// Add a ground plane collider (flat Y=0 half-space).
    pub fn add_ground_plane(&mut self) -> ColliderHandle {
        let collider = ColliderBuilder::halfspace(Vector::y_axis())
            .collision_groups(CollisionGroup::environment())
            .build();
        self.collider_set.insert(collider)
    }

    /// Remove a collider by its handle.
    pub fn remove_collider(&mut self, handle: ColliderHandle) {
        self.collider_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.rigid_body_set,
            true,
        );
    }

    /// World position of a rigid body.
    pub fn body_position(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(handle).map(|body| {
            let pos = body.translation();
            Vec3::new(pos.x, pos.y, pos.z)
        })
    }

    /// Half extents of a cuboid collider, if the handle is one.
    pub fn cuboid_half_extents(&self, handle: ColliderHandle) -> Option<Vec3> {
        let collider = self.collider_set.get(handle)?;
        let cuboid = collider.shape().as_cuboid()?;
        let h = cuboid.half_extents;
        Some(Vec3::new(h.x, h.y, h.z))
    }

    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    pub fn collider_count(&self) -> usize {
        self.collider_set.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_box_matches_bounds() {
        let mut world = PhysicsWorld::default();
        let bounds = Aabb::new(Vec3::new(-1.0, 0.0, 4.0), Vec3::new(3.0, 3.0, 4.5));
        let body = world.add_static_box(&bounds);

        assert!(world.rigid_body_set[body.rigid_body].is_fixed());
        assert_eq!(world.body_position(body.rigid_body), Some(bounds.center()));
        let half = world.cuboid_half_extents(body.collider).unwrap();
        assert!((half - Vec3::new(2.0, 1.5, 0.25)).length() < 1e-6);
    }

    #[test]
    fn flat_bounds_get_minimum_thickness() {
        let mut world = PhysicsWorld::default();
        let bounds = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 2.0, 0.0));
        let body = world.add_static_box(&bounds);
        let half = world.cuboid_half_extents(body.collider).unwrap();
        assert_eq!(half.z, MIN_HALF_EXTENT);
    }

    #[test]
    fn step_counts_and_keeps_static_bodies_still() {
        let mut world = PhysicsWorld::new(EARTH_GRAVITY);
        let body = world.add_static_box(&Aabb::from_center_size(Vec3::Y, Vec3::ONE));
        for _ in 0..10 {
            world.step(1.0 / 60.0);
        }
        assert_eq!(world.step_count(), 10);
        assert_eq!(world.body_position(body.rigid_body), Some(Vec3::Y));
    }
}
