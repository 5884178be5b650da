//! Interactive objects of a level session.
//!
//! Each classified mesh becomes a hecs entity. Interactive ones also get a
//! sensor collider so hover rays only ever see them.

use crate::classify::{
    is_claimed_door, resolve_binding, NavigationBinding, ObjectKind, RuleSet, NEW_FLOORS_TAG,
    RETURN_TRIGGER_NAME,
};
use crate::level::{NEW_FLOORS_ARRIVAL_OFFSET, RETURN_ARRIVAL_OFFSET, RETURN_TRIGGER_OFFSET};
use engine_core::{rgb_from_hex, Aabb, Material, OriginalAppearance, Ray, SceneName, Transform};
use glam::Vec3;
use hecs::{Entity, EntityBuilder, World};
use physics::{ColliderHandle, PhysicsWorld};
use scene::{SceneGraph, SceneMesh};
use std::collections::HashMap;

/// Hover rays stop looking past this distance.
pub const MAX_PICK_DISTANCE: f32 = 1000.0;

/// Size of the return trigger box.
const RETURN_TRIGGER_SIZE: Vec3 = Vec3::new(1.0, 2.0, 0.2);
const RETURN_TRIGGER_COLOR: u32 = 0x8b4513;
const RETURN_TRIGGER_OPACITY: f32 = 0.8;

/// Where a teleporting object sends the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeleportTarget(pub Vec3);

/// Sensor collider used for hover hit tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractiveCollider(pub ColliderHandle);

/// Counts from registering one model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterSummary {
    pub static_colliders: usize,
    pub interactive: usize,
}

/// Everything needed to create one interactive object.
#[derive(Debug, Clone)]
pub struct InteractiveSpec {
    pub name: String,
    pub transform: Transform,
    pub bounds: Aabb,
    pub material: Material,
    pub kind: ObjectKind,
    pub static_collider: bool,
    pub teleport_target: Option<Vec3>,
}

#[derive(Default)]
pub struct InteractionRegistry {
    by_collider: HashMap<ColliderHandle, Entity>,
    /// Interactive entities in registration order.
    interactive: Vec<Entity>,
}

impl InteractionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify and register every mesh of a loaded model.
    pub fn register_graph(
        &mut self,
        world: &mut World,
        physics: &mut PhysicsWorld,
        graph: &SceneGraph,
        rules: RuleSet,
    ) -> RegisterSummary {
        let mut summary = RegisterSummary::default();
        for mesh in graph.traverse() {
            let classification = rules.classify(&mesh.name);
            if classification.static_collider {
                summary.static_colliders += 1;
            }
            if classification.is_interactive() {
                summary.interactive += 1;
            }
            self.register_mesh(world, physics, mesh, rules);
        }
        physics.update_query_pipeline();
        log::info!(
            "Registered {:?}: {} colliders, {} interactive",
            graph.source(),
            summary.static_colliders,
            summary.interactive
        );
        summary
    }

    /// Register one mesh. Returns the entity if the mesh was classified as anything.
    pub fn register_mesh(
        &mut self,
        world: &mut World,
        physics: &mut PhysicsWorld,
        mesh: &SceneMesh,
        rules: RuleSet,
    ) -> Option<Entity> {
        let classification = rules.classify(&mesh.name);
        match classification.kind {
            Some(kind) => {
                log::debug!("Interactive {:?}: {}", kind, mesh.name);
                Some(self.add_interactive(
                    world,
                    physics,
                    InteractiveSpec {
                        name: mesh.name.clone(),
                        transform: mesh.transform,
                        bounds: mesh.bounds,
                        material: mesh.material,
                        kind,
                        static_collider: classification.static_collider,
                        teleport_target: None,
                    },
                ))
            }
            None if classification.static_collider => {
                let body = physics.add_static_box(&mesh.bounds);
                Some(world.spawn((SceneName(mesh.name.clone()), mesh.bounds, body)))
            }
            None => None,
        }
    }

    /// Create an interactive object and its colliders, resolving its binding.
    pub fn add_interactive(
        &mut self,
        world: &mut World,
        physics: &mut PhysicsWorld,
        spec: InteractiveSpec,
    ) -> Entity {
        let sensor = physics.add_interactive_box(&spec.bounds);
        let binding = resolve_binding(&spec.name, spec.kind, spec.teleport_target);

        let mut builder = EntityBuilder::new();
        builder
            .add(SceneName(spec.name))
            .add(spec.transform)
            .add(spec.bounds)
            .add(spec.material)
            .add(OriginalAppearance(spec.material))
            .add(spec.kind)
            .add(InteractiveCollider(sensor));
        if spec.static_collider {
            builder.add(physics.add_static_box(&spec.bounds));
        }
        if let Some(target) = spec.teleport_target {
            builder.add(TeleportTarget(target));
        }
        if let Some(binding) = binding {
            builder.add(binding);
        }
        let entity = world.spawn(builder.build());

        self.by_collider.insert(sensor, entity);
        self.interactive.push(entity);
        entity
    }

    /// Bind the first unclaimed door to the upper floors and add the return trigger.
    ///
    /// Returns `(door, return_trigger)`, or `None` when every door is claimed.
    pub fn bind_new_floors_door(
        &mut self,
        world: &mut World,
        physics: &mut PhysicsWorld,
        floor1: Vec3,
    ) -> Option<(Entity, Entity)> {
        let mut spare = None;
        for &e in &self.interactive {
            let Ok(mut query) = world.query_one::<(&SceneName, &ObjectKind, &Transform)>(e) else {
                continue;
            };
            if let Some((name, kind, transform)) = query.get() {
                if *kind == ObjectKind::Door && !is_claimed_door(name.as_str()) {
                    spare = Some((e, transform.position));
                    break;
                }
            }
        }
        let (door, door_position) = spare?;

        let arrival = floor1 + NEW_FLOORS_ARRIVAL_OFFSET;
        let renamed = {
            let mut name = world.get::<&mut SceneName>(door).ok()?;
            name.0 = format!("{}_{}", name.0, NEW_FLOORS_TAG);
            name.0.clone()
        };
        let binding = resolve_binding(&renamed, ObjectKind::Door, Some(arrival))?;
        world.insert(door, (TeleportTarget(arrival), binding)).ok()?;
        log::info!("Door {} now leads to the upper floors", renamed);

        let trigger_position = floor1 + RETURN_TRIGGER_OFFSET;
        let [r, g, b] = rgb_from_hex(RETURN_TRIGGER_COLOR);
        let trigger = self.add_interactive(
            world,
            physics,
            InteractiveSpec {
                name: RETURN_TRIGGER_NAME.to_string(),
                transform: Transform::from_position(trigger_position),
                bounds: Aabb::from_center_size(trigger_position, RETURN_TRIGGER_SIZE),
                material: Material::new([r, g, b, RETURN_TRIGGER_OPACITY], [0.0; 3]),
                kind: ObjectKind::ReturnTrigger,
                static_collider: true,
                teleport_target: Some(door_position + RETURN_ARRIVAL_OFFSET),
            },
        );
        physics.update_query_pipeline();

        Some((door, trigger))
    }

    /// Nearest interactive object along `ray`. Level geometry does not occlude.
    pub fn pick(&self, physics: &PhysicsWorld, ray: &Ray) -> Option<Entity> {
        let hit = physics.raycast_interactive(ray, MAX_PICK_DISTANCE)?;
        self.by_collider.get(&hit.collider).copied()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.interactive.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.interactive.is_empty()
    }

    /// First interactive entity whose name contains `pattern`.
    #[cfg(test)]
    pub fn find(&self, world: &World, pattern: &str) -> Option<Entity> {
        self.interactive.iter().copied().find(|&e| {
            world
                .get::<&SceneName>(e)
                .map(|name| name.contains(pattern))
                .unwrap_or(false)
        })
    }
}

/// Binding of an entity, if it has one.
pub fn binding_of(world: &World, entity: Entity) -> Option<NavigationBinding> {
    world.get::<&NavigationBinding>(entity).ok().map(|b| *b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Destination;
    use crate::level::FLOOR1_POSITION;
    use physics::StaticBody;

    fn mesh(name: &str, center: Vec3) -> SceneMesh {
        SceneMesh::new(
            name,
            Aabb::from_center_size(center, Vec3::new(1.0, 2.0, 0.2)),
            Material::default(),
        )
    }

    fn register(
        registry: &mut InteractionRegistry,
        world: &mut World,
        physics: &mut PhysicsWorld,
        meshes: Vec<SceneMesh>,
        rules: RuleSet,
    ) -> RegisterSummary {
        registry.register_graph(world, physics, &SceneGraph::new("test.glb", meshes), rules)
    }

    #[test]
    fn bucketsort_door_gets_binding_and_zero_mass_collider() {
        let mut world = World::new();
        let mut physics = PhysicsWorld::default();
        let mut registry = InteractionRegistry::new();
        let door = registry
            .register_mesh(
                &mut world,
                &mut physics,
                &mesh("wall_doorway_door_bucketsort_ready", Vec3::new(0.0, 1.0, -5.0)),
                RuleSet::MainDungeon,
            )
            .unwrap();

        assert_eq!(*world.get::<&ObjectKind>(door).unwrap(), ObjectKind::Door);
        assert_eq!(
            binding_of(&world, door),
            Some(NavigationBinding::Redirect(Destination::BucketSort))
        );

        let body = *world.get::<&StaticBody>(door).unwrap();
        let rigid_body = &physics.rigid_body_set[body.rigid_body];
        assert!(rigid_body.is_fixed());
        assert_eq!(rigid_body.mass(), 0.0);
        let center = physics.body_position(body.rigid_body).unwrap();
        assert!((center - Vec3::new(0.0, 1.0, -5.0)).length() < 1e-5, "{}", center);
        let half = physics.cuboid_half_extents(body.collider).unwrap();
        assert!((half - Vec3::new(0.5, 1.0, 0.1)).length() < 1e-5, "{}", half);
    }

    #[test]
    fn summary_counts_colliders_and_interactive() {
        let mut world = World::new();
        let mut physics = PhysicsWorld::default();
        let mut registry = InteractionRegistry::new();
        let summary = register(
            &mut registry,
            &mut world,
            &mut physics,
            vec![
                mesh("wall_a", Vec3::ZERO),
                mesh("pillar_b", Vec3::X),
                mesh("torch", Vec3::Y),
                mesh("wall_doorway_door_prim_ready", Vec3::Z),
            ],
            RuleSet::MainDungeon,
        );
        assert_eq!(summary, RegisterSummary { static_colliders: 3, interactive: 1 });
        assert_eq!(registry.len(), 1);
        assert_eq!(world.len(), 3);
    }

    #[test]
    fn pick_sees_through_walls_to_the_nearest_door() {
        let mut world = World::new();
        let mut physics = PhysicsWorld::default();
        let mut registry = InteractionRegistry::new();
        register(
            &mut registry,
            &mut world,
            &mut physics,
            vec![
                mesh("wall_front", Vec3::new(0.0, 1.0, -2.0)),
                mesh("wall_doorway_door_kruskal_ready", Vec3::new(0.0, 1.0, -5.0)),
                mesh("wall_doorway_door_heapsort_ready", Vec3::new(0.0, 1.0, -9.0)),
            ],
            RuleSet::MainDungeon,
        );

        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Z);
        let picked = registry.pick(&physics, &ray).unwrap();
        assert_eq!(picked, registry.find(&world, "kruskal").unwrap());

        let away = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Z);
        assert_eq!(registry.pick(&physics, &away), None);
    }

    #[test]
    fn binds_exactly_one_unclaimed_door() {
        let mut world = World::new();
        let mut physics = PhysicsWorld::default();
        let mut registry = InteractionRegistry::new();
        register(
            &mut registry,
            &mut world,
            &mut physics,
            vec![
                mesh("wall_doorway_door_kruskal_ready", Vec3::new(0.0, 1.0, -5.0)),
                mesh("wall_doorway_door_treasure_left_ready", Vec3::new(4.0, 1.0, -5.0)),
                mesh("wall_doorway_door_treasure_right_ready", Vec3::new(8.0, 1.0, -5.0)),
            ],
            RuleSet::MainDungeon,
        );

        let (door, trigger) = registry
            .bind_new_floors_door(&mut world, &mut physics, FLOOR1_POSITION)
            .unwrap();
        assert_eq!(
            world.get::<&SceneName>(door).unwrap().as_str(),
            "wall_doorway_door_treasure_left_ready_to_new_floors"
        );
        assert_eq!(
            binding_of(&world, door),
            Some(NavigationBinding::Teleport(Vec3::new(52.0, 1.0, 2.0)))
        );

        assert_eq!(world.get::<&SceneName>(trigger).unwrap().as_str(), RETURN_TRIGGER_NAME);
        assert_eq!(
            binding_of(&world, trigger),
            Some(NavigationBinding::Teleport(Vec3::new(6.0, 1.0, -3.0)))
        );
        assert_eq!(
            world.get::<&Transform>(trigger).unwrap().position,
            Vec3::new(45.0, 0.0, 0.0)
        );
        assert!(world.get::<&StaticBody>(trigger).is_ok());

        // Right-hand treasure door is left alone
        let right = registry.find(&world, "treasure_right").unwrap();
        assert_eq!(binding_of(&world, right), None);

        // A second pass finds the right-hand door; the first stays bound once
        let (second, _) = registry
            .bind_new_floors_door(&mut world, &mut physics, FLOOR1_POSITION)
            .unwrap();
        assert_eq!(second, right);
        assert!(world
            .get::<&SceneName>(door)
            .unwrap()
            .as_str()
            .ends_with("ready_to_new_floors"));
    }

    #[test]
    fn no_spare_door_means_no_binding() {
        let mut world = World::new();
        let mut physics = PhysicsWorld::default();
        let mut registry = InteractionRegistry::new();
        register(
            &mut registry,
            &mut world,
            &mut physics,
            vec![mesh("wall_doorway_door_prim_ready", Vec3::ZERO)],
            RuleSet::MainDungeon,
        );
        assert!(registry
            .bind_new_floors_door(&mut world, &mut physics, FLOOR1_POSITION)
            .is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn trigger_can_be_picked_after_binding() {
        let mut world = World::new();
        let mut physics = PhysicsWorld::default();
        let mut registry = InteractionRegistry::new();
        register(
            &mut registry,
            &mut world,
            &mut physics,
            vec![mesh("wall_doorway_door_spare", Vec3::ZERO)],
            RuleSet::MainDungeon,
        );
        let (_, trigger) = registry
            .bind_new_floors_door(&mut world, &mut physics, FLOOR1_POSITION)
            .unwrap();
        let ray = Ray::new(Vec3::new(45.0, 0.5, 5.0), Vec3::NEG_Z);
        assert_eq!(registry.pick(&physics, &ray), Some(trigger));
    }
}
