//! Kinematic movement for the first-person player.

use crate::{CollisionGroup, PhysicsWorld};
use engine_core::Vec3;
use rapier3d::control::{CharacterLength, KinematicCharacterController};
use rapier3d::prelude::*;

/// Capsule used for player collision. The eye sits at the top of the capsule.
#[derive(Clone)]
pub struct CharacterShape {
    shape: SharedShape,
    half_height: f32,
    radius: f32,
}

impl std::fmt::Debug for CharacterShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterShape")
            .field("half_height", &self.half_height)
            .field("radius", &self.radius)
            .finish()
    }
}

impl CharacterShape {
    pub fn capsule(half_height: f32, radius: f32) -> Self {
        Self {
            shape: SharedShape::capsule_y(half_height, radius),
            half_height,
            radius,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Distance from the capsule centre to the eye position.
    pub fn eye_offset(&self) -> f32 {
        self.half_height + self.radius
    }
}

impl PhysicsWorld {
    /// Slide `shape` from `eye` along `desired`, stopping against static geometry.
    ///
    /// Returns the eye position after the move. Interactive sensors never block.
    pub fn move_character(
        &self,
        shape: &CharacterShape,
        eye: Vec3,
        desired: Vec3,
        dt: f32,
    ) -> Vec3 {
        if desired.length_squared() <= f32::EPSILON {
            return eye;
        }

        let center = eye - Vec3::Y * shape.eye_offset();
        let position = Isometry::translation(center.x, center.y, center.z);

        let controller = KinematicCharacterController {
            offset: CharacterLength::Absolute(0.02),
            autostep: None,
            snap_to_ground: None,
            ..Default::default()
        };

        let filter = QueryFilter::default()
            .exclude_sensors()
            .groups(CollisionGroup::player());

        let movement = controller.move_shape(
            dt,
            &self.rigid_body_set,
            &self.collider_set,
            &self.query_pipeline,
            &*shape.shape,
            &position,
            vector![desired.x, desired.y, desired.z],
            filter,
            |_collision| {},
        );

        let t = movement.translation;
        eye + Vec3::new(t.x, t.y, t.z)
    }
}
