//! Player controller and state.

use crate::storage::{SavedView, LOOK_AT_DISTANCE};
use engine_core::{Camera, Vec2, Vec3};
use input::InputState;
use physics::{CharacterShape, PhysicsWorld};

/// Base mouse look rate, scaled by the configured sensitivity.
const BASE_SENSITIVITY: f32 = 0.002;
const CAPSULE_HALF_HEIGHT: f32 = 0.2;
const CAPSULE_RADIUS: f32 = 0.2;

/// First-person player: a camera at eye height on top of a collision capsule.
pub struct PlayerController {
    pub camera: Camera,
    pub shape: CharacterShape,
    pub move_speed: f32,
    pub sprint_multiplier: f32,
    /// Movement intent latched from the last input frame.
    movement: Vec2,
    sprinting: bool,
}

impl PlayerController {
    pub fn new(position: Vec3, sensitivity: f32, move_speed: f32) -> Self {
        let mut camera = Camera::new(position);
        camera.sensitivity = BASE_SENSITIVITY * sensitivity.max(0.0);
        Self {
            camera,
            shape: CharacterShape::capsule(CAPSULE_HALF_HEIGHT, CAPSULE_RADIUS),
            move_speed,
            sprint_multiplier: 1.6,
            movement: Vec2::ZERO,
            sprinting: false,
        }
    }

    /// Eye position.
    pub fn position(&self) -> Vec3 {
        self.camera.position()
    }

    /// Move instantly to `target`.
    pub fn teleport(&mut self, target: Vec3) {
        self.camera.transform.position = target;
    }

    /// Point saved alongside the position when leaving for a page.
    pub fn look_at_point(&self) -> Vec3 {
        self.camera.look_at_point(LOOK_AT_DISTANCE)
    }

    /// Place and orient the player from a saved view.
    pub fn restore_view(&mut self, view: &SavedView) {
        self.teleport(view.position);
        if let Some(target) = view.look_at {
            self.camera.look_at(target);
        }
    }

    /// Read this frame's input: mouse look now, movement for the next fixed steps.
    pub fn handle_input(&mut self, input: &InputState) {
        if input.is_cursor_locked() {
            let mouse_delta = input.mouse_delta();
            self.camera.process_mouse(mouse_delta.x, mouse_delta.y);
        }
        self.movement = input.get_movement_input();
        self.sprinting = input.is_sprinting();
    }

    /// Advance one fixed step.
    pub fn update(&mut self, physics: &PhysicsWorld, dt: f32) {
        let speed = if self.sprinting {
            self.move_speed * self.sprint_multiplier
        } else {
            self.move_speed
        };
        let desired = self.camera.planar_direction(self.movement) * speed * dt;
        let eye = self.camera.position();
        self.camera.transform.position = physics.move_character(&self.shape, eye, desired, dt);
    }
}
