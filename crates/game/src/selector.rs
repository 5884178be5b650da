//! Per-frame hover and selection.

use crate::classify::NavigationBinding;
use engine_core::{Material, OriginalAppearance, HOVER_EMISSIVE};
use hecs::{Entity, World};

/// Tracks which interactive object the view ray is on.
///
/// At most one entity is highlighted at a time. The highlight is always derived
/// from the entity's [`OriginalAppearance`], so re-applying it is a no-op and
/// restoring it is exact.
#[derive(Debug, Default)]
pub struct RaycastSelector {
    hovered: Option<Entity>,
    selected: Option<Entity>,
}

impl RaycastSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-evaluate hover against this frame's hit.
    pub fn update(&mut self, world: &mut World, candidate: Option<Entity>) {
        if let Some(previous) = self.hovered {
            if candidate != Some(previous) {
                restore(world, previous);
                self.hovered = None;
            }
        }

        self.selected = None;
        let Some(entity) = candidate else {
            return;
        };
        if !highlight(world, entity) {
            return;
        }
        self.hovered = Some(entity);
        if world.get::<&NavigationBinding>(entity).is_ok() {
            self.selected = Some(entity);
        }
    }

    /// Drop hover and restore its appearance.
    #[cfg(test)]
    pub fn clear(&mut self, world: &mut World) {
        if let Some(previous) = self.hovered.take() {
            restore(world, previous);
        }
        self.selected = None;
    }

    pub fn hovered(&self) -> Option<Entity> {
        self.hovered
    }

    /// Hovered object a select action would act on.
    pub fn selected(&self) -> Option<Entity> {
        self.selected
    }
}

fn highlight(world: &mut World, entity: Entity) -> bool {
    if world.get::<&OriginalAppearance>(entity).is_err() {
        let Ok(current) = world.get::<&Material>(entity).map(|m| *m) else {
            return false;
        };
        if world.insert_one(entity, OriginalAppearance(current)).is_err() {
            return false;
        }
    }

    match world.query_one_mut::<(&mut Material, &OriginalAppearance)>(entity) {
        Ok((material, original)) => {
            *material = original.0.with_emissive(HOVER_EMISSIVE);
            true
        }
        Err(_) => false,
    }
}

fn restore(world: &mut World, entity: Entity) {
    if let Ok((material, original)) =
        world.query_one_mut::<(&mut Material, &OriginalAppearance)>(entity)
    {
        *material = original.0;
    }
}
