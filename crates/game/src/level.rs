//! Level layouts: which models load where, and how each level behaves.

use crate::classify::RuleSet;
use engine_core::Aabb;
use glam::Vec3;
use physics::{EARTH_GRAVITY, ZERO_GRAVITY};
use serde::{Deserialize, Serialize};

/// Where the first upper floor sits, relative to the main dungeon.
pub const FLOOR1_POSITION: Vec3 = Vec3::new(50.0, 0.0, 0.0);
pub const FLOOR2_POSITION: Vec3 = Vec3::new(50.0, 5.0, 0.0);

/// Offset from floor 1 to where the new-floors door drops the player.
pub const NEW_FLOORS_ARRIVAL_OFFSET: Vec3 = Vec3::new(2.0, 1.0, 2.0);
/// Offset from floor 1 to the return trigger.
pub const RETURN_TRIGGER_OFFSET: Vec3 = Vec3::new(-5.0, 0.0, 0.0);
/// Offset from the bound door to where the return trigger drops the player.
pub const RETURN_ARRIVAL_OFFSET: Vec3 = Vec3::new(2.0, 0.0, 2.0);

/// Walkway between the main dungeon and the upper floors.
pub fn bridge_bounds() -> Aabb {
    Aabb::from_center_size(Vec3::new(25.0, 0.0, 0.0), Vec3::new(10.0, 0.2, 3.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LevelKind {
    #[default]
    MainDungeon,
    BucketSortRoom,
}

/// Part a model plays in its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelRole {
    /// The loading screen waits on this one.
    Primary,
    Floor1,
    Floor2,
}

#[derive(Debug, Clone)]
pub struct ModelPlacement {
    pub file: &'static str,
    pub position: Vec3,
    pub rules: RuleSet,
    pub role: ModelRole,
}

/// Static description of a level.
#[derive(Debug, Clone)]
pub struct LevelSpec {
    pub kind: LevelKind,
    pub title: &'static str,
    pub models: Vec<ModelPlacement>,
    pub gravity: Vec3,
    pub spawn: Vec3,
    /// Restore the saved player view on entry.
    pub resume_from_storage: bool,
    /// Selecting requires look lock to be engaged.
    pub requires_look_lock: bool,
    /// Number keys and arrows drive the step overlay.
    pub has_overlay: bool,
    /// Bind a spare door to the upper floors once they load.
    pub links_upper_floors: bool,
    /// Level the back shortcut leaves for.
    pub return_to: Option<LevelKind>,
}

impl LevelKind {
    pub fn spec(self) -> LevelSpec {
        match self {
            LevelKind::MainDungeon => LevelSpec {
                kind: self,
                title: "Main Dungeon",
                models: vec![
                    ModelPlacement {
                        file: "main_dungeon_v4_compressed.glb",
                        position: Vec3::ZERO,
                        rules: RuleSet::MainDungeon,
                        role: ModelRole::Primary,
                    },
                    ModelPlacement {
                        file: "floor1.glb",
                        position: FLOOR1_POSITION,
                        rules: RuleSet::UpperFloors,
                        role: ModelRole::Floor1,
                    },
                    ModelPlacement {
                        file: "floor2.glb",
                        position: FLOOR2_POSITION,
                        rules: RuleSet::UpperFloors,
                        role: ModelRole::Floor2,
                    },
                ],
                gravity: ZERO_GRAVITY,
                spawn: Vec3::new(0.0, 1.0, 0.0),
                resume_from_storage: true,
                requires_look_lock: true,
                has_overlay: false,
                links_upper_floors: true,
                return_to: None,
            },
            LevelKind::BucketSortRoom => LevelSpec {
                kind: self,
                title: "Bucket Sort Room",
                models: vec![ModelPlacement {
                    file: "floor1.glb",
                    position: Vec3::ZERO,
                    rules: RuleSet::BucketSortRoom,
                    role: ModelRole::Primary,
                }],
                gravity: EARTH_GRAVITY,
                spawn: Vec3::new(0.0, 1.0, 7.0),
                resume_from_storage: false,
                requires_look_lock: false,
                has_overlay: true,
                links_upper_floors: false,
                return_to: Some(LevelKind::MainDungeon),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_level_has_one_primary_model() {
        for kind in [LevelKind::MainDungeon, LevelKind::BucketSortRoom] {
            let spec = kind.spec();
            let primaries = spec.models.iter().filter(|m| m.role == ModelRole::Primary).count();
            assert_eq!(primaries, 1, "{:?}", kind);
            assert_eq!(spec.models[0].role, ModelRole::Primary);
        }
    }

    #[test]
    fn bucket_room_has_gravity_and_main_dungeon_does_not() {
        assert_eq!(LevelKind::MainDungeon.spec().gravity, Vec3::ZERO);
        assert_eq!(LevelKind::BucketSortRoom.spec().gravity.y, -9.82);
        assert_eq!(LevelKind::BucketSortRoom.spec().spawn, Vec3::new(0.0, 1.0, 7.0));
    }

    #[test]
    fn bridge_spans_ten_units() {
        let b = bridge_bounds();
        assert_eq!(b.center(), Vec3::new(25.0, 0.0, 0.0));
        assert_eq!(b.size().x, 10.0);
    }
}
