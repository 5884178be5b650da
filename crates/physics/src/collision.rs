//! Collision groups and filtering.

use rapier3d::prelude::*;

/// Collision groups for different collider roles.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Static level geometry (walls, pillars, floors, the ground plane)
    Environment = 1 << 0,
    /// Player character
    Player = 1 << 1,
    /// Hit-test volumes for doors, buckets and other interactive props
    Interactive = 1 << 2,
}

impl CollisionGroup {
    fn bits(self) -> Group {
        Group::from_bits_retain(self as u32)
    }

    /// Groups for static environment colliders.
    pub fn environment() -> InteractionGroups {
        InteractionGroups::new(Self::Environment.bits(), Group::ALL)
    }

    /// Groups for the player's movement queries: blocked by environment only.
    pub fn player() -> InteractionGroups {
        InteractionGroups::new(Self::Player.bits(), Self::Environment.bits())
    }

    /// Groups for interactive sensor volumes.
    pub fn interactive() -> InteractionGroups {
        InteractionGroups::new(Self::Interactive.bits(), Group::ALL)
    }

    /// Groups for hover raycasts: see interactive volumes and nothing else.
    pub fn interactive_query() -> InteractionGroups {
        InteractionGroups::new(Group::ALL, Self::Interactive.bits())
    }
}

/// Physics handles of a zero-mass static collider built for a scene mesh.
#[derive(Debug, Clone, Copy)]
pub struct StaticBody {
    pub rigid_body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interactive_query_skips_environment() {
        let query = CollisionGroup::interactive_query();
        assert!(query.test(CollisionGroup::interactive()));
        assert!(!query.test(CollisionGroup::environment()));
    }

    #[test]
    fn player_is_blocked_by_environment_only() {
        let player = CollisionGroup::player();
        assert!(player.test(CollisionGroup::environment()));
        assert!(!player.test(CollisionGroup::interactive()));
    }
}
