//! Mesh classification and navigation bindings.
//!
//! Node names are matched once, when a model is registered. Everything after
//! that works on [`ObjectKind`] and [`NavigationBinding`].

use crate::level::LevelKind;
use glam::Vec3;

/// What an interactive object is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Doorway leading to an algorithm page or another part of the dungeon.
    Door,
    /// Staircase on the upper floors.
    Stair,
    /// Prop that opens the step overlay (barrels, buckets).
    OverlayTrigger,
    /// Marker that sends the player back from the upper floors.
    ReturnTrigger,
}

/// Which rule table a model is classified with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleSet {
    MainDungeon,
    UpperFloors,
    BucketSortRoom,
}

/// Result of classifying one mesh name. A mesh may be both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    /// Gets a zero-mass box collider sized to its bounds.
    pub static_collider: bool,
    pub kind: Option<ObjectKind>,
}

impl Classification {
    pub fn is_interactive(&self) -> bool {
        self.kind.is_some()
    }
}

struct Rules {
    colliders: &'static [&'static str],
    interactive: &'static [(&'static str, ObjectKind)],
}

const MAIN_DUNGEON_RULES: Rules = Rules {
    colliders: &["wall", "pillar"],
    interactive: &[("wall_doorway_door", ObjectKind::Door)],
};

const UPPER_FLOOR_RULES: Rules = Rules {
    colliders: &["wall", "pillar", "floor", "ceiling"],
    interactive: &[("door", ObjectKind::Door), ("stair", ObjectKind::Stair)],
};

const BUCKET_ROOM_RULES: Rules = Rules {
    colliders: &["wall", "floor"],
    interactive: &[
        ("barrel", ObjectKind::OverlayTrigger),
        ("bucket", ObjectKind::OverlayTrigger),
        ("cylinder", ObjectKind::OverlayTrigger),
    ],
};

impl RuleSet {
    fn rules(self) -> &'static Rules {
        match self {
            RuleSet::MainDungeon => &MAIN_DUNGEON_RULES,
            RuleSet::UpperFloors => &UPPER_FLOOR_RULES,
            RuleSet::BucketSortRoom => &BUCKET_ROOM_RULES,
        }
    }

    /// Classify a node name. Within the interactive table the first match wins.
    pub fn classify(self, name: &str) -> Classification {
        let rules = self.rules();
        Classification {
            static_collider: rules.colliders.iter().any(|tag| name.contains(tag)),
            kind: rules
                .interactive
                .iter()
                .find(|(tag, _)| name.contains(tag))
                .map(|&(_, kind)| kind),
        }
    }
}

/// Algorithm pages a door can lead to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Kruskal,
    Heapsort,
    Prim,
    BucketSort,
}

impl Destination {
    /// Page filename, relative to the pages directory.
    pub fn page(self) -> &'static str {
        match self {
            Destination::Kruskal => "Kruskal.html",
            Destination::Heapsort => "heapsort.html",
            Destination::Prim => "Prim.html",
            Destination::BucketSort => "bucketsort.html",
        }
    }

    /// Level that renders this page in-app, if there is one.
    pub fn level(self) -> Option<LevelKind> {
        match self {
            Destination::BucketSort => Some(LevelKind::BucketSortRoom),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Destination::Kruskal => "Kruskal",
            Destination::Heapsort => "Heapsort",
            Destination::Prim => "Prim",
            Destination::BucketSort => "Bucket Sort",
        }
    }
}

/// What selecting an object does. Resolved once per object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavigationBinding {
    Redirect(Destination),
    Teleport(Vec3),
    Overlay,
}

/// Name tag that marks the door bound to the upper floors.
pub const NEW_FLOORS_TAG: &str = "to_new_floors";
/// Name of the trigger that leads back from the upper floors.
pub const RETURN_TRIGGER_NAME: &str = "return_to_main_dungeon";

enum BindingRule {
    Redirect(&'static str, Destination),
    /// Matches only when the object carries a teleport target.
    Teleport(&'static str),
    Overlay(ObjectKind),
}

const BINDING_RULES: &[BindingRule] = &[
    BindingRule::Redirect("kruskal", Destination::Kruskal),
    BindingRule::Redirect("heapsort", Destination::Heapsort),
    BindingRule::Redirect("prim", Destination::Prim),
    BindingRule::Redirect("bucketsort", Destination::BucketSort),
    BindingRule::Teleport(NEW_FLOORS_TAG),
    BindingRule::Teleport(RETURN_TRIGGER_NAME),
    BindingRule::Overlay(ObjectKind::OverlayTrigger),
];

/// Resolve the binding of an interactive object. First matching rule wins.
pub fn resolve_binding(
    name: &str,
    kind: ObjectKind,
    teleport_target: Option<Vec3>,
) -> Option<NavigationBinding> {
    BINDING_RULES.iter().find_map(|rule| match *rule {
        BindingRule::Redirect(tag, destination) if name.contains(tag) => {
            Some(NavigationBinding::Redirect(destination))
        }
        BindingRule::Teleport(tag) if name.contains(tag) => {
            teleport_target.map(NavigationBinding::Teleport)
        }
        BindingRule::Overlay(trigger) if trigger == kind => Some(NavigationBinding::Overlay),
        _ => None,
    })
}

/// True for names already claimed by an algorithm page or the upper floors.
pub fn is_claimed_door(name: &str) -> bool {
    name.contains(NEW_FLOORS_TAG)
        || matches!(
            resolve_binding(name, ObjectKind::Door, None),
            Some(NavigationBinding::Redirect(_))
        )
}
