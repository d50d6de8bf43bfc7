use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vec3::Vec3;

/// The closed set of component kinds a script may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Orientation state: three rotation angles.
    Transform,
    /// Motion state: position and velocity.
    Physics,
}

impl ComponentKind {
    /// Every component kind, in declaration order.
    pub const ALL: [ComponentKind; 2] = [ComponentKind::Transform, ComponentKind::Physics];

    /// Resolve a component name as written in a script. Names are case-sensitive.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Transform" => Some(Self::Transform),
            "Physics" => Some(Self::Physics),
            _ => None,
        }
    }

    /// The script-facing name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Transform => "Transform",
            Self::Physics => "Physics",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Component data
// ---------------------------------------------------------------------------

/// Rotation angles (radians) about the X, Y, and Z axes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    /// Accumulated rotation per axis.
    #[serde(default)]
    pub rotation: Vec3,
}

/// Position and velocity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Physics {
    /// World position.
    #[serde(default)]
    pub position: Vec3,
    /// Velocity in units per second.
    #[serde(default)]
    pub velocity: Vec3,
}

/// The components attached to one entity. A `None` slot means the kind was
/// not declared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentSet {
    /// Rotation state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    /// Position and velocity state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physics: Option<Physics>,
}

impl ComponentSet {
    /// Whether a component of `kind` is attached.
    pub fn has(&self, kind: ComponentKind) -> bool {
        match kind {
            ComponentKind::Transform => self.transform.is_some(),
            ComponentKind::Physics => self.physics.is_some(),
        }
    }

    /// Attached kinds, in canonical order.
    pub fn kinds(&self) -> Vec<ComponentKind> {
        ComponentKind::ALL
            .into_iter()
            .filter(|k| self.has(*k))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Defaults supplied by the embedding caller
// ---------------------------------------------------------------------------

/// Per-entity replacement of individual default fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentOverride {
    /// Replaces the default position.
    pub position: Option<Vec3>,
    /// Replaces the default velocity.
    pub velocity: Option<Vec3>,
    /// Replaces the default rotation.
    pub rotation: Option<Vec3>,
}

/// Initial component data for freshly built entities.
///
/// Scripts have no syntax for initial values, so the embedding caller
/// supplies them here. Everything is zero unless configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentDefaults {
    /// Applied to every entity declaring `Transform`.
    pub transform: Transform,
    /// Applied to every entity declaring `Physics`.
    pub physics: Physics,
    /// Keyed by entity name; fields set here win over the shared defaults.
    pub overrides: BTreeMap<String, ComponentOverride>,
}

impl ComponentDefaults {
    /// Set the shared initial velocity.
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.physics.velocity = velocity;
        self
    }

    /// Set the shared initial position.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.physics.position = position;
        self
    }

    /// Set the shared initial rotation.
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.transform.rotation = rotation;
        self
    }

    /// Set the initial velocity of a single entity.
    pub fn with_entity_velocity(mut self, entity: impl Into<String>, velocity: Vec3) -> Self {
        self.overrides.entry(entity.into()).or_default().velocity = Some(velocity);
        self
    }

    /// Set the initial position of a single entity.
    pub fn with_entity_position(mut self, entity: impl Into<String>, position: Vec3) -> Self {
        self.overrides.entry(entity.into()).or_default().position = Some(position);
        self
    }

    /// Initial `Transform` for the named entity.
    pub fn transform_for(&self, entity: &str) -> Transform {
        let mut t = self.transform;
        if let Some(rotation) = self.overrides.get(entity).and_then(|o| o.rotation) {
            t.rotation = rotation;
        }
        t
    }

    /// Initial `Physics` for the named entity.
    pub fn physics_for(&self, entity: &str) -> Physics {
        let mut p = self.physics;
        if let Some(o) = self.overrides.get(entity) {
            if let Some(position) = o.position {
                p.position = position;
            }
            if let Some(velocity) = o.velocity {
                p.velocity = velocity;
            }
        }
        p
    }

    /// Build the component set for `entity` with the given kinds attached.
    pub fn components_for(&self, entity: &str, kinds: &[ComponentKind]) -> ComponentSet {
        let mut set = ComponentSet::default();
        for kind in kinds {
            match kind {
                ComponentKind::Transform => set.transform = Some(self.transform_for(entity)),
                ComponentKind::Physics => set.physics = Some(self.physics_for(entity)),
            }
        }
        set
    }
}
