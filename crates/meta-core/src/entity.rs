use std::fmt;

use serde::{Deserialize, Serialize};

use crate::component::{ComponentKind, ComponentSet};

/// Stable identifier of an entity: its index in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub usize);

impl EntityId {
    /// The index into the registry's entity list.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A live entity: identity plus its component data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identifier, assigned when the entity joins a registry.
    pub id: EntityId,
    /// The name the script declared.
    pub name: String,
    /// Attached component data.
    pub components: ComponentSet,
}

impl Entity {
    /// Create an entity. The id is reassigned when it joins a registry.
    pub fn new(name: impl Into<String>, components: ComponentSet) -> Self {
        Self {
            id: EntityId(0),
            name: name.into(),
            components,
        }
    }

    /// Whether a component of `kind` is attached.
    pub fn has(&self, kind: ComponentKind) -> bool {
        self.components.has(kind)
    }
}
