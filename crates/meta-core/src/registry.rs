use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId};
use crate::error::{CoreError, CoreResult};
use crate::vec3::Vec3;

/// The authoritative, ordered set of live entities.
///
/// Entities keep their insertion order; [`EntityId`]s are indices into that
/// order and stay valid for the registry's lifetime.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entities: Vec<Entity>,
    by_name: HashMap<String, EntityId>,
}

/// Read-only copy of one entity's component state, handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Registry id of the entity.
    pub id: EntityId,
    /// Declared name.
    pub name: String,
    /// Position, when the entity has `Physics`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    /// Velocity, when the entity has `Physics`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity: Option<Vec3>,
    /// Rotation, when the entity has `Transform`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec3>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity, assigning it the next id. Names must be unique.
    pub fn insert(&mut self, mut entity: Entity) -> CoreResult<EntityId> {
        if self.by_name.contains_key(&entity.name) {
            return Err(CoreError::DuplicateName(entity.name));
        }
        let id = EntityId(self.entities.len());
        entity.id = id;
        self.by_name.insert(entity.name.clone(), id);
        self.entities.push(entity);
        Ok(id)
    }

    /// All entities in declaration order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Look up an entity by its declared name.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.by_name.get(name).and_then(|id| self.entities.get(id.0))
    }

    /// Mutable lookup by declared name.
    pub fn entity_mut(&mut self, name: &str) -> Option<&mut Entity> {
        let id = *self.by_name.get(name)?;
        self.entities.get_mut(id.0)
    }

    /// Look up an entity by id.
    pub fn get(&self, id: EntityId) -> CoreResult<&Entity> {
        self.entities.get(id.0).ok_or(CoreError::EntityNotFound(id))
    }

    /// Mutable lookup by id.
    pub fn get_mut(&mut self, id: EntityId) -> CoreResult<&mut Entity> {
        self.entities
            .get_mut(id.0)
            .ok_or(CoreError::EntityNotFound(id))
    }

    /// Ids of all entities in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().map(|e| e.id)
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the registry holds no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Copy out the current component state of every entity.
    pub fn snapshot(&self) -> Vec<EntitySnapshot> {
        self.entities
            .iter()
            .map(|e| EntitySnapshot {
                id: e.id,
                name: e.name.clone(),
                position: e.components.physics.map(|p| p.position),
                velocity: e.components.physics.map(|p| p.velocity),
                rotation: e.components.transform.map(|t| t.rotation),
            })
            .collect()
    }
}
