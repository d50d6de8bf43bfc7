use std::ops::Range;

use crate::builtin::Builtin;
use crate::component::ComponentKind;
use crate::entity::{Entity, EntityId};
use crate::value::{Axis, BinaryOp, Value};
use crate::vec3::Vec3;

/// A component field readable from handler expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// `position` (Physics).
    Position,
    /// `velocity` (Physics).
    Velocity,
    /// `rotation` (Transform).
    Rotation,
}

impl Field {
    /// Resolve an identifier to a component field.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "position" => Some(Self::Position),
            "velocity" => Some(Self::Velocity),
            "rotation" => Some(Self::Rotation),
            _ => None,
        }
    }

    /// The script-facing name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Velocity => "velocity",
            Self::Rotation => "rotation",
        }
    }

    /// The component that owns this field.
    pub fn component(self) -> ComponentKind {
        match self {
            Self::Position | Self::Velocity => ComponentKind::Physics,
            Self::Rotation => ComponentKind::Transform,
        }
    }

    /// Current value of this field on `entity`, if the owning component is attached.
    pub fn read(self, entity: &Entity) -> Option<Vec3> {
        match self {
            Self::Position => entity.components.physics.map(|p| p.position),
            Self::Velocity => entity.components.physics.map(|p| p.velocity),
            Self::Rotation => entity.components.transform.map(|t| t.rotation),
        }
    }
}

/// A type-checked expression with every name resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundExpr {
    /// A literal.
    Const(Value),
    /// The handler's parameter (e.g. `dt`).
    Param,
    /// A component field of the executing entity.
    Field(Field),
    /// One lane of a vector expression.
    Lane(Box<BoundExpr>, Axis),
    /// Negation.
    Neg(Box<BoundExpr>),
    /// Binary arithmetic.
    Binary(BinaryOp, Box<BoundExpr>, Box<BoundExpr>),
}

/// A builtin call with its target resolved at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundCall {
    /// The builtin to apply.
    pub builtin: Builtin,
    /// Argument expressions, type-checked against the builtin.
    pub args: Vec<BoundExpr>,
    /// Byte span of the call in the script source.
    pub span: Range<usize>,
}

/// An event handler ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundHandler {
    /// Event name this handler responds to.
    pub event: String,
    /// Name the event payload is bound to.
    pub param: String,
    /// Calls in execution order.
    pub body: Vec<BoundCall>,
}

/// The handlers of one entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityProgram {
    /// At most one handler per event.
    pub handlers: Vec<BoundHandler>,
}

impl EntityProgram {
    /// The handler for `event`, if declared.
    pub fn handler(&self, event: &str) -> Option<&BoundHandler> {
        self.handlers.iter().find(|h| h.event == event)
    }
}

/// Bound handlers for every entity of a registry, indexed by [`EntityId`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    entities: Vec<EntityProgram>,
}

impl Program {
    /// An empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the program for the next entity id.
    pub fn push(&mut self, program: EntityProgram) -> EntityId {
        let id = EntityId(self.entities.len());
        self.entities.push(program);
        id
    }

    /// Handlers of `id`, if the entity exists.
    pub fn entity(&self, id: EntityId) -> Option<&EntityProgram> {
        self.entities.get(id.0)
    }

    /// The handler `id` declares for `event`.
    pub fn handler(&self, id: EntityId, event: &str) -> Option<&BoundHandler> {
        self.entity(id).and_then(|p| p.handler(event))
    }

    /// Number of entity programs.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entity programs were pushed.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Total number of calls across every handler for `event`.
    pub fn call_count(&self, event: &str) -> usize {
        self.entities
            .iter()
            .filter_map(|p| p.handler(event))
            .map(|h| h.body.len())
            .sum()
    }
}
