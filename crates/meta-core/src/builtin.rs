use std::fmt;

use crate::component::ComponentKind;
use crate::entity::Entity;
use crate::value::{Axis, Value, ValueType};

/// Declared type of a builtin parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Accepts a scalar only.
    Scalar,
    /// Accepts a vector, or a scalar broadcast to all three lanes.
    Vector,
}

impl ParamType {
    /// Whether an argument of type `found` may be passed.
    pub fn accepts(self, found: ValueType) -> bool {
        match self {
            Self::Scalar => found == ValueType::Scalar,
            Self::Vector => true,
        }
    }

    /// The value type this parameter expects.
    pub fn value_type(self) -> ValueType {
        match self {
            Self::Scalar => ValueType::Scalar,
            Self::Vector => ValueType::Vector,
        }
    }
}

/// Functions a handler may call. Each mutates one component of the calling
/// entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `move(v)`: position += v.
    Move,
    /// `rotateX(a)`: rotation.x += a.
    RotateX,
    /// `rotateY(a)`: rotation.y += a.
    RotateY,
    /// `rotateZ(a)`: rotation.z += a.
    RotateZ,
    /// `rotate(v)`: rotation += v.
    Rotate,
    /// `accelerate(v)`: velocity += v.
    Accelerate,
    /// `setVelocity(v)`: velocity = v.
    SetVelocity,
    /// `setPosition(v)`: position = v.
    SetPosition,
}

impl Builtin {
    /// Every builtin, in table order.
    pub const ALL: [Builtin; 8] = [
        Builtin::Move,
        Builtin::RotateX,
        Builtin::RotateY,
        Builtin::RotateZ,
        Builtin::Rotate,
        Builtin::Accelerate,
        Builtin::SetVelocity,
        Builtin::SetPosition,
    ];

    /// Resolve a call name. Names are case-sensitive.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    /// The script-facing name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::RotateX => "rotateX",
            Self::RotateY => "rotateY",
            Self::RotateZ => "rotateZ",
            Self::Rotate => "rotate",
            Self::Accelerate => "accelerate",
            Self::SetVelocity => "setVelocity",
            Self::SetPosition => "setPosition",
        }
    }

    /// The component this builtin mutates.
    pub fn required_component(self) -> ComponentKind {
        match self {
            Self::Move | Self::Accelerate | Self::SetVelocity | Self::SetPosition => {
                ComponentKind::Physics
            }
            Self::RotateX | Self::RotateY | Self::RotateZ | Self::Rotate => {
                ComponentKind::Transform
            }
        }
    }

    /// Parameter types, in order.
    pub fn params(self) -> &'static [ParamType] {
        match self {
            Self::RotateX | Self::RotateY | Self::RotateZ => &[ParamType::Scalar],
            Self::Move | Self::Rotate | Self::Accelerate | Self::SetVelocity | Self::SetPosition => {
                &[ParamType::Vector]
            }
        }
    }

    /// Apply the mutation to `entity` with already evaluated arguments.
    ///
    /// Binding guarantees the required component is attached and the
    /// arguments match [`Builtin::params`]. A call that breaks either rule
    /// leaves the entity unchanged and logs a warning.
    pub fn apply(self, entity: &mut Entity, args: &[Value]) {
        let Some(&arg) = args.first() else {
            log::warn!("`{self}` on entity `{}` called without arguments; skipped", entity.name);
            return;
        };
        let applied = match self {
            Self::Move => {
                if let Some(p) = entity.components.physics.as_mut() {
                    p.position += arg.to_vec3();
                    true
                } else {
                    false
                }
            }
            Self::Accelerate => {
                if let Some(p) = entity.components.physics.as_mut() {
                    p.velocity += arg.to_vec3();
                    true
                } else {
                    false
                }
            }
            Self::SetVelocity => {
                if let Some(p) = entity.components.physics.as_mut() {
                    p.velocity = arg.to_vec3();
                    true
                } else {
                    false
                }
            }
            Self::SetPosition => {
                if let Some(p) = entity.components.physics.as_mut() {
                    p.position = arg.to_vec3();
                    true
                } else {
                    false
                }
            }
            Self::Rotate => {
                if let Some(t) = entity.components.transform.as_mut() {
                    t.rotation += arg.to_vec3();
                    true
                } else {
                    false
                }
            }
            Self::RotateX | Self::RotateY | Self::RotateZ => {
                let axis = match self {
                    Self::RotateX => Axis::X,
                    Self::RotateY => Axis::Y,
                    _ => Axis::Z,
                };
                match (entity.components.transform.as_mut(), arg.as_scalar()) {
                    (Some(t), Some(angle)) => {
                        *axis.get_mut(&mut t.rotation) += angle;
                        true
                    }
                    _ => false,
                }
            }
        };
        if !applied {
            log::warn!(
                "`{self}` on entity `{}` skipped: needs component `{}` and a {} argument, got {}",
                entity.name,
                self.required_component(),
                self.params().first().map_or(ValueType::Vector, |p| p.value_type()),
                arg.value_type(),
            );
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
