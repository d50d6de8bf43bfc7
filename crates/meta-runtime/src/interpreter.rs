//! Evaluation of bound handlers against live entities.

use std::ops::AddAssign;

use meta_core::{BoundExpr, BoundHandler, Entity, EntityId, Program, Registry, Value};

/// What a dispatch did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Handlers that ran.
    pub handlers: usize,
    /// Builtin calls executed.
    pub calls: usize,
}

impl AddAssign for DispatchStats {
    fn add_assign(&mut self, rhs: Self) {
        self.handlers += rhs.handlers;
        self.calls += rhs.calls;
    }
}

/// Evaluate `expr` for `entity`, with `arg` bound to the handler parameter.
///
/// Arithmetic follows IEEE 754: NaN and infinities propagate.
pub fn eval(expr: &BoundExpr, entity: &Entity, arg: f64) -> Value {
    match expr {
        BoundExpr::Const(v) => *v,
        BoundExpr::Param => Value::Scalar(arg),
        BoundExpr::Field(field) => Value::Vector(field.read(entity).unwrap_or_default()),
        BoundExpr::Lane(inner, axis) => Value::Scalar(axis.get(eval(inner, entity, arg).to_vec3())),
        BoundExpr::Neg(inner) => eval(inner, entity, arg).negate(),
        BoundExpr::Binary(op, lhs, rhs) => {
            Value::binary(*op, eval(lhs, entity, arg), eval(rhs, entity, arg))
        }
    }
}

/// Run one handler's statements in order against `entity`.
///
/// Each call's arguments are evaluated after the previous call's mutation,
/// so later statements observe earlier ones.
pub fn run_handler(handler: &BoundHandler, entity: &mut Entity, arg: f64) -> DispatchStats {
    let mut args = Vec::new();
    for call in &handler.body {
        args.clear();
        args.extend(call.args.iter().map(|a| eval(a, entity, arg)));
        call.builtin.apply(entity, &args);
    }
    DispatchStats {
        handlers: 1,
        calls: handler.body.len(),
    }
}

/// Deliver `event` to entity `id`. A missing handler or entity is a no-op.
pub fn dispatch(
    program: &Program,
    registry: &mut Registry,
    id: EntityId,
    event: &str,
    arg: f64,
) -> DispatchStats {
    let Some(handler) = program.handler(id, event) else {
        return DispatchStats::default();
    };
    match registry.get_mut(id) {
        Ok(entity) => run_handler(handler, entity, arg),
        Err(_) => DispatchStats::default(),
    }
}

/// Deliver `event` to every entity, in registry order.
pub fn broadcast(program: &Program, registry: &mut Registry, event: &str, arg: f64) -> DispatchStats {
    let mut stats = DispatchStats::default();
    for index in 0..registry.len() {
        stats += dispatch(program, registry, EntityId(index), event, arg);
    }
    stats
}
