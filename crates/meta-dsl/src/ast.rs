use meta_core::BinaryOp;

/// Source span as a byte range.
pub type Span = std::ops::Range<usize>;

/// An AST node with source location.
///
/// Equality compares nodes only, so two parses of differently formatted
/// but equivalent source compare equal.
#[derive(Debug, Clone)]
pub struct Spanned<T> {
    /// The wrapped AST node.
    pub node: T,
    /// The byte range of this node in the source text.
    pub span: Span,
}

impl<T> Spanned<T> {
    /// Wrap `node` with the byte range it was parsed from.
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

impl<T: PartialEq> PartialEq for Spanned<T> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

/// A parsed script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    /// Entity declarations in source order.
    pub entities: Vec<Spanned<EntityDecl>>,
}

/// `entity Name { components: [..]; on Event(param) { .. } }`
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDecl {
    /// The entity's name.
    pub name: Spanned<String>,
    /// Declared component names, in order. Never empty.
    pub components: Vec<Spanned<String>>,
    /// Event handlers, in order.
    pub handlers: Vec<Spanned<EventHandler>>,
}

/// `on Event(param) { statements }`
#[derive(Debug, Clone, PartialEq)]
pub struct EventHandler {
    /// The event name, e.g. `Tick`.
    pub event: Spanned<String>,
    /// The parameter name, e.g. `dt`.
    pub param: Spanned<String>,
    /// Statements in execution order.
    pub body: Vec<Spanned<Statement>>,
}

/// A builtin call statement, `name(arg, ...);`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// The called function.
    pub name: Spanned<String>,
    /// Argument expressions.
    pub args: Vec<Spanned<Expr>>,
}

/// An arithmetic expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal.
    Number(f64),
    /// A variable: the handler parameter or a component field.
    Ident(String),
    /// Lane access, `expr.x`.
    Field(Box<Spanned<Expr>>, Spanned<String>),
    /// Unary minus.
    Neg(Box<Spanned<Expr>>),
    /// Binary arithmetic.
    Binary(BinaryOp, Box<Spanned<Expr>>, Box<Spanned<Expr>>),
}

impl Expr {
    /// Binding strength of the outermost operator. Atoms bind tightest.
    pub fn precedence(&self) -> u8 {
        match self {
            Expr::Binary(op, _, _) => op.precedence(),
            Expr::Neg(_) => 3,
            Expr::Number(_) | Expr::Ident(_) | Expr::Field(_, _) => 4,
        }
    }

    /// Nesting depth of the expression tree. Atoms have depth 1.
    ///
    /// Walks with an explicit stack so arbitrarily deep trees are measured
    /// without recursing.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((expr, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            match expr {
                Expr::Number(_) | Expr::Ident(_) => {}
                Expr::Field(base, _) | Expr::Neg(base) => stack.push((&base.node, depth + 1)),
                Expr::Binary(_, l, r) => {
                    stack.push((&l.node, depth + 1));
                    stack.push((&r.node, depth + 1));
                }
            }
        }
        deepest
    }

    /// Every identifier the expression reads, in source order.
    pub fn idents(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_idents(&mut out);
        out
    }

    fn collect_idents<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Number(_) => {}
            Expr::Ident(name) => out.push(name),
            Expr::Field(base, _) | Expr::Neg(base) => base.node.collect_idents(out),
            Expr::Binary(_, l, r) => {
                l.node.collect_idents(out);
                r.node.collect_idents(out);
            }
        }
    }
}

impl Script {
    /// Look up an entity declaration by name.
    pub fn entity(&self, name: &str) -> Option<&EntityDecl> {
        self.entities
            .iter()
            .map(|e| &e.node)
            .find(|e| e.name.node == name)
    }

    /// Every statement in the script, across all entities and handlers.
    pub fn statements(&self) -> impl Iterator<Item = &Spanned<Statement>> {
        self.entities
            .iter()
            .flat_map(|e| e.node.handlers.iter())
            .flat_map(|h| h.node.body.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_are_ignored_by_equality() {
        let a = Spanned::new(Expr::Ident("dt".into()), 0..2);
        let b = Spanned::new(Expr::Ident("dt".into()), 10..12);
        assert_eq!(a, b);
        assert_ne!(a, Spanned::new(Expr::Ident("t".into()), 0..2));
    }

    #[test]
    fn idents_in_source_order() {
        let e = Expr::Binary(
            BinaryOp::Mul,
            Box::new(Spanned::new(Expr::Ident("velocity".into()), 0..8)),
            Box::new(Spanned::new(
                Expr::Neg(Box::new(Spanned::new(Expr::Ident("dt".into()), 12..14))),
                11..14,
            )),
        );
        assert_eq!(e.idents(), vec!["velocity", "dt"]);
        assert_eq!(e.depth(), 3);
    }

    #[test]
    fn depth_of_long_chain() {
        let mut e = Spanned::new(Expr::Ident("dt".into()), 0..2);
        for _ in 0..999 {
            e = Spanned::new(Expr::Neg(Box::new(e)), 0..0);
        }
        assert_eq!(e.node.depth(), 1000);
        assert_eq!(Expr::Number(1.0).depth(), 1);
    }
}
