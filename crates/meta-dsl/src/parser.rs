use std::collections::HashSet;
use std::fmt;

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;
use meta_core::BinaryOp;

use crate::ast::*;
use crate::lexer::{Token, line_col};

type ChumSpan = SimpleSpan;

/// Deepest expression nesting a script may use. Deeper expressions are
/// rejected with a parse error so later passes never walk unbounded trees.
pub const MAX_EXPR_DEPTH: usize = 256;

/// Parse error with source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// What the parser would have accepted at this point.
    pub expected: Vec<String>,
    /// The token found instead, or `None` at end of input.
    pub found: Option<String>,
    /// Byte range of the offending token.
    pub span: Span,
    /// One-based line of the offending token.
    pub line: usize,
    /// One-based column of the offending token.
    pub column: usize,
    /// Human-readable description.
    pub message: String,
}

impl ParseError {
    fn from_rich(source: &str, e: Rich<'_, Token>) -> Self {
        let span = e.span().into_range();
        let found = e.found().map(|t| t.to_string());
        let mut expected: Vec<String> = e.expected().map(|p| p.to_string()).collect();
        expected.sort();
        expected.dedup();

        let mut message = match &found {
            Some(tok) => format!("unexpected `{tok}`"),
            None => "unexpected end of input".to_string(),
        };
        if !expected.is_empty() {
            message.push_str(&format!(", expected {}", expected.join(" or ")));
        }

        let (line, column) = line_col(source, span.start);
        Self {
            expected,
            found,
            span,
            line,
            column,
            message,
        }
    }

    fn duplicate_entity(source: &str, name: &Spanned<String>) -> Self {
        let (line, column) = line_col(source, name.span.start);
        Self {
            expected: Vec::new(),
            found: Some(name.node.clone()),
            span: name.span.clone(),
            line,
            column,
            message: format!("duplicate entity name `{}`", name.node),
        }
    }

    fn too_deep(source: &str, span: Span) -> Self {
        let (line, column) = line_col(source, span.start);
        Self {
            expected: Vec::new(),
            found: source.get(span.clone()).map(|s| s.chars().take(32).collect()),
            span,
            line,
            column,
            message: format!("expression nested too deeply (limit {MAX_EXPR_DEPTH})"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {}",
            self.message, self.line, self.column
        )
    }
}

impl std::error::Error for ParseError {}

fn spanned<T>(node: T, span: ChumSpan) -> Spanned<T> {
    Spanned {
        node,
        span: span.into_range(),
    }
}

/// Build the full script parser.
///
/// All sub-parsers are defined inline so chumsky can infer the generic input type.
fn script_parser<'a, I>() -> impl Parser<'a, I, Script, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = ChumSpan>,
{
    // -- Helpers --

    let ident = select! { Token::Ident(w) => w }.labelled("identifier");
    let number = select! { Token::Number(n, _) => n }.labelled("number");
    let name = ident.clone().map_with(|w, e| spanned(w, e.span()));

    // -- Expressions --

    let expr = recursive(|expr| {
        let parens = expr
            .delimited_by(just(Token::LParen), just(Token::RParen))
            .map_with(|inner: Spanned<Expr>, e| spanned(inner.node, e.span()));

        let atom = choice((
            number.map_with(|n, e| spanned(Expr::Number(n), e.span())),
            ident.map_with(|w, e| spanned(Expr::Ident(w), e.span())),
            parens,
        ))
        .labelled("expression");

        // expr.x.y
        let postfix = atom.foldl_with(
            just(Token::Dot).ignore_then(name.clone()).repeated(),
            |base, field, e| spanned(Expr::Field(Box::new(base), field), e.span()),
        );

        let unary = recursive(|unary| {
            just(Token::Minus)
                .ignore_then(unary)
                .map_with(|inner: Spanned<Expr>, e| spanned(Expr::Neg(Box::new(inner)), e.span()))
                .or(postfix)
        });

        let product_op = select! {
            Token::Star => BinaryOp::Mul,
            Token::Slash => BinaryOp::Div,
        };
        let product = unary.clone().foldl_with(
            product_op.then(unary).repeated(),
            |lhs, (op, rhs), e| spanned(Expr::Binary(op, Box::new(lhs), Box::new(rhs)), e.span()),
        );

        let sum_op = select! {
            Token::Plus => BinaryOp::Add,
            Token::Minus => BinaryOp::Sub,
        };
        product.clone().foldl_with(
            sum_op.then(product).repeated(),
            |lhs, (op, rhs), e| spanned(Expr::Binary(op, Box::new(lhs), Box::new(rhs)), e.span()),
        )
    });

    // -- Statements --

    // name(arg, ...);
    let statement = name
        .clone()
        .then(
            expr.separated_by(just(Token::Comma))
                .at_least(1)
                .collect::<Vec<_>>()
                .delimited_by(just(Token::LParen), just(Token::RParen)),
        )
        .then_ignore(just(Token::Semicolon))
        .map_with(|(name, args), e| spanned(Statement { name, args }, e.span()))
        .labelled("statement");

    // on Event(param) { ... }
    let handler = just(Token::On)
        .ignore_then(name.clone())
        .then(name.clone().delimited_by(just(Token::LParen), just(Token::RParen)))
        .then(
            statement
                .repeated()
                .collect::<Vec<_>>()
                .delimited_by(just(Token::LBrace), just(Token::RBrace)),
        )
        .map_with(|((event, param), body), e| {
            spanned(EventHandler { event, param, body }, e.span())
        })
        .labelled("event handler");

    // components: [A, B];
    let components = just(Token::Components)
        .ignore_then(just(Token::Colon))
        .ignore_then(
            name.clone()
                .separated_by(just(Token::Comma))
                .at_least(1)
                .collect::<Vec<_>>()
                .delimited_by(just(Token::LBracket), just(Token::RBracket)),
        )
        .then_ignore(just(Token::Semicolon))
        .labelled("components declaration");

    // -- Top-level declarations --

    let entity = just(Token::Entity)
        .ignore_then(name)
        .then_ignore(just(Token::LBrace))
        .then(components)
        .then(handler.repeated().collect::<Vec<_>>())
        .then_ignore(just(Token::RBrace))
        .map_with(|((name, components), handlers), e| {
            spanned(
                EntityDecl {
                    name,
                    components,
                    handlers,
                },
                e.span(),
            )
        })
        .labelled("entity declaration");

    // -- Script --
    entity
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
        .map(|entities| Script { entities })
}

/// Report every entity whose name repeats an earlier declaration.
fn duplicate_names(source: &str, script: &Script) -> Vec<ParseError> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();
    for decl in &script.entities {
        let name = &decl.node.name;
        if !seen.insert(name.node.as_str()) {
            errors.push(ParseError::duplicate_entity(source, name));
        }
    }
    errors
}

/// Reject parentheses and unary minus stacked past [`MAX_EXPR_DEPTH`]
/// before the recursive descent ever sees them.
fn prefix_nesting(source: &str, tokens: &[(Token, Span)]) -> Option<ParseError> {
    // Pending unary minuses, one counter per open parenthesis.
    let mut levels: Vec<usize> = vec![0];
    let mut pending = 0;
    let mut prev: Option<&Token> = None;
    for (tok, span) in tokens {
        match tok {
            Token::LParen => levels.push(0),
            Token::RParen => {
                if levels.len() > 1 {
                    pending -= levels.pop().unwrap_or(0);
                }
                if let Some(level) = levels.last_mut() {
                    pending -= *level;
                    *level = 0;
                }
            }
            Token::Minus
                if matches!(
                    prev,
                    None | Some(
                        Token::LParen
                            | Token::Comma
                            | Token::Plus
                            | Token::Minus
                            | Token::Star
                            | Token::Slash
                    )
                ) =>
            {
                if let Some(level) = levels.last_mut() {
                    *level += 1;
                    pending += 1;
                }
            }
            Token::Number(..) | Token::Ident(_) => {
                if let Some(level) = levels.last_mut() {
                    pending -= *level;
                    *level = 0;
                }
            }
            _ => {}
        }
        if levels.len() - 1 + pending > MAX_EXPR_DEPTH {
            return Some(ParseError::too_deep(source, span.clone()));
        }
        prev = Some(tok);
    }
    None
}

/// Report every argument expression deeper than [`MAX_EXPR_DEPTH`].
fn deep_expressions(source: &str, script: &Script) -> Vec<ParseError> {
    script
        .statements()
        .flat_map(|stmt| stmt.node.args.iter())
        .filter(|arg| arg.node.depth() > MAX_EXPR_DEPTH)
        .map(|arg| ParseError::too_deep(source, arg.span.clone()))
        .collect()
}

fn run_parser(source: &str, tokens: &[(Token, Span)]) -> (Option<Script>, Vec<ParseError>) {
    let token_iter = tokens
        .iter()
        .map(|(tok, span)| (tok.clone(), ChumSpan::from(span.clone())));

    let len = tokens.last().map_or(0, |(_, s)| s.end);
    let eoi: ChumSpan = (len..len).into();
    let stream = Stream::from_iter(token_iter).map(eoi, |(t, s): (_, _)| (t, s));

    let (output, errors) = script_parser().parse(stream).into_output_errors();
    let errors = errors
        .into_iter()
        .map(|e| ParseError::from_rich(source, e))
        .collect();
    (output, errors)
}

/// Parse a token stream into an AST.
///
/// `source` is the text the tokens were lexed from; it is only used to
/// compute line and column numbers for errors.
pub fn parse(source: &str, tokens: &[(Token, Span)]) -> Result<Script, Vec<ParseError>> {
    if let Some(err) = prefix_nesting(source, tokens) {
        return Err(vec![err]);
    }
    let (output, errors) = run_parser(source, tokens);

    match output {
        Some(script) if errors.is_empty() => {
            let mut problems = duplicate_names(source, &script);
            problems.extend(deep_expressions(source, &script));
            if problems.is_empty() {
                Ok(script)
            } else {
                Err(problems)
            }
        }
        _ => Err(errors),
    }
}

/// Parse a token stream leniently, returning whatever AST could be built
/// alongside any errors.
///
/// Over-deep argument expressions are reported and dropped from the AST.
pub fn parse_lenient(source: &str, tokens: &[(Token, Span)]) -> (Script, Vec<ParseError>) {
    if let Some(err) = prefix_nesting(source, tokens) {
        return (Script::default(), vec![err]);
    }
    let (output, mut errors) = run_parser(source, tokens);
    let mut script = output.unwrap_or_default();
    errors.extend(duplicate_names(source, &script));
    errors.extend(deep_expressions(source, &script));
    for entity in &mut script.entities {
        for handler in &mut entity.node.handlers {
            handler
                .node
                .body
                .retain(|stmt| stmt.node.args.iter().all(|a| a.node.depth() <= MAX_EXPR_DEPTH));
        }
    }
    (script, errors)
}
