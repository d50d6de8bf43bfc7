use logos::Logos;
use std::fmt;

use crate::ast::Span;

/// Token type for Metascript.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Keyword `entity`.
    Entity,
    /// Keyword `components`.
    Components,
    /// Keyword `on`.
    On,
    /// Left brace `{`.
    LBrace,
    /// Right brace `}`.
    RBrace,
    /// Left bracket `[`.
    LBracket,
    /// Right bracket `]`.
    RBracket,
    /// Left parenthesis `(`.
    LParen,
    /// Right parenthesis `)`.
    RParen,
    /// Statement terminator `;`.
    Semicolon,
    /// Separator `,`.
    Comma,
    /// Field access `.`.
    Dot,
    /// Colon `:` after `components`.
    Colon,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// Numeric literal. Stores the parsed value and the source text.
    Number(f64, String),
    /// Identifier.
    Ident(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Entity => write!(f, "entity"),
            Token::Components => write!(f, "components"),
            Token::On => write!(f, "on"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::Colon => write!(f, ":"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Number(_, s) => write!(f, "{s}"),
            Token::Ident(w) => write!(f, "{w}"),
        }
    }
}

/// Internal logos token, borrowing from the source.
/// Converted to owned `Token` as the stream is consumed.
#[derive(Logos, Debug, Clone, Copy)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
enum RawToken {
    #[token("entity")]
    Entity,

    #[token("components")]
    Components,

    #[token("on")]
    On,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token(":")]
    Colon,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
}

/// What went wrong while lexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    /// The character starts no token.
    UnexpectedCharacter,
    /// A numeric literal too large to represent as a finite `f64`.
    NumberOutOfRange,
}

/// A lexer error with source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// What went wrong.
    pub kind: LexErrorKind,
    /// Byte range of the offending input.
    pub span: Span,
    /// One-based line of the offending input.
    pub line: usize,
    /// One-based column (in characters) of the offending input.
    pub column: usize,
    /// The text that could not be tokenized.
    pub found: String,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LexErrorKind::UnexpectedCharacter => write!(f, "unexpected character {:?}", self.found)?,
            LexErrorKind::NumberOutOfRange => write!(f, "number literal out of range")?,
        }
        write!(
            f,
            " at line {}, column {} (byte {})",
            self.line, self.column, self.span.start
        )
    }
}

impl std::error::Error for LexError {}

/// One-based line and column of a byte offset. Columns count characters.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// Lazy token stream over a source string.
///
/// Cloning the iterator forks it at the current position; calling
/// [`tokens`] again restarts from the beginning.
#[derive(Clone)]
pub struct Tokens<'a> {
    source: &'a str,
    inner: logos::Lexer<'a, RawToken>,
}

/// Start a lazy token stream over `source`.
pub fn tokens(source: &str) -> Tokens<'_> {
    Tokens {
        source,
        inner: RawToken::lexer(source),
    }
}

impl Iterator for Tokens<'_> {
    type Item = Result<(Token, Span), LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        let span = self.inner.span();
        let slice = self.inner.slice();
        let kind = match result.map(|raw| convert(raw, slice)) {
            Ok(Token::Number(n, _)) if !n.is_finite() => LexErrorKind::NumberOutOfRange,
            Ok(tok) => return Some(Ok((tok, span))),
            Err(()) => LexErrorKind::UnexpectedCharacter,
        };
        let (line, column) = line_col(self.source, span.start);
        Some(Err(LexError {
            kind,
            span,
            line,
            column,
            found: slice.to_string(),
        }))
    }
}

fn convert(raw: RawToken, slice: &str) -> Token {
    match raw {
        RawToken::Entity => Token::Entity,
        RawToken::Components => Token::Components,
        RawToken::On => Token::On,
        RawToken::LBrace => Token::LBrace,
        RawToken::RBrace => Token::RBrace,
        RawToken::LBracket => Token::LBracket,
        RawToken::RBracket => Token::RBracket,
        RawToken::LParen => Token::LParen,
        RawToken::RParen => Token::RParen,
        RawToken::Semicolon => Token::Semicolon,
        RawToken::Comma => Token::Comma,
        RawToken::Dot => Token::Dot,
        RawToken::Colon => Token::Colon,
        RawToken::Plus => Token::Plus,
        RawToken::Minus => Token::Minus,
        RawToken::Star => Token::Star,
        RawToken::Slash => Token::Slash,
        // Digits with at most one inner dot always parse; overlong ones give infinity.
        RawToken::Number => Token::Number(slice.parse().unwrap_or(f64::NAN), slice.to_string()),
        RawToken::Ident => Token::Ident(slice.to_string()),
    }
}

/// Lex source code into a sequence of `(Token, Span)` pairs.
///
/// Stops at the first character that starts no token.
pub fn lex(source: &str) -> Result<Vec<(Token, Span)>, LexError> {
    tokens(source).collect()
}

/// Lex leniently, skipping bad characters and collecting every error.
pub fn lex_all(source: &str) -> (Vec<(Token, Span)>, Vec<LexError>) {
    let mut toks = Vec::new();
    let mut errors = Vec::new();
    for item in tokens(source) {
        match item {
            Ok(t) => toks.push(t),
            Err(e) => errors.push(e),
        }
    }
    (toks, errors)
}
