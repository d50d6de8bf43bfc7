//! Metascript front end: lexing, parsing, formatting, and binding scripts
//! into `meta-core` programs.

/// Syntax tree types.
pub mod ast;
/// Resolution of names and types into a bound program.
pub mod binder;
/// Error and warning reports rendered with ariadne.
pub mod diagnostics;
pub mod fold;
/// Tokenizer built on logos.
pub mod lexer;
/// Chumsky grammar producing the syntax tree.
pub mod parser;
pub mod printer;
pub mod stats;

use std::path::{Path, PathBuf};

use meta_core::{ComponentDefaults, Program, Registry, ResolutionError};

pub use ast::{Script, Span};
pub use diagnostics::Diagnostic;
pub use lexer::{LexError, LexErrorKind};
pub use parser::ParseError;
pub use stats::ScriptStats;

/// File extension of script files in a directory.
pub const SCRIPT_EXTENSION: &str = "meta";

/// A failure to turn source text into an AST.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    /// Tokenizing failed.
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    /// The tokens do not form a script.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

impl SyntaxError {
    /// Byte span of the offending input.
    pub fn span(&self) -> Span {
        match self {
            SyntaxError::Lex(e) => e.span.clone(),
            SyntaxError::Parse(e) => e.span.clone(),
        }
    }

    /// One-based line and column of the offending input.
    pub fn location(&self) -> (usize, usize) {
        match self {
            SyntaxError::Lex(e) => (e.line, e.column),
            SyntaxError::Parse(e) => (e.line, e.column),
        }
    }

    /// Convert to a renderable diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            SyntaxError::Lex(e) => Diagnostic::from(e),
            SyntaxError::Parse(e) => Diagnostic::from(e),
        }
    }
}

/// Why a script could not be loaded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    /// Lexing or parsing failed; every error is kept.
    #[error("{} syntax error(s); first: {}", .0.len(), first_message(.0))]
    Syntax(Vec<SyntaxError>),

    /// The script parsed but failed to bind.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

fn first_message(errors: &[SyntaxError]) -> String {
    errors.first().map(ToString::to_string).unwrap_or_default()
}

impl LoadError {
    /// Diagnostics for every underlying error, ready for rendering.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            LoadError::Syntax(errors) => errors.iter().map(SyntaxError::to_diagnostic).collect(),
            LoadError::Resolution(e) => vec![Diagnostic::from(e)],
        }
    }
}

/// A script that parsed and bound successfully.
#[derive(Debug, Clone)]
pub struct Loaded {
    /// The AST after constant folding.
    pub script: Script,
    /// One entity per declaration, initialised from the defaults.
    pub registry: Registry,
    /// Bound handlers, indexed like the registry.
    pub program: Program,
}

/// Lex and parse a source string.
///
/// Every unrecognised character is reported; parsing only runs when lexing
/// succeeded.
pub fn parse_source(source: &str) -> Result<Script, Vec<SyntaxError>> {
    let (tokens, lex_errors) = lexer::lex_all(source);
    if !lex_errors.is_empty() {
        return Err(lex_errors.into_iter().map(SyntaxError::Lex).collect());
    }
    parser::parse(source, &tokens)
        .map_err(|errors| errors.into_iter().map(SyntaxError::Parse).collect())
}

/// Parse, fold, and bind a script.
pub fn load(source: &str, defaults: &ComponentDefaults) -> Result<Loaded, LoadError> {
    let mut script = parse_source(source).map_err(LoadError::Syntax)?;
    fold::fold_script(&mut script);
    let (registry, program) = binder::bind(&script, defaults)?;
    Ok(Loaded {
        script,
        registry,
        program,
    })
}

/// List the script files directly inside `dir`, sorted by path.
pub fn script_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == SCRIPT_EXTENSION))
        .collect();
    files.sort();
    Ok(files)
}
