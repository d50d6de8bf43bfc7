use meta_core::ResolutionError;
use meta_dsl::{Diagnostic, LoadError, SyntaxError};

/// Alias for `Result<T, EngineError>`.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors returned by the [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, thiserror::Error, miette::Diagnostic)]
pub enum EngineError {
    /// The script failed to lex or parse.
    #[error("script has {} syntax error(s)", .0.len())]
    #[diagnostic(code(meta::syntax), help("run `meta check` on the script for details"))]
    Syntax(Vec<SyntaxError>),

    /// The script parsed but does not bind to components and builtins.
    #[error(transparent)]
    #[diagnostic(code(meta::resolution))]
    Resolution(ResolutionError),

    /// No surface with this id is registered.
    #[error("no render surface named `{0}`")]
    #[diagnostic(code(meta::unknown_surface), help("register the surface before starting a script on it"))]
    UnknownSurface(String),

    /// The surface has no running simulation.
    #[error("no simulation is running on `{0}`")]
    #[diagnostic(code(meta::not_running))]
    NotRunning(String),
}

impl From<LoadError> for EngineError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::Syntax(errors) => EngineError::Syntax(errors),
            LoadError::Resolution(e) => EngineError::Resolution(e),
        }
    }
}

impl EngineError {
    /// Source diagnostics for script errors; empty for engine-state errors.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            EngineError::Syntax(errors) => errors.iter().map(SyntaxError::to_diagnostic).collect(),
            EngineError::Resolution(e) => vec![Diagnostic::from(e)],
            EngineError::UnknownSurface(_) | EngineError::NotRunning(_) => Vec::new(),
        }
    }
}
