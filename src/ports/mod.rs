// Boundaries between the generator core and its collaborators.

use std::path::{Path, PathBuf};

use crate::domain::ast::TranslationUnit;
use crate::domain::config::CompileConfig;
use crate::domain::diagnostic::Diagnostic;

/// A file the provider could not turn into a translation unit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("cannot read {}: {message}", .path.display())]
    Unreadable { path: PathBuf, message: String },
    /// `first` is the earliest error, as `line:column: message`.
    #[error("{}:{first} ({errors} error(s))", .path.display())]
    Failed {
        path: PathBuf,
        errors: usize,
        first: String,
    },
    #[error("parser panicked on {}: {message}", .path.display())]
    Panicked { path: PathBuf, message: String },
}

impl ParseError {
    pub fn path(&self) -> &Path {
        match self {
            ParseError::Unreadable { path, .. }
            | ParseError::Failed { path, .. }
            | ParseError::Panicked { path, .. } => path,
        }
    }
}

/// Produces parse sessions. Implementations are shared by every ingestion
/// task, so they must be thread-safe; the sessions they hand out are not.
pub trait AstProvider: Send + Sync {
    fn open_session(&self) -> Box<dyn ProviderSession + '_>;
}

/// One independent parse context, owned by exactly one task.
pub trait ProviderSession {
    fn parse(
        &mut self,
        path: &Path,
        config: &CompileConfig,
        sink: &dyn DiagnosticSink,
    ) -> Result<TranslationUnit, ParseError>;
}

/// Receives provider diagnostics.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}
