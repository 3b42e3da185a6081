//! Diagnostics and severities.
//!
//! Providers report parse problems as [`Diagnostic`]s using their own
//! severity scale; the logging adapter maps them onto the six-level
//! [`Severity`] scale used by the rest of the tool.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::ast::SourceLocation;

/// Six-level log scale, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

impl Severity {
    pub const MOST_VERBOSE: Severity = Severity::Trace;

    /// Map a numeric level, clamping out-of-range values to the scale ends.
    pub fn from_index(level: i64) -> Self {
        match level {
            i64::MIN..=0 => Severity::Trace,
            1 => Severity::Debug,
            2 => Severity::Info,
            3 => Severity::Warn,
            4 => Severity::Error,
            _ => Severity::Fatal,
        }
    }

    /// Parse a CLI level: a number 0-5 (clamped) or a level name.
    pub fn parse_level(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return Some(Self::from_index(n));
        }
        match trimmed.to_lowercase().as_str() {
            "trace" => Some(Severity::Trace),
            "debug" => Some(Severity::Debug),
            "info" => Some(Severity::Info),
            "warn" | "warning" => Some(Severity::Warn),
            "error" => Some(Severity::Error),
            "fatal" | "critical" => Some(Severity::Fatal),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Severity scale used by AST providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProviderSeverity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl ProviderSeverity {
    pub fn to_severity(self) -> Severity {
        match self {
            ProviderSeverity::Debug => Severity::Trace,
            ProviderSeverity::Info => Severity::Info,
            ProviderSeverity::Warning => Severity::Warn,
            ProviderSeverity::Error => Severity::Error,
            ProviderSeverity::Critical => Severity::Fatal,
        }
    }
}

/// Channel a diagnostic was reported through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSource {
    /// The provider's own lexer/parser; these errors also end up in the
    /// returned `ParseError`.
    Frontend,
    /// Session-level reporting (configuration, recovery notes).
    Session,
}

impl DiagnosticSource {
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticSource::Frontend => "frontend",
            DiagnosticSource::Session => "session",
        }
    }
}

/// Where a diagnostic points, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticLocation {
    pub file: PathBuf,
    pub position: Option<SourceLocation>,
}

impl fmt::Display for DiagnosticLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(pos) => write!(f, "{}:{}: ", self.file.display(), pos),
            None => write!(f, "{}: ", self.file.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub source: DiagnosticSource,
    pub severity: ProviderSeverity,
    pub message: String,
    pub location: Option<DiagnosticLocation>,
}

impl Diagnostic {
    pub fn new(source: DiagnosticSource, severity: ProviderSeverity, message: impl Into<String>) -> Self {
        Self {
            source,
            severity,
            message: message.into(),
            location: None,
        }
    }

    pub fn at(mut self, file: impl Into<PathBuf>, position: Option<SourceLocation>) -> Self {
        self.location = Some(DiagnosticLocation {
            file: file.into(),
            position,
        });
        self
    }
}
