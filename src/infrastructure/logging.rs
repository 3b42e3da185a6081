//! Logging setup and the diagnostic adapter.
//!
//! Everything logs through `tracing`. The subscriber is installed once by the
//! binary; tests and library users may install their own or none at all.
//! `tracing` has no level above `ERROR`, so fatal events are errors emitted
//! on [`FATAL_TARGET`], which the fatal-only filter lets through.

use tracing::Level;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::fmt::time;
use tracing_subscriber::prelude::*;

use crate::domain::diagnostic::{Diagnostic, DiagnosticSource, Severity};
use crate::ports::DiagnosticSink;

pub const FATAL_TARGET: &str = "tributary::fatal";

/// Log an event at fatal severity.
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)+) => {
        ::tracing::error!(target: $crate::infrastructure::logging::FATAL_TARGET, $($arg)+)
    };
}

/// Filter admitting events at `severity` and above.
pub fn severity_filter(severity: Severity) -> Targets {
    let level = match severity {
        Severity::Trace => LevelFilter::TRACE,
        Severity::Debug => LevelFilter::DEBUG,
        Severity::Info => LevelFilter::INFO,
        Severity::Warn => LevelFilter::WARN,
        Severity::Error => LevelFilter::ERROR,
        Severity::Fatal => {
            return Targets::new().with_target(FATAL_TARGET, LevelFilter::ERROR);
        }
    };
    Targets::new().with_default(level)
}

/// Install the global subscriber: uptime timestamps, thread names, level.
pub fn init_logging(severity: Severity) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(time::uptime())
                .with_thread_names(true)
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(severity_filter(severity))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))
}

/// Forwards provider diagnostics into the log stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnosticSink;

impl TracingDiagnosticSink {
    /// The severity and line a diagnostic is logged with, or `None` when it
    /// duplicates an error the frontend already surfaced.
    pub fn render(diagnostic: &Diagnostic) -> Option<(Severity, String)> {
        let severity = diagnostic.severity.to_severity();
        let source = diagnostic.source.name();
        match &diagnostic.location {
            None => Some((severity, format!("[{}] {}", source, diagnostic.message))),
            Some(_) if diagnostic.source == DiagnosticSource::Frontend => None,
            Some(location) => Some((
                severity,
                format!("[{}] {}{}", source, location, diagnostic.message),
            )),
        }
    }
}

impl DiagnosticSink for TracingDiagnosticSink {
    fn report(&self, diagnostic: &Diagnostic) {
        let Some((severity, line)) = Self::render(diagnostic) else {
            return;
        };
        match severity {
            Severity::Trace => tracing::event!(Level::TRACE, "{}", line),
            Severity::Debug => tracing::event!(Level::DEBUG, "{}", line),
            Severity::Info => tracing::event!(Level::INFO, "{}", line),
            Severity::Warn => tracing::event!(Level::WARN, "{}", line),
            Severity::Error => tracing::event!(Level::ERROR, "{}", line),
            Severity::Fatal => crate::fatal!("{}", line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ast::SourceLocation;
    use crate::domain::diagnostic::ProviderSeverity;

    #[test]
    fn test_render_without_location() {
        let d = Diagnostic::new(DiagnosticSource::Frontend, ProviderSeverity::Warning, "stray token");
        assert_eq!(
            TracingDiagnosticSink::render(&d),
            Some((Severity::Warn, "[frontend] stray token".to_string()))
        );
    }

    #[test]
    fn test_render_with_location_prefix() {
        let d = Diagnostic::new(DiagnosticSource::Session, ProviderSeverity::Critical, "giving up")
            .at("/src/a.hpp", Some(SourceLocation::new(4, 2)));
        assert_eq!(
            TracingDiagnosticSink::render(&d),
            Some((Severity::Fatal, "[session] /src/a.hpp:4:2: giving up".to_string()))
        );
    }

    #[test]
    fn test_frontend_diagnostics_with_location_are_suppressed() {
        let d = Diagnostic::new(DiagnosticSource::Frontend, ProviderSeverity::Error, "expected `;`")
            .at("/src/a.hpp", Some(SourceLocation::new(1, 1)));
        assert_eq!(TracingDiagnosticSink::render(&d), None);
    }

    #[test]
    fn test_fatal_filter_only_admits_fatal_target() {
        let filter = severity_filter(Severity::Fatal);
        assert!(filter.would_enable(FATAL_TARGET, &Level::ERROR));
        assert!(!filter.would_enable("tributary::domain", &Level::ERROR));
        let info = severity_filter(Severity::Info);
        assert!(info.would_enable("tributary::domain", &Level::INFO));
        assert!(!info.would_enable("tributary::domain", &Level::DEBUG));
    }
}
