//! The bundled C++ front end.
//!
//! Reads a header, drops `#if 0` regions, substitutes the configured defines
//! and parses the declarations it needs. Errors reach the sink on the
//! frontend channel and are summarised in the returned [`ParseError`];
//! warnings and notes go out on the session channel.

pub mod lexer;
pub mod parser;

use std::fs;
use std::path::Path;

use crate::domain::ast::TranslationUnit;
use crate::domain::config::CompileConfig;
use crate::domain::diagnostic::{Diagnostic, DiagnosticSource, ProviderSeverity};
use crate::ports::{AstProvider, DiagnosticSink, ParseError, ProviderSession};

use self::lexer::{expand_defines, strip_disabled_blocks, tokenize};
use self::parser::Parser;

#[derive(Debug, Default, Clone, Copy)]
pub struct CppAstProvider;

impl CppAstProvider {
    pub fn new() -> Self {
        Self
    }
}

impl AstProvider for CppAstProvider {
    fn open_session(&self) -> Box<dyn ProviderSession + '_> {
        Box::new(CppSession::default())
    }
}

/// Parse state for one task. Counters are per session and never shared.
#[derive(Debug, Default)]
pub struct CppSession {
    errors: usize,
    first_error: Option<String>,
}

impl CppSession {
    fn record_error(&mut self, summary: String) {
        self.errors += 1;
        if self.first_error.is_none() {
            self.first_error = Some(summary);
        }
    }
}

impl ProviderSession for CppSession {
    fn parse(
        &mut self,
        path: &Path,
        config: &CompileConfig,
        sink: &dyn DiagnosticSink,
    ) -> Result<TranslationUnit, ParseError> {
        self.errors = 0;
        self.first_error = None;

        let source = fs::read_to_string(path).map_err(|e| ParseError::Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let source = if config.fast_preprocessing {
            source
        } else {
            strip_disabled_blocks(&source)
        };

        let (tokens, lex_errors) = tokenize(&source);
        for error in lex_errors {
            let message = format!("unexpected character `{}`", error.text);
            self.record_error(format!("{}: {}", error.location, message));
            sink.report(
                &Diagnostic::new(DiagnosticSource::Frontend, ProviderSeverity::Error, message)
                    .at(path, Some(error.location)),
            );
        }

        let tokens = expand_defines(tokens, &config.defines);
        let attributes_supported = config.standard.supports_attributes();
        let (declarations, issues) = Parser::new(&tokens, attributes_supported).parse();

        let warnings_as_errors = config.warnings_as_errors();
        for issue in issues {
            let promoted = warnings_as_errors && issue.severity == ProviderSeverity::Warning;
            let fatal = issue.severity >= ProviderSeverity::Error || promoted;
            let (source, severity) = if fatal {
                (DiagnosticSource::Frontend, ProviderSeverity::Error)
            } else {
                (DiagnosticSource::Session, issue.severity)
            };
            if fatal {
                self.record_error(format!("{}: {}", issue.location, issue.message));
            }
            sink.report(
                &Diagnostic::new(source, severity, issue.message).at(path, Some(issue.location)),
            );
        }

        if self.errors > 0 {
            return Err(ParseError::Failed {
                path: path.to_path_buf(),
                errors: self.errors,
                first: self.first_error.take().unwrap_or_default(),
            });
        }

        sink.report(&Diagnostic::new(
            DiagnosticSource::Session,
            ProviderSeverity::Debug,
            format!(
                "parsed {} with {} top-level declaration(s) ({})",
                path.display(),
                declarations.len(),
                config.standard
            ),
        ));
        Ok(TranslationUnit::new(path, declarations))
    }
}
