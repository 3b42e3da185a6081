//! Ingestion pipeline.
//!
//! Runs one provider session per file on a bounded pool and folds the
//! outcomes into a single verdict. A failing file never cancels the others:
//! every task is joined before the verdict is built.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use dashmap::DashMap;
use rayon::prelude::*;

use crate::domain::ast::TranslationUnit;
use crate::domain::config::CompileConfig;
use crate::infrastructure::concurrency::build_ingest_pool;
use crate::ports::{AstProvider, DiagnosticSink, ParseError};

/// Aggregate outcome of one ingestion run.
#[derive(Debug)]
pub struct IngestionVerdict {
    /// False if any file failed.
    pub success: bool,
    /// Units that parsed, in input order. Kept even when `success` is false.
    pub units: Vec<TranslationUnit>,
    /// Failed files, in input order.
    pub failures: Vec<ParseError>,
}

impl IngestionVerdict {
    pub fn parsed_paths(&self) -> Vec<PathBuf> {
        self.units.iter().map(|u| u.path.clone()).collect()
    }
}

pub struct IngestionPipeline<'a> {
    provider: &'a dyn AstProvider,
    sink: &'a dyn DiagnosticSink,
    pool: rayon::ThreadPool,
}

impl<'a> IngestionPipeline<'a> {
    pub fn new(
        provider: &'a dyn AstProvider,
        sink: &'a dyn DiagnosticSink,
        workers: Option<usize>,
    ) -> Result<Self> {
        Ok(Self {
            provider,
            sink,
            pool: build_ingest_pool(workers)?,
        })
    }

    /// Parse every file in parallel. `config` is shared read-only by all tasks.
    pub fn ingest(&self, files: &[PathBuf], config: &CompileConfig) -> IngestionVerdict {
        let failed = AtomicBool::new(false);
        let parsed: DashMap<usize, TranslationUnit> = DashMap::new();
        let failures: DashMap<usize, ParseError> = DashMap::new();

        tracing::info!(files = files.len(), "Ingesting translation units");

        self.pool.install(|| {
            files.par_iter().enumerate().for_each(|(index, path)| {
                let span = tracing::info_span!("ingest", file = %path.display());
                let _guard = span.enter();

                match self.parse_one(path, config) {
                    Ok(unit) => {
                        tracing::debug!(declarations = unit.declarations.len(), "Parsed");
                        parsed.insert(index, unit);
                    }
                    Err(err) => {
                        tracing::error!("{}", err);
                        failed.store(true, Ordering::SeqCst);
                        failures.insert(index, err);
                    }
                }
            });
        });

        let mut units: Vec<(usize, TranslationUnit)> = parsed.into_iter().collect();
        units.sort_by_key(|(i, _)| *i);
        let mut failures: Vec<(usize, ParseError)> = failures.into_iter().collect();
        failures.sort_by_key(|(i, _)| *i);

        let verdict = IngestionVerdict {
            success: !failed.load(Ordering::SeqCst),
            units: units.into_iter().map(|(_, u)| u).collect(),
            failures: failures.into_iter().map(|(_, e)| e).collect(),
        };

        tracing::info!(
            parsed = verdict.units.len(),
            failed = verdict.failures.len(),
            success = verdict.success,
            "Ingestion finished"
        );
        verdict
    }

    /// Each call opens its own session; a panic inside the provider is
    /// recorded as a failure for this file only.
    fn parse_one(&self, path: &Path, config: &CompileConfig) -> Result<TranslationUnit, ParseError> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut session = self.provider.open_session();
            session.parse(path, config, self.sink)
        }));

        outcome.unwrap_or_else(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(ParseError::Panicked {
                path: path.to_path_buf(),
                message,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::diagnostic::Diagnostic;
    use crate::ports::ProviderSession;
    use std::sync::atomic::AtomicUsize;

    struct NullSink;
    impl DiagnosticSink for NullSink {
        fn report(&self, _diagnostic: &Diagnostic) {}
    }

    /// Fails on paths containing "bad", panics on "boom".
    struct ScriptedProvider {
        sessions: AtomicUsize,
    }

    struct ScriptedSession;

    impl AstProvider for ScriptedProvider {
        fn open_session(&self) -> Box<dyn ProviderSession + '_> {
            self.sessions.fetch_add(1, Ordering::SeqCst);
            Box::new(ScriptedSession)
        }
    }

    impl ProviderSession for ScriptedSession {
        fn parse(
            &mut self,
            path: &Path,
            _config: &CompileConfig,
            _sink: &dyn DiagnosticSink,
        ) -> Result<TranslationUnit, ParseError> {
            let name = path.to_string_lossy();
            if name.contains("boom") {
                panic!("provider exploded");
            }
            if name.contains("bad") {
                return Err(ParseError::Failed {
                    path: path.to_path_buf(),
                    errors: 1,
                    first: "1:1: expected `;`".to_string(),
                });
            }
            Ok(TranslationUnit::new(path, Vec::new()))
        }
    }

    fn provider() -> ScriptedProvider {
        ScriptedProvider {
            sessions: AtomicUsize::new(0),
        }
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_all_files_parse() {
        let provider = provider();
        let pipeline = IngestionPipeline::new(&provider, &NullSink, Some(2)).unwrap();
        let files = paths(&["a.h", "b.h", "c.h"]);
        let verdict = pipeline.ingest(&files, &CompileConfig::default());
        assert!(verdict.success);
        assert_eq!(verdict.parsed_paths(), files);
        assert_eq!(provider.sessions.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_one_failure_fails_the_run_but_keeps_the_rest() {
        let provider = provider();
        let pipeline = IngestionPipeline::new(&provider, &NullSink, Some(4)).unwrap();
        let files = paths(&["a.h", "bad.h", "c.h"]);
        let verdict = pipeline.ingest(&files, &CompileConfig::default());
        assert!(!verdict.success);
        assert_eq!(verdict.parsed_paths(), paths(&["a.h", "c.h"]));
        assert_eq!(verdict.failures.len(), 1);
        assert_eq!(verdict.failures[0].path(), Path::new("bad.h"));
    }

    #[test]
    fn test_panicking_provider_is_contained() {
        let provider = provider();
        let pipeline = IngestionPipeline::new(&provider, &NullSink, Some(2)).unwrap();
        let files = paths(&["boom.h", "ok.h"]);
        let verdict = pipeline.ingest(&files, &CompileConfig::default());
        assert!(!verdict.success);
        assert_eq!(verdict.parsed_paths(), paths(&["ok.h"]));
        assert!(matches!(
            &verdict.failures[0],
            ParseError::Panicked { message, .. } if message == "provider exploded"
        ));
    }

    #[test]
    fn test_empty_input_succeeds() {
        let provider = provider();
        let pipeline = IngestionPipeline::new(&provider, &NullSink, None).unwrap();
        let verdict = pipeline.ingest(&[], &CompileConfig::default());
        assert!(verdict.success);
        assert!(verdict.units.is_empty());
    }
}
