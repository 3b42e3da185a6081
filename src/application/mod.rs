// Application use cases for Tributary.

use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::generator::{outline, GenerationReport, RecordGenerator, RecordRejection};
use crate::infrastructure::config::ToolConfig;
use crate::infrastructure::discovery::DiscoveryService;
use crate::infrastructure::ingestion::{IngestionPipeline, IngestionVerdict};
use crate::ports::{AstProvider, DiagnosticSink};

/// How a generation run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every file parsed. The report may still carry skipped records.
    Generated(GenerationReport),
    /// At least one file failed to parse; nothing was generated.
    IngestionFailed(IngestionVerdict),
    /// A record was rejected under the abort policy; nothing was generated.
    Aborted(RecordRejection),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Generated(report) if report.is_clean())
    }
}

/// Discover, ingest and generate for one build directory.
pub struct GenerateUsecase<'a> {
    pub provider: &'a dyn AstProvider,
    pub sink: &'a dyn DiagnosticSink,
    /// Log the declaration outline of every parsed unit.
    pub dump_ast: bool,
}

impl<'a> GenerateUsecase<'a> {
    pub fn run(&self, root: &Path, config: &ToolConfig) -> Result<RunOutcome> {
        let discovery = DiscoveryService::new(config.discovery.mode)
            .with_excludes(config.discovery.exclude.as_slice())
            .context("Invalid exclude pattern")?;
        let files = discovery
            .discover(root)
            .with_context(|| format!("Failed to scan {}", root.display()))?;
        tracing::info!(files = files.len(), root = %root.display(), "Discovered input files");

        let pipeline = IngestionPipeline::new(self.provider, self.sink, config.ingest.workers)?;
        let verdict = pipeline.ingest(&files, &config.compile);

        if self.dump_ast {
            for unit in &verdict.units {
                tracing::info!("{}", unit.path().display());
                for line in outline(unit) {
                    tracing::info!("{}", line);
                }
            }
        }

        if !verdict.success {
            return Ok(RunOutcome::IngestionFailed(verdict));
        }

        let generator = RecordGenerator::new(config.generation.on_unsupported);
        match generator.generate(&verdict.units) {
            Ok(report) => Ok(RunOutcome::Generated(report)),
            Err(rejection) => Ok(RunOutcome::Aborted(rejection)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::generator::RejectionPolicy;
    use crate::infrastructure::cpp::CppAstProvider;
    use crate::infrastructure::logging::TracingDiagnosticSink;
    use std::fs;
    use tempfile::tempdir;

    fn usecase<'a>(provider: &'a CppAstProvider, sink: &'a TracingDiagnosticSink) -> GenerateUsecase<'a> {
        GenerateUsecase {
            provider,
            sink,
            dump_ast: false,
        }
    }

    #[test]
    fn test_generates_for_marked_records() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("a.hpp"),
            "namespace app { struct [[legion::reflectable]] a { int x; }; }",
        )
        .unwrap();
        let (provider, sink) = (CppAstProvider::new(), TracingDiagnosticSink);
        let outcome = usecase(&provider, &sink).run(dir.path(), &ToolConfig::default()).unwrap();
        assert!(outcome.is_success());
        let RunOutcome::Generated(report) = outcome else {
            panic!("expected generated output");
        };
        assert_eq!(report.records[0].name, "app::a");
    }

    #[test]
    fn test_parse_failure_stops_generation() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("good.hpp"), "struct [[legion::reflectable]] g { int x; };").unwrap();
        fs::write(dir.path().join("bad.hpp"), "struct b {").unwrap();
        let (provider, sink) = (CppAstProvider::new(), TracingDiagnosticSink);
        let outcome = usecase(&provider, &sink).run(dir.path(), &ToolConfig::default()).unwrap();
        assert!(!outcome.is_success());
        match outcome {
            RunOutcome::IngestionFailed(verdict) => {
                assert_eq!(verdict.units.len(), 1);
                assert_eq!(verdict.failures.len(), 1);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_skip_policy_is_not_success() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("r.hpp"),
            "struct [[legion::reflectable]] r { float* p; };\nstruct [[legion::reflectable]] ok { int v; };",
        )
        .unwrap();
        let mut config = ToolConfig::default();
        config.generation.on_unsupported = RejectionPolicy::Skip;
        let (provider, sink) = (CppAstProvider::new(), TracingDiagnosticSink);
        let outcome = usecase(&provider, &sink).run(dir.path(), &config).unwrap();
        assert!(!outcome.is_success());
        let RunOutcome::Generated(report) = outcome else {
            panic!("expected a report");
        };
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.rejections.len(), 1);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        let (provider, sink) = (CppAstProvider::new(), TracingDiagnosticSink);
        let result = usecase(&provider, &sink).run(&dir.path().join("nope"), &ToolConfig::default());
        assert!(result.is_err());
    }
}
