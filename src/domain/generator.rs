//! Record generation.
//!
//! Walks parsed translation units, selects candidate records, classifies
//! their members and emits one reflection block per record. Rejections are
//! per-record values; the [`RejectionPolicy`] decides whether the first one
//! aborts the run or the record is skipped.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::ast::{DeclKind, Declaration, SourceLocation, TranslationUnit};
use crate::domain::classifier::{classify, EmitStrategy, Rejection};
use crate::domain::emitter::emit;
use crate::domain::filter::is_candidate;

/// What to do with a record that has an unsupported member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectionPolicy {
    /// Abort generation for the whole run on the first rejected record.
    #[default]
    Abort,
    /// Skip the record, keep generating, report every rejection at the end.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedRecord {
    /// Fully qualified record name.
    pub name: String,
    pub file: PathBuf,
    pub text: String,
}

/// Every rejected member of one record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}:{}: record {}: {}", .file.display(), .location, .record, join_reasons(.rejections))]
pub struct RecordRejection {
    pub record: String,
    pub file: PathBuf,
    pub location: SourceLocation,
    pub rejections: Vec<Rejection>,
}

fn join_reasons(rejections: &[Rejection]) -> String {
    rejections
        .iter()
        .map(|r| format!("{} ({})", r, r.declared_type))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub records: Vec<GeneratedRecord>,
    pub rejections: Vec<RecordRejection>,
}

impl GenerationReport {
    pub fn is_clean(&self) -> bool {
        self.rejections.is_empty()
    }

    /// All generated blocks, in walk order.
    pub fn text(&self) -> String {
        self.records
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub struct RecordGenerator {
    policy: RejectionPolicy,
}

impl RecordGenerator {
    pub fn new(policy: RejectionPolicy) -> Self {
        Self { policy }
    }

    /// Generate code for every candidate record in `units`.
    ///
    /// Under [`RejectionPolicy::Abort`] the first rejected record is returned
    /// as the error and nothing is generated.
    pub fn generate(&self, units: &[TranslationUnit]) -> Result<GenerationReport, RecordRejection> {
        let mut report = GenerationReport::default();
        for unit in units {
            let mut scope = Vec::new();
            self.walk(unit.path(), &unit.declarations, &mut scope, false, &mut report)?;
        }
        tracing::info!(
            records = report.records.len(),
            rejected = report.rejections.len(),
            "Generation finished"
        );
        Ok(report)
    }

    fn walk(
        &self,
        file: &Path,
        decls: &[Declaration],
        scope: &mut Vec<String>,
        in_template: bool,
        report: &mut GenerationReport,
    ) -> Result<(), RecordRejection> {
        for decl in decls {
            if is_candidate(decl) {
                if in_template {
                    tracing::warn!(
                        file = %file.display(),
                        location = %decl.location,
                        record = %qualify(scope, &decl.name),
                        "Skipping marked record nested in a class template"
                    );
                } else {
                    self.visit_candidate(file, decl, scope, report)?;
                }
            }

            if decl.kind.is_container() && !decl.children.is_empty() {
                let named = !decl.name.is_empty();
                if named {
                    scope.push(decl.name.clone());
                }
                let templated =
                    in_template || matches!(decl.kind, DeclKind::Record { is_template: true, .. });
                let walked = self.walk(file, &decl.children, scope, templated, report);
                if named {
                    scope.pop();
                }
                walked?;
            }
        }
        Ok(())
    }

    fn visit_candidate(
        &self,
        file: &Path,
        decl: &Declaration,
        scope: &[String],
        report: &mut GenerationReport,
    ) -> Result<(), RecordRejection> {
        if decl.name.is_empty() {
            tracing::warn!(
                file = %file.display(),
                location = %decl.location,
                "Skipping anonymous record carrying the reflect marker"
            );
            return Ok(());
        }

        let qualified = qualify(scope, &decl.name);
        match generate_record(file, &qualified, decl) {
            Ok(record) => {
                tracing::debug!(record = %record.name, "Generated reflection block");
                report.records.push(record);
                Ok(())
            }
            Err(rejection) => match self.policy {
                RejectionPolicy::Abort => {
                    crate::fatal!("{}", rejection);
                    Err(rejection)
                }
                RejectionPolicy::Skip => {
                    tracing::error!("{}; record skipped", rejection);
                    report.rejections.push(rejection);
                    Ok(())
                }
            },
        }
    }
}

/// Classify every data member of `decl` and emit its block, or collect the
/// members that cannot be serialized.
pub fn generate_record(
    file: &Path,
    qualified: &str,
    decl: &Declaration,
) -> Result<GeneratedRecord, RecordRejection> {
    let mut fields = Vec::new();
    let mut rejections = Vec::new();

    for field in decl.fields() {
        let strategy = classify(field);
        tracing::trace!(record = qualified, member = %field.name, %strategy, "Classified member");
        match EmitStrategy::try_from(strategy) {
            Ok(s) => fields.push((field.name.clone(), s)),
            Err(r) => rejections.push(r),
        }
    }

    if !rejections.is_empty() {
        return Err(RecordRejection {
            record: qualified.to_string(),
            file: file.to_path_buf(),
            location: decl.location,
            rejections,
        });
    }

    Ok(GeneratedRecord {
        name: qualified.to_string(),
        file: file.to_path_buf(),
        text: emit(qualified, &fields),
    })
}

fn qualify(scope: &[String], name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", scope.join("::"), name)
    }
}

/// Indented `'name' - kind` lines for every declaration of `unit`.
pub fn outline(unit: &TranslationUnit) -> Vec<String> {
    fn visit(decls: &[Declaration], depth: usize, out: &mut Vec<String>) {
        for decl in decls {
            out.push(format!(
                "{}'{}' - {}",
                "\t".repeat(depth),
                decl.display_name(),
                decl.kind
            ));
            if decl.kind.is_container() {
                visit(&decl.children, depth + 1, out);
            }
        }
    }

    let mut out = Vec::new();
    visit(&unit.declarations, 0, &mut out);
    out
}
