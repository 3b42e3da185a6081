// Command-line entry point for Tributary.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tributary::application::{GenerateUsecase, RunOutcome};
use tributary::domain::diagnostic::Severity;
use tributary::domain::generator::{GenerationReport, RejectionPolicy};
use tributary::infrastructure::config::ToolConfig;
use tributary::infrastructure::logging::init_logging;
use tributary::infrastructure::path_resolver;
use tributary::infrastructure::{CppAstProvider, FileSelection, TracingDiagnosticSink};

const EXIT_FAILURE: i32 = -1;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generates reflection functions for annotated C++ records", long_about = None)]
struct Cli {
    /// Build directory to scan
    #[arg(short = 'd', long = "dir")]
    dir: Option<PathBuf>,

    /// Log level: 0 (trace) to 5 (fatal), or a level name
    #[arg(short = 'v', long = "log", short_alias = 'l', allow_negative_numbers = true)]
    log: Option<String>,

    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Files to ingest (headers, sources, all)
    #[arg(long)]
    mode: Option<String>,

    /// Glob to exclude, relative to the build directory (repeatable)
    #[arg(long)]
    exclude: Vec<String>,

    /// Ingestion worker threads
    #[arg(long)]
    workers: Option<usize>,

    /// Skip records with unsupported members instead of aborting
    #[arg(long)]
    skip_unsupported: bool,

    /// Log the declaration outline of every parsed file
    #[arg(long)]
    dump_ast: bool,

    /// Write generated code here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn from_str(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Spellings with a single dash accepted in place of the long flags.
const SINGLE_DASH_LONG: [&str; 3] = ["dir", "log", "help"];

/// Rewrite `-dir`, `-log` and `-help` (also `-dir=x`) to their `--` forms.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            let Some(text) = arg.to_str() else {
                return arg;
            };
            let Some(rest) = text.strip_prefix('-').filter(|r| !r.starts_with('-')) else {
                return arg;
            };
            let name = rest.split('=').next().unwrap_or(rest);
            if SINGLE_DASH_LONG.contains(&name) {
                OsString::from(format!("-{}", text))
            } else {
                arg
            }
        })
        .collect()
}

fn main() {
    let cli = match Cli::try_parse_from(normalize_args(env::args_os())) {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and are not failures.
            let failed = e.use_stderr();
            let _ = e.print();
            std::process::exit(if failed { EXIT_FAILURE } else { 0 });
        }
    };

    let requested = cli.log.as_deref().map(Severity::parse_level);
    let severity = match requested {
        Some(Some(level)) => level,
        Some(None) => Severity::MOST_VERBOSE,
        None => Severity::default(),
    };
    if let Err(e) = init_logging(severity) {
        eprintln!("{:#}", e);
    }
    match requested {
        Some(Some(level)) => tracing::info!("Set logging level to: {}", level),
        Some(None) => tracing::warn!(
            "Failed to parse logging settings, reverting to safe mode default: {}",
            Severity::MOST_VERBOSE
        ),
        None => {}
    }

    let code = match run(&cli, severity) {
        Ok(code) => code,
        Err(e) => {
            tributary::fatal!("{:#}", e);
            EXIT_FAILURE
        }
    };
    std::process::exit(code);
}

fn run(cli: &Cli, severity: Severity) -> Result<i32> {
    let verbose = severity <= Severity::Debug;
    if verbose {
        let cwd = env::current_dir().context("Cannot determine execution directory")?;
        tracing::debug!("Execution dir: {}", cwd.display());
    }

    let Some(dir) = &cli.dir else {
        tracing::error!("Missing build directory.");
        return Ok(EXIT_FAILURE);
    };
    let root = path_resolver::resolve(dir)
        .with_context(|| format!("Cannot resolve build directory {}", dir.display()))?;
    tracing::debug!("Build dir: {}", root.display());

    let config = load_config(cli)?;
    if verbose {
        tracing::debug!("Standard: {}", config.compile.standard);
        tracing::debug!("Flags: {}", config.compile.flags.join(", "));
        let defines: Vec<String> = config
            .compile
            .defines
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        tracing::debug!("Defines: {}", defines.join(", "));
        for dir in &config.compile.include_dirs {
            tracing::debug!("Include dir: {}", dir.display());
        }
        for dir in &config.compile.system_include_dirs {
            tracing::debug!("System include dir: {}", dir.display());
        }
    }
    let format = OutputFormat::from_str(&cli.format)
        .ok_or_else(|| anyhow!("Unknown output format '{}'", cli.format))?;

    let provider = CppAstProvider::new();
    let sink = TracingDiagnosticSink;
    let usecase = GenerateUsecase {
        provider: &provider,
        sink: &sink,
        dump_ast: cli.dump_ast,
    };

    match usecase.run(&root, &config)? {
        RunOutcome::IngestionFailed(verdict) => {
            for path in verdict.parsed_paths() {
                tracing::debug!("Parsed: {}", path.display());
            }
            tracing::error!(
                "{} file(s) failed to parse, {} parsed; no code generated",
                verdict.failures.len(),
                verdict.units.len()
            );
            Ok(EXIT_FAILURE)
        }
        RunOutcome::Aborted(_) => {
            tracing::error!("Generation aborted; no code generated");
            Ok(EXIT_FAILURE)
        }
        RunOutcome::Generated(report) => {
            write_output(&report, format, cli.output.as_deref())?;
            if !report.is_clean() {
                tracing::error!("{} record(s) skipped:", report.rejections.len());
                for rejection in &report.rejections {
                    tracing::error!("  {}", rejection);
                }
                return Ok(EXIT_FAILURE);
            }
            tracing::info!("Generated {} record(s)", report.records.len());
            Ok(0)
        }
    }
}

/// The config file, if any, with command-line flags applied on top.
fn load_config(cli: &Cli) -> Result<ToolConfig> {
    let mut config = match &cli.config {
        Some(path) => ToolConfig::load(path)?,
        None => ToolConfig::default(),
    };
    if let Some(mode) = &cli.mode {
        config.discovery.mode = FileSelection::from_str(mode)
            .ok_or_else(|| anyhow!("Unknown discovery mode '{}'", mode))?;
    }
    config.discovery.exclude.extend(cli.exclude.iter().cloned());
    if cli.workers.is_some() {
        config.ingest.workers = cli.workers;
    }
    if cli.skip_unsupported {
        config.generation.on_unsupported = RejectionPolicy::Skip;
    }
    Ok(config)
}

fn write_output(report: &GenerationReport, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let content = match format {
        OutputFormat::Text => report.text(),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&report.records).context("Failed to serialise records")?
        }
    };
    match output {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", content),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(args: &[&str]) -> Vec<String> {
        normalize_args(args.iter().map(OsString::from))
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect()
    }

    #[test]
    fn test_single_dash_long_flags_are_rewritten() {
        assert_eq!(
            normalized(&["tributary", "-dir", "hdr", "-log=2", "-help"]),
            vec!["tributary", "--dir", "hdr", "--log=2", "--help"]
        );
    }

    #[test]
    fn test_other_arguments_are_untouched() {
        assert_eq!(
            normalized(&["tributary", "-d", "hdr", "-v", "-1", "--dir", "-directory"]),
            vec!["tributary", "-d", "hdr", "-v", "-1", "--dir", "-directory"]
        );
    }

    #[test]
    fn test_single_dash_forms_parse() {
        let cli = Cli::try_parse_from(normalized(&["tributary", "-dir", "hdr", "-log", "2"])).unwrap();
        assert_eq!(cli.dir, Some(PathBuf::from("hdr")));
        assert_eq!(cli.log.as_deref(), Some("2"));
    }
}
