use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::config::CompileConfig;
use crate::domain::generator::RejectionPolicy;
use crate::infrastructure::discovery::FileSelection;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    pub mode: FileSelection,
    /// Globs relative to the build directory.
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Pool size; defaults to the number of cores.
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub on_unsupported: RejectionPolicy,
}

/// Contents of a `tributary.toml` file. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub compile: CompileConfig,
    pub discovery: DiscoverySettings,
    pub ingest: IngestSettings,
    pub generation: GenerationSettings,
}

impl ToolConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ToolConfig = toml::from_str(content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::LanguageStandard;
    use tempfile::tempdir;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = ToolConfig::from_toml("").unwrap();
        assert_eq!(config, ToolConfig::default());
        assert_eq!(config.generation.on_unsupported, RejectionPolicy::Abort);
        assert_eq!(config.discovery.mode, FileSelection::Headers);
    }

    #[test]
    fn test_full_file() {
        let config = ToolConfig::from_toml(
            r#"
[compile]
standard = "c++20"
flags = ["-Werror"]
system_include_dirs = ["/usr/include"]

[compile.defines]
L_NODISCARD = "[[nodiscard]]"

[discovery]
mode = "all"
exclude = ["third_party/**"]

[ingest]
workers = 2

[generation]
on_unsupported = "skip"
"#,
        )
        .unwrap();
        assert_eq!(config.compile.standard, LanguageStandard::Cpp20);
        assert!(config.compile.warnings_as_errors());
        assert_eq!(config.compile.defines["L_NODISCARD"], "[[nodiscard]]");
        assert_eq!(config.discovery.mode, FileSelection::All);
        assert_eq!(config.discovery.exclude, vec!["third_party/**".to_string()]);
        assert_eq!(config.ingest.workers, Some(2));
        assert_eq!(config.generation.on_unsupported, RejectionPolicy::Skip);
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tributary.toml");
        fs::write(&path, "[ingest]\nworkers = \"many\"\n").unwrap();
        let err = ToolConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("tributary.toml"));
    }
}
