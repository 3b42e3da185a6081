use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::{Deserialize, Serialize};

/// Which files a discovery pass selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileSelection {
    #[default]
    Headers,
    Sources,
    All,
}

const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "hxx", "inl"];
const SOURCE_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx"];

impl FileSelection {
    /// Parse selection from string (CLI input).
    pub fn from_str(s: &str) -> Option<FileSelection> {
        match s.to_lowercase().as_str() {
            "headers" | "header" | "h" => Some(FileSelection::Headers),
            "sources" | "source" | "src" => Some(FileSelection::Sources),
            "all" => Some(FileSelection::All),
            _ => None,
        }
    }

    pub fn matches(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let ext = ext.to_lowercase();
        let headers = HEADER_EXTENSIONS.contains(&ext.as_str());
        let sources = SOURCE_EXTENSIONS.contains(&ext.as_str());
        match self {
            FileSelection::Headers => headers,
            FileSelection::Sources => sources,
            FileSelection::All => headers || sources,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("root directory {} does not exist", .0.display())]
    MissingRoot(PathBuf),
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid exclude pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Walks a directory tree and lists the files to ingest.
pub struct DiscoveryService {
    selection: FileSelection,
    excludes: Vec<Pattern>,
}

impl DiscoveryService {
    pub fn new(selection: FileSelection) -> Self {
        Self {
            selection,
            excludes: Vec::new(),
        }
    }

    /// Add exclusion globs, matched against paths relative to the root.
    pub fn with_excludes<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self, DiscoveryError> {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let compiled = Pattern::new(pattern).map_err(|source| DiscoveryError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;
            self.excludes.push(compiled);
        }
        Ok(self)
    }

    /// Collect every selected file under `root`.
    ///
    /// Entries are visited in file-name order inside each directory, so the
    /// result is stable for an unchanged tree.
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
        if !root.exists() {
            return Err(DiscoveryError::MissingRoot(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(DiscoveryError::NotADirectory(root.to_path_buf()));
        }

        let mut files = Vec::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir)
                .and_then(|rd| rd.collect::<Result<Vec<_>, _>>())
                .map_err(|source| DiscoveryError::Io {
                    path: dir.clone(),
                    source,
                })?;
            entries.sort_by_key(|e| e.file_name());

            let mut subdirs = Vec::new();
            for entry in entries {
                let path = entry.path();
                if self.is_excluded(root, &path) {
                    tracing::trace!(path = %path.display(), "Excluded");
                    continue;
                }
                let file_type = entry.file_type().map_err(|source| DiscoveryError::Io {
                    path: path.clone(),
                    source,
                })?;

                if file_type.is_dir() {
                    if entry.file_name() != ".git" {
                        subdirs.push(path);
                    }
                } else if (file_type.is_file() || path.is_file()) && self.selection.matches(&path) {
                    files.push(path);
                }
            }
            // Reverse so the stack pops subdirectories in name order.
            pending.extend(subdirs.into_iter().rev());
        }

        tracing::debug!(root = %root.display(), count = files.len(), "Discovered files");
        Ok(files)
    }

    fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        if self.excludes.is_empty() {
            return false;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        self.excludes.iter().any(|p| p.matches_path(relative))
    }
}
