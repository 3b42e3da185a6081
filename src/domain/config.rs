// Compile configuration shared read-only by every ingestion task.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Macro defined for every run so headers can detect code generation.
pub const AUTOGEN_MACRO: &str = "L_AUTOGENACTIVE";

/// C++ language standard selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LanguageStandard {
    #[serde(rename = "c++98")]
    Cpp98,
    #[serde(rename = "c++03")]
    Cpp03,
    #[serde(rename = "c++11")]
    Cpp11,
    #[serde(rename = "c++14")]
    Cpp14,
    #[serde(rename = "c++17")]
    Cpp17,
    #[serde(rename = "c++20")]
    Cpp20,
    #[serde(rename = "c++23")]
    Cpp23,
}

impl LanguageStandard {
    /// `[[...]]` attribute syntax arrived with C++11.
    pub fn supports_attributes(&self) -> bool {
        *self >= LanguageStandard::Cpp11
    }

    /// The `-std=` spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageStandard::Cpp98 => "c++98",
            LanguageStandard::Cpp03 => "c++03",
            LanguageStandard::Cpp11 => "c++11",
            LanguageStandard::Cpp14 => "c++14",
            LanguageStandard::Cpp17 => "c++17",
            LanguageStandard::Cpp20 => "c++20",
            LanguageStandard::Cpp23 => "c++23",
        }
    }
}

impl fmt::Display for LanguageStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-std={}", self.as_str())
    }
}

impl Default for LanguageStandard {
    fn default() -> Self {
        LanguageStandard::Cpp17
    }
}

/// Immutable per-run compile configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    pub standard: LanguageStandard,
    /// Warning and feature flags, e.g. `-Werror`.
    pub flags: Vec<String>,
    /// Object-like macro definitions; an empty replacement removes the name.
    pub defines: BTreeMap<String, String>,
    pub include_dirs: Vec<PathBuf>,
    pub system_include_dirs: Vec<PathBuf>,
    /// Skip conditional-block evaluation (`#if 0`) while preprocessing.
    pub fast_preprocessing: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        let mut defines = BTreeMap::new();
        defines.insert(AUTOGEN_MACRO.to_string(), String::new());
        Self {
            standard: LanguageStandard::default(),
            flags: Vec::new(),
            defines,
            include_dirs: Vec::new(),
            system_include_dirs: Vec::new(),
            fast_preprocessing: false,
        }
    }
}

impl CompileConfig {
    pub fn with_define(mut self, name: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.defines.insert(name.into(), replacement.into());
        self
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    /// Warnings count as errors.
    pub fn warnings_as_errors(&self) -> bool {
        self.has_flag("-Werror")
    }
}
