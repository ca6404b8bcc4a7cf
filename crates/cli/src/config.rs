//! `routetypes.toml`: which outputs to generate and how.
//!
//! ```toml
//! ignoreHead = true
//!
//! [outputs."src/types/api.ts"]
//! target = "serverTypes"
//!
//! [compilerOptions]
//! cwd = "/app"
//!
//! [compilerOptions.style]
//! singleQuote = true
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use routetypes_common::OutputTarget;
use routetypes_core::{CompilerOptions, ExtractorOptions, Output};
use serde::Deserialize;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "routetypes.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Unset means enabled; running the CLI is the opt-in.
    pub enabled: Option<bool>,
    pub ignore_head: bool,
    pub outputs: BTreeMap<PathBuf, OutputConfig>,
    pub compiler_options: CompilerOptions,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub target: OutputTarget,
}

impl Config {
    pub fn from_toml(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    pub fn read(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
        Self::from_toml(&contents)
            .map_err(|e| format!("Failed to parse config file {}: {e}", path.display()))
    }

    /// Read `explicit`, else [`DEFAULT_CONFIG_FILE`] in `dir` if present,
    /// else the defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, String> {
        if let Some(path) = explicit {
            return Self::read(path);
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!("Using config file {}", candidate.display());
            Self::read(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    pub fn into_extractor_options(self) -> ExtractorOptions {
        ExtractorOptions {
            enabled: self.enabled.unwrap_or(true),
            ignore_head: self.ignore_head,
            outputs: self
                .outputs
                .into_iter()
                .map(|(path, output)| Output::new(path, output.target))
                .collect(),
            compiler_options: self.compiler_options,
            on_schema_ready: None,
        }
    }
}
