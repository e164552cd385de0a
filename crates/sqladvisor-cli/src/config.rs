//! Configuration file handling

use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use sqladvisor_core::RuleConfig;
use std::path::{Path, PathBuf};

use crate::args::OutputFormat;

pub const CONFIG_FILE_NAME: &str = "sqladvisor.toml";

/// Configuration for sqladvisor
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Target engine (mysql, tidb, mariadb, postgres)
    #[serde(default)]
    pub engine: Option<String>,

    /// Version string reported by the target engine
    #[serde(default)]
    pub engine_version: Option<String>,

    /// Script file patterns to check
    #[serde(default)]
    pub files: Vec<String>,

    /// Output format (human, json, sarif)
    #[serde(default)]
    pub format: Option<String>,

    /// Review rules, evaluated in the listed order
    #[serde(default, rename = "rule")]
    pub rules: Vec<RuleConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).into_diagnostic()?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).into_diagnostic()
    }

    /// Try to find and load sqladvisor.toml in current directory or parent directories
    pub fn find_and_load() -> Result<Option<Self>> {
        let mut current_dir = std::env::current_dir().into_diagnostic()?;

        loop {
            let config_path = current_dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                tracing::debug!(path = %config_path.display(), "loading configuration");
                return Ok(Some(Self::from_file(&config_path)?));
            }

            if !current_dir.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Merge CLI arguments into configuration
    /// CLI arguments take precedence over config file values
    pub fn merge_with_args(
        mut self,
        files: &[PathBuf],
        engine: &Option<String>,
        engine_version: &Option<String>,
        format: &Option<OutputFormat>,
    ) -> Self {
        if !files.is_empty() {
            self.files = files.iter().map(|p| p.display().to_string()).collect();
        }

        if engine.is_some() {
            self.engine = engine.clone();
        }

        if engine_version.is_some() {
            self.engine_version = engine_version.clone();
        }

        if let Some(fmt) = format {
            self.format = Some(format!("{:?}", fmt).to_lowercase());
        }

        self
    }

    pub fn output_format(&self) -> OutputFormat {
        match self.format.as_deref() {
            Some("json") => OutputFormat::Json,
            Some("sarif") => OutputFormat::Sarif,
            _ => OutputFormat::Human,
        }
    }
}
