//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.projexp.toml` files.

use crate::analysis::{SummaryOptions, DEFAULT_PRECISION};
use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".projexp.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Query parameters.
    #[serde(default)]
    pub query: QueryConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Report output file; stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Query settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Summary rows need strictly more employees than this.
    #[serde(default = "default_min_employees")]
    pub min_employees: usize,

    /// Fraction for the discrete percentile.
    #[serde(default = "default_percentile")]
    pub percentile: f64,

    /// Decimal places of rounded values.
    #[serde(default = "default_precision")]
    pub precision: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            min_employees: default_min_employees(),
            percentile: default_percentile(),
            precision: default_precision(),
        }
    }
}

fn default_min_employees() -> usize {
    3
}

fn default_percentile() -> f64 {
    0.5
}

fn default_precision() -> u32 {
    DEFAULT_PRECISION
}

impl From<&QueryConfig> for SummaryOptions {
    fn from(config: &QueryConfig) -> Self {
        Self {
            min_employees: config.min_employees,
            percentile: config.percentile,
            precision: config.precision,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load `.projexp.toml` from a directory.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given explicitly on the command line override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if let Some(min_employees) = args.min_employees {
            self.query.min_employees = min_employees;
        }
        if let Some(percentile) = args.percentile {
            self.query.percentile = percentile;
        }
        if let Some(precision) = args.precision {
            self.query.precision = precision;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Summary query parameters, validated.
    pub fn summary_options(&self) -> Result<SummaryOptions> {
        let options = SummaryOptions::from(&self.query);
        options.validate().context("Invalid [query] settings")?;
        Ok(options)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
