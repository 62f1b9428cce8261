//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// projexp - project experience aggregator
///
/// Joins an employee relation with a project relation and reports the
/// average experience per project, the project(s) with the highest
/// average, and average/median/head count for larger projects.
///
/// Examples:
///   projexp --input fixtures/company.json
///   projexp --input data.toml --format json --output report.json
///   projexp --input data.json --query top
///   projexp --input data.json --min-employees 2 --percentile 0.5
///   projexp --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Dataset file holding the employee and project relations
    ///
    /// JSON (.json) or TOML (.toml), chosen by extension.
    #[arg(short, long, value_name = "FILE", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// The report is printed to stdout when omitted.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Which query results to include
    #[arg(long, default_value = "all", value_name = "QUERY")]
    pub query: QuerySelection,

    /// Summary rows need strictly more employees than this
    ///
    /// Default: from config or 3.
    #[arg(long, value_name = "COUNT", env = "PROJEXP_MIN_EMPLOYEES")]
    pub min_employees: Option<usize>,

    /// Fraction for the discrete percentile (0.0 - 1.0)
    ///
    /// Default: from config or 0.5 (the median).
    #[arg(long, value_name = "FRACTION")]
    pub percentile: Option<f64>,

    /// Decimal places of rounded averages and medians
    #[arg(long, value_name = "DIGITS")]
    pub precision: Option<u32>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .projexp.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .projexp.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Query results to include in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum QuerySelection {
    /// Every query
    #[default]
    All,
    /// Average experience per project
    Average,
    /// Project(s) tied for the highest average
    Top,
    /// Average, median and count for projects above the threshold
    Summary,
}

impl QuerySelection {
    /// Whether the selection covers the given query.
    pub fn includes(&self, kind: crate::models::QueryKind) -> bool {
        use crate::models::QueryKind;

        matches!(
            (self, kind),
            (QuerySelection::All, _)
                | (QuerySelection::Average, QueryKind::Average)
                | (QuerySelection::Top, QueryKind::Top)
                | (QuerySelection::Summary, QueryKind::Summary)
        )
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        match self.input {
            Some(ref input) if !input.is_file() => {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
            None => return Err("An --input dataset file is required".to_string()),
            _ => {}
        }

        if let Some(percentile) = self.percentile {
            if !(0.0..=1.0).contains(&percentile) {
                return Err("Percentile must be between 0.0 and 1.0".to_string());
            }
        }

        if let Some(precision) = self.precision {
            if precision > crate::analysis::MAX_PRECISION {
                return Err(format!(
                    "Precision must be at most {}",
                    crate::analysis::MAX_PRECISION
                ));
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::QueryKind;

    pub(crate) fn make_args() -> Args {
        Args {
            input: Some(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/company.json")),
            output: None,
            format: None,
            query: QuerySelection::All,
            min_employees: None,
            percentile: None,
            precision: None,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_ok() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_missing_input() {
        let mut args = make_args();
        args.input = Some(PathBuf::from("/nonexistent/data.json"));
        assert!(args.validate().is_err());

        args.input = None;
        assert!(args.validate().is_err());

        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_percentile_range() {
        let mut args = make_args();
        args.percentile = Some(1.2);
        assert!(args.validate().is_err());

        args.percentile = Some(0.0);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_precision_limit() {
        let mut args = make_args();
        args.precision = Some(40);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_query_selection_includes() {
        assert!(QuerySelection::All.includes(QueryKind::Summary));
        assert!(QuerySelection::Top.includes(QueryKind::Top));
        assert!(!QuerySelection::Top.includes(QueryKind::Average));
        assert!(!QuerySelection::Average.includes(QueryKind::Summary));
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "projexp",
            "--input",
            "data.json",
            "--format",
            "json",
            "--query",
            "summary",
            "--min-employees",
            "2",
        ])
        .unwrap();

        assert_eq!(args.input, Some(PathBuf::from("data.json")));
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert_eq!(args.query, QuerySelection::Summary);
        assert_eq!(args.min_employees, Some(2));
    }
}
