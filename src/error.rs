//! Error types for dataset loading and query evaluation.

use crate::models::{EmployeeId, ProjectId};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Errors raised while loading or validating a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The dataset file could not be read.
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file extension does not name a supported format.
    #[error("Unsupported dataset format for {0} (expected .json or .toml)")]
    UnsupportedFormat(PathBuf),

    /// The JSON document is malformed or has the wrong shape.
    #[error("Invalid JSON dataset: {0}")]
    Json(#[from] serde_json::Error),

    /// The TOML document is malformed or has the wrong shape.
    #[error("Invalid TOML dataset: {0}")]
    Toml(#[from] toml::de::Error),

    /// Two employee rows share an identifier.
    #[error("Duplicate employee_id {0}")]
    DuplicateEmployee(EmployeeId),

    /// An employee row has negative experience.
    #[error("Employee {employee_id} has negative experience_years ({experience_years})")]
    NegativeExperience {
        employee_id: EmployeeId,
        experience_years: Decimal,
    },

    /// The same employee is assigned to the same project twice.
    #[error("Duplicate assignment of employee {employee_id} to project {project_id}")]
    DuplicateAssignment {
        project_id: ProjectId,
        employee_id: EmployeeId,
    },
}

/// Errors raised by query parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    /// Percentile fraction is not within `0.0..=1.0`.
    #[error("Percentile must be between 0.0 and 1.0, got {0}")]
    InvalidPercentile(f64),

    /// Requested more decimal places than a `Decimal` can hold.
    #[error("Precision must be at most 28, got {0}")]
    InvalidPrecision(u32),

    /// The sum of a group's experience values exceeds the `Decimal` range.
    #[error("Sum of experience_years overflows the decimal range")]
    Overflow,
}
