//! Data models for the experience aggregator.
//!
//! This module contains the source relations (employees and project
//! assignments), the derived result rows of each query, and the report
//! that bundles them together.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a row in the employee relation.
pub type EmployeeId = u64;

/// Identifier of a project.
pub type ProjectId = u64;

/// A row of the `employee` relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique employee identifier.
    pub employee_id: EmployeeId,
    /// Years of experience (non-negative).
    pub experience_years: Decimal,
}

impl Employee {
    /// Creates a new employee row.
    #[allow(dead_code)] // Builder for in-memory datasets
    pub fn new(employee_id: EmployeeId, experience_years: Decimal) -> Self {
        Self {
            employee_id,
            experience_years,
        }
    }
}

/// A row of the `project` relation: one employee assigned to one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Project identifier (shared by every assignment of the project).
    pub project_id: ProjectId,
    /// Referenced employee.
    pub employee_id: EmployeeId,
}

impl Assignment {
    /// Creates a new assignment row.
    #[allow(dead_code)] // Builder for in-memory datasets
    pub fn new(project_id: ProjectId, employee_id: EmployeeId) -> Self {
        Self {
            project_id,
            employee_id,
        }
    }
}

/// One row of the inner join `project JOIN employee USING (employee_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinedRow {
    pub project_id: ProjectId,
    #[allow(dead_code)] // Join key, kept for tracing rows back to the employee relation
    pub employee_id: EmployeeId,
    pub experience_years: Decimal,
}

/// Average experience of a single project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectAverage {
    pub project_id: ProjectId,
    /// Mean experience, rounded half-up.
    pub average_years: Decimal,
}

/// A project together with its dense rank by average experience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedProject {
    /// Dense rank, starting at 1 for the highest average.
    pub rank: usize,
    pub project_id: ProjectId,
    pub average_years: Decimal,
}

/// Per-project summary with average, discrete median and head count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectExperienceSummary {
    pub project_id: ProjectId,
    /// Mean experience, rounded half-up.
    pub average_years: Decimal,
    /// Discrete median: always one of the observed values, rounded half-up.
    pub median_years: Decimal,
    /// Number of employees joined to the project.
    pub employee_count: usize,
}

/// Which query results a report should contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    /// Average experience per project.
    Average,
    /// Project(s) tied for the highest average.
    Top,
    /// Average, median and count, filtered by head count.
    Summary,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKind::Average => write!(f, "Average Experience per Project"),
            QueryKind::Top => write!(f, "Highest Average Experience"),
            QueryKind::Summary => write!(f, "Project Experience Summary"),
        }
    }
}

impl QueryKind {
    /// All queries in report order.
    pub const ALL: [QueryKind; 3] = [QueryKind::Average, QueryKind::Top, QueryKind::Summary];

    /// Markdown anchor of the query section.
    pub fn anchor(&self) -> &'static str {
        match self {
            QueryKind::Average => "average-experience-per-project",
            QueryKind::Top => "highest-average-experience",
            QueryKind::Summary => "project-experience-summary",
        }
    }
}

/// Metadata about a report run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Dataset the report was computed from.
    pub source: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Rows in the employee relation.
    pub employees: usize,
    /// Rows in the project relation.
    pub assignments: usize,
    /// Rows produced by the join.
    pub joined_rows: usize,
    /// Assignments dropped because they reference no known employee.
    pub dropped_assignments: usize,
    /// Summary rows require strictly more employees than this.
    pub min_employees: usize,
    /// Fraction used for the discrete percentile.
    pub percentile: f64,
    /// Decimal places of every rounded value.
    pub precision: u32,
}

/// The complete aggregation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    /// Average experience per project, by project id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub averages: Option<Vec<ProjectAverage>>,
    /// Projects tied for rank 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_projects: Option<Vec<RankedProject>>,
    /// Filtered summaries, by project id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summaries: Option<Vec<ProjectExperienceSummary>>,
}

impl Report {
    /// Creates a report with no query results yet.
    pub fn new(metadata: ReportMetadata) -> Self {
        Self {
            metadata,
            averages: None,
            top_projects: None,
            summaries: None,
        }
    }

    /// Queries whose results are present, in report order.
    pub fn included_queries(&self) -> Vec<QueryKind> {
        QueryKind::ALL
            .into_iter()
            .filter(|kind| match kind {
                QueryKind::Average => self.averages.is_some(),
                QueryKind::Top => self.top_projects.is_some(),
                QueryKind::Summary => self.summaries.is_some(),
            })
            .collect()
    }
}
