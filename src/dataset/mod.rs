//! Source relations and the employee/project join.
//!
//! A dataset is loaded from a JSON or TOML file holding the `employee`
//! and `project` relations, validated once, and then joined on
//! `employee_id` for the aggregation queries.

use crate::error::DatasetError;
use crate::models::{Assignment, Employee, EmployeeId, JoinedRow, ProjectId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Both source relations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// The `employee` relation.
    #[serde(default, rename = "employee", alias = "employees")]
    pub employees: Vec<Employee>,

    /// The `project` relation.
    #[serde(default, rename = "project", alias = "projects")]
    pub assignments: Vec<Assignment>,
}

/// Result of joining the project relation against the employee relation.
#[derive(Debug, Clone, Default)]
pub struct JoinResult {
    /// Joined rows, in project relation order.
    pub rows: Vec<JoinedRow>,
    /// Assignments whose employee does not exist.
    pub dropped: Vec<Assignment>,
}

impl Dataset {
    /// Build a dataset from in-memory relations, validating it.
    #[allow(dead_code)] // Alternative to loading from a file
    pub fn new(employees: Vec<Employee>, assignments: Vec<Assignment>) -> Result<Self, DatasetError> {
        let dataset = Self {
            employees,
            assignments,
        };
        dataset.validate()?;
        Ok(dataset)
    }

    /// Load and validate a dataset file; the format follows the extension.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let content = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let dataset: Dataset = match ext.as_str() {
            "json" => serde_json::from_str(&content)?,
            "toml" => toml::from_str(&content)?,
            _ => return Err(DatasetError::UnsupportedFormat(path.to_path_buf())),
        };

        dataset.validate()?;
        info!(
            "Loaded {} employees and {} assignments from {}",
            dataset.employees.len(),
            dataset.assignments.len(),
            path.display()
        );

        Ok(dataset)
    }

    /// Check key uniqueness and value ranges.
    pub fn validate(&self) -> Result<(), DatasetError> {
        let mut seen_employees = HashSet::new();
        for employee in &self.employees {
            if !seen_employees.insert(employee.employee_id) {
                return Err(DatasetError::DuplicateEmployee(employee.employee_id));
            }
            if employee.experience_years.is_sign_negative() && !employee.experience_years.is_zero() {
                return Err(DatasetError::NegativeExperience {
                    employee_id: employee.employee_id,
                    experience_years: employee.experience_years,
                });
            }
        }

        let mut seen_assignments = HashSet::new();
        for assignment in &self.assignments {
            if !seen_assignments.insert((assignment.project_id, assignment.employee_id)) {
                return Err(DatasetError::DuplicateAssignment {
                    project_id: assignment.project_id,
                    employee_id: assignment.employee_id,
                });
            }
        }

        Ok(())
    }

    /// Inner join on `employee_id`.
    pub fn join(&self) -> JoinResult {
        let by_id: HashMap<EmployeeId, &Employee> = self
            .employees
            .iter()
            .map(|e| (e.employee_id, e))
            .collect();

        let mut result = JoinResult::default();

        for assignment in &self.assignments {
            match by_id.get(&assignment.employee_id) {
                Some(employee) => result.rows.push(JoinedRow {
                    project_id: assignment.project_id,
                    employee_id: employee.employee_id,
                    experience_years: employee.experience_years,
                }),
                None => {
                    warn!(
                        "Project {} references unknown employee {}; dropped by join",
                        assignment.project_id, assignment.employee_id
                    );
                    result.dropped.push(assignment.clone());
                }
            }
        }

        debug!(
            "Join produced {} rows ({} dropped)",
            result.rows.len(),
            result.dropped.len()
        );

        result
    }

    /// Distinct project identifiers in the project relation.
    pub fn project_ids(&self) -> Vec<ProjectId> {
        let mut ids: Vec<ProjectId> = self.assignments.iter().map(|a| a.project_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
