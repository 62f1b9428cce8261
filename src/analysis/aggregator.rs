//! Per-project experience aggregation.
//!
//! Grouping, averaging, discrete percentiles and dense ranking over the
//! joined employee/project rows. All arithmetic is exact decimal; rounding
//! is half-up and applied once, on the final value.

use crate::error::QueryError;
use crate::models::{JoinedRow, ProjectAverage, ProjectExperienceSummary, ProjectId, RankedProject};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;
use tracing::debug;

/// Default number of decimal places for rounded results.
pub const DEFAULT_PRECISION: u32 = 2;

/// Largest scale a `Decimal` can represent.
pub const MAX_PRECISION: u32 = 28;

/// Parameters of the summary query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryOptions {
    /// Keep projects with strictly more employees than this.
    pub min_employees: usize,
    /// Fraction for the discrete percentile (0.5 is the median).
    pub percentile: f64,
    /// Decimal places of the rounded average and median.
    pub precision: u32,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            min_employees: 3,
            percentile: 0.5,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl SummaryOptions {
    /// Reject parameters no query could be evaluated with.
    pub fn validate(&self) -> Result<(), QueryError> {
        validate_percentile(self.percentile)?;
        validate_precision(self.precision)
    }
}

pub fn validate_percentile(percentile: f64) -> Result<(), QueryError> {
    if (0.0..=1.0).contains(&percentile) {
        Ok(())
    } else {
        Err(QueryError::InvalidPercentile(percentile))
    }
}

pub fn validate_precision(precision: u32) -> Result<(), QueryError> {
    if precision <= MAX_PRECISION {
        Ok(())
    } else {
        Err(QueryError::InvalidPrecision(precision))
    }
}

/// Round half-up to `dp` places, padding the scale so `7` renders as `7.00`.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

/// Group experience values by project, ordered by project id.
pub fn group_by_project(rows: &[JoinedRow]) -> BTreeMap<ProjectId, Vec<Decimal>> {
    let mut grouped: BTreeMap<ProjectId, Vec<Decimal>> = BTreeMap::new();

    for row in rows {
        grouped
            .entry(row.project_id)
            .or_default()
            .push(row.experience_years);
    }

    grouped
}

/// Arithmetic mean, unrounded. `None` for an empty group.
pub fn mean(values: &[Decimal]) -> Result<Option<Decimal>, QueryError> {
    if values.is_empty() {
        return Ok(None);
    }

    let sum = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
        .ok_or(QueryError::Overflow)?;

    Ok(Some(sum / Decimal::from(values.len())))
}

/// Exact decimal form of a percentile fraction; `0.28` stays `0.28`.
fn exact_fraction(percentile: f64) -> Result<Decimal, QueryError> {
    percentile
        .to_string()
        .parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_f64_retain(percentile))
        .ok_or(QueryError::InvalidPercentile(percentile))
}

/// Discrete percentile: the smallest value whose cumulative distribution
/// reaches `percentile`. Always returns an element of `values`.
pub fn percentile_disc(values: &[Decimal], percentile: f64) -> Result<Option<Decimal>, QueryError> {
    validate_percentile(percentile)?;

    if values.is_empty() {
        return Ok(None);
    }

    let mut sorted = values.to_vec();
    sorted.sort();

    let n = sorted.len();
    let position = (exact_fraction(percentile)? * Decimal::from(n))
        .ceil()
        .to_usize()
        .unwrap_or(n);
    let index = position.clamp(1, n) - 1;

    Ok(Some(sorted[index]))
}

/// Average experience per project, rounded, ordered by project id.
pub fn average_experience_per_project(
    rows: &[JoinedRow],
    precision: u32,
) -> Result<Vec<ProjectAverage>, QueryError> {
    let mut averages = Vec::new();

    for (project_id, values) in group_by_project(rows) {
        if let Some(avg) = mean(&values)? {
            averages.push(ProjectAverage {
                project_id,
                average_years: round_half_up(avg, precision),
            });
        }
    }

    Ok(averages)
}

/// Dense rank by average descending; ties share a rank and are ordered by
/// project id.
pub fn rank_projects(averages: &[ProjectAverage]) -> Vec<RankedProject> {
    let mut sorted: Vec<&ProjectAverage> = averages.iter().collect();
    sorted.sort_by(|a, b| {
        b.average_years
            .cmp(&a.average_years)
            .then_with(|| a.project_id.cmp(&b.project_id))
    });

    let mut ranked = Vec::with_capacity(sorted.len());
    let mut rank = 0;
    let mut previous: Option<Decimal> = None;

    for avg in sorted {
        if previous != Some(avg.average_years) {
            rank += 1;
            previous = Some(avg.average_years);
        }
        ranked.push(RankedProject {
            rank,
            project_id: avg.project_id,
            average_years: avg.average_years,
        });
    }

    ranked
}

/// Every project tied for the highest average.
pub fn top_average_projects(averages: &[ProjectAverage]) -> Vec<RankedProject> {
    let top: Vec<RankedProject> = rank_projects(averages)
        .into_iter()
        .take_while(|p| p.rank == 1)
        .collect();

    debug!("{} project(s) tied for the highest average", top.len());
    top
}

/// Average, discrete median and head count per project, keeping only
/// projects with more than `options.min_employees` employees.
pub fn project_summaries(
    rows: &[JoinedRow],
    options: &SummaryOptions,
) -> Result<Vec<ProjectExperienceSummary>, QueryError> {
    options.validate()?;

    let mut summaries = Vec::new();

    for (project_id, values) in group_by_project(rows) {
        let employee_count = values.len();
        if employee_count <= options.min_employees {
            debug!(
                "Project {} has {} employees; filtered out",
                project_id, employee_count
            );
            continue;
        }

        let (Some(avg), Some(median)) =
            (mean(&values)?, percentile_disc(&values, options.percentile)?)
        else {
            continue;
        };

        summaries.push(ProjectExperienceSummary {
            project_id,
            average_years: round_half_up(avg, options.precision),
            median_years: round_half_up(median, options.precision),
            employee_count,
        });
    }

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn row(project_id: ProjectId, employee_id: u64, years: &str) -> JoinedRow {
        JoinedRow {
            project_id,
            employee_id,
            experience_years: d(years),
        }
    }

    fn avg(project_id: ProjectId, years: &str) -> ProjectAverage {
        ProjectAverage {
            project_id,
            average_years: d(years),
        }
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(d("2.675"), 2).to_string(), "2.68");
        assert_eq!(round_half_up(d("2.665"), 2).to_string(), "2.67");
        assert_eq!(round_half_up(d("2.664"), 2).to_string(), "2.66");
        assert_eq!(round_half_up(d("7"), 2).to_string(), "7.00");
        assert_eq!(round_half_up(d("0.5"), 0).to_string(), "1");
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[d("5"), d("7"), d("9")]), Ok(Some(d("7"))));
        assert_eq!(mean(&[]), Ok(None));
    }

    #[test]
    fn test_mean_overflow_is_an_error() {
        assert_eq!(mean(&[Decimal::MAX, Decimal::MAX]), Err(QueryError::Overflow));

        let rows = vec![
            row(1, 1, &Decimal::MAX.to_string()),
            row(1, 2, &Decimal::MAX.to_string()),
        ];
        assert_eq!(
            average_experience_per_project(&rows, 2),
            Err(QueryError::Overflow)
        );
    }

    #[test]
    fn test_percentile_disc_returns_observed_value() {
        let values = [d("9"), d("4"), d("7"), d("5")];
        // sorted: 4 5 7 9; ceil(0.5 * 4) = 2 -> second value
        assert_eq!(percentile_disc(&values, 0.5).unwrap(), Some(d("5")));
        assert_eq!(percentile_disc(&values, 0.0).unwrap(), Some(d("4")));
        assert_eq!(percentile_disc(&values, 1.0).unwrap(), Some(d("9")));
        assert_eq!(percentile_disc(&values, 0.51).unwrap(), Some(d("7")));
    }

    #[test]
    fn test_percentile_disc_exact_cumulative_boundary() {
        // 0.28 * 25 is 7.000000000000001 in f64; the 7th value has cume_dist exactly 0.28
        let values: Vec<Decimal> = (1..=25).map(Decimal::from).collect();
        assert_eq!(percentile_disc(&values, 0.28).unwrap(), Some(d("7")));
        assert_eq!(percentile_disc(&values, 0.2801).unwrap(), Some(d("8")));

        let values: Vec<Decimal> = (1..=10).map(Decimal::from).collect();
        assert_eq!(percentile_disc(&values, 0.3).unwrap(), Some(d("3")));
        assert_eq!(percentile_disc(&values, 0.7).unwrap(), Some(d("7")));
    }

    #[test]
    fn test_percentile_disc_odd_count() {
        let values = [d("5"), d("7"), d("9")];
        assert_eq!(percentile_disc(&values, 0.5).unwrap(), Some(d("7")));
    }

    #[test]
    fn test_percentile_disc_invalid_fraction() {
        assert_eq!(
            percentile_disc(&[d("1")], 1.5),
            Err(QueryError::InvalidPercentile(1.5))
        );
        assert!(percentile_disc(&[d("1")], f64::NAN).is_err());
    }

    #[test]
    fn test_percentile_disc_empty() {
        assert_eq!(percentile_disc(&[], 0.5).unwrap(), None);
    }

    #[test]
    fn test_average_experience_per_project() {
        let rows = vec![
            row(2, 1, "3"),
            row(1, 1, "3"),
            row(1, 2, "2"),
            row(1, 3, "1"),
            row(2, 4, "2"),
        ];

        let averages = average_experience_per_project(&rows, 2).unwrap();
        assert_eq!(averages, vec![avg(1, "2.00"), avg(2, "2.50")]);
        assert_eq!(averages[0].average_years.to_string(), "2.00");
    }

    #[test]
    fn test_average_rounds_repeating_fraction() {
        let rows = vec![row(1, 1, "1"), row(1, 2, "1"), row(1, 3, "0")];
        let averages = average_experience_per_project(&rows, 2).unwrap();
        assert_eq!(averages[0].average_years.to_string(), "0.67");
    }

    #[test]
    fn test_rank_projects_dense() {
        let averages = vec![
            avg(1, "5.00"),
            avg(2, "8.00"),
            avg(3, "6.50"),
            avg(4, "8.00"),
            avg(5, "5.00"),
        ];

        let ranked = rank_projects(&averages);
        let ranks: Vec<(usize, ProjectId)> = ranked.iter().map(|r| (r.rank, r.project_id)).collect();
        assert_eq!(ranks, vec![(1, 2), (1, 4), (2, 3), (3, 1), (3, 5)]);
    }

    #[test]
    fn test_top_average_projects_keeps_ties() {
        let averages = vec![avg(1, "8.00"), avg(2, "7.99"), avg(3, "8.00")];

        let top = top_average_projects(&averages);
        let ids: Vec<ProjectId> = top.iter().map(|p| p.project_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(top.iter().all(|p| p.average_years == d("8")));
    }

    #[test]
    fn test_top_average_projects_single_winner() {
        let averages = vec![avg(1, "2.00"), avg(2, "2.50")];
        let top = top_average_projects(&averages);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].project_id, 2);
    }

    #[test]
    fn test_top_average_projects_empty() {
        assert!(top_average_projects(&[]).is_empty());
    }

    #[test]
    fn test_three_employees_excluded_from_summary() {
        let rows = vec![row(10, 1, "5"), row(10, 2, "7"), row(10, 3, "9")];

        let averages = average_experience_per_project(&rows, 2).unwrap();
        assert_eq!(averages, vec![avg(10, "7.00")]);

        let summaries = project_summaries(&rows, &SummaryOptions::default()).unwrap();
        assert!(summaries.is_empty());

        let relaxed = SummaryOptions {
            min_employees: 2,
            ..SummaryOptions::default()
        };
        let summaries = project_summaries(&rows, &relaxed).unwrap();
        assert_eq!(
            summaries,
            vec![ProjectExperienceSummary {
                project_id: 10,
                average_years: d("7.00"),
                median_years: d("7.00"),
                employee_count: 3,
            }]
        );
    }

    #[test]
    fn test_project_summaries_filters_and_orders() {
        let rows = vec![
            row(3, 5, "7"),
            row(1, 1, "3"),
            row(3, 6, "5"),
            row(3, 7, "9"),
            row(1, 2, "2"),
            row(3, 8, "4"),
            row(2, 1, "3"),
            row(2, 2, "2"),
            row(2, 3, "1"),
            row(2, 4, "2"),
            row(2, 5, "7"),
        ];

        let summaries = project_summaries(&rows, &SummaryOptions::default()).unwrap();
        assert_eq!(summaries.len(), 2);
        assert!(summaries.iter().all(|s| s.employee_count > 3));

        assert_eq!(summaries[0].project_id, 2);
        assert_eq!(summaries[0].average_years.to_string(), "3.00");
        assert_eq!(summaries[0].median_years.to_string(), "2.00");
        assert_eq!(summaries[0].employee_count, 5);

        assert_eq!(summaries[1].project_id, 3);
        assert_eq!(summaries[1].average_years.to_string(), "6.25");
        assert_eq!(summaries[1].median_years.to_string(), "5.00");
    }

    #[test]
    fn test_summary_median_is_observed_value() {
        let rows = vec![
            row(1, 1, "1.5"),
            row(1, 2, "2.25"),
            row(1, 3, "10"),
            row(1, 4, "3"),
        ];
        let observed: Vec<Decimal> = rows.iter().map(|r| r.experience_years).collect();

        let summaries = project_summaries(&rows, &SummaryOptions::default()).unwrap();
        assert!(observed.contains(&summaries[0].median_years));
        assert_eq!(summaries[0].median_years, d("2.25"));
    }

    #[test]
    fn test_summary_options_validation() {
        let options = SummaryOptions {
            percentile: -0.1,
            ..SummaryOptions::default()
        };
        assert_eq!(
            project_summaries(&[], &options),
            Err(QueryError::InvalidPercentile(-0.1))
        );

        let options = SummaryOptions {
            precision: 29,
            ..SummaryOptions::default()
        };
        assert_eq!(options.validate(), Err(QueryError::InvalidPrecision(29)));
    }
}
