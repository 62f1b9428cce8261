//! Equivalent SQL for each query, shown alongside its results.

use super::aggregator::SummaryOptions;
use crate::models::QueryKind;

/// Render the SQL statement a relational engine would run for `kind`.
pub fn equivalent_sql(kind: QueryKind, options: &SummaryOptions) -> String {
    let precision = options.precision;

    match kind {
        QueryKind::Average => format!(
            "SELECT p.project_id,\n       ROUND(AVG(e.experience_years), {precision}) AS average_years\n\
             FROM project p\n\
             JOIN employee e ON p.employee_id = e.employee_id\n\
             GROUP BY p.project_id\n\
             ORDER BY p.project_id;"
        ),
        QueryKind::Top => format!(
            "WITH averages AS (\n\
             \x20   SELECT p.project_id,\n\
             \x20          ROUND(AVG(e.experience_years), {precision}) AS average_years\n\
             \x20   FROM project p\n\
             \x20   JOIN employee e ON p.employee_id = e.employee_id\n\
             \x20   GROUP BY p.project_id\n\
             ), ranked AS (\n\
             \x20   SELECT project_id, average_years,\n\
             \x20          DENSE_RANK() OVER (ORDER BY average_years DESC) AS rnk\n\
             \x20   FROM averages\n\
             )\n\
             SELECT project_id, average_years\n\
             FROM ranked\n\
             WHERE rnk = 1\n\
             ORDER BY project_id;"
        ),
        QueryKind::Summary => format!(
            "SELECT p.project_id,\n\
             \x20      ROUND(AVG(e.experience_years), {precision}) AS average_years,\n\
             \x20      ROUND(PERCENTILE_DISC({percentile}) WITHIN GROUP (ORDER BY e.experience_years), {precision}) AS median_years,\n\
             \x20      COUNT(e.employee_id) AS employee_count\n\
             FROM project p\n\
             JOIN employee e ON p.employee_id = e.employee_id\n\
             GROUP BY p.project_id\n\
             HAVING COUNT(e.employee_id) > {min_employees}\n\
             ORDER BY p.project_id;",
            percentile = options.percentile,
            min_employees = options.min_employees,
        ),
    }
}
