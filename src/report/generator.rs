//! Markdown and JSON report generation.
//!
//! This module renders the query results of a [`Report`] as a Markdown
//! document or as pretty-printed JSON.

use crate::analysis::{equivalent_sql, SummaryOptions};
use crate::models::{
    ProjectAverage, ProjectExperienceSummary, QueryKind, RankedProject, Report, ReportMetadata,
};
use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# Project Experience Report\n\n");

    // Metadata section
    output.push_str(&generate_metadata_section(&report.metadata));

    // Table of contents
    output.push_str(&generate_table_of_contents(report));

    let options = SummaryOptions {
        min_employees: report.metadata.min_employees,
        percentile: report.metadata.percentile,
        precision: report.metadata.precision,
    };

    if let Some(ref averages) = report.averages {
        output.push_str(&generate_averages_section(averages, &options));
    }
    if let Some(ref top) = report.top_projects {
        output.push_str(&generate_top_section(top, &options));
    }
    if let Some(ref summaries) = report.summaries {
        output.push_str(&generate_summary_section(summaries, &options));
    }

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Employees:** {}\n", metadata.employees));
    section.push_str(&format!(
        "- **Project Assignments:** {}\n",
        metadata.assignments
    ));
    section.push_str(&format!("- **Joined Rows:** {}\n", metadata.joined_rows));
    if metadata.dropped_assignments > 0 {
        section.push_str(&format!(
            "- **Dropped Assignments:** {} (unknown employee)\n",
            metadata.dropped_assignments
        ));
    }
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(report: &Report) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");

    for kind in report.included_queries() {
        toc.push_str(&format!("- [{}](#{})\n", kind, kind.anchor()));
    }

    toc.push('\n');

    toc
}

/// Section heading followed by the equivalent SQL in a collapsed block.
fn section_header(kind: QueryKind, options: &SummaryOptions) -> String {
    let mut header = String::new();

    header.push_str(&format!("## {}\n\n", kind));
    header.push_str("<details>\n<summary>Equivalent SQL</summary>\n\n```sql\n");
    header.push_str(&equivalent_sql(kind, options));
    header.push_str("\n```\n</details>\n\n");

    header
}

/// Generate the average-per-project section.
fn generate_averages_section(averages: &[ProjectAverage], options: &SummaryOptions) -> String {
    let mut section = section_header(QueryKind::Average, options);

    if averages.is_empty() {
        section.push_str("No project has any joined employee.\n\n");
        return section;
    }

    section.push_str("| Project | Average Years |\n");
    section.push_str("|:---|---:|\n");
    for avg in averages {
        section.push_str(&format!(
            "| {} | {} |\n",
            avg.project_id, avg.average_years
        ));
    }
    section.push('\n');

    section
}

/// Generate the highest-average section.
fn generate_top_section(top: &[RankedProject], options: &SummaryOptions) -> String {
    let mut section = section_header(QueryKind::Top, options);

    if top.is_empty() {
        section.push_str("No project has any joined employee.\n\n");
        return section;
    }

    if top.len() > 1 {
        section.push_str(&format!(
            "{} projects are tied for the highest average.\n\n",
            top.len()
        ));
    }

    section.push_str("| Rank | Project | Average Years |\n");
    section.push_str("|:---:|:---|---:|\n");
    for project in top {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            project.rank, project.project_id, project.average_years
        ));
    }
    section.push('\n');

    section
}

/// Generate the average/median/count section.
fn generate_summary_section(
    summaries: &[ProjectExperienceSummary],
    options: &SummaryOptions,
) -> String {
    let mut section = section_header(QueryKind::Summary, options);

    section.push_str(
        "> ⚠️ **Note:** the source query omitted the separator before `COUNT(...)`; \
         it is restored above and `employee_count` is reported as its own column.\n\n",
    );

    section.push_str(&format!(
        "*Projects with more than {} employees; median is the discrete {} percentile.*\n\n",
        options.min_employees, options.percentile
    ));

    if summaries.is_empty() {
        section.push_str(&format!(
            "No project has more than {} employees.\n\n",
            options.min_employees
        ));
        return section;
    }

    section.push_str("| Project | Average Years | Median Years | Employees |\n");
    section.push_str("|:---|---:|---:|---:|\n");
    for summary in summaries {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            summary.project_id, summary.average_years, summary.median_years, summary.employee_count
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by projexp v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}
