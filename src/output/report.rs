//! Rendering of failed job reports.
//!
//! Markdown is the primary format: rows sorted by pipeline id then job id,
//! with `|` in names escaped so the table stays intact.

use clap::ValueEnum;
use serde::Serialize;

use crate::error::Result;
use crate::providers::gitlab::{FailedJobRow, FailedJobsReport};

use super::tables::{create_table, cyan_header, failed_cell};

pub const NO_HEAD_PIPELINE: &str = "No head pipeline found for this merge request.";
pub const NO_FAILED_JOBS: &str = "No failed jobs found.";

const MARKDOWN_TABLE_HEADER: &str =
    "|pipelineID|pipelineName|jobID|jobName|\n| -------- | ---------- | --- | ----- |";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Markdown,
    Table,
    Json,
}

pub fn render(report: &FailedJobsReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Markdown => Ok(render_markdown(report)),
        ReportFormat::Table => Ok(render_table(report)),
        ReportFormat::Json => render_json(report),
    }
}

/// Rows ordered by `(pipeline_id, job_id)`.
pub fn sorted_rows(rows: &[FailedJobRow]) -> Vec<&FailedJobRow> {
    let mut sorted: Vec<_> = rows.iter().collect();
    sorted.sort_by_key(|row| (row.pipeline_id, row.job_id));
    sorted
}

pub fn render_markdown(report: &FailedJobsReport) -> String {
    let header = format!("# Failed jobs for the MR IID {}:\n\n", report.mr_iid);

    if report.head_pipeline.is_none() {
        return format!("{header}{NO_HEAD_PIPELINE}");
    }

    if report.rows.is_empty() {
        return format!("{header}{NO_FAILED_JOBS}");
    }

    let table_rows = sorted_rows(&report.rows)
        .into_iter()
        .map(|row| {
            format!(
                "| {} | {} | {} | {} |",
                row.pipeline_id,
                escape_cell(&row.pipeline_name),
                row.job_id,
                escape_cell(&row.job_name)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{header}{MARKDOWN_TABLE_HEADER}\n{table_rows}")
}

fn render_table(report: &FailedJobsReport) -> String {
    let header = format!("Failed jobs for the MR IID {}:", report.mr_iid);

    if report.head_pipeline.is_none() {
        return format!("{header}\n{NO_HEAD_PIPELINE}");
    }

    if report.rows.is_empty() {
        return format!("{header}\n{NO_FAILED_JOBS}");
    }

    let mut table = create_table();
    table.set_header(cyan_header(&["Pipeline ID", "Pipeline", "Job ID", "Job"]));
    for row in sorted_rows(&report.rows) {
        table.add_row(vec![
            row.pipeline_id.to_string().into(),
            row.pipeline_name.as_str().into(),
            row.job_id.to_string().into(),
            failed_cell(&row.job_name),
        ]);
    }

    format!("{header}\n{table}")
}

#[derive(Serialize)]
struct JsonReport<'a> {
    merge_request_iid: u64,
    head_pipeline_found: bool,
    failed_jobs: Vec<&'a FailedJobRow>,
}

fn render_json(report: &FailedJobsReport) -> Result<String> {
    let json = JsonReport {
        merge_request_iid: report.mr_iid,
        head_pipeline_found: report.head_pipeline.is_some(),
        failed_jobs: sorted_rows(&report.rows),
    };
    Ok(serde_json::to_string_pretty(&json)?)
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}
