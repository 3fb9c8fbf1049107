use std::collections::HashMap;

use log::debug;

use crate::error::Result;

use super::source::PipelineSource;
use super::types::{FailedJobRow, PipelineDetails, PipelineRef};

const FAILED_STATUS: &str = "failed";

/// Collects every failed job across `pipelines`, in listing order.
///
/// Pipeline details are fetched once per `PipelineRef` and reused for the
/// rest of the call, so a list containing duplicates does not refetch them.
///
/// # Errors
///
/// Returns the first API error; rows gathered so far are discarded.
pub async fn collect_failed_jobs<S>(
    source: &S,
    pipelines: &[PipelineRef],
) -> Result<Vec<FailedJobRow>>
where
    S: PipelineSource,
{
    let mut cache: HashMap<PipelineRef, PipelineDetails> = HashMap::new();
    let mut rows = Vec::new();

    for pipeline_ref in pipelines {
        if !cache.contains_key(pipeline_ref) {
            let details = source
                .pipeline(pipeline_ref.project_id, pipeline_ref.id)
                .await?;
            cache.insert(*pipeline_ref, details);
        }
        let pipeline = &cache[pipeline_ref];

        let jobs = source
            .pipeline_jobs(pipeline.project_id, pipeline.id)
            .await?;
        let pipeline_name = resolve_pipeline_name(pipeline);

        let before = rows.len();
        rows.extend(
            jobs.into_iter()
                .filter(|job| job.status == FAILED_STATUS)
                .map(|job| FailedJobRow {
                    pipeline_id: pipeline.id,
                    pipeline_name: pipeline_name.clone(),
                    job_id: job.id,
                    job_name: job.name,
                }),
        );
        debug!(
            "Pipeline {pipeline_ref} ({pipeline_name}) has {} failed jobs",
            rows.len() - before
        );
    }

    Ok(rows)
}

/// Display name of a pipeline: its name, else its ref, else `pipeline-<id>`.
pub fn resolve_pipeline_name(pipeline: &PipelineDetails) -> String {
    pipeline
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .or(pipeline.ref_.as_deref())
        .map_or_else(|| format!("pipeline-{}", pipeline.id), str::to_string)
}
