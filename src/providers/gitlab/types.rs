use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a pipeline node during traversal.
///
/// Two pipelines are the same node iff both the pipeline id and the project id match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineRef {
    pub id: u64,
    pub project_id: u64,
}

impl PipelineRef {
    pub fn new(id: u64, project_id: u64) -> Self {
        Self { id, project_id }
    }
}

impl fmt::Display for PipelineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.project_id, self.id)
    }
}

/// A merge request as returned by `GET /projects/:id/merge_requests/:iid`.
///
/// Only the fields the tools read are modelled.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeRequest {
    pub iid: u64,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub source_branch: Option<String>,
    pub target_branch: Option<String>,
    pub web_url: Option<String>,
    pub head_pipeline: Option<PipelineSummary>,
    pub diff_refs: Option<DiffRefs>,
}

/// The pipeline embedded in a merge request.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSummary {
    pub id: u64,
    pub project_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiffRefs {
    pub base_sha: Option<String>,
    pub head_sha: Option<String>,
}

/// A pipeline as returned by `GET /projects/:id/pipelines/:pipeline_id`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PipelineDetails {
    pub id: u64,
    pub project_id: u64,
    pub name: Option<String>,
    #[serde(rename = "ref")]
    pub ref_: Option<String>,
}

/// A CI job within a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Job {
    pub id: u64,
    pub name: String,
    pub status: String,
}

/// A trigger job; `downstream_pipeline` is set once the child pipeline exists.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BridgeJob {
    pub downstream_pipeline: Option<DownstreamPipeline>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DownstreamPipeline {
    pub id: u64,
    pub project_id: Option<u64>,
}

impl BridgeJob {
    /// The triggered pipeline, if any. Same-project triggers omit the project id.
    pub fn downstream_ref(&self, parent_project_id: u64) -> Option<PipelineRef> {
        self.downstream_pipeline.as_ref().map(|downstream| {
            PipelineRef::new(
                downstream.id,
                downstream.project_id.unwrap_or(parent_project_id),
            )
        })
    }
}

/// One failed job in the aggregated report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedJobRow {
    pub pipeline_id: u64,
    pub pipeline_name: String,
    pub job_id: u64,
    pub job_name: String,
}
