use std::collections::HashSet;

use log::debug;

use crate::error::Result;

use super::source::PipelineSource;
use super::types::PipelineRef;

/// Discovers every pipeline reachable from `root` through bridge jobs.
///
/// The result is in depth-first pre-order: a pipeline precedes all of its
/// descendants and siblings keep the order in which the API returned their
/// bridges. Each pipeline appears once, even when the trigger graph has
/// diamonds or cycles.
///
/// # Errors
///
/// Returns the first API error; no partial listing is produced.
pub async fn collect_pipelines<S>(source: &S, root: PipelineRef) -> Result<Vec<PipelineRef>>
where
    S: PipelineSource,
{
    let mut pipelines = Vec::new();
    let mut visited = HashSet::new();
    let mut stack = vec![root];

    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }

        pipelines.push(current);

        let bridges = source
            .pipeline_bridges(current.project_id, current.id)
            .await?;

        let downstream: Vec<PipelineRef> = bridges
            .iter()
            .filter_map(|bridge| bridge.downstream_ref(current.project_id))
            .collect();

        debug!(
            "Pipeline {current} has {} bridges, {} downstream pipelines",
            bridges.len(),
            downstream.len()
        );

        // Reversed so the first bridge's child is popped first.
        stack.extend(downstream.into_iter().rev());
    }

    Ok(pipelines)
}
