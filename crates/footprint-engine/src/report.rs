//! Aggregated impact of a task tree

use crate::ids::TaskId;
use footprint_domain::{
    DimensionalityError, EnvironmentalImpact, ImpactSourceId, ImpactSummary,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Impact of a task split along both aggregation axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskImpact {
    /// Task the report was computed for
    pub task_id: TaskId,
    /// Whole subtree
    pub total: EnvironmentalImpact,
    /// Total of each direct subtask
    #[serde(default)]
    pub subtasks: BTreeMap<TaskId, EnvironmentalImpact>,
    /// Whole subtree grouped by impact source
    #[serde(default)]
    pub resources: BTreeMap<ImpactSourceId, EnvironmentalImpact>,
}

impl TaskImpact {
    /// `{CATEGORY: {value, unit}}` of the total
    pub fn summary(&self) -> Result<ImpactSummary, DimensionalityError> {
        self.total.summary()
    }

    /// `{impact_source_id: summary}` of the per-source buckets
    pub fn resource_summaries(
        &self,
    ) -> Result<BTreeMap<ImpactSourceId, ImpactSummary>, DimensionalityError> {
        self.resources
            .iter()
            .map(|(id, impact)| Ok((id.clone(), impact.summary()?)))
            .collect()
    }
}
