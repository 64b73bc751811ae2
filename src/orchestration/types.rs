//! # Orchestration Types
//!
//! Data shared by the orchestration components: pages of team ids, the
//! orchestrator's run states and the summary returned to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TeamId;

/// Ascending team ids returned by one store query
pub type Page = Vec<TeamId>;

/// Outcome status of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
}

/// Aggregate counts for one orchestrator run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub status: RunStatus,
    pub teams_found: usize,
    pub teams_scheduled: usize,
    pub failed_teams: usize,
    pub teams_pages_processed: usize,
}

impl RunSummary {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "status": self.status,
            "teams_found": self.teams_found,
            "teams_scheduled": self.teams_scheduled,
            "failed_teams": self.failed_teams,
            "teams_pages_processed": self.teams_pages_processed,
        })
    }
}

/// Orchestrator run lifecycle.
///
/// `Start -> SelectingPages -> (PartitioningBatches -> SchedulingChains)* -> Completed`,
/// with `Failed` reachable whenever page selection errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    Start,
    SelectingPages,
    PartitioningBatches,
    SchedulingChains,
    Completed,
    Failed,
}

impl OrchestratorState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn can_transition_to(&self, next: OrchestratorState) -> bool {
        use OrchestratorState::*;
        matches!(
            (self, next),
            (Start, SelectingPages)
                | (Start, Failed)
                | (SelectingPages, PartitioningBatches)
                | (SelectingPages, Completed)
                | (SelectingPages, Failed)
                | (PartitioningBatches, SchedulingChains)
                | (SchedulingChains, SelectingPages)
                | (Completed, Start)
                | (Failed, Start)
        )
    }
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::SelectingPages => "selecting_pages",
            Self::PartitioningBatches => "partitioning_batches",
            Self::SchedulingChains => "scheduling_chains",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_json_keys() {
        let summary = RunSummary {
            status: RunStatus::Success,
            teams_found: 3,
            teams_scheduled: 2,
            failed_teams: 1,
            teams_pages_processed: 1,
        };

        let value = summary.to_json();
        assert_eq!(value["status"], "success");
        assert_eq!(value["teams_found"], 3);
        assert_eq!(value["teams_scheduled"], 2);
        assert_eq!(value["failed_teams"], 1);
        assert_eq!(value["teams_pages_processed"], 1);
        assert_eq!(serde_json::to_value(&summary).unwrap(), value);
    }

    #[test]
    fn test_state_transitions() {
        use OrchestratorState::*;

        assert!(Start.can_transition_to(SelectingPages));
        assert!(SelectingPages.can_transition_to(PartitioningBatches));
        assert!(PartitioningBatches.can_transition_to(SchedulingChains));
        assert!(SchedulingChains.can_transition_to(SelectingPages));
        assert!(SelectingPages.can_transition_to(Completed));
        assert!(SelectingPages.can_transition_to(Failed));
        assert!(Failed.can_transition_to(Start));

        assert!(!Start.can_transition_to(Completed));
        assert!(!SchedulingChains.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Failed));
        assert!(Completed.is_terminal());
        assert!(!SchedulingChains.is_terminal());
    }
}
