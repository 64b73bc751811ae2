//! # Warming Chains
//!
//! A chain is the unit of work handed to the queue: one warming step per team
//! of a batch, in order, followed by exactly one gauge decrement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TeamId;

/// One step of a warming chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ChainStep {
    /// Warm the cohort dependency cache of one team
    WarmTeam { team_id: TeamId },
    /// Terminal bookkeeping step: decrement the active-chains gauge
    DecrementActiveChains,
}

/// Ordered steps executed sequentially by one worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmingChain {
    pub chain_id: Uuid,
    pub steps: Vec<ChainStep>,
}

impl WarmingChain {
    /// Build the chain for a batch: warm every team, then decrement the gauge
    pub fn for_batch(batch: &[TeamId]) -> Self {
        let steps = batch
            .iter()
            .map(|&team_id| ChainStep::WarmTeam { team_id })
            .chain(std::iter::once(ChainStep::DecrementActiveChains))
            .collect();

        Self {
            chain_id: Uuid::new_v4(),
            steps,
        }
    }

    /// Team ids in execution order
    pub fn team_ids(&self) -> Vec<TeamId> {
        self.steps
            .iter()
            .filter_map(|step| match step {
                ChainStep::WarmTeam { team_id } => Some(*team_id),
                ChainStep::DecrementActiveChains => None,
            })
            .collect()
    }

    pub fn team_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| matches!(step, ChainStep::WarmTeam { .. }))
            .count()
    }
}

/// Receipt for an accepted chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionHandle {
    pub chain_id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_ends_with_single_decrement() {
        let chain = WarmingChain::for_batch(&[5, 3, 9]);

        assert_eq!(
            chain.steps,
            vec![
                ChainStep::WarmTeam { team_id: 5 },
                ChainStep::WarmTeam { team_id: 3 },
                ChainStep::WarmTeam { team_id: 9 },
                ChainStep::DecrementActiveChains,
            ]
        );
        assert_eq!(chain.team_ids(), vec![5, 3, 9]);
        assert_eq!(chain.team_count(), 3);
    }

    #[test]
    fn test_empty_batch_still_decrements() {
        let chain = WarmingChain::for_batch(&[]);
        assert_eq!(chain.steps, vec![ChainStep::DecrementActiveChains]);
        assert_eq!(chain.team_count(), 0);
    }

    #[test]
    fn test_step_wire_format() {
        let value = serde_json::to_value(ChainStep::WarmTeam { team_id: 12 }).unwrap();
        assert_eq!(value, serde_json::json!({"step": "warm_team", "team_id": 12}));

        let value = serde_json::to_value(ChainStep::DecrementActiveChains).unwrap();
        assert_eq!(value, serde_json::json!({"step": "decrement_active_chains"}));
    }
}
