//! Backstop limits for graph execution.
//!
//! Termination of a run is already guaranteed by the bounded retry counter
//! at the branch node. The visit budget here turns an impossible runaway
//! (a wiring or merge mistake) into a typed error instead of a hang.

use thiserror::Error;

use super::graph::Graph;

/// Hard ceiling on node invocations for one run.
#[derive(Debug, Clone, Copy)]
pub struct RunLimits {
    pub max_node_visits: u32,
}

impl RunLimits {
    /// Derive the ceiling from the graph: every node once plus the full
    /// retry allowance of its branch.
    pub fn for_graph(graph: &Graph) -> Self {
        Self {
            max_node_visits: graph.visit_budget(),
        }
    }

    pub fn check(&self, tracker: &VisitTracker) -> Result<(), SafetyViolation> {
        if tracker.node_visits >= self.max_node_visits {
            return Err(SafetyViolation::NodeBudgetExceeded {
                visits: tracker.node_visits,
                limit: self.max_node_visits,
            });
        }
        Ok(())
    }
}

/// Counts node invocations during a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisitTracker {
    pub node_visits: u32,
}

impl VisitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_visit(&mut self) {
        self.node_visits += 1;
    }
}

#[derive(Debug, Clone, Error)]
pub enum SafetyViolation {
    #[error("node visit budget exceeded: {visits} >= {limit}")]
    NodeBudgetExceeded { visits: u32, limit: u32 },
}
