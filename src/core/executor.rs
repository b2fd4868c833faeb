//! Graph executor.
//!
//! Walks the static graph from the start node to the terminal marker: at
//! each node, invoke the bound step, merge its partial update, then pick
//! the successor (a fixed edge, or the router's decision at the branch).
//! One run exclusively owns one state instance; there is no reentrancy and
//! no concurrency between nodes.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::steps::{Step, StepRegistry};

use super::graph::{Edge, Graph, NodeId, Route};
use super::safety::{RunLimits, VisitTracker};
use super::state::DocState;

/// Record of one completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Unique identifier for this run
    pub id: Uuid,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run reached the terminal node
    pub completed_at: DateTime<Utc>,

    /// Nodes in invocation order, retries included
    pub nodes_executed: Vec<NodeId>,

    /// Final state at the terminal node
    pub state: DocState,
}

/// The workflow execution engine.
pub struct Executor {
    graph: Graph,
    steps: StepRegistry,
    limits: RunLimits,
}

impl Executor {
    /// Build an executor over a validated graph.
    ///
    /// Fails when the wiring is broken or a wired node has no bound step;
    /// both are construction-time faults, caught before any run starts.
    pub fn new(graph: Graph, steps: StepRegistry) -> Result<Self> {
        graph.validate()?;
        for node in NodeId::ALL {
            if graph.edge(node).is_some() && !steps.contains(node) {
                anyhow::bail!("node '{}' has no step bound to it", node);
            }
        }

        let limits = RunLimits::for_graph(&graph);
        Ok(Self {
            graph,
            steps,
            limits,
        })
    }

    /// Execute one run to the terminal node and return the final state.
    ///
    /// Any step error is fatal: the walk aborts immediately and the error
    /// surfaces to the caller. No partial state is reported as success.
    #[instrument(skip(self, state), fields(topic = %state.framework_name))]
    pub async fn run(&self, mut state: DocState) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, "starting documentation run");

        let mut tracker = VisitTracker::new();
        let mut nodes_executed = Vec::new();
        let mut current = self.graph.start();

        loop {
            if let Err(violation) = self.limits.check(&tracker) {
                error!(%violation, "aborting run");
                return Err(anyhow::Error::new(violation));
            }

            let step = self
                .steps
                .get(current)
                .with_context(|| format!("node '{}' has no step bound to it", current))?;

            let update = step
                .invoke(&state)
                .await
                .with_context(|| format!("step '{}' failed", step.name()))?;
            state.merge(update);

            tracker.record_visit();
            nodes_executed.push(current);
            info!(node = %current, visits = tracker.node_visits, "node completed");

            current = match self.graph.edge(current) {
                Some(Edge::Next(next)) => *next,
                Some(Edge::Branch {
                    router,
                    forward,
                    retry,
                }) => match router.decide(&state.latest_defects, state.diagram_attempts) {
                    Route::Forward => {
                        if !state.latest_defects.is_empty() {
                            info!(
                                attempts = state.diagram_attempts,
                                "retry cap reached, accepting degraded content"
                            );
                        }
                        *forward
                    }
                    Route::Retry => {
                        info!(
                            attempt = state.diagram_attempts,
                            "routing back for another attempt"
                        );
                        *retry
                    }
                },
                Some(Edge::End) => break,
                None => anyhow::bail!("node '{}' has no outgoing edge", current),
            };
        }

        info!(%run_id, nodes = nodes_executed.len(), "run completed");

        Ok(RunReport {
            id: run_id,
            started_at,
            completed_at: Utc::now(),
            nodes_executed,
            state,
        })
    }
}
