//! Pipeline steps.
//!
//! Each step is a named unit of work: a function of the current state to a
//! partial update, possibly backed by the external generator. The executor
//! owns the merge; steps never mutate shared state directly.

pub mod architect;
pub mod validator;
pub mod visuals;
pub mod writers;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::adapters::{Generator, SyntaxChecker};
use crate::core::graph::NodeId;
use crate::core::state::{DocState, StateUpdate};

// Re-export the concrete steps
pub use architect::LeadArchitectStep;
pub use validator::DiagramValidatorStep;
pub use visuals::VisualArchitectStep;
pub use writers::{BackendEngineerStep, GovernanceLeadStep, InfraSecurityDevopsStep};

/// A unit of work in the pipeline.
///
/// Steps run synchronously to completion from the engine's point of view
/// and return a partial update with a stable key set. A returned error is
/// fatal to the run, so generator-backed steps degrade internally and
/// reserve errors for genuinely unrecoverable conditions.
#[async_trait]
pub trait Step: Send + Sync {
    /// Stable step name, used in logs.
    fn name(&self) -> &'static str;

    /// Produce this step's partial update for the current state.
    async fn invoke(&self, state: &DocState) -> Result<StateUpdate>;
}

/// Node-to-step binding handed to the executor.
#[derive(Default)]
pub struct StepRegistry {
    steps: HashMap<NodeId, Box<dyn Step>>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: NodeId, step: Box<dyn Step>) {
        self.steps.insert(node, step);
    }

    pub fn get(&self, node: NodeId) -> Option<&dyn Step> {
        self.steps.get(&node).map(Box::as_ref)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.steps.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// The production binding: every engine node wired to its concrete step.
pub fn standard_steps(
    generator: Arc<dyn Generator>,
    checker: Arc<dyn SyntaxChecker>,
) -> StepRegistry {
    let mut registry = StepRegistry::new();
    registry.insert(
        NodeId::LeadArchitect,
        Box::new(LeadArchitectStep::new(generator.clone())),
    );
    registry.insert(
        NodeId::VisualArchitect,
        Box::new(VisualArchitectStep::new(generator.clone())),
    );
    registry.insert(
        NodeId::DiagramValidator,
        Box::new(DiagramValidatorStep::new(checker)),
    );
    registry.insert(
        NodeId::BackendEngineer,
        Box::new(BackendEngineerStep::new(generator.clone())),
    );
    registry.insert(
        NodeId::InfraSecurityDevops,
        Box::new(InfraSecurityDevopsStep::new(generator.clone())),
    );
    registry.insert(
        NodeId::GovernanceLead,
        Box::new(GovernanceLeadStep::new(generator)),
    );
    registry
}
