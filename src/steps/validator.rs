//! Diagram validator step.
//!
//! Checks the four candidate diagrams through the injected syntax checker
//! and reports the outcome as a defect batch. Defects are data for the
//! router, not errors: this step never fails the run.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::adapters::SyntaxChecker;
use crate::core::state::{DocState, StateUpdate, DIAGRAM_FIELDS};

use super::Step;

pub struct DiagramValidatorStep {
    checker: Arc<dyn SyntaxChecker>,
}

impl DiagramValidatorStep {
    pub fn new(checker: Arc<dyn SyntaxChecker>) -> Self {
        Self { checker }
    }
}

#[async_trait]
impl Step for DiagramValidatorStep {
    fn name(&self) -> &'static str {
        "diagram_validator"
    }

    async fn invoke(&self, state: &DocState) -> Result<StateUpdate> {
        let mut defects = Vec::new();

        for (field, label) in DIAGRAM_FIELDS {
            if let Some(error) = self.checker.check(state.text(field)).await {
                defects.push(format!("{} Diagram Error:\n{}", label, error));
            }
        }

        if defects.is_empty() {
            info!(step = self.name(), "validation passed");
        } else {
            warn!(
                step = self.name(),
                defects = defects.len(),
                attempt = state.diagram_attempts,
                "validation failed"
            );
        }

        Ok(StateUpdate::new().with_defects(defects))
    }
}
