//! Visual architect step: the four Mermaid diagrams.
//!
//! This is the producing step of the validation retry loop: every
//! invocation rewrites all four diagrams, bumps the attempt counter, and
//! folds the previous defect batch into its prompt so the generator can
//! correct itself.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::adapters::{GenerateRequest, Generator};
use crate::core::extract::extract;
use crate::core::state::{DocState, StateUpdate, TextField};

use super::Step;

/// Expected generator reply.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VisualDraft {
    pub p1_overview_architecture_mermaid: String,
    pub p1_overview_flow_mermaid: String,
    pub p2_deep_architecture_mermaid: String,
    pub p2_deep_flow_mermaid: String,
}

const FORMAT_INSTRUCTIONS: &str = "Reply with a JSON object containing exactly these string fields:\n\
- p1_overview_architecture_mermaid: Mermaid code for the high-level architecture diagram\n\
- p1_overview_flow_mermaid: Mermaid code for the high-level happy-path interaction flow\n\
- p2_deep_architecture_mermaid: Mermaid code for the detailed component-level architecture diagram\n\
- p2_deep_flow_mermaid: Mermaid code for the deep interaction flow including edge cases";

/// Generates the four diagrams from the core directive.
pub struct VisualArchitectStep {
    generator: Arc<dyn Generator>,
}

impl VisualArchitectStep {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

/// Generators wrap diagrams in fences anyway sometimes; strip them so the
/// validator and the emitted site see bare Mermaid code.
fn strip_diagram_fences(code: &str) -> &str {
    let mut code = code.trim();
    if let Some(rest) = code.strip_prefix("```mermaid") {
        code = rest.trim_start();
    } else if let Some(rest) = code.strip_prefix("```") {
        code = rest.trim_start();
    }
    if let Some(rest) = code.strip_suffix("```") {
        code = rest.trim_end();
    }
    code
}

#[async_trait]
impl Step for VisualArchitectStep {
    fn name(&self) -> &'static str {
        "visual_architect"
    }

    async fn invoke(&self, state: &DocState) -> Result<StateUpdate> {
        let system = format!(
            "You are the Visual Architect Specialist. Generate exactly 4 valid, complex \
             Mermaid.js diagrams based strictly on the core directive. DO NOT wrap the mermaid \
             code in markdown backticks inside the JSON.\n\n{}",
            FORMAT_INSTRUCTIONS
        );

        let mut user = format!(
            "Core Directive:\n{}",
            state.text(TextField::CoreConceptDirective)
        );
        if let Some(last_batch) = state.defect_log.last() {
            user.push_str(&format!(
                "\n\nPrevious attempts failed with these errors:\n{}\n\nPlease fix your Mermaid syntax.",
                last_batch
            ));
        }

        let request = GenerateRequest::json(system, user);
        let extraction = extract::<VisualDraft>(self.generator.as_ref(), &request).await;
        if extraction.is_degraded() {
            warn!(step = self.name(), "generator reply unusable, writing empty diagrams");
        }
        let draft = extraction.draft;

        Ok(StateUpdate::new()
            .with_text(
                TextField::P1OverviewArchitectureMermaid,
                strip_diagram_fences(&draft.p1_overview_architecture_mermaid),
            )
            .with_text(
                TextField::P1OverviewFlowMermaid,
                strip_diagram_fences(&draft.p1_overview_flow_mermaid),
            )
            .with_text(
                TextField::P2DeepArchitectureMermaid,
                strip_diagram_fences(&draft.p2_deep_architecture_mermaid),
            )
            .with_text(
                TextField::P2DeepFlowMermaid,
                strip_diagram_fences(&draft.p2_deep_flow_mermaid),
            )
            .with_attempt_bump())
    }
}
