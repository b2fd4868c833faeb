//! Lead architect step: the core directive and the P1 overview prose.

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
pub struct ArchitectDraft {
    pub core_concept_directive: String,
    pub p1_business_purpose: String,
    pub p1_problem_solved: String,
    pub p1_key_characteristics: String,
}

const FORMAT_INSTRUCTIONS: &str = "Reply with a JSON object containing exactly these string fields:\n\
- core_concept_directive: the central architectural directive to guide all other sections\n\
- p1_business_purpose: purpose of this framework\n\
- p1_problem_solved: what problem this solves\n\
- p1_key_characteristics: key characteristics (bullet points)";

/// Produces the core directive every downstream step works from, plus the
/// P1 business-context prose.
pub struct LeadArchitectStep {
    generator: Arc<dyn Generator>,
}

impl LeadArchitectStep {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Step for LeadArchitectStep {
    fn name(&self) -> &'static str {
        "lead_architect"
    }

    async fn invoke(&self, state: &DocState) -> Result<StateUpdate> {
        let system = format!(
            "You are the Lead Solutions Architect. Your job is to define the P1 overview and \
             the core directive for the standard framework. Provide deep, professional markdown \
             for the text fields. Output valid JSON.\n\n{}",
            FORMAT_INSTRUCTIONS
        );

        let mut user = format!("Framework Topic: {}", state.framework_name);
        if !state.framework_description.is_empty() {
            user.push_str("\nUser Requirements:\n");
            user.push_str(&state.framework_description);
        }

        let request = GenerateRequest::json(system, user);
        let extraction = extract::<ArchitectDraft>(self.generator.as_ref(), &request).await;
        if extraction.is_degraded() {
            warn!(step = self.name(), "generator reply unusable, writing empty sections");
        }
        let draft = extraction.draft;

        Ok(StateUpdate::new()
            .with_text(TextField::CoreConceptDirective, draft.core_concept_directive)
            .with_text(TextField::P1BusinessPurpose, draft.p1_business_purpose)
            .with_text(TextField::P1ProblemSolved, draft.p1_problem_solved)
            .with_text(TextField::P1KeyCharacteristics, draft.p1_key_characteristics))
    }
}
