//! Extraction Fallback Integration Tests
//!
//! The degrade-gracefully ladder observed through a real generator-backed
//! step: a flaky or garbage-producing generator must never abort the run,
//! and the step's partial update must always carry its full key set.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use standoc::adapters::{GenerateRequest, Generator};
use standoc::core::{DocState, TextField};
use standoc::steps::{LeadArchitectStep, Step, VisualArchitectStep};

/// Generator answering with scripted replies, then erroring.
struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String>>>,
}

impl ScriptedGenerator {
    fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
        }
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _request: &GenerateRequest) -> Result<String> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("script exhausted")))
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

fn architect_json() -> String {
    r#"{
        "core_concept_directive": "partitioned log",
        "p1_business_purpose": "decouple services",
        "p1_problem_solved": "fan-out at scale",
        "p1_key_characteristics": "- append-only"
    }"#
    .to_string()
}

#[tokio::test]
async fn test_failed_first_call_recovers_via_reparse() {
    let generator = Arc::new(ScriptedGenerator::new(vec![
        Err(anyhow!("connection reset")),
        Ok(architect_json()),
    ]));
    let step = LeadArchitectStep::new(generator);

    let update = step.invoke(&DocState::new("Event Mesh", "")).await.unwrap();

    // Structurally complete and non-empty.
    assert_eq!(update.text_fields().len(), 4);
    assert_eq!(
        update.text(TextField::CoreConceptDirective),
        Some("partitioned log")
    );
}

#[tokio::test]
async fn test_fenced_reply_recovers_via_reparse() {
    let fenced = format!("```json\n{}\n```", architect_json());
    let generator = Arc::new(ScriptedGenerator::new(vec![
        Ok(fenced.clone()),
        Ok(fenced),
    ]));
    let step = LeadArchitectStep::new(generator);

    let update = step.invoke(&DocState::new("Event Mesh", "")).await.unwrap();

    assert_eq!(
        update.text(TextField::P1BusinessPurpose),
        Some("decouple services")
    );
}

#[tokio::test]
async fn test_prose_wrapped_reply_recovers_via_scrape() {
    let chatty = format!("Sure! Here is the JSON you wanted:\n\n{}\n\nAnything else?", architect_json());
    let generator = Arc::new(ScriptedGenerator::new(vec![
        Ok(chatty.clone()),
        Ok(chatty),
    ]));
    let step = LeadArchitectStep::new(generator);

    let update = step.invoke(&DocState::new("Event Mesh", "")).await.unwrap();

    assert_eq!(
        update.text(TextField::P1ProblemSolved),
        Some("fan-out at scale")
    );
}

#[tokio::test]
async fn test_unusable_generator_yields_complete_empty_update() {
    let generator = Arc::new(ScriptedGenerator::new(vec![
        Ok("<<<not json at all>>>".to_string()),
        Ok("<<<still not json>>>".to_string()),
    ]));
    let step = LeadArchitectStep::new(generator);

    let update = step.invoke(&DocState::new("Event Mesh", "")).await.unwrap();

    // Every expected key present, values empty, never a missing key.
    assert_eq!(update.text_fields().len(), 4);
    for field in update.text_fields() {
        assert_eq!(update.text(field), Some(""));
    }
}

#[tokio::test]
async fn test_dead_generator_still_bumps_the_attempt_counter() {
    // Even a fully degraded visual step must keep the retry loop moving:
    // the attempt counter is what guarantees termination.
    let generator = Arc::new(ScriptedGenerator::new(vec![
        Err(anyhow!("down")),
        Err(anyhow!("down")),
    ]));
    let step = VisualArchitectStep::new(generator);

    let mut state = DocState::new("Event Mesh", "");
    let update = step.invoke(&state).await.unwrap();
    state.merge(update);

    assert_eq!(state.diagram_attempts, 1);
    assert_eq!(state.text(TextField::P1OverviewFlowMermaid), "");
}

#[tokio::test]
async fn test_partial_reply_fills_missing_keys_with_defaults() {
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(
        r#"{"core_concept_directive": "only this"}"#.to_string(),
    )]));
    let step = LeadArchitectStep::new(generator);

    let update = step.invoke(&DocState::new("Event Mesh", "")).await.unwrap();

    assert_eq!(update.text(TextField::CoreConceptDirective), Some("only this"));
    assert_eq!(update.text(TextField::P1KeyCharacteristics), Some(""));
}
