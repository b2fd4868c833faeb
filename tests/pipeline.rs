//! Full Pipeline Integration Tests
//!
//! The production step roster wired to fakes for both collaborators: one
//! run from the initial state through the graph to the emitted site.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use standoc::adapters::{GenerateRequest, Generator, SyntaxChecker};
use standoc::core::{DocState, Executor, Graph, TextField};
use standoc::site;
use standoc::steps::standard_steps;

/// Generator that answers every request with the same JSON object carrying
/// every content field; each step parses out the subset it owns.
struct OmniGenerator;

#[async_trait]
impl Generator for OmniGenerator {
    fn name(&self) -> &str {
        "omni"
    }

    async fn generate(&self, _request: &GenerateRequest) -> Result<String> {
        Ok(serde_json::json!({
            "core_concept_directive": "single-writer partitioned log",
            "p1_business_purpose": "decouple producers from consumers",
            "p1_problem_solved": "synchronous fan-out collapses under load",
            "p1_key_characteristics": "- append-only\n- replayable",
            "p1_overview_architecture_mermaid": "graph TD\nProducer-->Broker",
            "p1_overview_flow_mermaid": "sequenceDiagram\nP->>B: publish",
            "p2_deep_architecture_mermaid": "graph LR\nBroker-->Partition",
            "p2_deep_flow_mermaid": "graph TD\nRetry-->DLQ",
            "p2_data_architecture": "events are the source of truth",
            "p2_interface_spec": "publish/subscribe over gRPC",
            "p3_coding_standards": "retry with jitter",
            "p3_error_handling": "dead-letter after N attempts",
            "p3_infra_model": "stateless workers",
            "p4_security_control": "mTLS everywhere",
            "p4_nfr_baseline": "p99 under 50ms",
            "p4_observability": "traces per event",
            "p5_deployment_topology": "three availability zones",
            "p6_risks_and_antipatterns": "distributed monolith",
            "p6_trade_offs": "latency for durability",
            "p7_when_to_use": "high fan-out domains",
            "p7_when_not_to_use": "simple CRUD"
        })
        .to_string())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

struct AcceptAll;

#[async_trait]
impl SyntaxChecker for AcceptAll {
    async fn check(&self, _code: &str) -> Option<String> {
        None
    }
}

struct RejectAll;

#[async_trait]
impl SyntaxChecker for RejectAll {
    async fn check(&self, _code: &str) -> Option<String> {
        Some("unexpected token".to_string())
    }
}

fn executor(checker: Arc<dyn SyntaxChecker>) -> Executor {
    let registry = standard_steps(Arc::new(OmniGenerator), checker);
    Executor::new(Graph::standard(3), registry).unwrap()
}

#[tokio::test]
async fn test_happy_path_fills_every_content_field() {
    let executor = executor(Arc::new(AcceptAll));

    let report = executor
        .run(DocState::new("Event Mesh", "brokered event backbone"))
        .await
        .unwrap();

    assert_eq!(report.state.diagram_attempts, 1);
    assert!(report.state.defect_log.is_empty());
    assert_eq!(
        report.state.text(TextField::CoreConceptDirective),
        "single-writer partitioned log"
    );
    assert_eq!(
        report.state.text(TextField::P7WhenNotToUse),
        "simple CRUD"
    );
    assert_eq!(
        report.state.text(TextField::P1OverviewArchitectureMermaid),
        "graph TD\nProducer-->Broker"
    );
}

#[tokio::test]
async fn test_happy_path_emits_the_full_site() {
    let temp = tempfile::TempDir::new().unwrap();
    let executor = executor(Arc::new(AcceptAll));

    let report = executor.run(DocState::new("Event Mesh", "")).await.unwrap();
    let written = site::emit(temp.path(), &report.state).unwrap();

    assert_eq!(written.len(), 8);

    let index = std::fs::read_to_string(temp.path().join("docs/index.md")).unwrap();
    assert!(index.starts_with("# Event Mesh"));
    assert!(index.contains("decouple producers from consumers"));

    let p2 = std::fs::read_to_string(temp.path().join("docs/p2-architecture.md")).unwrap();
    assert!(p2.contains("events are the source of truth"));

    let config = std::fs::read_to_string(temp.path().join("mkdocs.yml")).unwrap();
    assert!(config.contains("site_name: Event Mesh Standard"));
}

#[tokio::test]
async fn test_rejected_diagrams_cap_out_and_still_ship() {
    let temp = tempfile::TempDir::new().unwrap();
    let executor = executor(Arc::new(RejectAll));

    let report = executor.run(DocState::new("Event Mesh", "")).await.unwrap();

    // Cap reached, one batch per failed pass, run still completed.
    assert_eq!(report.state.diagram_attempts, 3);
    assert_eq!(report.state.defect_log.len(), 3);
    assert!(report
        .state
        .defect_log
        .iter()
        .all(|batch| batch.contains("unexpected token")));

    // The last candidate diagrams are kept and emitted.
    let written = site::emit(temp.path(), &report.state).unwrap();
    assert_eq!(written.len(), 8);
    let index = std::fs::read_to_string(temp.path().join("docs/index.md")).unwrap();
    assert!(index.contains("graph TD\nProducer-->Broker"));
}

#[tokio::test]
async fn test_downstream_prose_survives_diagram_defects() {
    let executor = executor(Arc::new(RejectAll));

    let report = executor.run(DocState::new("Event Mesh", "")).await.unwrap();

    assert_eq!(
        report.state.text(TextField::P5DeploymentTopology),
        "three availability zones"
    );
    assert_eq!(
        report.state.text(TextField::P6TradeOffs),
        "latency for durability"
    );
}
