//! Markdown writer steps: backend engineering, platform, and governance.
//!
//! Three generator-backed steps with the same shape: a role prompt, the
//! core directive as input, and a fixed set of owned prose fields.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::adapters::{GenerateRequest, Generator};
use crate::core::extract::extract;
use crate::core::state::{DocState, StateUpdate, TextField};

use super::Step;

/// User prompt shared by the writer steps: the framework topic plus the
/// directive the architect produced.
fn directive_prompt(state: &DocState) -> String {
    format!(
        "Framework: {}\nCore Directive:\n{}",
        state.framework_name,
        state.text(TextField::CoreConceptDirective)
    )
}

// ── Backend engineer ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BackendDraft {
    pub p2_data_architecture: String,
    pub p2_interface_spec: String,
    pub p3_coding_standards: String,
    pub p3_error_handling: String,
}

const BACKEND_FORMAT: &str = "Reply with a JSON object containing exactly these string fields:\n\
- p2_data_architecture: markdown description of the data architecture\n\
- p2_interface_spec: markdown interface specification (REST, gRPC, Pub/Sub, ...)\n\
- p3_coding_standards: markdown coding standards (circuit breaker, retry logic, saga, ...)\n\
- p3_error_handling: markdown error handling and exception strategy";

/// Writes the P2 data/interface and P3 design-pattern prose.
pub struct BackendEngineerStep {
    generator: Arc<dyn Generator>,
}

impl BackendEngineerStep {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Step for BackendEngineerStep {
    fn name(&self) -> &'static str {
        "backend_engineer"
    }

    async fn invoke(&self, state: &DocState) -> Result<StateUpdate> {
        let system = format!(
            "You are a Senior Backend Engineer. Write deep, practical markdown content for the \
             data architecture, interface specification, coding standards, and error handling \
             sections, based strictly on the core directive. Output valid JSON.\n\n{}",
            BACKEND_FORMAT
        );
        let request = GenerateRequest::json(system, directive_prompt(state));

        let extraction = extract::<BackendDraft>(self.generator.as_ref(), &request).await;
        if extraction.is_degraded() {
            warn!(step = self.name(), "generator reply unusable, writing empty sections");
        }
        let draft = extraction.draft;

        Ok(StateUpdate::new()
            .with_text(TextField::P2DataArchitecture, draft.p2_data_architecture)
            .with_text(TextField::P2InterfaceSpec, draft.p2_interface_spec)
            .with_text(TextField::P3CodingStandards, draft.p3_coding_standards)
            .with_text(TextField::P3ErrorHandling, draft.p3_error_handling))
    }
}

// ── Infra, security & devops ─────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlatformDraft {
    pub p3_infra_model: String,
    pub p4_security_control: String,
    pub p4_nfr_baseline: String,
    pub p4_observability: String,
    pub p5_deployment_topology: String,
}

const PLATFORM_FORMAT: &str = "Reply with a JSON object containing exactly these string fields:\n\
- p3_infra_model: markdown built-in platform and infrastructure model\n\
- p4_security_control: markdown built-in security control\n\
- p4_nfr_baseline: markdown NFR baseline expectations\n\
- p4_observability: markdown observability architecture\n\
- p5_deployment_topology: markdown deployment topology";

/// Writes the infrastructure, security, NFR, observability, and deployment
/// prose.
pub struct InfraSecurityDevopsStep {
    generator: Arc<dyn Generator>,
}

impl InfraSecurityDevopsStep {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Step for InfraSecurityDevopsStep {
    fn name(&self) -> &'static str {
        "infra_security_devops"
    }

    async fn invoke(&self, state: &DocState) -> Result<StateUpdate> {
        let system = format!(
            "You are a DevOps & Security Lead. Write deep, practical markdown content for the \
             infrastructure, security, observability, and deployment topology sections, based \
             strictly on the core directive. Output valid JSON.\n\n{}",
            PLATFORM_FORMAT
        );
        let request = GenerateRequest::json(system, directive_prompt(state));

        let extraction = extract::<PlatformDraft>(self.generator.as_ref(), &request).await;
        if extraction.is_degraded() {
            warn!(step = self.name(), "generator reply unusable, writing empty sections");
        }
        let draft = extraction.draft;

        Ok(StateUpdate::new()
            .with_text(TextField::P3InfraModel, draft.p3_infra_model)
            .with_text(TextField::P4SecurityControl, draft.p4_security_control)
            .with_text(TextField::P4NfrBaseline, draft.p4_nfr_baseline)
            .with_text(TextField::P4Observability, draft.p4_observability)
            .with_text(TextField::P5DeploymentTopology, draft.p5_deployment_topology))
    }
}

// ── Governance lead ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GovernanceDraft {
    pub p6_risks_and_antipatterns: String,
    pub p6_trade_offs: String,
    pub p7_when_to_use: String,
    pub p7_when_not_to_use: String,
}

const GOVERNANCE_FORMAT: &str = "Reply with a JSON object containing exactly these string fields:\n\
- p6_risks_and_antipatterns: markdown risks and anti-patterns\n\
- p6_trade_offs: markdown trade-offs\n\
- p7_when_to_use: markdown when to use\n\
- p7_when_not_to_use: markdown when NOT to use";

/// Writes the P6 risk/trade-off and P7 decision-guide prose.
pub struct GovernanceLeadStep {
    generator: Arc<dyn Generator>,
}

impl GovernanceLeadStep {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Step for GovernanceLeadStep {
    fn name(&self) -> &'static str {
        "governance_lead"
    }

    async fn invoke(&self, state: &DocState) -> Result<StateUpdate> {
        let system = format!(
            "You are an Enterprise Architecture Governance Lead. Write deep, practical markdown \
             content for the risks, trade-offs, and decision-guide sections, based strictly on \
             the core directive. Output valid JSON.\n\n{}",
            GOVERNANCE_FORMAT
        );
        let request = GenerateRequest::json(system, directive_prompt(state));

        let extraction = extract::<GovernanceDraft>(self.generator.as_ref(), &request).await;
        if extraction.is_degraded() {
            warn!(step = self.name(), "generator reply unusable, writing empty sections");
        }
        let draft = extraction.draft;

        Ok(StateUpdate::new()
            .with_text(TextField::P6RisksAndAntipatterns, draft.p6_risks_and_antipatterns)
            .with_text(TextField::P6TradeOffs, draft.p6_trade_offs)
            .with_text(TextField::P7WhenToUse, draft.p7_when_to_use)
            .with_text(TextField::P7WhenNotToUse, draft.p7_when_not_to_use))
    }
}
