//! Shared pipeline state.
//!
//! `DocState` is the single record all nodes read from and write into.
//! Nodes never mutate it directly: each returns a `StateUpdate` and the
//! executor performs the merge.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Content fields of the generated documentation.
///
/// Every field is owned by exactly one step: that step rewrites all of its
/// fields on each invocation. Ownership is an authoring contract, not
/// something the engine enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    /// Central architectural directive that guides every downstream step.
    CoreConceptDirective,

    // P1: overview
    P1BusinessPurpose,
    P1ProblemSolved,
    P1KeyCharacteristics,
    P1OverviewArchitectureMermaid,
    P1OverviewFlowMermaid,

    // P2: deep architecture
    P2DeepArchitectureMermaid,
    P2DeepFlowMermaid,
    P2DataArchitecture,
    P2InterfaceSpec,

    // P3: application design
    P3CodingStandards,
    P3ErrorHandling,
    P3InfraModel,

    // P4: security & NFR
    P4SecurityControl,
    P4NfrBaseline,
    P4Observability,

    // P5-P7: deployment, risks, decision guide
    P5DeploymentTopology,
    P6RisksAndAntipatterns,
    P6TradeOffs,
    P7WhenToUse,
    P7WhenNotToUse,
}

impl TextField {
    /// Snake-case key, matching the JSON key the owning step requests
    /// from the generator.
    pub fn key(&self) -> &'static str {
        match self {
            TextField::CoreConceptDirective => "core_concept_directive",
            TextField::P1BusinessPurpose => "p1_business_purpose",
            TextField::P1ProblemSolved => "p1_problem_solved",
            TextField::P1KeyCharacteristics => "p1_key_characteristics",
            TextField::P1OverviewArchitectureMermaid => "p1_overview_architecture_mermaid",
            TextField::P1OverviewFlowMermaid => "p1_overview_flow_mermaid",
            TextField::P2DeepArchitectureMermaid => "p2_deep_architecture_mermaid",
            TextField::P2DeepFlowMermaid => "p2_deep_flow_mermaid",
            TextField::P2DataArchitecture => "p2_data_architecture",
            TextField::P2InterfaceSpec => "p2_interface_spec",
            TextField::P3CodingStandards => "p3_coding_standards",
            TextField::P3ErrorHandling => "p3_error_handling",
            TextField::P3InfraModel => "p3_infra_model",
            TextField::P4SecurityControl => "p4_security_control",
            TextField::P4NfrBaseline => "p4_nfr_baseline",
            TextField::P4Observability => "p4_observability",
            TextField::P5DeploymentTopology => "p5_deployment_topology",
            TextField::P6RisksAndAntipatterns => "p6_risks_and_antipatterns",
            TextField::P6TradeOffs => "p6_trade_offs",
            TextField::P7WhenToUse => "p7_when_to_use",
            TextField::P7WhenNotToUse => "p7_when_not_to_use",
        }
    }
}

impl std::fmt::Display for TextField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// The four diagram fields the validator checks, with the labels used in
/// defect reports.
pub const DIAGRAM_FIELDS: [(TextField, &str); 4] = [
    (TextField::P1OverviewArchitectureMermaid, "P1 Arch"),
    (TextField::P1OverviewFlowMermaid, "P1 Flow"),
    (TextField::P2DeepArchitectureMermaid, "P2 Arch"),
    (TextField::P2DeepFlowMermaid, "P2 Flow"),
];

/// Shared state for one pipeline run.
///
/// Reads never fail: a text field that has not been written yet reads as
/// `""`, the defect lists as empty, the attempt counter as zero. The state
/// is owned exclusively by the executor for the duration of one run and
/// discarded (or exported into the emitted site) afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocState {
    /// Topic the documentation is generated for. Input, set once at run
    /// start, never overwritten by steps.
    pub framework_name: String,

    /// Optional free-text requirements. Input, same lifecycle as the name.
    pub framework_description: String,

    /// Content fields written so far.
    text: BTreeMap<TextField, String>,

    /// One joined entry per failed validation pass. Append-only: never
    /// cleared, so it doubles as the historical defect log.
    pub defect_log: Vec<String>,

    /// The most recent validation batch. Replaced on every validation
    /// pass; empty means the latest candidate diagrams were accepted.
    pub latest_defects: Vec<String>,

    /// Number of diagram generation attempts so far.
    pub diagram_attempts: u32,
}

impl DocState {
    /// Create the initial state for a run: inputs set, everything else at
    /// its documented default.
    pub fn new(framework_name: impl Into<String>, framework_description: impl Into<String>) -> Self {
        Self {
            framework_name: framework_name.into(),
            framework_description: framework_description.into(),
            text: BTreeMap::new(),
            defect_log: Vec::new(),
            latest_defects: Vec::new(),
            diagram_attempts: 0,
        }
    }

    /// Read a content field. Missing means empty, never an error.
    pub fn text(&self, field: TextField) -> &str {
        self.text.get(&field).map(String::as_str).unwrap_or("")
    }

    /// Merge a partial update into the state.
    ///
    /// Text entries overwrite field-wise. A defect batch replaces
    /// `latest_defects` and, when non-empty, appends one joined entry to
    /// `defect_log`. An attempt bump increments the counter by exactly one.
    pub fn merge(&mut self, update: StateUpdate) {
        for (field, value) in update.text {
            self.text.insert(field, value);
        }

        if let Some(batch) = update.defects {
            if !batch.is_empty() {
                self.defect_log.push(batch.join("\n\n"));
            }
            self.latest_defects = batch;
        }

        if update.bump_attempts {
            self.diagram_attempts += 1;
        }
    }
}

/// A partial state update returned by one step invocation.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    text: BTreeMap<TextField, String>,
    defects: Option<Vec<String>>,
    bump_attempts: bool,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a content field (overwrites on merge).
    pub fn with_text(mut self, field: TextField, value: impl Into<String>) -> Self {
        self.text.insert(field, value.into());
        self
    }

    /// Record the outcome of a validation pass. An empty batch means the
    /// candidate content was accepted.
    pub fn with_defects(mut self, defects: Vec<String>) -> Self {
        self.defects = Some(defects);
        self
    }

    /// Increment the diagram attempt counter on merge.
    pub fn with_attempt_bump(mut self) -> Self {
        self.bump_attempts = true;
        self
    }

    /// Read back a text entry (used by tests and the executor's logging).
    pub fn text(&self, field: TextField) -> Option<&str> {
        self.text.get(&field).map(String::as_str)
    }

    /// The set of content fields this update writes, in stable order.
    /// Steps have a fixed schema: the same step always yields the same set.
    pub fn text_fields(&self) -> Vec<TextField> {
        self.text.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.defects.is_none() && !self.bump_attempts
    }
}
