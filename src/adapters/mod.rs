//! Adapter interfaces for external collaborators.
//!
//! The engine reaches the outside world through two narrow interfaces: a
//! content generator (LLM) and a diagram syntax checker. Both are injected
//! into the steps at construction time.

pub mod gemini;
pub mod mermaid;

use anyhow::Result;
use async_trait::async_trait;

// Re-export the concrete adapters
pub use gemini::GeminiGenerator;
pub use mermaid::MermaidCli;

/// One generation request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Role framing and task description, including the expected JSON key
    /// set when `json` is set.
    pub system: String,

    /// Topic-specific input.
    pub user: String,

    /// Ask the generator for a bare JSON object reply.
    pub json: bool,
}

impl GenerateRequest {
    /// Request a structured JSON reply.
    pub fn json(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            json: true,
        }
    }

    /// Request free text.
    pub fn text(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            json: false,
        }
    }
}

/// External content generator.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Human-readable generator name.
    fn name(&self) -> &str;

    /// Produce raw text for the request. Transport failures and malformed
    /// replies are plain errors; the extraction ladder decides how far to
    /// degrade. The engine never retries transport errors on its own.
    async fn generate(&self, request: &GenerateRequest) -> Result<String>;

    /// Cheap availability probe, used by `standoc doctor`.
    async fn health_check(&self) -> Result<()>;
}

/// Syntax check over diagram code.
///
/// `None` means the code is acceptable; `Some` carries the error text that
/// becomes a defect entry. A missing external tool is reported the same
/// way; the check never crashes a run. No timeout is applied, so a hung
/// checker hangs the run (known limitation, kept visible on purpose).
#[async_trait]
pub trait SyntaxChecker: Send + Sync {
    async fn check(&self, code: &str) -> Option<String>;
}
