//! Mermaid syntax checker.
//!
//! Shells out to the Mermaid CLI (`mmdc`): the candidate diagram is written
//! to a temporary `.mmd` file and compiled to SVG. A non-zero exit, or a
//! missing binary, becomes error text for the validator to report as a
//! defect, never a crash.

use std::io::Write;

use async_trait::async_trait;
use tokio::process::Command;

use super::SyntaxChecker;

/// Mermaid CLI wrapper.
pub struct MermaidCli {
    /// Path to the mmdc binary (default: "mmdc")
    binary_path: String,
}

impl Default for MermaidCli {
    fn default() -> Self {
        Self::new()
    }
}

impl MermaidCli {
    /// Use `mmdc` from the PATH.
    pub fn new() -> Self {
        Self {
            binary_path: "mmdc".to_string(),
        }
    }

    /// Use a custom mmdc binary.
    pub fn with_binary_path(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Availability probe used by `standoc doctor`.
    pub async fn available(&self) -> bool {
        Command::new(&self.binary_path)
            .arg("--version")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

/// Strip a wrapping ```mermaid / ``` fence, if present.
fn strip_mermaid_fences(code: &str) -> &str {
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
impl SyntaxChecker for MermaidCli {
    async fn check(&self, code: &str) -> Option<String> {
        let code = strip_mermaid_fences(code);
        if code.is_empty() {
            return Some("Mermaid code is empty.".to_string());
        }

        let mut input = match tempfile::Builder::new().suffix(".mmd").tempfile() {
            Ok(file) => file,
            Err(e) => return Some(format!("Unexpected error during validation: {}", e)),
        };
        if let Err(e) = input.write_all(code.as_bytes()) {
            return Some(format!("Unexpected error during validation: {}", e));
        }

        let input_path = input.path().to_path_buf();
        let output_path = input_path.with_extension("mmd.svg");

        let result = Command::new(&self.binary_path)
            .arg("-i")
            .arg(&input_path)
            .arg("-o")
            .arg(&output_path)
            .output()
            .await;

        let verdict = match result {
            Ok(output) if output.status.success() => None,
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let stdout = String::from_utf8_lossy(&output.stdout);
                Some(format!(
                    "Mermaid CLI Error:\n{}\nOutput:\n{}",
                    stderr.trim(),
                    stdout.trim()
                ))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Some(format!(
                "Error: '{}' command not found. Ensure @mermaid-js/mermaid-cli is installed.",
                self.binary_path
            )),
            Err(e) => Some(format!("Unexpected error during validation: {}", e)),
        };

        // The input file drops with the handle; the rendered SVG does not.
        let _ = std::fs::remove_file(&output_path);

        verdict
    }
}
