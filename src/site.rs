//! Documentation site emitter.
//!
//! Runs once, after the terminal node: serializes the final state's
//! content fields into the mkdocs page set plus the site configuration
//! file. This is the run's only externally visible side effect besides
//! logging.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::core::state::{DocState, TextField};

/// Write the documentation site into `output_dir`.
///
/// Returns the files written, the site configuration last. Missing content
/// fields render as empty sections; the emitter never fails on absence.
pub fn emit(output_dir: &Path, state: &DocState) -> Result<Vec<PathBuf>> {
    let docs_dir = output_dir.join("docs");
    fs::create_dir_all(&docs_dir)
        .with_context(|| format!("failed to create docs directory: {}", docs_dir.display()))?;

    let mut written = Vec::new();
    for (filename, content) in pages(state) {
        let path = docs_dir.join(filename);
        fs::write(&path, content)
            .with_context(|| format!("failed to write page: {}", path.display()))?;
        written.push(path);
    }

    let config_path = output_dir.join("mkdocs.yml");
    fs::write(&config_path, site_config(&state.framework_name))
        .with_context(|| format!("failed to write site config: {}", config_path.display()))?;
    written.push(config_path);

    info!(files = written.len(), dir = %output_dir.display(), "documentation site emitted");

    Ok(written)
}

/// The page set, mapped section by section from the content fields.
fn pages(state: &DocState) -> Vec<(&'static str, String)> {
    let g = |field: TextField| state.text(field);

    vec![
        (
            "index.md",
            format!(
                "# {}\n\n\
                 ## 1. Business Context\n\n\
                 ### Purpose\n{}\n\n\
                 ### What problem this solves?\n{}\n\n\
                 ### Key characteristics\n{}\n\n\
                 ## 2. Architecture Overview\n\n```mermaid\n{}\n```\n\n\
                 ## 3. Interaction Flow (Happy path)\n\n```mermaid\n{}\n```",
                state.framework_name,
                g(TextField::P1BusinessPurpose),
                g(TextField::P1ProblemSolved),
                g(TextField::P1KeyCharacteristics),
                g(TextField::P1OverviewArchitectureMermaid),
                g(TextField::P1OverviewFlowMermaid),
            ),
        ),
        (
            "p2-architecture.md",
            format!(
                "# P2. Architecture\n\n\
                 ## 1. Architecture Diagram (deep)\n\n```mermaid\n{}\n```\n\n\
                 ## 2. Interaction Flow (deep)\n\n```mermaid\n{}\n```\n\n\
                 ## 3. Data Architecture\n\n{}\n\n\
                 ## 4. Interface Specification\n\n{}",
                g(TextField::P2DeepArchitectureMermaid),
                g(TextField::P2DeepFlowMermaid),
                g(TextField::P2DataArchitecture),
                g(TextField::P2InterfaceSpec),
            ),
        ),
        (
            "p3-design.md",
            format!(
                "# P3. App Design Pattern\n\n\
                 ## 1. Coding Standards\n\n{}\n\n\
                 ## 2. Error Handling & Exception Strategy\n\n{}\n\n\
                 # Platform & Infrastructure\n\n\
                 ## 1. Built-in Infra Model\n\n{}",
                g(TextField::P3CodingStandards),
                g(TextField::P3ErrorHandling),
                g(TextField::P3InfraModel),
            ),
        ),
        (
            "p4-security.md",
            format!(
                "# P4. Security & NFR\n\n\
                 ## 1. Built-in Security Control\n\n{}\n\n\
                 ## 2. NFR Baseline\n\n{}\n\n\
                 ## 3. Observability\n\n{}",
                g(TextField::P4SecurityControl),
                g(TextField::P4NfrBaseline),
                g(TextField::P4Observability),
            ),
        ),
        (
            "p5-deployment.md",
            format!(
                "# P5. Deployment\n\n\
                 ## 1. Deployment Topology\n\n{}",
                g(TextField::P5DeploymentTopology),
            ),
        ),
        (
            "p6-risks.md",
            format!(
                "# P6. Risks & Anti-patterns\n\n\
                 ## 1. Risk & Anti-pattern\n\n{}\n\n\
                 ## 2. Trade-offs\n\n{}",
                g(TextField::P6RisksAndAntipatterns),
                g(TextField::P6TradeOffs),
            ),
        ),
        (
            "p7-decision.md",
            format!(
                "# P7. Decision Guide\n\n\
                 ## 1. When to Use\n\n{}\n\n\
                 ## 2. When NOT to Use\n\n{}",
                g(TextField::P7WhenToUse),
                g(TextField::P7WhenNotToUse),
            ),
        ),
    ]
}

/// The mkdocs configuration: material theme, tab navigation, and mermaid
/// fences rendered by superfences.
fn site_config(framework_name: &str) -> String {
    format!(
        r#"site_name: {} Standard
theme:
  name: material
  features:
    - navigation.tabs
markdown_extensions:
  - pymdownx.superfences:
      custom_fences:
        - name: mermaid
          class: mermaid
          format: !!python/name:pymdownx.superfences.fence_code_format

nav:
  - P1. Overview: index.md
  - P2. Architecture: p2-architecture.md
  - P3. App Design Pattern: p3-design.md
  - P4. Security & NFR: p4-security.md
  - P5. Deployment: p5-deployment.md
  - P6. Risks & Anti-patterns: p6-risks.md
  - P7. Decision Guide: p7-decision.md
"#,
        framework_name
    )
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::core::state::StateUpdate;

    use super::*;

    #[test]
    fn test_emit_writes_all_pages_and_site_config() {
        let temp = TempDir::new().unwrap();
        let state = DocState::new("Event Mesh", "");

        let written = emit(temp.path(), &state).unwrap();

        assert_eq!(written.len(), 8);
        assert!(temp.path().join("docs/index.md").exists());
        assert!(temp.path().join("docs/p7-decision.md").exists());
        assert!(temp.path().join("mkdocs.yml").exists());
    }

    #[test]
    fn test_index_page_carries_topic_and_content() {
        let temp = TempDir::new().unwrap();
        let mut state = DocState::new("Event Mesh", "");
        state.merge(
            StateUpdate::new()
                .with_text(TextField::P1BusinessPurpose, "decouple producers")
                .with_text(TextField::P1OverviewArchitectureMermaid, "graph TD\nA-->B"),
        );

        emit(temp.path(), &state).unwrap();

        let index = fs::read_to_string(temp.path().join("docs/index.md")).unwrap();
        assert!(index.starts_with("# Event Mesh"));
        assert!(index.contains("decouple producers"));
        assert!(index.contains("```mermaid\ngraph TD\nA-->B\n```"));
    }

    #[test]
    fn test_site_config_names_the_site_and_pages() {
        let config = site_config("Event Mesh");

        assert!(config.contains("site_name: Event Mesh Standard"));
        assert!(config.contains("name: material"));
        assert!(config.contains("p5-deployment.md"));
    }

    #[test]
    fn test_missing_fields_render_as_empty_sections() {
        let temp = TempDir::new().unwrap();
        let state = DocState::new("Event Mesh", "");

        emit(temp.path(), &state).unwrap();

        let risks = fs::read_to_string(temp.path().join("docs/p6-risks.md")).unwrap();
        assert!(risks.contains("## 1. Risk & Anti-pattern"));
    }
}
