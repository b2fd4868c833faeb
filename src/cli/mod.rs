//! Command-line interface for standoc.
//!
//! Provides commands for generating a documentation site, checking the
//! environment, and inspecting the resolved configuration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::adapters::{GeminiGenerator, Generator, MermaidCli, SyntaxChecker};
use crate::config::Settings;
use crate::core::{DocState, Executor, Graph};
use crate::site;
use crate::steps;

/// standoc - graph-driven generator for standard framework documentation
#[derive(Parser, Debug)]
#[command(name = "standoc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a documentation site for a framework topic
    Generate {
        /// The standard framework topic, e.g. "High TPS API Service"
        #[arg(short, long)]
        topic: String,

        /// Optional detailed description or requirements for the framework
        #[arg(short, long, default_value = "")]
        description: String,

        /// Output directory (overrides configuration)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that the generator and the mermaid CLI are available
    Doctor,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Generate {
                topic,
                description,
                output,
            } => generate(&topic, &description, output).await,
            Commands::Doctor => doctor().await,
            Commands::Config => show_config(),
        }
    }
}

/// Run the full pipeline and emit the site.
async fn generate(topic: &str, description: &str, output: Option<PathBuf>) -> Result<()> {
    if topic.trim().is_empty() {
        anyhow::bail!("Topic must not be empty");
    }

    let mut settings = Settings::load()?;
    if let Some(output) = output {
        settings.output_dir = output;
    }

    // Configuration failures abort here, before any node executes.
    let generator: Arc<dyn Generator> =
        Arc::new(GeminiGenerator::from_settings(&settings.generator)?);
    let checker: Arc<dyn SyntaxChecker> = Arc::new(match &settings.mermaid_binary {
        Some(binary) => MermaidCli::with_binary_path(binary),
        None => MermaidCli::new(),
    });

    let registry = steps::standard_steps(generator, checker);
    let graph = Graph::standard(settings.retry.max_diagram_attempts);
    let executor = Executor::new(graph, registry)?;

    eprintln!("Starting documentation generation for: '{}'", topic);
    if !description.is_empty() {
        eprintln!("Using description: '{}'", description);
    }

    let report = executor.run(DocState::new(topic, description)).await?;
    let written = site::emit(&settings.output_dir, &report.state)?;

    if !report.state.defect_log.is_empty() {
        eprintln!(
            "[Diagram validation failed {} time(s); the last candidate diagrams were kept]",
            report.state.defect_log.len()
        );
    }
    eprintln!(
        "[Run {} completed: {} files written to {}]",
        report.id,
        written.len(),
        settings.output_dir.display()
    );

    Ok(())
}

/// Probe the external collaborators.
async fn doctor() -> Result<()> {
    let settings = Settings::load()?;
    let mut ready = true;

    match GeminiGenerator::from_settings(&settings.generator) {
        Ok(generator) => match generator.health_check().await {
            Ok(()) => println!("generator: ok (model {})", settings.generator.model),
            Err(e) => {
                ready = false;
                println!("generator: unreachable ({:#})", e);
            }
        },
        Err(e) => {
            ready = false;
            println!("generator: not configured ({:#})", e);
        }
    }

    let checker = match &settings.mermaid_binary {
        Some(binary) => MermaidCli::with_binary_path(binary),
        None => MermaidCli::new(),
    };
    if checker.available().await {
        println!("mermaid: ok");
    } else {
        // Not fatal: a missing mmdc turns into validation defects and the
        // pipeline still finishes.
        println!("mermaid: mmdc not found (diagram validation will report defects)");
    }

    if ready {
        Ok(())
    } else {
        anyhow::bail!("environment is not ready")
    }
}

/// Show the resolved configuration (for debugging)
fn show_config() -> Result<()> {
    let settings = Settings::load()?;

    println!("Config file: {}", match &settings.config_file {
        Some(path) => path.display().to_string(),
        None => "(none - using defaults)".to_string(),
    });
    println!();
    println!("Generator:");
    println!("  Model:             {}", settings.generator.model);
    println!("  Temperature:       {}", settings.generator.temperature);
    println!("  Max output tokens: {}", settings.generator.max_output_tokens);
    println!(
        "  API key:           {}",
        if settings.generator.api_key.is_some() {
            "set"
        } else {
            "not set"
        }
    );
    println!();
    println!("Retry:");
    println!(
        "  Max diagram attempts: {}",
        settings.retry.max_diagram_attempts
    );
    println!();
    println!("Output dir: {}", settings.output_dir.display());
    println!(
        "Mermaid binary: {}",
        settings.mermaid_binary.as_deref().unwrap_or("mmdc (from PATH)")
    );

    Ok(())
}
