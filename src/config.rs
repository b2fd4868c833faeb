//! Configuration for standoc.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (GEMINI_API_KEY, STANDOC_MODEL, STANDOC_OUTPUT)
//! 2. Config file (.standoc/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .standoc/config.yaml
//! - Paths in the config file are relative to the config file's project root
//!
//! Settings are resolved once in the entry point and passed explicitly into
//! the components that need them; no step reads the process environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Raw config file schema (matches the YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub mermaid: MermaidConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratorConfig {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetryConfig {
    pub max_diagram_attempts: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MermaidConfig {
    pub binary: Option<String>,
}

/// Resolved generator settings.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    /// API key; its absence is only an error once a generator is built.
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.2,
            max_output_tokens: 8192,
        }
    }
}

/// Resolved retry settings for the validation loop.
#[derive(Debug, Clone)]
pub struct RetrySettings {
    /// Diagram generation attempts before the pipeline accepts degraded
    /// content and moves on.
    pub max_diagram_attempts: u32,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_diagram_attempts: 3,
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub generator: GeneratorSettings,
    pub retry: RetrySettings,
    /// Where the documentation site is emitted.
    pub output_dir: PathBuf,
    /// Override for the mermaid CLI binary.
    pub mermaid_binary: Option<String>,
    /// Path to the config file, if one was found.
    pub config_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            generator: GeneratorSettings::default(),
            retry: RetrySettings::default(),
            output_dir: PathBuf::from("output"),
            mermaid_binary: None,
            config_file: None,
        }
    }
}

impl Settings {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self> {
        let mut settings = Settings::default();

        if let Some(config_path) = find_config_file() {
            let config = load_config_file(&config_path)?;
            let base_dir = config_base_dir(&config_path);
            settings.apply_file(config, &base_dir);
            settings.config_file = Some(config_path);
        }

        settings.apply_env();
        Ok(settings)
    }

    /// Overlay values from a parsed config file.
    fn apply_file(&mut self, config: ConfigFile, base_dir: &Path) {
        if let Some(model) = config.generator.model {
            self.generator.model = model;
        }
        if let Some(temperature) = config.generator.temperature {
            self.generator.temperature = temperature;
        }
        if let Some(max_output_tokens) = config.generator.max_output_tokens {
            self.generator.max_output_tokens = max_output_tokens;
        }
        if let Some(max_attempts) = config.retry.max_diagram_attempts {
            self.retry.max_diagram_attempts = max_attempts;
        }
        if let Some(output_dir) = config.output_dir {
            self.output_dir = resolve_path(base_dir, &output_dir);
        }
        if let Some(binary) = config.mermaid.binary {
            self.mermaid_binary = Some(binary);
        }
    }

    /// Overlay environment variables (highest priority).
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.generator.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("STANDOC_MODEL") {
            self.generator.model = model;
        }
        if let Ok(output) = std::env::var("STANDOC_OUTPUT") {
            self.output_dir = PathBuf::from(output);
        }
    }
}

/// Find the config file by searching the current directory and its parents.
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".standoc").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse a config file.
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Project root for a config file: the parent of its `.standoc/` directory.
fn config_base_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .and_then(|p| p.parent())
        .unwrap_or(Path::new("."))
        .to_path_buf()
}

/// Resolve a path that may be relative to the config file's project root.
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
