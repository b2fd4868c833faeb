//! Gemini generator adapter.
//!
//! Non-streaming client for the Google Generative Language API
//! `generateContent` endpoint. One request per step invocation; the
//! extraction ladder owns all recovery, so this client only reports.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::GeneratorSettings;

use super::{GenerateRequest, Generator};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Placeholder value shipped in `.env` templates; treated as unset.
const PLACEHOLDER_KEY: &str = "your_gemini_api_key_here";

/// Google Gemini API client.
pub struct GeminiGenerator {
    http: Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiGenerator {
    /// Build a generator from settings.
    ///
    /// A missing or placeholder API key is a configuration error and
    /// surfaces here, before any node executes.
    pub fn from_settings(settings: &GeneratorSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty() && *key != PLACEHOLDER_KEY)
            .context("GEMINI_API_KEY environment variable is not set correctly")?
            .to_string();

        Ok(Self {
            http: Client::new(),
            api_key,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_output_tokens: settings.max_output_tokens,
        })
    }
}

// ── Wire types ───────────────────────────────────────────────────

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize, Debug)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize, Debug)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize, Debug)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[async_trait]
impl Generator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            API_BASE, self.model, self.api_key
        );

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: request.user.clone(),
                }],
            }],
            system_instruction: Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: request.system.clone(),
                }],
            }),
            generation_config: GenerationConfig {
                max_output_tokens: self.max_output_tokens,
                temperature: self.temperature,
                response_mime_type: request.json.then(|| "application/json".to_string()),
            },
        };

        let response = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Gemini request failed for model '{}'", self.model))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            anyhow::bail!("Gemini returned HTTP {}: {}", status, body);
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .context("Gemini response body is not valid JSON")?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            anyhow::bail!("Gemini returned an empty reply");
        }

        Ok(text)
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!("{}/models/{}?key={}", API_BASE, self.model, self.api_key);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Gemini health check request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Gemini health check failed: HTTP {}", response.status());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_key(key: Option<&str>) -> GeneratorSettings {
        GeneratorSettings {
            api_key: key.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_key_is_a_config_error() {
        assert!(GeminiGenerator::from_settings(&settings_with_key(None)).is_err());
        assert!(GeminiGenerator::from_settings(&settings_with_key(Some(""))).is_err());
    }

    #[test]
    fn test_placeholder_key_is_a_config_error() {
        let result = GeminiGenerator::from_settings(&settings_with_key(Some(PLACEHOLDER_KEY)));
        assert!(result.is_err());
    }

    #[test]
    fn test_valid_key_builds_generator() {
        let generator = GeminiGenerator::from_settings(&settings_with_key(Some("k-123"))).unwrap();
        assert_eq!(generator.name(), "gemini");
        assert_eq!(generator.model, GeneratorSettings::default().model);
    }
}
