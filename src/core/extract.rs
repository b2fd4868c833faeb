//! Degrade-gracefully extraction of structured generator output.
//!
//! A step that needs structured content asks the generator for JSON and
//! runs the reply through an ordered ladder of strategies, first success
//! wins. Preferring a degraded-but-complete draft over an error keeps a
//! single flaky reply from aborting the whole multi-step run; only
//! configuration failures abort, and those are raised before any node runs.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::adapters::{GenerateRequest, Generator};

/// Which strategy produced the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// The structured reply parsed as-is.
    Structured,
    /// A second, identical invocation parsed leniently (fences stripped).
    Reparse,
    /// The first top-level braced block scraped out of the raw text.
    Scrape,
    /// Every expected key present, every value empty.
    EmptyDefault,
}

/// Outcome of one extraction: the parsed draft plus the tier that won.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction<T> {
    pub draft: T,
    pub tier: Tier,
}

impl<T> Extraction<T> {
    /// True when every tier with real content failed.
    pub fn is_degraded(&self) -> bool {
        self.tier == Tier::EmptyDefault
    }
}

/// Run the extraction ladder for one draft type.
///
/// Never fails: generator transport errors and malformed output degrade
/// tier by tier down to the empty default, so the caller always receives a
/// draft with its full key set.
pub async fn extract<T>(generator: &dyn Generator, request: &GenerateRequest) -> Extraction<T>
where
    T: DeserializeOwned + Default,
{
    // Tier 1: structured reply, parsed strictly.
    match generator.generate(request).await {
        Ok(raw) => match serde_json::from_str::<T>(raw.trim()) {
            Ok(draft) => {
                return Extraction {
                    draft,
                    tier: Tier::Structured,
                }
            }
            Err(e) => warn!(error = %e, "structured parse failed, re-invoking for raw text"),
        },
        Err(e) => warn!(error = %e, "generator call failed, re-invoking for raw text"),
    }

    // Tier 2: identical invocation, lenient parse of the raw text.
    let raw = match generator.generate(request).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "re-invocation failed, falling back to empty draft");
            return Extraction {
                draft: T::default(),
                tier: Tier::EmptyDefault,
            };
        }
    };
    match serde_json::from_str::<T>(strip_code_fences(&raw)) {
        Ok(draft) => {
            return Extraction {
                draft,
                tier: Tier::Reparse,
            }
        }
        Err(e) => warn!(error = %e, "raw reparse failed, scraping for a JSON object"),
    }

    // Tier 3: first top-level braced block in the raw text.
    if let Some(block) = scrape_object(&raw) {
        if let Ok(draft) = serde_json::from_str::<T>(block) {
            return Extraction {
                draft,
                tier: Tier::Scrape,
            };
        }
    }

    warn!("could not locate valid JSON in response, falling back to empty draft");
    Extraction {
        draft: T::default(),
        tier: Tier::EmptyDefault,
    }
}

/// Strip a wrapping markdown code fence, with or without a language tag.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line ("json", "yaml", ...), if any.
    let body = match rest.split_once('\n') {
        Some((_tag, body)) => body,
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// The outermost braced block: first `{` through last `}`.
fn scrape_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Draft {
        title: String,
        body: String,
    }

    /// Generator returning scripted replies in order.
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

    fn request() -> GenerateRequest {
        GenerateRequest::json("system", "user")
    }

    #[tokio::test]
    async fn test_clean_json_wins_on_structured_tier() {
        let generator = ScriptedGenerator::new(vec![Ok(
            r#"{"title": "t", "body": "b"}"#.to_string()
        )]);

        let extraction: Extraction<Draft> = extract(&generator, &request()).await;

        assert_eq!(extraction.tier, Tier::Structured);
        assert_eq!(extraction.draft.title, "t");
    }

    #[tokio::test]
    async fn test_fenced_json_recovers_on_reparse_tier() {
        let fenced = "```json\n{\"title\": \"t\", \"body\": \"b\"}\n```".to_string();
        let generator = ScriptedGenerator::new(vec![Ok(fenced.clone()), Ok(fenced)]);

        let extraction: Extraction<Draft> = extract(&generator, &request()).await;

        assert_eq!(extraction.tier, Tier::Reparse);
        assert_eq!(extraction.draft.body, "b");
    }

    #[tokio::test]
    async fn test_failed_first_call_recovers_on_reparse_tier() {
        let generator = ScriptedGenerator::new(vec![
            Err(anyhow!("transport error")),
            Ok(r#"{"title": "t", "body": "b"}"#.to_string()),
        ]);

        let extraction: Extraction<Draft> = extract(&generator, &request()).await;

        assert_eq!(extraction.tier, Tier::Reparse);
        assert!(!extraction.is_degraded());
        assert_eq!(extraction.draft, Draft {
            title: "t".to_string(),
            body: "b".to_string(),
        });
    }

    #[tokio::test]
    async fn test_prose_wrapped_json_recovers_on_scrape_tier() {
        let chatty = "Here is the result you asked for:\n{\"title\": \"t\", \"body\": \"b\"}\nHope that helps!";
        let generator = ScriptedGenerator::new(vec![
            Ok(chatty.to_string()),
            Ok(chatty.to_string()),
        ]);

        let extraction: Extraction<Draft> = extract(&generator, &request()).await;

        assert_eq!(extraction.tier, Tier::Scrape);
        assert_eq!(extraction.draft.title, "t");
    }

    #[tokio::test]
    async fn test_garbage_degrades_to_empty_default_with_all_keys() {
        let generator = ScriptedGenerator::new(vec![
            Ok("no json here".to_string()),
            Ok("still no json".to_string()),
        ]);

        let extraction: Extraction<Draft> = extract(&generator, &request()).await;

        assert!(extraction.is_degraded());
        assert_eq!(extraction.draft, Draft::default());
    }

    #[tokio::test]
    async fn test_generator_failing_twice_degrades_to_empty_default() {
        let generator = ScriptedGenerator::new(vec![
            Err(anyhow!("transport error")),
            Err(anyhow!("transport error")),
        ]);

        let extraction: Extraction<Draft> = extract(&generator, &request()).await;

        assert_eq!(extraction.tier, Tier::EmptyDefault);
    }

    #[test]
    fn test_strip_code_fences_variants() {
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_scrape_object_spans_first_to_last_brace() {
        let text = "noise {\"a\": {\"b\": 1}} trailing";
        assert_eq!(scrape_object(text), Some("{\"a\": {\"b\": 1}}"));
        assert_eq!(scrape_object("no braces"), None);
    }
}
