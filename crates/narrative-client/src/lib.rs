//! Narrative commentary over a finished ratio analysis.
//!
//! The analysis itself never depends on this crate: a generator only reads the
//! derived years and findings and returns free text.

pub mod error;
pub mod gemini;
pub mod prompt;

pub use error::{NarrativeError, NarrativeResult};
pub use gemini::GeminiNarrator;
pub use prompt::{build_prompt, fallback_narrative};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use statement_core::{AnomalyFinding, AugmentedYear};

/// Configuration for the narrative backend
#[derive(Debug, Clone)]
pub struct NarrativeConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub timeout: Duration,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-pro".to_string(),
            temperature: 0.3,
            timeout: Duration::from_secs(60),
        }
    }
}

impl NarrativeConfig {
    pub fn from_env() -> NarrativeResult<Self> {
        let defaults = Self::default();
        let temperature = match std::env::var("LLM_TEMPERATURE") {
            Ok(raw) => raw.trim().parse::<f64>().map_err(|_| {
                NarrativeError::Config(format!("LLM_TEMPERATURE has invalid value {:?}", raw))
            })?,
            Err(_) => defaults.temperature,
        };

        Ok(Self {
            api_key: std::env::var("GOOGLE_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            model: std::env::var("LLM_MODEL").unwrap_or(defaults.model),
            temperature,
            timeout: defaults.timeout,
        })
    }
}

/// Everything a generator may read about one analysis run.
#[derive(Debug, Clone, Copy)]
pub struct NarrativeRequest<'a> {
    pub symbol: &'a str,
    pub market: Option<&'a str>,
    pub years: &'a [AugmentedYear],
    pub anomalies: &'a [AnomalyFinding],
}

/// Backend-agnostic interface for narrative generation.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn narrate(&self, request: &NarrativeRequest<'_>) -> NarrativeResult<String>;

    fn backend_name(&self) -> &'static str;
}

/// Generator used when no model is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineNarrator;

#[async_trait]
impl NarrativeGenerator for OfflineNarrator {
    async fn narrate(&self, request: &NarrativeRequest<'_>) -> NarrativeResult<String> {
        Ok(fallback_narrative(request))
    }

    fn backend_name(&self) -> &'static str {
        "offline"
    }
}

/// Pick a generator for `config`: Gemini when an API key is set, offline otherwise.
pub fn narrator_from_config(config: &NarrativeConfig) -> NarrativeResult<Arc<dyn NarrativeGenerator>> {
    if config.api_key.is_some() {
        Ok(Arc::new(GeminiNarrator::new(config)?))
    } else {
        tracing::info!("GOOGLE_API_KEY not set, using offline narrative summaries");
        Ok(Arc::new(OfflineNarrator))
    }
}

/// Run `generator`, turning a failure into explanatory text.
pub async fn narrate_or_explain(generator: &dyn NarrativeGenerator, request: &NarrativeRequest<'_>) -> String {
    match generator.narrate(request).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(
                "Narrative generation via {} failed for {}: {}",
                generator.backend_name(),
                request.symbol,
                e
            );
            format!("Narrative generation failed: {}", e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingNarrator;

    #[async_trait]
    impl NarrativeGenerator for FailingNarrator {
        async fn narrate(&self, _request: &NarrativeRequest<'_>) -> NarrativeResult<String> {
            Err(NarrativeError::ServiceUnavailable("Status: 503".to_string()))
        }

        fn backend_name(&self) -> &'static str {
            "failing"
        }
    }

    fn empty_request() -> NarrativeRequest<'static> {
        NarrativeRequest {
            symbol: "ACME",
            market: None,
            years: &[],
            anomalies: &[],
        }
    }

    #[tokio::test]
    async fn test_failure_becomes_text() {
        let text = narrate_or_explain(&FailingNarrator, &empty_request()).await;
        assert_eq!(text, "Narrative generation failed: Service unavailable: Status: 503");
    }

    #[tokio::test]
    async fn test_offline_narrator() {
        let text = narrate_or_explain(&OfflineNarrator, &empty_request()).await;
        assert!(text.starts_with("Analysis for ACME (Global):"));
        assert!(text.contains("- Anomalies detected: 0"));
    }

    #[test]
    fn test_narrator_selection() {
        let offline = narrator_from_config(&NarrativeConfig::default()).unwrap();
        assert_eq!(offline.backend_name(), "offline");

        let gemini = narrator_from_config(&NarrativeConfig {
            api_key: Some("key".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(gemini.backend_name(), "gemini");
    }
}
