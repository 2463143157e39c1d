use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{NarrativeError, NarrativeResult};
use crate::prompt::{build_prompt, SYSTEM_INSTRUCTION};
use crate::{NarrativeConfig, NarrativeGenerator, NarrativeRequest};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, with its parts joined.
    pub fn into_text(self) -> NarrativeResult<String> {
        let text = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(NarrativeError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

/// Narrative writer backed by the Gemini `generateContent` REST API.
#[derive(Clone)]
pub struct GeminiNarrator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f64,
}

impl GeminiNarrator {
    pub fn new(config: &NarrativeConfig) -> NarrativeResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| NarrativeError::Config("GOOGLE_API_KEY not set".to_string()))?;

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    fn request_body(&self, prompt: String) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION.to_string(),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        }
    }
}

#[async_trait]
impl NarrativeGenerator for GeminiNarrator {
    async fn narrate(&self, request: &NarrativeRequest<'_>) -> NarrativeResult<String> {
        let body = self.request_body(build_prompt(request));
        let url = format!("{}/models/{}:generateContent", BASE_URL, self.model);

        tracing::debug!("Requesting narrative for {} from {}", request.symbol, self.model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NarrativeError::ServiceUnavailable(format!(
                "Status: {}",
                response.status()
            )));
        }

        response.json::<GenerateContentResponse>().await?.into_text()
    }

    fn backend_name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> NarrativeConfig {
        NarrativeConfig {
            api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_requires_api_key() {
        let result = GeminiNarrator::new(&NarrativeConfig::default());
        assert!(matches!(result, Err(NarrativeError::Config(_))));
    }

    #[test]
    fn test_request_body_shape() {
        let narrator = GeminiNarrator::new(&config()).unwrap();
        let body = serde_json::to_value(narrator.request_body("hello".to_string())).unwrap();
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], SYSTEM_INSTRUCTION);
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["temperature"], 0.3);
    }

    #[test]
    fn test_response_text_extraction() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Liquidity is thin. "},{"text":"Collections slowed."}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "Liquidity is thin. Collections slowed.");
    }

    #[test]
    fn test_empty_response_is_an_error() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(response.into_text(), Err(NarrativeError::EmptyResponse)));

        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(response.into_text(), Err(NarrativeError::EmptyResponse)));
    }
}
