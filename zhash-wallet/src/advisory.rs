//! Privacy advisory provider
//!
//! Forwards user questions to an external text-generation backend under a
//! fixed persona. Failures never reach the caller: they are logged and turned
//! into one of two canned replies.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::AdvisorConfig;
use crate::error::{Error, Result};

/// Persona the backend answers under
pub const SYSTEM_INSTRUCTION: &str = "You are 'Zhash AI', an expert in Fully Homomorphic Encryption (FHE) and zero-knowledge privacy. Explain complex blockchain privacy concepts simply. Emphasize how Zama's FHE technology allows computation on encrypted data without ever revealing the underlying amounts.";

/// Reply used when the backend answered without any text
pub const EMPTY_REPLY_FALLBACK: &str = "I'm sorry, I couldn't process that privacy query right now.";

/// Reply used when the backend could not be reached or decoded
pub const OFFLINE_FALLBACK: &str = "The privacy assistant is currently offline. Rest assured, your data remains encrypted via Zama FHE protocol.";

/// External text-generation backend
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a reply to `prompt`. `Ok(None)` means the backend answered
    /// without text content.
    async fn generate(&self, system_instruction: &str, prompt: &str) -> Result<Option<String>>;
}

/// Google Gemini `generateContent` client
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: &AdvisorConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, system_instruction: &str, prompt: &str) -> Result<Option<String>> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = json!({
            "systemInstruction": { "parts": [{ "text": system_instruction }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Advisory(format!(
                "API request failed with status: {}",
                response.status()
            )));
        }

        let data: GenerateContentResponse = response.json().await?;
        Ok(data.text())
    }
}

/// Stand-in backend used when no API key is configured
#[derive(Debug, Default)]
pub struct OfflineGenerator;

#[async_trait]
impl TextGenerator for OfflineGenerator {
    async fn generate(&self, _system_instruction: &str, _prompt: &str) -> Result<Option<String>> {
        Err(Error::Advisory("No API key configured".to_string()))
    }
}

/// Advisory provider
pub struct AdvisoryProvider {
    generator: Arc<dyn TextGenerator>,
}

impl AdvisoryProvider {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Build the provider from configuration, going offline without an API key
    pub fn from_config(config: &AdvisorConfig) -> Result<Self> {
        let generator: Arc<dyn TextGenerator> = match &config.api_key {
            Some(api_key) => Arc::new(GeminiClient::new(config, api_key.clone())?),
            None => {
                tracing::warn!("No advisory API key found, assistant will answer with fallbacks");
                Arc::new(OfflineGenerator)
            }
        };
        Ok(Self::new(generator))
    }

    /// Ask the backend about `query`
    ///
    /// Blank queries are dropped without contacting the backend and yield
    /// `None`. Anything else yields the backend's reply or a fallback.
    pub async fn get_advice(&self, query: &str) -> Option<String> {
        if query.trim().is_empty() {
            return None;
        }

        let reply = match self.generator.generate(SYSTEM_INSTRUCTION, query).await {
            Ok(Some(text)) => text,
            Ok(None) => EMPTY_REPLY_FALLBACK.to_string(),
            Err(e) => {
                tracing::error!("Advisory backend error: {}", e);
                OFFLINE_FALLBACK.to_string()
            }
        };
        Some(reply)
    }
}
