//! LLM (`OpenAI`) API client module
//!
//! Generates the short spoken reply and turns it into MP3 audio.

use std::path::Path;

use async_trait::async_trait;
use openai_api_rs::v1::api::OpenAIClient;
use openai_api_rs::v1::chat_completion::ChatCompletionRequest;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::info;

use super::prompt::build_reply_prompt;
use crate::core::config::AppConfig;
use crate::errors::RelayError;

/// Produces the reply text for a user prompt.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate_reply(&self, user_text: &str) -> Result<String, RelayError>;
}

/// Writes synthesized speech for `text` to `output`.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize_to_file(&self, text: &str, output: &Path) -> Result<(), RelayError>;
}

/// LLM API client for replies and speech
pub struct LlmClient {
    chat: Mutex<OpenAIClient>,
    http: Client,
    api_key: String,
    org_id: Option<String>,
    base_url: String,
    model_name: String,
    system_prompt: String,
    tts_model: String,
    tts_voice: String,
}

impl LlmClient {
    /// # Errors
    ///
    /// Returns an error if the API key is missing or a client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, RelayError> {
        let api_key = config.require_openai_api_key()?.to_string();

        let mut builder = OpenAIClient::builder()
            .with_api_key(api_key.clone())
            .with_endpoint(config.openai_base_url.clone());
        if let Some(org) = &config.openai_org_id {
            builder = builder.with_organization(org.clone());
        }
        let chat = match builder.build() {
            Ok(client) => client,
            Err(e) => {
                return Err(RelayError::OpenAIError(format!(
                    "Failed to create OpenAI client: {e}"
                )));
            }
        };

        let http = Client::builder().build().map_err(|e| {
            RelayError::HttpError(format!("Failed to build OpenAI HTTP client: {e}"))
        })?;

        Ok(Self {
            chat: Mutex::new(chat),
            http,
            api_key,
            org_id: config.openai_org_id.clone(),
            base_url: config.openai_base_url.clone(),
            model_name: config.openai_model.clone(),
            system_prompt: config.system_prompt.clone(),
            tts_model: config.tts_model.clone(),
            tts_voice: config.tts_voice.clone(),
        })
    }

    fn auth_headers(&self) -> Result<HeaderMap, RelayError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", self.api_key)
            .parse()
            .map_err(|e| RelayError::HttpError(format!("Invalid Authorization header: {e}")))?;
        headers.insert("Authorization", auth_value);

        let content_type_value = "application/json"
            .parse()
            .map_err(|e| RelayError::HttpError(format!("Invalid Content-Type header: {e}")))?;
        headers.insert("Content-Type", content_type_value);

        if let Some(org) = &self.org_id {
            let org_value = org.parse().map_err(|e| {
                RelayError::HttpError(format!("Invalid OpenAI-Organization header: {e}"))
            })?;
            headers.insert("OpenAI-Organization", org_value);
        }

        Ok(headers)
    }
}

#[async_trait]
impl ReplyGenerator for LlmClient {
    async fn generate_reply(&self, user_text: &str) -> Result<String, RelayError> {
        let prompt = build_reply_prompt(&self.system_prompt, user_text);

        #[cfg(feature = "debug-logs")]
        info!("Using chat prompt:\n{:?}", prompt);

        let request = ChatCompletionRequest::new(self.model_name.clone(), prompt);

        let result = {
            let mut client = self.chat.lock().await;
            client.chat_completion(request).await?
        };

        let reply = result
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| RelayError::OpenAIError("No text in completion response".to_string()))?;

        info!(model = %self.model_name, chars = reply.chars().count(), "Generated reply");
        Ok(reply)
    }
}

#[async_trait]
impl SpeechSynthesizer for LlmClient {
    async fn synthesize_to_file(&self, text: &str, output: &Path) -> Result<(), RelayError> {
        let request_body = json!({
            "model": self.tts_model,
            "input": text,
            "voice": self.tts_voice,
            "response_format": "mp3"
        });

        let response = self
            .http
            .post(format!("{}/audio/speech", self.base_url))
            .headers(self.auth_headers()?)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| RelayError::HttpError(format!("OpenAI speech request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(RelayError::OpenAIError(format!(
                "OpenAI speech error (status {status}): {error_text}"
            )));
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(RelayError::OpenAIError(
                "OpenAI speech response was empty".to_string(),
            ));
        }

        tokio::fs::write(output, &audio).await?;
        info!(
            bytes = audio.len(),
            voice = %self.tts_voice,
            path = %output.display(),
            "Synthesized speech"
        );
        Ok(())
    }
}
