use crate::actors::messages::AppError;
use crate::actors::traits::Completer;
use crate::config::{LlmProvider, QuestConfig};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

// --- Constants ---
pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const OLLAMA_API_BASE: &str = "http://localhost:11434";
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(30);

// --- Wire types ---
#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

// OpenAI-compatible request/response (OpenRouter, llama.cpp server, local GPT)
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

// Ollama /api/chat
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: ChatMessageResponse,
}

/// Builds an HTTP client whose every request is bounded by `timeout`.
pub fn http_client(timeout: Duration) -> Result<Client, AppError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Turns a non-2xx response into `BackendUnavailable`, keeping status and body.
async fn ensure_success(res: reqwest::Response, what: &str) -> Result<reqwest::Response, AppError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(AppError::BackendUnavailable(format!(
        "{} request failed with status {}: {}",
        what, status, body
    )))
}

/// Chat-completions client for any OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct OpenAiCompatibleCompleter {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    default_model: String,
}

impl OpenAiCompatibleCompleter {
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. `https://openrouter.ai/api/v1`.
    /// * `api_key` - Sent as a bearer token when present.
    /// * `model` - Model used when a call does not name one.
    /// * `timeout` - Upper bound for each HTTP request.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()),
            default_model: model.into(),
        })
    }

    fn build_request(&self, endpoint: &str) -> Result<reqwest::RequestBuilder, AppError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.api_key {
            let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| AppError::Config(format!("Invalid API key: {}", e)))?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        Ok(self
            .client
            .post(format!("{}/{}", self.base_url, endpoint))
            .headers(headers))
    }
}

#[async_trait]
impl Completer for OpenAiCompatibleCompleter {
    async fn complete(
        &self,
        system_prompt: String,
        user_prompt: String,
        model: Option<String>,
        temperature: Option<f32>,
    ) -> Result<String, AppError> {
        let model = model.unwrap_or_else(|| self.default_model.clone());
        debug!("Chat completion with model {}", model);

        let payload = ChatRequest {
            model: &model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: &system_prompt,
                },
                WireMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            temperature,
        };

        let res = self.build_request("chat/completions")?.json(&payload).send().await?;
        let res = ensure_success(res, "Completion").await?;

        let body: ChatResponse = res
            .json()
            .await
            .map_err(|e| AppError::BackendUnavailable(format!("Malformed completion response: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AppError::BackendUnavailable("Completion response had no choices".to_string()))
    }
}

/// Chat client for a local Ollama server.
#[derive(Clone)]
pub struct OllamaCompleter {
    client: Client,
    base_url: String,
    default_model: String,
}

impl OllamaCompleter {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_model: model.into(),
        })
    }
}

#[async_trait]
impl Completer for OllamaCompleter {
    async fn complete(
        &self,
        system_prompt: String,
        user_prompt: String,
        model: Option<String>,
        temperature: Option<f32>,
    ) -> Result<String, AppError> {
        let model = model.unwrap_or_else(|| self.default_model.clone());
        info!("Ollama chat with model {}", model);

        let payload = OllamaChatRequest {
            model: &model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: &system_prompt,
                },
                WireMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            stream: false,
            options: temperature.map(|temperature| OllamaOptions { temperature }),
        };

        let res = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&payload)
            .send()
            .await?;
        let res = ensure_success(res, "Ollama chat").await?;

        let body: OllamaChatResponse = res
            .json()
            .await
            .map_err(|e| AppError::BackendUnavailable(format!("Malformed Ollama response: {}", e)))?;

        body.message
            .content
            .ok_or_else(|| AppError::BackendUnavailable("Ollama response had no content".to_string()))
    }
}

/// Builds the configured completion backend.
pub fn completer_from_config(config: &QuestConfig) -> Result<Arc<dyn Completer>, AppError> {
    match config.llm_provider {
        LlmProvider::Ollama => Ok(Arc::new(OllamaCompleter::new(
            config.llm_base_url.clone(),
            config.model.model_id.clone(),
            config.backend_timeout,
        )?)),
        LlmProvider::OpenAi => {
            if config.llm_api_key.is_none() {
                warn!("No API key configured for {}", config.llm_base_url);
            }
            Ok(Arc::new(OpenAiCompatibleCompleter::new(
                config.llm_base_url.clone(),
                config.llm_api_key.clone(),
                config.model.model_id.clone(),
                config.backend_timeout,
            )?))
        }
    }
}
