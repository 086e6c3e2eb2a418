//! Ollama client for LLM text generation (OpenAI-compatible API)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::outbound::{ChatMessage, LlmPort, LlmRequest, LlmResponse, MessageRole};

/// Client for an OpenAI-compatible chat completions endpoint
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Run one chat completion request
    pub async fn chat_completion(&self, request: &LlmRequest) -> Result<LlmResponse, OllamaError> {
        let mut chat = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system_prompt {
            chat.push(ChatMessage::system(system.clone()));
        }
        chat.extend(request.messages.iter().cloned());

        let messages: Vec<ApiMessage> = chat
            .iter()
            .map(|message| ApiMessage {
                role: match message.role {
                    MessageRole::System => "system",
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                },
                content: message.content.clone(),
            })
            .collect();

        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(OllamaError::Api(error_text));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or(OllamaError::EmptyCompletion)?;

        // A blank completion is a failed generation, not a success with an
        // empty story.
        if choice.message.content.trim().is_empty() {
            return Err(OllamaError::EmptyCompletion);
        }

        Ok(LlmResponse {
            content: choice.message.content,
            model: completion.model,
            tokens_used: completion
                .usage
                .map(|usage| usage.total_tokens)
                .unwrap_or(0),
        })
    }

    /// Check if the server is available
    pub async fn health_check(&self) -> Result<bool, OllamaError> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .send()
            .await?;

        Ok(response.status().is_success())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OllamaError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
    #[error("model returned an empty completion")]
    EmptyCompletion,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ApiMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    model: String,
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

#[async_trait]
impl LlmPort for OllamaClient {
    type Error = OllamaError;

    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, OllamaError> {
        self.chat_completion(&request).await
    }
}
