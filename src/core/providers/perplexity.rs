//! Perplexity provider implementation
//!
//! Perplexity exposes an OpenAI-compatible chat completion endpoint, so any
//! compatible endpoint can be targeted by overriding the URL.

use crate::core::constants::user_agent;
use crate::core::provider::{Provider, ProviderError};
use crate::models::chat::{ChatCompletionRequest, ChatCompletionResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Longest error body echoed back to the user
const MAX_ERROR_DETAIL: usize = 300;

/// Perplexity chat completion provider
pub struct PerplexityProvider {
    client: Client,
    api_key: String,
    api_url: String,
    timeout: u64,
}

impl PerplexityProvider {
    /// Create a new Perplexity provider
    ///
    /// # Arguments
    ///
    /// * `api_key` - Bearer token
    /// * `api_url` - Full chat completion endpoint URL
    /// * `timeout` - Request timeout in seconds
    pub fn new(api_key: String, api_url: String, timeout: u64) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .user_agent(user_agent())
            .build()
            .map_err(|e| ProviderError::Unexpected(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            api_url,
            timeout,
        })
    }

    /// Classify API errors and provide helpful messages
    fn classify_error(error_detail: &str) -> String {
        let error_lower = error_detail.to_lowercase();

        if error_lower.contains("invalid_api_key")
            || error_lower.contains("unauthorized")
            || error_lower.contains("authorization required")
        {
            return "Invalid API key. Please check your PERPLEXITY_API_KEY.".to_string();
        }

        if error_lower.contains("rate_limit") || error_lower.contains("quota") {
            return "Rate limit exceeded. Please wait and try again, or upgrade your API plan."
                .to_string();
        }

        if error_lower.contains("model")
            && (error_lower.contains("invalid")
                || error_lower.contains("not found")
                || error_lower.contains("does not exist"))
        {
            return "Model not found. Please check the --model value.".to_string();
        }

        let detail = error_detail.trim();
        if detail.chars().count() > MAX_ERROR_DETAIL {
            let truncated: String = detail.chars().take(MAX_ERROR_DETAIL).collect();
            format!("{}...", truncated)
        } else {
            detail.to_string()
        }
    }

    fn transport_error(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Unexpected(error.to_string())
        }
    }
}

#[async_trait]
impl Provider for PerplexityProvider {
    async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ProviderError> {
        debug!("POST {} (model {})", self.api_url, request.model);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("API returned {}: {}", status, error_text.trim());

            let message = match status.canonical_reason() {
                Some(reason) if error_text.trim().is_empty() => reason.to_string(),
                _ => Self::classify_error(&error_text),
            };
            return Err(ProviderError::from_status(status.as_u16(), message));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        if let Some(usage) = &completion.usage {
            debug!(
                "Token usage: {} prompt, {} completion, {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        Ok(completion)
    }

    fn provider_name(&self) -> &str {
        "Perplexity"
    }
}
