//! Extension suggestion pipeline
//!
//! Header probe, completion call, extraction and sanitization, wired
//! together over a `Provider`.

use crate::conversion::request_converter::{CompletionSettings, build_extension_request};
use crate::conversion::response_converter::{
    ExtractError, extract_extensions, response_content, sanitize_extensions,
};
use crate::core::provider::{Provider, ProviderError};
use crate::core::target::{HeaderSummary, fetch_headers, placeholder_headers};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("No extensions suggested by AI")]
    Empty,
}

/// Probe the target, falling back to the placeholder map on failure
pub async fn collect_headers(base_url: &str, timeout: u64) -> HeaderSummary {
    match fetch_headers(base_url, timeout).await {
        Ok(headers) => {
            debug!("Retrieved {} headers from {}", headers.len(), base_url);
            headers
        }
        Err(e) => {
            warn!("Could not fetch headers from {}: {}", base_url, e);
            placeholder_headers()
        }
    }
}

/// Ask the provider for extensions and return the sanitized, capped list
///
/// # Errors
///
/// Fails on provider errors, on model output without a usable extensions
/// object, and when no suggested item survives sanitization.
pub async fn suggest_extensions(
    provider: &dyn Provider,
    url: &str,
    headers: &HeaderSummary,
    settings: &CompletionSettings,
) -> Result<Vec<String>, SuggestError> {
    let request = build_extension_request(url, headers, settings);

    debug!(
        "Requesting suggestions from {} with model {}",
        provider.provider_name(),
        request.model
    );
    let response = provider.create_chat_completion(&request).await?;

    let content = response_content(&response)?;
    debug!("AI response: {}", content);

    let parsed = extract_extensions(content)?;
    let extensions = sanitize_extensions(&parsed.extensions, settings.max_extensions);

    let rejected: Vec<&String> = parsed
        .extensions
        .iter()
        .filter(|ext| !extensions.contains(*ext))
        .collect();
    if !rejected.is_empty() {
        debug!("Discarded suggestions: {:?}", rejected);
    }

    if extensions.is_empty() {
        return Err(SuggestError::Empty);
    }

    Ok(extensions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::{
        ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns a canned answer and records the request
    struct MockProvider {
        answer: Result<String, u16>,
        seen: Mutex<Vec<ChatCompletionRequest>>,
    }

    impl MockProvider {
        fn answering(content: &str) -> Self {
            Self {
                answer: Ok(content.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                answer: Err(status),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Provider for MockProvider {
        async fn create_chat_completion(
            &self,
            request: &ChatCompletionRequest,
        ) -> Result<ChatCompletionResponse, ProviderError> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.answer {
                Ok(content) => Ok(ChatCompletionResponse {
                    id: "test".to_string(),
                    object: "chat.completion".to_string(),
                    created: 0,
                    model: request.model.clone(),
                    choices: vec![ChatChoice {
                        index: 0,
                        message: ChatMessage {
                            role: "assistant".to_string(),
                            content: content.clone(),
                        },
                        finish_reason: Some("stop".to_string()),
                    }],
                    usage: None,
                }),
                Err(status) => Err(ProviderError::from_status(*status, "boom".to_string())),
            }
        }

        fn provider_name(&self) -> &str {
            "Mock"
        }
    }

    fn settings(max_extensions: usize) -> CompletionSettings {
        CompletionSettings {
            model: "sonar-pro".to_string(),
            max_tokens: 500,
            temperature: 0.1,
            max_extensions,
        }
    }

    #[tokio::test]
    async fn test_suggestions_are_sanitized_and_capped() {
        let provider = MockProvider::answering(
            r#"Here you go: {"extensions": [".php", "html", ".inc", ".php", ".bak", ".old"]}"#,
        );

        let extensions = suggest_extensions(
            &provider,
            "https://example.com/FUZZ",
            &placeholder_headers(),
            &settings(3),
        )
        .await
        .unwrap();

        assert_eq!(extensions, vec![".php", ".inc", ".bak"]);

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].messages[1].content.contains("Error fetching headers"));
    }

    #[tokio::test]
    async fn test_all_invalid_is_empty() {
        let provider = MockProvider::answering(r#"{"extensions": ["php", "../etc"]}"#);
        let err = suggest_extensions(
            &provider,
            "https://example.com/FUZZ",
            &HeaderSummary::new(),
            &settings(4),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SuggestError::Empty));
    }

    #[tokio::test]
    async fn test_missing_json_is_terminal() {
        let provider = MockProvider::answering("Try .php and .asp");
        let err = suggest_extensions(
            &provider,
            "https://example.com/FUZZ",
            &HeaderSummary::new(),
            &settings(4),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SuggestError::Extract(ExtractError::NoJson)));
    }

    #[tokio::test]
    async fn test_provider_error_is_propagated() {
        let provider = MockProvider::failing(429);
        let err = suggest_extensions(
            &provider,
            "https://example.com/FUZZ",
            &HeaderSummary::new(),
            &settings(4),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            SuggestError::Provider(ProviderError::RateLimit(_))
        ));
    }

    #[tokio::test]
    async fn test_collect_headers_falls_back_to_placeholder() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let headers = collect_headers(&format!("http://{}/", addr), 2).await;
        assert_eq!(headers, placeholder_headers());
    }
}
