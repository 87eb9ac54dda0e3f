//! Target to chat request conversion
//!
//! Turns the target URL and its header summary into the chat completion
//! request asking the model for likely file extensions.

use crate::core::config::Config;
use crate::core::constants::role;
use crate::core::target::HeaderSummary;
use crate::models::chat::{ChatCompletionRequest, ChatMessage};

const SYSTEM_PROMPT: &str = "You are a cybersecurity expert that suggests file extensions for \
web application fuzzing. You respond only with valid JSON containing an extensions array.";

/// Parameters of the completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_extensions: usize,
}

impl From<&Config> for CompletionSettings {
    fn from(config: &Config) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            max_extensions: config.max_extensions,
        }
    }
}

/// Build the user prompt for a target
pub fn build_prompt(url: &str, headers: &HeaderSummary, max_extensions: usize) -> String {
    // A BTreeMap of strings always serializes
    let headers_json =
        serde_json::to_string_pretty(headers).unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"Given the following URL and HTTP headers, suggest the most likely file extensions for fuzzing this endpoint.
Respond with a JSON object containing a list of extensions. The response is parsed as strict JSON,
so it must be valid JSON. No preamble or explanation. Use the format: {{"extensions": [".ext1", ".ext2", ...]}}.

Guidelines:
- Suggest up to {max} extensions maximum
- Only suggest extensions that make sense for this URL path and these headers
- If the path contains technology indicators (like /js/, /css/, /api/, /admin/), prioritize related extensions
- Consider the Server header, X-Powered-By and other technology indicators
- Prefer commonly exploited file types (backups, configs) if the path suggests admin or config areas
- For generic paths, suggest a mix of web technologies (.php, .html, .js, .txt, .xml, .json)

Examples:
1. URL: https://example.com/presentations/FUZZ
   Headers: {{"Content-Type": "application/pdf", "Server": "Apache"}}
   Response: {{"extensions": [".pdf", ".ppt", ".pptx", ".doc"]}}

2. URL: https://example.com/admin/FUZZ
   Headers: {{"Server": "Microsoft-IIS/10.0", "X-Powered-By": "ASP.NET"}}
   Response: {{"extensions": [".aspx", ".asp", ".config", ".xml"]}}

3. URL: https://example.com/api/FUZZ
   Headers: {{"Content-Type": "application/json", "Server": "nginx"}}
   Response: {{"extensions": [".json", ".xml", ".php", ".py"]}}

URL: {url}
Headers: {headers}

Response:"#,
        max = max_extensions,
        url = url,
        headers = headers_json,
    )
}

/// Convert a target into a chat completion request
///
/// # Arguments
///
/// * `url` - Target URL, marker included
/// * `headers` - Header summary of the target
/// * `settings` - Model and sampling parameters
pub fn build_extension_request(
    url: &str,
    headers: &HeaderSummary,
    settings: &CompletionSettings,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: settings.model.clone(),
        messages: vec![
            ChatMessage {
                role: role::SYSTEM.to_string(),
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: role::USER.to_string(),
                content: build_prompt(url, headers, settings.max_extensions),
            },
        ],
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
    }
}
