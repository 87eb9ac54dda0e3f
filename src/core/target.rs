//! Target URL handling
//!
//! Validates the URL before anything touches the network and collects the
//! response headers the model uses as technology hints.

use crate::core::constants::{FUZZ_MARKER, user_agent};
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Header map sent to the model, ordered by name
pub type HeaderSummary = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("invalid URL format: {0}")]
    Malformed(String),

    #[error("URL must include scheme (http:// or https://)")]
    MissingScheme,

    #[error("URL must include hostname")]
    MissingHost,

    #[error("URL must contain the FUZZ keyword")]
    MissingMarker,

    #[error("executing HEAD request: {0}")]
    Fetch(#[from] reqwest::Error),
}

/// Check that the target has a scheme, a host and the fuzzing marker
///
/// # Errors
///
/// Returns the first failed requirement.
pub fn validate_url(raw: &str) -> Result<Url, TargetError> {
    let url = Url::parse(raw).map_err(|e| match e {
        url::ParseError::RelativeUrlWithoutBase => TargetError::MissingScheme,
        url::ParseError::EmptyHost => TargetError::MissingHost,
        other => TargetError::Malformed(other.to_string()),
    })?;

    if url.scheme().is_empty() {
        return Err(TargetError::MissingScheme);
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(TargetError::MissingHost),
    }

    if !raw.contains(FUZZ_MARKER) {
        return Err(TargetError::MissingMarker);
    }

    Ok(url)
}

/// Whether the marker sits in the last path segment, where ffuf appends
/// extensions
pub fn marker_in_last_segment(url: &Url) -> bool {
    url.path()
        .rsplit('/')
        .next()
        .is_some_and(|segment| segment.contains(FUZZ_MARKER))
}

/// The target with the first marker removed, used for the header probe
pub fn base_url(raw: &str) -> String {
    raw.replacen(FUZZ_MARKER, "", 1)
}

/// Header map used when the probe fails
pub fn placeholder_headers() -> HeaderSummary {
    let mut headers = HeaderSummary::new();
    headers.insert("Header".to_string(), "Error fetching headers".to_string());
    headers
}

/// `content-type` -> `Content-Type`
pub fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Send one HEAD request and summarize the response headers
///
/// Each header maps to its first value. `Status-Code` holds the status
/// line, e.g. `200 OK`.
///
/// # Errors
///
/// Returns `TargetError::Fetch` when the client cannot be built or the
/// request fails or times out.
pub async fn fetch_headers(url: &str, timeout: u64) -> Result<HeaderSummary, TargetError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout))
        .user_agent(user_agent())
        .build()?;

    let response = client.head(url).send().await?;

    let mut headers = HeaderSummary::new();
    for name in response.headers().keys() {
        if let Some(value) = response.headers().get(name) {
            headers.insert(
                canonical_header_name(name.as_str()),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }
    }

    let status = response.status();
    let status_line = match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    };
    headers.insert("Status-Code".to_string(), status_line);

    Ok(headers)
}
