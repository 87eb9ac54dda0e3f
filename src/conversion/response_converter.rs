//! Model output to extension list conversion
//!
//! The model answers in free text. The first `{"extensions": [...]}` object
//! found in it is decoded, then every item is checked against a strict
//! pattern.

use crate::models::chat::ChatCompletionResponse;
use crate::models::suggestion::ExtensionsResponse;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    /// Flat JSON object holding an "extensions" array
    static ref EXTENSIONS_JSON: Regex =
        Regex::new(r#"\{[^{}]*"extensions"\s*:\s*\[[^\]]*\][^{}]*\}"#).unwrap();

    /// A dot followed by one or more ASCII alphanumerics
    static ref VALID_EXTENSION: Regex = Regex::new(r"^\.[A-Za-z0-9]+$").unwrap();
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no choices in API response")]
    NoChoices,

    #[error("no valid JSON found in AI response")]
    NoJson,

    #[error("parsing AI response JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Text of the first choice
pub fn response_content(response: &ChatCompletionResponse) -> Result<&str, ExtractError> {
    response.first_content().ok_or(ExtractError::NoChoices)
}

/// Decode the first extensions object embedded in `content`
///
/// # Errors
///
/// `NoJson` when nothing matches, `InvalidJson` when the first match does
/// not decode.
pub fn extract_extensions(content: &str) -> Result<ExtensionsResponse, ExtractError> {
    let matched = EXTENSIONS_JSON
        .find(content)
        .ok_or(ExtractError::NoJson)?;

    Ok(serde_json::from_str(matched.as_str())?)
}

/// Whether `ext` is a single dot followed only by ASCII alphanumerics
pub fn is_valid_extension(ext: &str) -> bool {
    VALID_EXTENSION.is_match(ext)
}

/// Keep valid, first-seen extensions, at most `max` of them
///
/// Invalid items are dropped as they are, never repaired.
pub fn sanitize_extensions<I, S>(extensions: I, max: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut kept: Vec<String> = Vec::new();

    for ext in extensions {
        if kept.len() >= max {
            break;
        }
        let ext = ext.as_ref();
        if is_valid_extension(ext) && !kept.iter().any(|k| k == ext) {
            kept.push(ext.to_string());
        }
    }

    kept
}
