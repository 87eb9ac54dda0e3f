//! Constants shared across the pipeline
//!
//! Endpoint defaults, timeouts, the fuzzing marker and chat role names.

/// Crate version, reported by `--version` and in the User-Agent header
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default chat completion endpoint
pub const PERPLEXITY_URL: &str = "https://api.perplexity.ai/chat/completions";

/// Default completion model
pub const DEFAULT_MODEL: &str = "sonar-pro";

/// Environment variable holding the API credential
pub const API_KEY_ENV: &str = "PERPLEXITY_API_KEY";

/// Where to obtain an API key, shown when the credential is missing
pub const API_KEY_HELP_URL: &str = "https://www.perplexity.ai/settings/api";

/// Sentinel token ffuf replaces with wordlist entries
pub const FUZZ_MARKER: &str = "FUZZ";

/// Default ffuf executable
pub const DEFAULT_FFUF_PATH: &str = "ffuf";

/// Extension cap bounds
pub const MIN_EXTENSIONS: u8 = 1;
pub const MAX_EXTENSIONS: u8 = 10;
pub const DEFAULT_MAX_EXTENSIONS: u8 = 4;

/// Timeout for the HEAD request against the target, in seconds
pub const HEADER_TIMEOUT_SECS: u64 = 10;

/// Timeout for the completion API call, in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Upper bound for header fetch plus suggestion, in seconds
pub const RUN_TIMEOUT_SECS: u64 = 300;

/// Completion parameters
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Exit status used when ffuf is interrupted by a signal
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Returns the User-Agent sent with every outbound request
pub fn user_agent() -> String {
    format!("ffufai/{}", VERSION)
}

/// Message role constants
pub mod role {
    /// User role identifier
    pub const USER: &str = "user";

    /// System role identifier
    pub const SYSTEM: &str = "system";
}
