//! Logging configuration and initialization
//!
//! Sets up the tracing subscriber. Output goes to stderr so that ffuf's
//! results on stdout are not interleaved with diagnostics.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Normalize a configured log level to a tracing filter directive
///
/// Only the first word is considered. Unknown levels fall back to "info";
/// "warning" maps to "warn" and "critical" to "error".
pub fn normalize_level(log_level: &str) -> &'static str {
    let level = log_level
        .split_whitespace()
        .next()
        .unwrap_or("info")
        .to_lowercase();

    match level.as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" | "critical" => "error",
        _ => "info",
    }
}

/// Filter directive applying `level` to this crate only
///
/// Dependencies stay at "warn", or "error" when that is stricter, so
/// verbose mode does not turn on reqwest and hyper internals.
pub fn filter_directive(log_level: &str, verbose: bool) -> String {
    let level = if verbose {
        "debug"
    } else {
        normalize_level(log_level)
    };
    let dependencies = if level == "error" { "error" } else { "warn" };

    format!("{},{}={}", dependencies, env!("CARGO_CRATE_NAME"), level)
}

/// Initialize the logging system
///
/// `RUST_LOG` wins when set. Otherwise verbose mode selects "debug" and
/// the configured level is used as-is, both scoped to this crate.
///
/// # Arguments
///
/// * `log_level` - The configured log level string
/// * `verbose` - Whether `--verbose` was given
pub fn init_logging(log_level: &str, verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(log_level, verbose)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_level() {
        assert_eq!(normalize_level("debug"), "debug");
        assert_eq!(normalize_level("WARNING"), "warn");
        assert_eq!(normalize_level("critical"), "error");
        assert_eq!(normalize_level("info # default"), "info");
        assert_eq!(normalize_level("loud"), "info");
        assert_eq!(normalize_level(""), "info");
    }

    #[test]
    fn test_filter_directive_is_scoped_to_crate() {
        assert_eq!(filter_directive("info", true), "warn,ffufai=debug");
        assert_eq!(filter_directive("trace", false), "warn,ffufai=trace");
        assert_eq!(filter_directive("info", false), "warn,ffufai=info");
        assert_eq!(filter_directive("critical", false), "error,ffufai=error");
        assert!(EnvFilter::try_new(filter_directive("debug", false)).is_ok());
    }
}
