//! ffufai: AI-assisted ffuf wrapper
//!
//! Probes the target, asks a chat completion API which file extensions are
//! likely to exist behind the `FUZZ` marker, and runs ffuf with them.

mod conversion;
mod core;
mod models;
#[cfg(test)]
mod test_support;

use crate::conversion::request_converter::CompletionSettings;
use crate::core::args::{ArgsError, Cli, parse_args};
use crate::core::config::{Config, FileConfig, api_key_from_env, explicit_config_path};
use crate::core::constants::API_KEY_HELP_URL;
use crate::core::logging::init_logging;
use crate::core::provider::Provider;
use crate::core::providers::PerplexityProvider;
use crate::core::runner::{FfufCommand, launch, spawn_signal_listener, suggestion_line};
use crate::core::suggest::{collect_headers, suggest_extensions};
use crate::core::target::{base_url, marker_in_last_segment, validate_url};
use clap::CommandFactory;
use std::process::exit;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() {
    // A missing .env is fine
    dotenv::dotenv().ok();

    let invocation = match parse_args(std::env::args()) {
        Ok(invocation) => invocation,
        Err(e) => {
            match &e {
                // Help and version go to stdout, usage errors to stderr
                ArgsError::Clap(clap_error) => {
                    let _ = clap_error.print();
                }
                ArgsError::MissingUrl => {
                    eprintln!("Error: {}\n", e);
                    eprintln!("{}", Cli::command().render_help());
                }
            }
            exit(e.exit_code());
        }
    };

    let config_path = explicit_config_path(invocation.cli.config.as_deref());
    let file_config = match FileConfig::discover(config_path.as_deref()) {
        Ok(file_config) => file_config,
        Err(e) => {
            eprintln!("Configuration Error: {:#}", e);
            exit(1);
        }
    };

    let config = match Config::resolve(invocation, file_config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration Error: {}", e);
            exit(1);
        }
    };

    init_logging(&config.log_level, config.verbose);

    let target = match validate_url(&config.url) {
        Ok(target) => target,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    };
    if !marker_in_last_segment(&target) {
        warn!(
            "FUZZ keyword is not at the end of the URL path. Extension fuzzing may not work as expected."
        );
    }

    let api_key = match api_key_from_env() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Please set the PERPLEXITY_API_KEY environment variable.");
            eprintln!("Get your API key from: {}", API_KEY_HELP_URL);
            exit(1);
        }
    };

    let provider = match PerplexityProvider::new(
        api_key,
        config.api_url.clone(),
        config.request_timeout,
    ) {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    };

    let extensions = match tokio::time::timeout(
        Duration::from_secs(config.run_timeout),
        suggest(&config, &provider),
    )
    .await
    {
        Ok(Ok(extensions)) => extensions,
        Ok(Err(e)) => {
            eprintln!("Error getting AI extensions: {}", e);
            exit(1);
        }
        Err(_) => {
            eprintln!(
                "Error getting AI extensions: timed out after {}s",
                config.run_timeout
            );
            exit(1);
        }
    };

    println!("{}", suggestion_line(&extensions));

    let command = FfufCommand::new(&config.ffuf_path, &config.ffuf_args, &extensions);
    let cancel = CancellationToken::new();
    let listener = (!config.dry_run).then(|| spawn_signal_listener(cancel.clone()));

    let outcome = launch(&command, config.dry_run, cancel).await;

    if let Some(listener) = listener {
        listener.abort();
    }

    match outcome {
        Ok(_) => debug!("ffufai completed successfully"),
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(e.exit_code());
        }
    }
}

/// Probe the target and ask the provider for extensions
async fn suggest(
    config: &Config,
    provider: &dyn Provider,
) -> Result<Vec<String>, crate::core::suggest::SuggestError> {
    let base = base_url(&config.url);
    debug!("Analyzing target: {}", base);

    let headers = collect_headers(&base, config.header_timeout).await;

    info!("Getting AI suggestions for file extensions...");
    suggest_extensions(
        provider,
        &config.url,
        &headers,
        &CompletionSettings::from(config),
    )
    .await
}
