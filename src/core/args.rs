//! Command-line handling
//!
//! ffufai only owns a handful of flags; everything else belongs to ffuf.
//! The raw argument vector is first split into known flags and pass-through
//! arguments, then the known part is parsed with clap.

use crate::core::constants::{MAX_EXTENSIONS, MIN_EXTENSIONS};
use clap::Parser;
use clap::error::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

const AFTER_HELP: &str = "\
Examples:
  ffufai -u https://example.com/FUZZ -w /path/to/wordlist.txt
  ffufai --verbose --max-extensions 6 -u https://example.com/admin/FUZZ -w wordlist.txt -fc 404
  ffufai --dry-run -u https://example.com/api/FUZZ -w wordlist.txt

Environment variables:
  PERPLEXITY_API_KEY    Perplexity AI API key (required)
  FFUFAI_CONFIG         Path to a TOML config file (default: ./ffufai.toml if present)
  RUST_LOG              Overrides the log filter

All arguments not listed above are passed to ffuf unchanged.
Use -- to pass everything after it to ffuf.";

/// Flags owned by ffufai
#[derive(Parser, Debug, Default, Clone, PartialEq)]
#[command(
    name = "ffufai",
    version,
    about = "AI-powered ffuf wrapper that suggests file extensions for the target",
    override_usage = "ffufai [OPTIONS] -u URL [FFUF OPTIONS]",
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// Path to ffuf executable [default: ffuf]
    #[arg(long, value_name = "PATH")]
    pub ffuf_path: Option<String>,

    /// Maximum number of extensions to suggest (1-10) [default: 4]
    #[arg(
        long,
        value_name = "N",
        value_parser = clap::value_parser!(u8).range(MIN_EXTENSIONS as i64..=MAX_EXTENSIONS as i64)
    )]
    pub max_extensions: Option<u8>,

    /// Completion model to use [default: sonar-pro]
    #[arg(long, value_name = "NAME")]
    pub model: Option<String>,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Show what would be executed without running ffuf
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Error)]
pub enum ArgsError {
    #[error(transparent)]
    Clap(#[from] clap::Error),

    #[error("-u URL argument is required")]
    MissingUrl,
}

impl ArgsError {
    /// Help and version output, which clap prints and exits 0 for
    pub fn is_informational(&self) -> bool {
        match self {
            ArgsError::Clap(e) => matches!(
                e.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ),
            ArgsError::MissingUrl => false,
        }
    }

    /// Process exit status to report for this error
    pub fn exit_code(&self) -> i32 {
        if self.is_informational() { 0 } else { 1 }
    }
}

/// Parsed command line
#[derive(Debug, Clone)]
pub struct Invocation {
    pub cli: Cli,
    /// Target URL as given after `-u`
    pub url: String,
    /// Arguments forwarded to ffuf, in their original order
    pub ffuf_args: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagKind {
    Value,
    Switch,
}

/// Name, kind, and whether the single-dash form is ours too
///
/// `-config` is ffuf's own flag, so only `--config` is taken.
const KNOWN_FLAGS: &[(&str, FlagKind, bool)] = &[
    ("ffuf-path", FlagKind::Value, true),
    ("max-extensions", FlagKind::Value, true),
    ("model", FlagKind::Value, true),
    ("config", FlagKind::Value, false),
    ("verbose", FlagKind::Switch, true),
    ("dry-run", FlagKind::Switch, true),
    ("version", FlagKind::Switch, true),
    ("help", FlagKind::Switch, true),
];

/// Result of splitting the raw arguments
#[derive(Debug, Default, PartialEq)]
pub struct SplitArgs {
    /// Known flags rewritten to clap's `--flag` form
    pub known: Vec<String>,
    pub passthrough: Vec<String>,
}

/// Look up a known flag, accepting `-flag`, `--flag` and `--flag=value`
fn lookup_flag(arg: &str) -> Option<(&'static str, FlagKind, Option<&str>)> {
    let (body, double_dash) = match arg.strip_prefix("--") {
        Some(body) => (body, true),
        None => (arg.strip_prefix('-')?, false),
    };

    let (name, inline) = match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    };

    KNOWN_FLAGS
        .iter()
        .find(|(flag, _, single_dash)| *flag == name && (double_dash || *single_dash))
        .map(|(flag, kind, _)| (*flag, *kind, inline))
}

/// Split arguments (without the program name) into known and pass-through
pub fn split_args<I>(args: I) -> SplitArgs
where
    I: IntoIterator<Item = String>,
{
    let mut split = SplitArgs::default();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        if arg == "--" {
            split.passthrough.extend(iter.by_ref());
            break;
        }

        if arg == "-h" {
            split.known.push("--help".to_string());
            continue;
        }

        let Some((name, kind, inline)) = lookup_flag(&arg) else {
            split.passthrough.push(arg);
            continue;
        };

        match (kind, inline) {
            (_, Some(value)) => split.known.push(format!("--{}={}", name, value)),
            (FlagKind::Switch, None) => split.known.push(format!("--{}", name)),
            (FlagKind::Value, None) => {
                split.known.push(format!("--{}", name));
                // A missing value is left for clap to report
                if let Some(value) = iter.next() {
                    split.known.push(value);
                }
            }
        }
    }

    split
}

/// Find the target URL given to ffuf with `-u URL` or `-u=URL`
pub fn find_target_url(ffuf_args: &[String]) -> Option<String> {
    let mut iter = ffuf_args.iter();
    while let Some(arg) = iter.next() {
        if arg == "-u" {
            return iter.next().cloned();
        }
        if let Some(url) = arg.strip_prefix("-u=") {
            return Some(url.to_string());
        }
    }
    None
}

/// Parse a full argument vector, program name first
///
/// # Errors
///
/// Returns `ArgsError::Clap` for invalid known flags (and for help/version
/// requests, which clap reports as errors) and `ArgsError::MissingUrl` when
/// no `-u URL` is present.
pub fn parse_args<I>(args: I) -> Result<Invocation, ArgsError>
where
    I: IntoIterator<Item = String>,
{
    let mut iter = args.into_iter();
    let program = iter.next().unwrap_or_else(|| "ffufai".to_string());

    let split = split_args(iter);
    let cli = Cli::try_parse_from(std::iter::once(program).chain(split.known))?;
    let url = find_target_url(&split.passthrough).ok_or(ArgsError::MissingUrl)?;

    Ok(Invocation {
        cli,
        url,
        ffuf_args: split.passthrough,
    })
}
