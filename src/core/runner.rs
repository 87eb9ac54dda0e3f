//! ffuf invocation
//!
//! Builds the ffuf command line, prints it on dry run, or runs ffuf with the
//! terminal's stdio until it exits or an interrupt cancels it.

use crate::core::constants::INTERRUPTED_EXIT_CODE;
use std::borrow::Cow;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ffuf was interrupted")]
    Interrupted,

    #[error("ffuf execution failed: {0}")]
    Failed(ExitStatus),

    #[error("waiting for ffuf: {0}")]
    Wait(#[source] std::io::Error),
}

impl RunnerError {
    /// Process exit status to report for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            RunnerError::Failed(status) => status.code().filter(|code| *code != 0).unwrap_or(1),
            RunnerError::Interrupted => INTERRUPTED_EXIT_CODE,
            RunnerError::Spawn { .. } | RunnerError::Wait(_) => 1,
        }
    }
}

/// What `launch` did
#[derive(Debug, PartialEq, Eq)]
pub enum Launch {
    /// Nothing was spawned; holds the rendered command line
    DryRun(String),
    Completed,
}

/// The ffuf command: executable, forwarded arguments, then `-e <exts>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfufCommand {
    program: String,
    args: Vec<String>,
}

impl FfufCommand {
    pub fn new(program: &str, ffuf_args: &[String], extensions: &[String]) -> Self {
        if ffuf_args.iter().any(|arg| arg == "-e" || arg.starts_with("-e=")) {
            warn!("ffuf arguments already contain -e; the suggested extensions are appended as a second -e");
        }

        let mut args = ffuf_args.to_vec();
        args.push("-e".to_string());
        args.push(extensions.join(","));

        Self {
            program: program.to_string(),
            args,
        }
    }

    /// The command line as it can be pasted into a POSIX shell
    pub fn render(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run ffuf with inherited stdio until it exits or `cancel` fires
    ///
    /// # Errors
    ///
    /// `Spawn` if ffuf cannot be started, `Failed` on a non-zero exit and
    /// `Interrupted` when cancelled.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), RunnerError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        debug!("Spawned {} (pid {:?})", self.program, child.id());

        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(RunnerError::Wait)?;
                if status.success() {
                    Ok(())
                } else if cancel.is_cancelled() {
                    // ffuf got the same SIGINT and exited first
                    Err(RunnerError::Interrupted)
                } else {
                    Err(RunnerError::Failed(status))
                }
            }
            _ = cancel.cancelled() => {
                if let Err(e) = child.kill().await {
                    warn!("Failed to stop ffuf: {}", e);
                }
                Err(RunnerError::Interrupted)
            }
        }
    }
}

/// Result line for the suggestions, e.g. `AI suggested extensions: [.php .bak]`
pub fn suggestion_line(extensions: &[String]) -> String {
    format!("AI suggested extensions: [{}]", extensions.join(" "))
}

/// Print the command line, and run it unless this is a dry run
pub async fn launch(
    command: &FfufCommand,
    dry_run: bool,
    cancel: CancellationToken,
) -> Result<Launch, RunnerError> {
    let line = command.render();

    if dry_run {
        println!("Would execute: {}", line);
        return Ok(Launch::DryRun(line));
    }

    println!("Executing: {}", line);
    command.run(cancel).await?;
    Ok(Launch::Completed)
}

/// Cancel `token` on SIGINT, or SIGTERM on Unix
pub fn spawn_signal_listener(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        eprintln!();
        warn!("Received interrupt signal, stopping ffuf...");
        token.cancel();
    })
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Unable to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            warn!("Unable to listen for SIGTERM: {}", e);
            ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    ctrl_c().await;
}

fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-_./:=,@%+".contains(c)
}

/// Single-quote `arg` when a shell would otherwise split or expand it
pub fn shell_quote(arg: &str) -> Cow<'_, str> {
    if !arg.is_empty() && arg.chars().all(is_shell_safe) {
        Cow::Borrowed(arg)
    } else {
        Cow::Owned(format!("'{}'", arg.replace('\'', r"'\''")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_command_layout() {
        let command = FfufCommand::new(
            "ffuf",
            &strings(&["-u", "https://example.com/FUZZ", "-w", "words.txt"]),
            &strings(&[".php", ".bak"]),
        );

        assert_eq!(command.program, "ffuf");
        assert_eq!(
            command.args,
            strings(&["-u", "https://example.com/FUZZ", "-w", "words.txt", "-e", ".php,.bak"])
        );
        assert_eq!(
            command.render(),
            "ffuf -u https://example.com/FUZZ -w words.txt -e .php,.bak"
        );
    }

    #[test]
    fn test_suggestion_line() {
        assert_eq!(
            suggestion_line(&strings(&[".php", ".bak"])),
            "AI suggested extensions: [.php .bak]"
        );
        assert_eq!(suggestion_line(&strings(&[".js"])), "AI suggested extensions: [.js]");
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("-fc"), "-fc");
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("my words.txt"), "'my words.txt'");
        assert_eq!(
            shell_quote("https://x/FUZZ?a=1&b=2"),
            "'https://x/FUZZ?a=1&b=2'"
        );
        assert_eq!(shell_quote("Cookie: a'b"), r"'Cookie: a'\''b'");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(RunnerError::Interrupted.exit_code(), INTERRUPTED_EXIT_CODE);
        let spawn = RunnerError::Spawn {
            program: "ffuf".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(spawn.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_spawns_nothing() {
        let command = FfufCommand::new(
            "/nonexistent/ffuf",
            &strings(&["-u", "http://x/FUZZ"]),
            &strings(&[".php"]),
        );

        let outcome = launch(&command, true, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Launch::DryRun("/nonexistent/ffuf -u http://x/FUZZ -e .php".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let command = FfufCommand::new("/nonexistent/ffuf", &[], &strings(&[".php"]));
        let err = command.run(CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, RunnerError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_and_failure() {
        let ok = FfufCommand::new("true", &[], &strings(&[".php"]));
        assert!(ok.run(CancellationToken::new()).await.is_ok());

        // `sh -c 'exit 3' -e .php` exits 3, "-e" becomes $0
        let failing = FfufCommand::new("sh", &strings(&["-c", "exit 3"]), &strings(&[".php"]));
        let err = failing.run(CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, RunnerError::Failed(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancellation_kills_child() {
        let command = FfufCommand::new("sh", &strings(&["-c", "exec sleep 30"]), &strings(&[".php"]));
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let result = tokio::time::timeout(Duration::from_secs(10), command.run(token))
            .await
            .expect("cancellation did not stop the child");
        assert!(matches!(result, Err(RunnerError::Interrupted)));
    }
}
