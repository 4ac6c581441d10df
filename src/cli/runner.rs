//! Child-process runner with bounded fixed-delay retry.

use std::path::Path;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::cli::CliError;
use crate::utils::metrics::{CLI_RETRIES, CLI_RUNS};
use crate::utils::METRICS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts: attempts.max(1), delay }
    }

    /// Run exactly once.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// Split captured output into lines, dropping the trailing newline.
pub fn split_lines(raw: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(raw);
    let trimmed = text.trim_end();
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.lines().map(str::to_string).collect()
}

/// Run `program args...`, retrying on non-zero exit. Returns stdout lines.
pub async fn run_command(program: &Path, args: &[String], policy: RetryPolicy) -> Result<Vec<String>, CliError> {
    let command = render(program, args);
    let mut attempt = 0;
    loop {
        attempt += 1;
        METRICS.inc_counter(CLI_RUNS);
        debug!(%command, attempt, "running");

        let out = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| CliError::Spawn { command: command.clone(), source })?;

        if out.status.success() {
            return Ok(split_lines(&out.stdout));
        }

        let stdout = split_lines(&out.stdout);
        let stderr = String::from_utf8_lossy(&out.stderr).trim_end().to_string();
        if attempt >= policy.attempts {
            return Err(CliError::Failed { command, code: out.status.code(), attempts: attempt, stdout, stderr });
        }
        METRICS.inc_counter(CLI_RETRIES);
        warn!(%command, attempt, code = ?out.status.code(), stdout = %stdout.join("\n"), %stderr, "command failed, retrying");
        sleep(policy.delay).await;
    }
}

fn render(program: &Path, args: &[String]) -> String {
    let mut s = program.display().to_string();
    for a in args {
        s.push(' ');
        s.push_str(a);
    }
    s
}
