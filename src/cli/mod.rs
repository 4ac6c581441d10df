//! Wrapper around the `zwallet` and `zbox` command-line clients.

pub mod commands;
pub mod output;
pub mod params;
pub mod runner;

use thiserror::Error;

pub use commands::{allocation_id_from_output, CliNode, CliProfile, CliWallet, ZBOX, ZWALLET};
pub use output::{key_value_pairs_to_map, key_value_settings_to_map, SettingMaps};
pub use params::Params;
pub use runner::{run_command, RetryPolicy};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {code:?} after {attempts} attempt(s)\nstdout:\n{}\nstderr:\n{stderr}", stdout.join("\n"))]
    Failed { command: String, code: Option<i32>, attempts: u32, stdout: Vec<String>, stderr: String },

    #[error("unreadable {what} output: {message}\n{}", output.join("\n"))]
    Parse { what: &'static str, message: String, output: Vec<String> },
}

impl CliError {
    /// Captured stdout lines, for asserting on CLI error messages.
    pub fn output(&self) -> &[String] {
        match self {
            CliError::Failed { stdout, .. } | CliError::Parse { output: stdout, .. } => stdout,
            CliError::Spawn { .. } => &[],
        }
    }
}
