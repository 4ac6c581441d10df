use thiserror::Error;

use crate::cli::CliError;
use crate::client::ClientError;
use crate::config::ConfigError;
use crate::rewards::ReconcileError;
use crate::txn::TxError;
use crate::utils::wait::WaitTimeout;

/// Unified error type for the harness
#[derive(Error, Debug)]
pub enum SystestError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TxError),

    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    #[error("Reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Integrity check failed: {0}")]
    Integrity(String),

    #[error(transparent)]
    Timeout(#[from] WaitTimeout),
}

/// Convenience alias
pub type Result<T> = std::result::Result<T, SystestError>;
