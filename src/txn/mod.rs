//! Transaction building, signing, submission and confirmation.

pub mod builder;
pub mod submit;

use thiserror::Error;

use crate::client::ClientError;
use crate::model::TxStatus;
use crate::utils::WaitTimeout;

pub use builder::{transaction_hash, Built, Hashed, Signed, Transaction};
pub use submit::TransactionHelper;

#[derive(Debug, Error)]
pub enum TxError {
    #[error("encoding transaction data: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("transaction {hash} confirmed with status {actual}, expected {expected:?}; output: {output}")]
    UnexpectedStatus { hash: String, expected: TxStatus, actual: i32, output: String },

    #[error("transaction {hash} not confirmed: {source}")]
    ConfirmationTimeout {
        hash: String,
        #[source]
        source: WaitTimeout,
    },
}
