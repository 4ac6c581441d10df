//! HTTP side of the harness: transport, health selection, consensus fan-out
//! and the typed endpoint client built on top.

pub mod api;
pub mod consensus;
pub mod health;
pub mod transport;
pub mod url;

use thiserror::Error;

use crate::model::NodeRole;
use crate::utils::WaitTimeout;

pub use api::{ApiClient, FAUCET_SC_ADDRESS, HTTP_OK, MINER_SC_ADDRESS, STORAGE_SC_ADDRESS};
pub use consensus::{ConsensusClient, NodeFailure};
pub use health::{BlobberAdminAuth, HealthSelector};
pub use transport::{ExecutionRequest, HttpResponse, HttpTransport, Method, Transport};
pub use url::UrlBuilder;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] ::url::ParseError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("decode error: {message}; body: {body}")]
    Decode { message: String, body: String },

    #[error("no consensus among {role}s ({expected} expected vs {not_expected} not): {cause}")]
    Consensus { role: NodeRole, expected: usize, not_expected: usize, cause: String },

    #[error("no healthy {0}s")]
    NoHealthyNodes(NodeRole),

    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("network discovery failed: {0}")]
    Discovery(String),

    #[error("key derivation failed: {0}")]
    Crypto(String),

    #[error("response mismatch: {0}")]
    Mismatch(String),

    #[error(transparent)]
    Timeout(#[from] WaitTimeout),
}
