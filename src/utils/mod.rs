//! Utility module: errors, logging, metrics, polling, token units and serde helpers.

pub mod errors;
pub mod logging;
pub mod metrics;
pub mod serde_helpers;
pub mod tokenomics;
pub mod wait;

pub use errors::{Result, SystestError};
pub use logging::{init_logging, init_test_logging};
pub use metrics::{MetricsRegistry, METRICS};
pub use wait::{poll_until, wait_until, PollPolicy, WaitTimeout};
