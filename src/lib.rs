//! End-to-end system test harness for a blockchain storage network.
//!
//! Drives a live deployment (miners, sharders, blobbers) through its REST
//! API and the `zwallet`/`zbox` clients, then asserts on what the chain
//! reports.

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod crypto;
pub mod model;
pub mod rewards;
pub mod session;
pub mod txn;
pub mod utils;

pub use context::SystemContext;
pub use utils::errors::{Result, SystestError};

#[cfg(test)]
mod tests;
