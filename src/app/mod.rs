//! Operator binary: probe the network, manage wallets, run reward audits.

pub mod cli;

pub use cli::run_cli;
