//! Crate-level tests.
//!
//! - Integration: full flows against wiremock nodes
//! - Fuzz: parsers and decoders fed garbage must not panic
//! - Scenarios: live network suites, `#[ignore]`d unless a deployment is configured

pub mod fuzz;
pub mod integration;
pub mod scenarios;
