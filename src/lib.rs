//! Stemcell smoke suite
//!
//! Black-box acceptance checks for a BOSH stemcell, driven entirely through
//! the external bosh CLI: remote commands go over `bosh ssh`, artifacts come
//! back over `bosh scp`, and configuration changes go through `bosh deploy`.

pub mod bosh;
pub mod common;
pub mod matchers;
pub mod poll;
pub mod settings;
pub mod suite;

// Re-export commonly used types for tests
pub use bosh::{BoshCli, InvocationResult};
pub use common::{Error, Result, SuiteConfig};
