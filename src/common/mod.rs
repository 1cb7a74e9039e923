//! Common utilities shared across the suite

pub mod config;
pub mod error;
pub mod logging;

pub use config::SuiteConfig;
pub use error::{Error, Result};
