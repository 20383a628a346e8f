//! Travis-Client: Travis CI v3 API provider for buildscan
//!
//! This crate connects the scanner to Travis CI. It resolves repositories,
//! fetches builds with their jobs, lists a repository's recent builds, and
//! turns job logs into `TestsInformation`.
//!
//! ## Key Components
//!
//! - `TravisClient`: `CiProvider` implementation over `reqwest`
//! - `TravisConfig`: endpoint, token and page size, readable from the environment
//! - `parse_tests_information`: Maven/Surefire summary parser for raw job logs

mod client;
mod config;
mod error;
pub mod log_parser;
pub mod wire;

pub use client::TravisClient;
pub use config::{TravisConfig, DEFAULT_API_URL, DEFAULT_PAGE_SIZE};
pub use error::TravisError;
pub use log_parser::parse_tests_information;

/// Result type for Travis client operations
pub type Result<T> = std::result::Result<T, TravisError>;
