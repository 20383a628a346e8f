//! buildscan Core Library
//!
//! Scans a CI provider's build history for builds that fail because of
//! failing tests in a target language.
//!
//! ## Key Components
//!
//! - `CiProvider`: async seam over the CI provider (Travis, or the in-memory fake)
//! - `load_lines`: line-delimited input loading
//! - `resolve_repositories` / `fetch_build` / `builds_since`: provider lookups
//!   that turn "not found" into a logged skip
//! - `classify`: the failure-signature decision
//! - `ScanSession`: runs one scan and owns its counters and dedup sets

pub mod classifier;
pub mod config;
pub mod error;
pub mod fakes;
pub mod fetcher;
pub mod input;
pub mod model;
pub mod obs;
pub mod provider;
pub mod resolver;
pub mod session;
pub mod telemetry;

pub use classifier::{classify, Verdict};
pub use config::ScanConfig;
pub use error::{ProviderError, Result, ScanError};
pub use fetcher::{builds_since, fetch_build};
pub use input::load_lines;
pub use model::{Build, BuildId, BuildStatus, Job, JobId, Log, Repository, TestsInformation};
pub use obs::{emit_build_qualified, emit_scan_finished, emit_scan_started, scan_span};
pub use provider::{CiProvider, ProviderResult};
pub use resolver::resolve_repositories;
pub use session::{ScanCounters, ScanSession, ScanSummary, Workflow};
pub use telemetry::init_tracing;
