//! CI provider seam.
//!
//! The scanner consumes a CI provider only through [`CiProvider`]. Lookups
//! distinguish absence (`Ok(None)`) from hard failure (`Err`), and the trait is
//! backend-agnostic: `travis-client` implements it over HTTP, and
//! [`MemoryCiProvider`](crate::fakes::MemoryCiProvider) serves tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ProviderError;
use crate::model::{Build, BuildId, Repository};

/// Result type for provider lookups.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Read access to a CI provider's repositories and builds.
#[async_trait]
pub trait CiProvider: Send + Sync {
    /// Look up a repository by slug. `Ok(None)` if the provider does not know it.
    async fn repository(&self, slug: &str) -> ProviderResult<Option<Repository>>;

    /// Fetch a single build with its jobs and their logs. `Ok(None)` if absent.
    async fn build(&self, id: BuildId) -> ProviderResult<Option<Build>>;

    /// List the builds of `repository` that started on or after `cutoff`,
    /// in provider order.
    async fn builds_since(
        &self,
        repository: &Repository,
        cutoff: DateTime<Utc>,
    ) -> ProviderResult<Vec<Build>>;
}
