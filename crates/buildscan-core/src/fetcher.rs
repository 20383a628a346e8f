//! Build retrieval, by id or by repository and cutoff.

use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use crate::model::{Build, BuildId, Repository};
use crate::provider::CiProvider;

/// Parse `raw_id` as a build id and fetch that build.
///
/// Returns `None`, after logging, when the id does not parse, the build does
/// not exist, or the provider fails.
pub async fn fetch_build(provider: &dyn CiProvider, raw_id: &str) -> Option<Build> {
    let id: BuildId = match raw_id.parse() {
        Ok(id) => id,
        Err(e) => {
            error!(input = %raw_id, error = %e, "cannot read build id from input");
            return None;
        }
    };

    match provider.build(id).await {
        Ok(Some(build)) => Some(build),
        Ok(None) => {
            warn!(build_id = %id, "build cannot be retrieved");
            None
        }
        Err(e) => {
            error!(build_id = %id, error = %e, "build lookup failed");
            None
        }
    }
}

/// List the builds of `repository` started on or after `cutoff`.
///
/// A provider failure is logged and yields no builds for this repository.
pub async fn builds_since(
    provider: &dyn CiProvider,
    repository: &Repository,
    cutoff: DateTime<Utc>,
) -> Vec<Build> {
    match provider.builds_since(repository, cutoff).await {
        Ok(builds) => {
            debug!(slug = %repository.slug, count = builds.len(), "fetched builds since cutoff");
            builds
        }
        Err(e) => {
            error!(slug = %repository.slug, error = %e, "listing builds failed");
            Vec::new()
        }
    }
}
