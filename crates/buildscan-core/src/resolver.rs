//! Slug to repository resolution.

use tracing::{debug, error, info, warn};

use crate::model::Repository;
use crate::provider::CiProvider;

/// Resolve each slug to a repository with build history, in input order.
///
/// Unknown slugs, repositories that never built, and provider failures are
/// logged and skipped; the remaining slugs are still resolved.
pub async fn resolve_repositories(provider: &dyn CiProvider, slugs: &[String]) -> Vec<Repository> {
    let mut resolved = Vec::new();

    for slug in slugs {
        debug!(slug = %slug, "resolving repository");
        match provider.repository(slug).await {
            Ok(Some(repository)) if repository.has_build_history() => resolved.push(repository),
            Ok(Some(_)) => {
                info!(slug = %slug, "repository has no recorded build, skipping");
            }
            Ok(None) => {
                warn!(slug = %slug, "repository not found, skipping");
            }
            Err(e) => {
                error!(slug = %slug, error = %e, "repository lookup failed, skipping");
            }
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::MemoryCiProvider;
    use crate::model::BuildId;
    use tracing_test::traced_test;

    fn slugs(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    #[traced_test]
    async fn test_skips_unknown_and_buildless_repositories() {
        let provider = MemoryCiProvider::new();
        provider.insert_repository(Repository::new(1, "org/a", Some(BuildId(10))));
        provider.insert_repository(Repository::new(2, "org/never-built", None));
        provider.insert_repository(Repository::new(3, "org/c", Some(BuildId(30))));

        let resolved = resolve_repositories(
            &provider,
            &slugs(&["org/c", "org/missing", "org/never-built", "org/a"]),
        )
        .await;

        let names: Vec<&str> = resolved.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(names, vec!["org/c", "org/a"]);
        assert!(logs_contain("repository not found"));
        assert!(logs_contain("repository has no recorded build"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_provider_failure_does_not_stop_resolution() {
        let provider = MemoryCiProvider::new();
        provider.insert_repository(Repository::new(1, "org/flaky", Some(BuildId(1))));
        provider.insert_repository(Repository::new(2, "org/ok", Some(BuildId(2))));
        provider.break_slug("org/flaky");

        let resolved = resolve_repositories(&provider, &slugs(&["org/flaky", "org/ok"])).await;

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].slug, "org/ok");
        assert!(logs_contain("repository lookup failed"));
    }

    #[tokio::test]
    async fn test_duplicate_slugs_resolve_twice() {
        let provider = MemoryCiProvider::new();
        provider.insert_repository(Repository::new(1, "org/a", Some(BuildId(10))));

        let resolved = resolve_repositories(&provider, &slugs(&["org/a", "org/a"])).await;
        assert_eq!(resolved.len(), 2);
    }
}
