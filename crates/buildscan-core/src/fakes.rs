//! In-memory fake CI provider (testing only)
//!
//! `MemoryCiProvider` satisfies the [`CiProvider`] contract from data inserted
//! up front, without any network access. Slugs and build ids can also be
//! marked as failing to exercise the transport-error paths.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ProviderError;
use crate::model::{Build, BuildId, Repository};
use crate::provider::{CiProvider, ProviderResult};

#[derive(Debug, Default)]
struct State {
    repositories: HashMap<String, Repository>,
    builds: Vec<Build>,
    broken_slugs: HashSet<String>,
    broken_builds: HashSet<BuildId>,
    requests: Vec<String>,
}

/// In-memory provider backed by a repository map and an ordered build list.
#[derive(Debug, Default)]
pub struct MemoryCiProvider {
    state: Mutex<State>,
}

impl MemoryCiProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repository under its slug.
    pub fn insert_repository(&self, repository: Repository) {
        let mut state = self.state.lock().unwrap();
        state
            .repositories
            .insert(repository.slug.clone(), repository);
    }

    /// Register a build. Builds are listed back in insertion order.
    pub fn insert_build(&self, build: Build) {
        let mut state = self.state.lock().unwrap();
        state.builds.push(build);
    }

    /// Make every lookup touching `slug` fail with a transport error.
    pub fn break_slug(&self, slug: &str) {
        let mut state = self.state.lock().unwrap();
        state.broken_slugs.insert(slug.to_string());
    }

    /// Make fetching `id` fail with a transport error.
    pub fn break_build(&self, id: BuildId) {
        let mut state = self.state.lock().unwrap();
        state.broken_builds.insert(id);
    }

    /// Requests received so far, e.g. `"repository org/a"` or `"build 12"`.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }
}

fn transport(what: impl std::fmt::Display) -> ProviderError {
    ProviderError::Transport(format!("connection reset while fetching {}", what))
}

#[async_trait]
impl CiProvider for MemoryCiProvider {
    async fn repository(&self, slug: &str) -> ProviderResult<Option<Repository>> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(format!("repository {}", slug));
        if state.broken_slugs.contains(slug) {
            return Err(transport(slug));
        }
        Ok(state.repositories.get(slug).cloned())
    }

    async fn build(&self, id: BuildId) -> ProviderResult<Option<Build>> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(format!("build {}", id));
        if state.broken_builds.contains(&id) {
            return Err(transport(id));
        }
        Ok(state.builds.iter().find(|b| b.id == id).cloned())
    }

    async fn builds_since(
        &self,
        repository: &Repository,
        cutoff: DateTime<Utc>,
    ) -> ProviderResult<Vec<Build>> {
        let mut state = self.state.lock().unwrap();
        state
            .requests
            .push(format!("builds_since {}", repository.slug));
        if state.broken_slugs.contains(&repository.slug) {
            return Err(transport(&repository.slug));
        }
        Ok(state
            .builds
            .iter()
            .filter(|b| b.repository.slug == repository.slug)
            .filter(|b| b.started_at.is_some_and(|started| started >= cutoff))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BuildStatus;
    use chrono::Duration;

    fn build_at(id: u64, slug: &str, started_at: Option<DateTime<Utc>>) -> Build {
        Build {
            id: BuildId(id),
            repository: Repository::new(1, slug, Some(BuildId(id))),
            language: "java".to_string(),
            status: BuildStatus::Passed,
            started_at,
            jobs: vec![],
        }
    }

    #[tokio::test]
    async fn test_unknown_lookups_are_absent() {
        let provider = MemoryCiProvider::new();
        assert!(provider.repository("org/none").await.unwrap().is_none());
        assert!(provider.build(BuildId(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_builds_since_filters_by_repo_and_cutoff() {
        let provider = MemoryCiProvider::new();
        let now = Utc::now();
        let repo = Repository::new(1, "org/a", Some(BuildId(3)));
        provider.insert_build(build_at(1, "org/a", Some(now - Duration::hours(10))));
        provider.insert_build(build_at(2, "org/a", Some(now - Duration::hours(1))));
        provider.insert_build(build_at(3, "org/a", None));
        provider.insert_build(build_at(4, "org/b", Some(now)));
        provider.insert_build(build_at(5, "org/a", Some(now - Duration::hours(2))));

        let builds = provider
            .builds_since(&repo, now - Duration::hours(2))
            .await
            .unwrap();
        let ids: Vec<u64> = builds.iter().map(|b| b.id.0).collect();
        assert_eq!(ids, vec![2, 5]);
    }

    #[tokio::test]
    async fn test_broken_slug_fails_with_transport_error() {
        let provider = MemoryCiProvider::new();
        provider.insert_repository(Repository::new(1, "org/a", None));
        provider.break_slug("org/a");
        let err = provider.repository("org/a").await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
        assert_eq!(provider.requests(), vec!["repository org/a".to_string()]);
    }
}
