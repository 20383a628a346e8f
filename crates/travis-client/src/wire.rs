//! Travis API v3 representations and their conversion to scanner entities.

use buildscan_core::{Build, BuildId, BuildStatus, Job, JobId, Log, Repository};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Language Travis assumes when a build configuration names none.
pub const DEFAULT_LANGUAGE: &str = "ruby";

#[derive(Debug, Clone, Deserialize)]
pub struct MinimalBuild {
    pub id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MinimalRepository {
    pub id: u64,
    pub slug: String,
}

/// `GET /repo/{slug}?include=repository.last_started_build`
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryResource {
    pub id: u64,
    pub slug: String,
    #[serde(default)]
    pub last_started_build: Option<MinimalBuild>,
}

impl From<RepositoryResource> for Repository {
    fn from(res: RepositoryResource) -> Self {
        Repository::new(res.id, res.slug, res.last_started_build.map(|b| BuildId(b.id)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobResource {
    pub id: u64,
    #[serde(default)]
    pub config: Option<JobConfig>,
}

/// `GET /build/{id}?include=build.jobs,job.config`
#[derive(Debug, Clone, Deserialize)]
pub struct BuildResource {
    pub id: u64,
    pub state: BuildStatus,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    pub repository: MinimalRepository,
    #[serde(default)]
    pub jobs: Vec<JobResource>,
}

impl BuildResource {
    /// Language of the first job's configuration, or Travis' default.
    pub fn language(&self) -> String {
        self.jobs
            .first()
            .and_then(|job| job.config.as_ref())
            .and_then(|config| config.language.clone())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }

    /// Convert to a [`Build`] given the log of each job, in job order.
    ///
    /// `repository` replaces the minimal repository embedded in the resource
    /// when the caller already holds the full record.
    pub fn into_build(self, repository: Option<&Repository>, logs: Vec<Log>) -> Build {
        let language = self.language();
        let repository = repository
            .cloned()
            .unwrap_or_else(|| Repository::new(self.repository.id, self.repository.slug, None));
        let jobs = self
            .jobs
            .iter()
            .zip(logs.into_iter().chain(std::iter::repeat_with(Log::default)))
            .map(|(job, log)| Job {
                id: JobId(job.id),
                log,
            })
            .collect();

        Build {
            id: BuildId(self.id),
            repository,
            language,
            status: self.state,
            started_at: self.started_at,
            jobs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    pub is_last: bool,
}

/// `GET /repo/{slug}/builds`
#[derive(Debug, Clone, Deserialize)]
pub struct BuildsPage {
    #[serde(default)]
    pub builds: Vec<BuildResource>,
    #[serde(rename = "@pagination", default)]
    pub pagination: Option<Pagination>,
}

impl BuildsPage {
    /// Whether Travis has more builds after this page.
    pub fn has_more(&self) -> bool {
        !self.builds.is_empty() && self.pagination.as_ref().is_some_and(|p| !p.is_last)
    }
}
