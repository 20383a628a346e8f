//! Travis CI v3 API client
//!
//! Implements [`CiProvider`] over HTTP. Requests are sent one at a time and
//! never retried; a 404 is reported as absence.

use async_trait::async_trait;
use buildscan_core::{
    Build, BuildId, BuildStatus, CiProvider, JobId, Log, ProviderResult, Repository,
};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::TravisConfig;
use crate::error::TravisError;
use crate::log_parser::parse_tests_information;
use crate::wire::{BuildResource, BuildsPage, RepositoryResource};
use crate::Result;

const BUILD_INCLUDES: &str = "build.jobs,job.config";

/// Travis client for repository, build and log lookups
pub struct TravisClient {
    config: TravisConfig,
    base_url: Url,
    http_client: reqwest::Client,
}

impl TravisClient {
    /// Create a new Travis client
    pub fn new(config: TravisConfig) -> Result<Self> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|e| TravisError::InvalidConfig(format!("{}: {}", config.api_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(TravisError::InvalidConfig(format!(
                "{} cannot be used as a base URL",
                config.api_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("travis-api-version"),
            HeaderValue::from_static("3"),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(&format!("token {}", token))
                .map_err(|e| TravisError::InvalidConfig(format!("invalid token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("buildscan/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(TravisClient {
            config,
            base_url,
            http_client,
        })
    }

    pub fn config(&self) -> &TravisConfig {
        &self.config
    }

    /// Base URL extended with percent-encoded path segments.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET `url`; `Ok(None)` on 404.
    async fn get_text(&self, url: Url) -> Result<Option<String>> {
        debug!(url = %url, "GET");
        let response = self.http_client.get(url.clone()).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.text().await?)),
            status => Err(TravisError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        match self.get_text(url).await? {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    /// Fetch a repository by slug
    pub async fn fetch_repository(&self, slug: &str) -> Result<Option<Repository>> {
        let mut url = self.url(&["repo", slug]);
        url.query_pairs_mut()
            .append_pair("include", "repository.last_started_build");
        let resource: Option<RepositoryResource> = self.get_json(url).await?;
        Ok(resource.map(Repository::from))
    }

    /// Fetch a build with its jobs and, for failed builds, their logs
    pub async fn fetch_build(&self, id: BuildId) -> Result<Option<Build>> {
        let mut url = self.url(&["build", &id.to_string()]);
        url.query_pairs_mut().append_pair("include", BUILD_INCLUDES);
        match self.get_json::<BuildResource>(url).await? {
            Some(resource) => Ok(Some(self.complete(resource, None).await)),
            None => Ok(None),
        }
    }

    /// List builds started on or after `cutoff`, newest first
    pub async fn fetch_builds_since(
        &self,
        repository: &Repository,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Build>> {
        let mut builds = Vec::new();
        let mut offset: u64 = 0;

        loop {
            let mut url = self.url(&["repo", &repository.slug, "builds"]);
            url.query_pairs_mut()
                .append_pair("sort_by", "started_at:desc")
                .append_pair("limit", &self.config.page_size.to_string())
                .append_pair("offset", &offset.to_string())
                .append_pair("include", BUILD_INCLUDES);

            let Some(page) = self.get_json::<BuildsPage>(url).await? else {
                warn!(slug = %repository.slug, "repository disappeared while listing builds");
                break;
            };
            let has_more = page.has_more();
            offset += page.builds.len() as u64;

            let mut reached_cutoff = false;
            for resource in page.builds {
                let Some(started_at) = resource.started_at else {
                    continue;
                };
                if started_at < cutoff {
                    reached_cutoff = true;
                    break;
                }
                builds.push(self.complete(resource, Some(repository)).await);
            }

            if reached_cutoff || !has_more {
                break;
            }
        }

        Ok(builds)
    }

    /// Fetch the raw log of a job; `Ok(None)` if Travis has none.
    pub async fn fetch_job_log(&self, id: JobId) -> Result<Option<String>> {
        let url = self.url(&["job", &id.to_string(), "log.txt"]);
        self.get_text(url).await
    }

    /// Attach logs to a build resource. Logs are only fetched for failed builds;
    /// a log that cannot be fetched counts as no tests.
    async fn complete(
        &self,
        resource: BuildResource,
        repository: Option<&Repository>,
    ) -> Build {
        let mut logs = Vec::new();
        if resource.state == BuildStatus::Failed {
            for job in &resource.jobs {
                let tests_information = match self.fetch_job_log(JobId(job.id)).await {
                    Ok(Some(raw)) => parse_tests_information(&raw),
                    Ok(None) => {
                        debug!(job_id = job.id, "job has no log");
                        Default::default()
                    }
                    Err(e) => {
                        warn!(
                            job_id = job.id,
                            build_id = resource.id,
                            error = %e,
                            "job log unavailable, counting no tests"
                        );
                        Default::default()
                    }
                };
                logs.push(Log { tests_information });
            }
        }
        resource.into_build(repository, logs)
    }
}

#[async_trait]
impl CiProvider for TravisClient {
    async fn repository(&self, slug: &str) -> ProviderResult<Option<Repository>> {
        Ok(self.fetch_repository(slug).await?)
    }

    async fn build(&self, id: BuildId) -> ProviderResult<Option<Build>> {
        Ok(self.fetch_build(id).await?)
    }

    async fn builds_since(
        &self,
        repository: &Repository,
        cutoff: DateTime<Utc>,
    ) -> ProviderResult<Vec<Build>> {
        Ok(self.fetch_builds_since(repository, cutoff).await?)
    }
}
