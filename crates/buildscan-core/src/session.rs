//! Scan orchestration.
//!
//! A [`ScanSession`] runs exactly one scan, either over a file of build ids
//! or over a file of project slugs, and owns everything the scan accumulates:
//! the counters, the deduplicated sets of qualifying slugs and repositories,
//! and the ordered list of qualifying build ids.
//!
//! Lookups are awaited one after the other. The only error that aborts a scan
//! is an unreadable input file; everything the provider cannot answer is
//! logged and skipped.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn, Instrument};
use uuid::Uuid;

use crate::classifier::{classify, Verdict};
use crate::config::ScanConfig;
use crate::error::Result;
use crate::fetcher;
use crate::input::load_lines;
use crate::model::{Build, BuildId, Repository};
use crate::obs::{emit_build_qualified, emit_scan_finished, emit_scan_started, scan_span};
use crate::provider::CiProvider;
use crate::resolver::resolve_repositories;

/// Which input a scan was started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    /// One build id per line.
    BuildIds,
    /// One "owner/name" slug per line.
    Slugs,
}

impl Workflow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Workflow::BuildIds => "build_ids",
            Workflow::Slugs => "slugs",
        }
    }
}

/// Aggregate counters of a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanCounters {
    pub total_repo_number: usize,
    pub total_repo_using_travis: usize,
    pub total_scanned_builds: usize,
    pub total_build_in_target_language: usize,
    pub total_build_in_target_language_failing: usize,
    pub total_build_in_target_language_failing_with_failing_tests: usize,
}

/// Serializable snapshot of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub scan_id: Uuid,
    pub workflow: Option<Workflow>,
    pub target_language: String,
    pub cutoff: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub counters: ScanCounters,
    pub qualifying_build_ids: Vec<BuildId>,
    /// Sorted.
    pub qualifying_slugs: Vec<String>,
}

impl ScanSummary {
    /// Wall-clock duration, zero until the scan has finished.
    pub fn duration_ms(&self) -> u64 {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => (end - start).num_milliseconds().max(0) as u64,
            _ => 0,
        }
    }
}

/// State of one scan.
pub struct ScanSession {
    provider: Arc<dyn CiProvider>,
    config: ScanConfig,
    scan_id: Uuid,
    workflow: Option<Workflow>,
    scan_start: Option<DateTime<Utc>>,
    scan_end: Option<DateTime<Utc>>,
    cutoff: DateTime<Utc>,
    counters: ScanCounters,
    qualifying_slugs: HashSet<String>,
    qualifying_repositories: HashMap<String, Repository>,
    qualifying_build_ids: Vec<BuildId>,
}

impl ScanSession {
    /// Create a session whose cutoff is `lookback_hours` before now.
    pub fn new(config: ScanConfig, provider: Arc<dyn CiProvider>) -> Self {
        Self::with_now(config, provider, Utc::now())
    }

    /// Create a session whose cutoff is `lookback_hours` before `now`.
    ///
    /// A window reaching past the earliest representable time starts the
    /// cutoff there.
    pub fn with_now(config: ScanConfig, provider: Arc<dyn CiProvider>, now: DateTime<Utc>) -> Self {
        let cutoff = now
            .checked_sub_signed(Duration::hours(i64::from(config.lookback_hours)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self {
            provider,
            config,
            scan_id: Uuid::new_v4(),
            workflow: None,
            scan_start: None,
            scan_end: None,
            cutoff,
            counters: ScanCounters::default(),
            qualifying_slugs: HashSet::new(),
            qualifying_repositories: HashMap::new(),
            qualifying_build_ids: Vec::new(),
        }
    }

    /// Classify every build id listed in `path` and return the qualifying
    /// builds in input order.
    pub async fn scan_build_ids(&mut self, path: &Path) -> Result<Vec<Build>> {
        let span = scan_span(&self.scan_id.to_string(), Workflow::BuildIds.as_str());
        self.run_build_ids(path).instrument(span).await
    }

    /// Resolve every slug listed in `path`, classify each repository's builds
    /// since the cutoff, and return the qualifying builds.
    pub async fn scan_slugs(&mut self, path: &Path) -> Result<Vec<Build>> {
        let span = scan_span(&self.scan_id.to_string(), Workflow::Slugs.as_str());
        self.run_slugs(path).instrument(span).await
    }

    async fn run_build_ids(&mut self, path: &Path) -> Result<Vec<Build>> {
        self.begin(Workflow::BuildIds, path);
        let lines = load_lines(path)?;
        self.counters.total_scanned_builds = lines.len();

        let provider = Arc::clone(&self.provider);
        let mut result = Vec::new();
        for line in &lines {
            let Some(build) = fetcher::fetch_build(provider.as_ref(), line).await else {
                continue;
            };
            if self.qualifies(&build) {
                self.qualifying_build_ids.push(build.id);
                result.push(build);
            }
        }

        self.counters.total_repo_number = self.qualifying_repositories.len();
        self.counters.total_repo_using_travis = self.qualifying_repositories.len();
        self.counters.total_build_in_target_language_failing_with_failing_tests = result.len();
        self.finish();
        Ok(result)
    }

    async fn run_slugs(&mut self, path: &Path) -> Result<Vec<Build>> {
        self.begin(Workflow::Slugs, path);
        let slugs = load_lines(path)?;
        self.counters.total_repo_number = slugs.len();

        let provider = Arc::clone(&self.provider);
        let repositories = resolve_repositories(provider.as_ref(), &slugs).await;
        self.counters.total_repo_using_travis = repositories.len();

        let mut result = Vec::new();
        for repository in &repositories {
            let builds = fetcher::builds_since(provider.as_ref(), repository, self.cutoff).await;
            for build in builds {
                self.counters.total_scanned_builds += 1;
                if self.qualifies(&build) {
                    self.qualifying_build_ids.push(build.id);
                    result.push(build);
                }
            }
        }

        self.counters.total_build_in_target_language_failing_with_failing_tests = result.len();
        self.finish();
        Ok(result)
    }

    /// Classify `build`, update the language and failure counters, and
    /// register its repository when it matches the failure signature.
    pub fn qualifies(&mut self, build: &Build) -> bool {
        let verdict = classify(build, &self.config.target_language);
        let slug = build.repository.slug.as_str();

        if !verdict.is_target_language() {
            warn!(
                slug = %slug,
                build_id = %build.id,
                language = %build.language,
                "build is not in target language"
            );
            return false;
        }
        self.counters.total_build_in_target_language += 1;
        debug!(slug = %slug, build_id = %build.id, status = %build.status, "build in target language");

        if !verdict.is_failing() {
            return false;
        }
        self.counters.total_build_in_target_language_failing += 1;

        match verdict {
            Verdict::Qualifies { job } => {
                self.register(&build.repository);
                emit_build_qualified(build.id.0, slug, job.0);
                true
            }
            _ => false,
        }
    }

    fn register(&mut self, repository: &Repository) {
        self.qualifying_slugs.insert(repository.slug.clone());
        self.qualifying_repositories
            .entry(repository.slug.clone())
            .or_insert_with(|| repository.clone());
    }

    fn begin(&mut self, workflow: Workflow, path: &Path) {
        self.workflow = Some(workflow);
        self.scan_start = Some(Utc::now());
        emit_scan_started(
            &self.scan_id.to_string(),
            workflow.as_str(),
            path,
            &self.config.target_language,
        );
    }

    fn finish(&mut self) {
        self.scan_end = Some(Utc::now());
        emit_scan_finished(&self.summary());
    }

    pub fn scan_id(&self) -> Uuid {
        self.scan_id
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn counters(&self) -> &ScanCounters {
        &self.counters
    }

    pub fn scan_start(&self) -> Option<DateTime<Utc>> {
        self.scan_start
    }

    pub fn scan_end(&self) -> Option<DateTime<Utc>> {
        self.scan_end
    }

    /// Earliest build start considered by the slug workflow.
    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }

    pub fn qualifying_slugs(&self) -> &HashSet<String> {
        &self.qualifying_slugs
    }

    /// Qualifying repositories keyed by slug.
    pub fn qualifying_repositories(&self) -> &HashMap<String, Repository> {
        &self.qualifying_repositories
    }

    pub fn qualifying_build_ids(&self) -> &[BuildId] {
        &self.qualifying_build_ids
    }

    /// Snapshot the session for reporting.
    pub fn summary(&self) -> ScanSummary {
        let mut slugs: Vec<String> = self.qualifying_slugs.iter().cloned().collect();
        slugs.sort();
        ScanSummary {
            scan_id: self.scan_id,
            workflow: self.workflow,
            target_language: self.config.target_language.clone(),
            cutoff: self.cutoff,
            started_at: self.scan_start,
            finished_at: self.scan_end,
            counters: self.counters,
            qualifying_build_ids: self.qualifying_build_ids.clone(),
            qualifying_slugs: slugs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::MemoryCiProvider;
    use crate::model::{BuildStatus, Job, TestsInformation};
    use tracing_test::traced_test;

    fn tests_failing(failing: u32) -> TestsInformation {
        TestsInformation {
            running: 10,
            passing: 10 - failing,
            failing,
            skipped: 0,
        }
    }

    fn build(id: u64, slug: &str, language: &str, status: BuildStatus, failing: &[u32]) -> Build {
        Build {
            id: BuildId(id),
            repository: Repository::new(id * 10, slug, Some(BuildId(id))),
            language: language.to_string(),
            status,
            started_at: Some(Utc::now()),
            jobs: failing
                .iter()
                .enumerate()
                .map(|(i, f)| Job::new(id * 100 + i as u64, tests_failing(*f)))
                .collect(),
        }
    }

    fn session() -> ScanSession {
        ScanSession::new(ScanConfig::default(), Arc::new(MemoryCiProvider::new()))
    }

    #[test]
    #[traced_test]
    fn test_wrong_language_touches_no_language_counters() {
        let mut s = session();
        let b = build(1, "org/py", "python", BuildStatus::Failed, &[3]);

        assert!(!s.qualifies(&b));
        assert_eq!(s.counters().total_build_in_target_language, 0);
        assert_eq!(s.counters().total_build_in_target_language_failing, 0);
        assert!(s.qualifying_slugs().is_empty());
        assert!(logs_contain("build is not in target language"));
        assert!(logs_contain("language=python"));
    }

    #[test]
    fn test_passed_build_is_counted_but_not_failing() {
        let mut s = session();
        let b = build(2, "org/a", "java", BuildStatus::Passed, &[0]);

        assert!(!s.qualifies(&b));
        assert_eq!(s.counters().total_build_in_target_language, 1);
        assert_eq!(s.counters().total_build_in_target_language_failing, 0);
    }

    #[test]
    fn test_failed_build_without_failing_tests_is_counted_as_failing() {
        let mut s = session();
        let b = build(3, "org/a", "java", BuildStatus::Failed, &[0, 0]);

        assert!(!s.qualifies(&b));
        assert_eq!(s.counters().total_build_in_target_language_failing, 1);
        assert!(s.qualifying_repositories().is_empty());
    }

    #[test]
    fn test_qualifying_build_registers_repository_once() {
        let mut s = session();
        let b = build(4, "org/a", "java", BuildStatus::Failed, &[0, 3, 5]);

        assert!(s.qualifies(&b));
        assert!(s.qualifies(&b));
        assert_eq!(s.qualifying_slugs().len(), 1);
        assert_eq!(s.qualifying_repositories().len(), 1);
        assert!(s.qualifying_repositories().contains_key("org/a"));
        assert_eq!(s.counters().total_build_in_target_language_failing, 2);
    }

    #[test]
    fn test_slug_and_repository_sets_grow_together() {
        let mut s = session();
        let builds = [
            build(5, "org/a", "java", BuildStatus::Failed, &[1]),
            build(6, "org/b", "java", BuildStatus::Failed, &[0]),
            build(7, "org/b", "java", BuildStatus::Failed, &[2]),
            build(8, "org/a", "java", BuildStatus::Failed, &[4]),
            build(9, "org/c", "ruby", BuildStatus::Failed, &[4]),
        ];
        for b in &builds {
            s.qualifies(b);
            assert_eq!(s.qualifying_slugs().len(), s.qualifying_repositories().len());
        }
        assert_eq!(s.qualifying_slugs().len(), 2);
    }

    #[test]
    fn test_cutoff_is_lookback_before_now() {
        let now = Utc::now();
        let s = ScanSession::with_now(
            ScanConfig::new("java", 6),
            Arc::new(MemoryCiProvider::new()),
            now,
        );
        assert_eq!(s.cutoff(), now - Duration::hours(6));
        assert!(s.scan_start().is_none());
        assert!(s.scan_end().is_none());
    }

    #[test]
    fn test_oversized_lookback_clamps_cutoff_instead_of_panicking() {
        let config = ScanConfig::new("java", u32::MAX);
        assert!(config.validate().is_err());

        let s = ScanSession::new(config, Arc::new(MemoryCiProvider::new()));
        assert_eq!(s.cutoff(), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_summary_sorts_slugs_and_reports_zero_duration_before_finish() {
        let mut s = session();
        s.qualifies(&build(1, "org/z", "java", BuildStatus::Failed, &[1]));
        s.qualifies(&build(2, "org/a", "java", BuildStatus::Failed, &[1]));

        let summary = s.summary();
        assert_eq!(summary.qualifying_slugs, vec!["org/a", "org/z"]);
        assert_eq!(summary.duration_ms(), 0);
        assert!(summary.workflow.is_none());
    }

    #[test]
    fn test_summary_serializes_workflow_snake_case() {
        let json = serde_json::to_string(&Workflow::BuildIds).unwrap();
        assert_eq!(json, "\"build_ids\"");
    }
}
