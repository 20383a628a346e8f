//! CI entities as seen by the scanner.
//!
//! These are read-only views handed out by a [`CiProvider`](crate::CiProvider);
//! the scanner never mutates them.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Numeric identifier of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildId(pub u64);

impl FromStr for BuildId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(BuildId)
    }
}

impl std::fmt::Display for BuildId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric identifier of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Overall state of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Created,
    Received,
    Started,
    Passed,
    Failed,
    Errored,
    Canceled,
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BuildStatus::Created => "created",
            BuildStatus::Received => "received",
            BuildStatus::Started => "started",
            BuildStatus::Passed => "passed",
            BuildStatus::Failed => "failed",
            BuildStatus::Errored => "errored",
            BuildStatus::Canceled => "canceled",
        };
        f.write_str(s)
    }
}

/// A project tracked by the CI provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Provider-side numeric id.
    pub id: u64,
    /// Unique "owner/name" identifier.
    pub slug: String,
    /// Most recent build, absent when the project never built.
    pub last_build_id: Option<BuildId>,
}

impl Repository {
    pub fn new(id: u64, slug: impl Into<String>, last_build_id: Option<BuildId>) -> Self {
        Self {
            id,
            slug: slug.into(),
            last_build_id,
        }
    }

    /// Whether the provider has recorded at least one build.
    pub fn has_build_history(&self) -> bool {
        self.last_build_id.is_some()
    }
}

/// Parsed summary of a job's test run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestsInformation {
    pub running: u32,
    pub passing: u32,
    pub failing: u32,
    pub skipped: u32,
}

impl TestsInformation {
    pub fn has_failing_tests(&self) -> bool {
        self.failing > 0
    }
}

/// Log of a single job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub tests_information: TestsInformation,
}

/// One execution lane of a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub log: Log,
}

impl Job {
    pub fn new(id: u64, tests_information: TestsInformation) -> Self {
        Self {
            id: JobId(id),
            log: Log { tests_information },
        }
    }
}

/// One CI execution of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub id: BuildId,
    pub repository: Repository,
    /// Language from the build configuration, e.g. "java".
    pub language: String,
    pub status: BuildStatus,
    pub started_at: Option<DateTime<Utc>>,
    /// Jobs in provider order.
    pub jobs: Vec<Job>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_id_parses_decimal() {
        assert_eq!("123".parse::<BuildId>().unwrap(), BuildId(123));
        assert!("abc".parse::<BuildId>().is_err());
        assert!("".parse::<BuildId>().is_err());
        assert!("-5".parse::<BuildId>().is_err());
        assert!("12 3".parse::<BuildId>().is_err());
    }

    #[test]
    fn test_build_status_serde_lowercase() {
        let json = serde_json::to_string(&BuildStatus::Failed).unwrap();
        assert_eq!(json, "\"failed\"");
        let parsed: BuildStatus = serde_json::from_str("\"canceled\"").unwrap();
        assert_eq!(parsed, BuildStatus::Canceled);
    }

    #[test]
    fn test_build_status_display_matches_serde() {
        for status in [
            BuildStatus::Created,
            BuildStatus::Passed,
            BuildStatus::Errored,
            BuildStatus::Canceled,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json.trim_matches('"'), status.to_string());
        }
    }

    #[test]
    fn test_repository_build_history() {
        assert!(Repository::new(1, "org/a", Some(BuildId(9))).has_build_history());
        assert!(!Repository::new(2, "org/b", None).has_build_history());
    }

    #[test]
    fn test_default_log_has_no_failing_tests() {
        assert!(!Log::default().tests_information.has_failing_tests());
    }
}
