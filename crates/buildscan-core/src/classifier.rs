//! Failure-signature classification.
//!
//! A build matches when it is configured for the target language, its status
//! is `Failed`, and at least one of its jobs reports failing tests. [`classify`]
//! is the pure decision; [`ScanSession`](crate::ScanSession) turns the
//! [`Verdict`] into counter updates and repository registration.

use crate::model::{Build, BuildStatus, JobId};

/// Outcome of classifying one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Configured for another language.
    WrongLanguage,
    /// Target language, but the build did not fail.
    NotFailed,
    /// Failed in the target language, but no job reports failing tests.
    NoFailingTests,
    /// Matches the failure signature; `job` is the first job with failing tests.
    Qualifies { job: JobId },
}

impl Verdict {
    pub fn is_target_language(&self) -> bool {
        !matches!(self, Verdict::WrongLanguage)
    }

    pub fn is_failing(&self) -> bool {
        matches!(self, Verdict::NoFailingTests | Verdict::Qualifies { .. })
    }

    pub fn qualifies(&self) -> bool {
        matches!(self, Verdict::Qualifies { .. })
    }
}

/// Classify `build` against the failure signature for `target_language`.
///
/// Jobs are searched in order and the search stops at the first job whose
/// log reports failing tests.
pub fn classify(build: &Build, target_language: &str) -> Verdict {
    if build.language != target_language {
        return Verdict::WrongLanguage;
    }
    if build.status != BuildStatus::Failed {
        return Verdict::NotFailed;
    }

    build
        .jobs
        .iter()
        .find(|job| job.log.tests_information.has_failing_tests())
        .map(|job| Verdict::Qualifies { job: job.id })
        .unwrap_or(Verdict::NoFailingTests)
}
