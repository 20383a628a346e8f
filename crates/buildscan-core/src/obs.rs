//! Structured observability hooks for scan lifecycle events.
//!
//! This module provides:
//! - A scan-scoped tracing span, attached to the workflow future with
//!   `tracing::Instrument`
//! - Emission functions for key lifecycle events: scan start, qualifying
//!   build, scan finish
//!
//! Events are emitted at `info!` level (filter with `BUILDSCAN_LOG` or `RUST_LOG`).

use std::path::Path;

use tracing::info;

use crate::session::ScanSummary;

/// Span tagged with the scan id and workflow name.
///
/// # Example
///
/// ```ignore
/// session.run().instrument(scan_span("7f3c...", "slugs")).await;
/// // every event inside carries scan_id and workflow
/// ```
pub fn scan_span(scan_id: &str, workflow: &str) -> tracing::Span {
    tracing::info_span!("buildscan.scan", scan_id = %scan_id, workflow = %workflow)
}

/// Emit event: scan started on an input file.
pub fn emit_scan_started(scan_id: &str, workflow: &str, input: &Path, target_language: &str) {
    info!(
        event = "scan.started",
        scan_id = %scan_id,
        workflow = %workflow,
        input = %input.display(),
        target_language = %target_language,
    );
}

/// Emit event: a build matched the failure signature.
pub fn emit_build_qualified(build_id: u64, slug: &str, job_id: u64) {
    info!(
        event = "scan.build_qualified",
        build_id = build_id,
        slug = %slug,
        job_id = job_id,
    );
}

/// Emit event: scan finished, with every counter.
pub fn emit_scan_finished(summary: &ScanSummary) {
    let c = &summary.counters;
    info!(
        event = "scan.finished",
        scan_id = %summary.scan_id,
        duration_ms = summary.duration_ms(),
        total_repo_number = c.total_repo_number,
        total_repo_using_travis = c.total_repo_using_travis,
        total_scanned_builds = c.total_scanned_builds,
        total_build_in_target_language = c.total_build_in_target_language,
        total_build_in_target_language_failing = c.total_build_in_target_language_failing,
        total_build_in_target_language_failing_with_failing_tests =
            c.total_build_in_target_language_failing_with_failing_tests,
    );
}
