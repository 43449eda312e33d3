//! Sync run accounting

use serde::Serialize;

/// At most this many error strings are surfaced to operators; the rest are
/// counted but suppressed.
pub const ERROR_SUMMARY_LIMIT: usize = 5;

/// Accumulated outcome of one sync run.
///
/// Exactly one instance per run, owned by the orchestrator, never shared
/// across runs. Invariant at completion:
/// `succeeded + skipped + failed == candidates considered`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    /// Overall success: no failures and at least one upload, or an empty
    /// candidate set
    pub success: bool,
    pub succeeded: u32,
    pub skipped: u32,
    pub failed: u32,
    /// Append-only, unbounded; capped at presentation time
    pub errors: Vec<String>,
    pub uploaded_paths: Vec<String>,
}

impl SyncReport {
    pub fn record_upload(&mut self, path: String) {
        self.uploaded_paths.push(path);
        self.succeeded += 1;
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.failed += 1;
    }

    /// Record a run-terminating error that pre-empts candidate processing
    /// (it counts no candidate).
    pub fn record_aborted(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.success = false;
    }

    /// Finalize the overall outcome once all candidates are processed.
    pub fn finish(&mut self) {
        self.success = self.failed == 0 && self.succeeded > 0;
    }

    /// Number of candidates this run considered
    pub fn considered(&self) -> u32 {
        self.succeeded + self.skipped + self.failed
    }

    /// The first few error strings, for operator-facing summaries.
    pub fn error_summary(&self) -> &[String] {
        &self.errors[..self.errors.len().min(ERROR_SUMMARY_LIMIT)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_requires_at_least_one_upload_and_no_failures() {
        let mut report = SyncReport::default();
        report.record_upload("/gallerys/default/a.jpg".into());
        report.finish();
        assert!(report.success);

        let mut report = SyncReport::default();
        report.record_upload("/gallerys/default/a.jpg".into());
        report.record_failure("upload of b.jpg failed");
        report.finish();
        assert!(!report.success);

        let mut report = SyncReport::default();
        report.record_skip();
        report.finish();
        assert!(!report.success);
    }

    #[test]
    fn error_summary_caps_at_five() {
        let mut report = SyncReport::default();
        for i in 0..8 {
            report.record_failure(format!("error {i}"));
        }
        assert_eq!(report.failed, 8);
        assert_eq!(report.errors.len(), 8);
        assert_eq!(report.error_summary().len(), ERROR_SUMMARY_LIMIT);
        assert_eq!(report.error_summary()[0], "error 0");
    }

    #[test]
    fn considered_matches_counters() {
        let mut report = SyncReport::default();
        report.record_upload("/gallerys/default/a.jpg".into());
        report.record_skip();
        report.record_failure("x");
        assert_eq!(report.considered(), 3);
    }
}
