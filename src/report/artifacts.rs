//! Evidence capture around a test invocation
//!
//! At call phase the reporter attaches a screenshot labelled with the outcome. At
//! teardown, for failed tests only, it looks for the invocation's artifact folders under
//! the output root and attaches the trace and video found there. Nothing in here can
//! fail a test: every problem is logged and reporting continues.

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

use super::types::{Attachment, AttachmentKind, AttachmentSink, TestOutcome, TestPhase};
use crate::driver::traits::ScreenshotOptions;
use crate::runner::context::FixtureSet;
use crate::runner::state::{CallPhaseState, PhaseStates, RunId};

pub const TRACE_FILE_NAME: &str = "trace.zip";
pub const VIDEO_FILE_NAME: &str = "video.webm";
pub const DEFAULT_OUTPUT_DIR: &str = "test-results";

pub const TRACE_ATTACHMENT_NAME: &str = "Log_Error_Trace";
pub const VIDEO_ATTACHMENT_NAME: &str = "Log_Error_Video";

/// Test name without its parameterization suffix: `test_foo[chromium]` -> `test_foo`
pub fn canonical_test_name(test_name: &str) -> &str {
    test_name.split('[').next().unwrap_or(test_name)
}

/// Artifact folder names use `-` where test names use `_`
pub fn normalize_folder_name(name: &str) -> String {
    name.replace('-', "_")
}

pub fn screenshot_attachment_name(outcome: &TestOutcome) -> String {
    format!("Screenshot_{}_Call", outcome.status_label())
}

/// Immediate subdirectories of `output_root` whose normalized name contains
/// `canonical_name`, sorted by path
pub fn find_artifact_folders(output_root: &Path, canonical_name: &str) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(output_root)
        .with_context(|| format!("Failed to list {}", output_root.display()))?;

    let mut folders = Vec::new();
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if normalize_folder_name(&name).contains(canonical_name) {
            folders.push(path);
        }
    }
    folders.sort();
    Ok(folders)
}

/// What the reporter attached for one phase
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PhaseReport {
    pub attachments: Vec<String>,
    pub matched_folders: Vec<PathBuf>,
}

pub struct ArtifactReporter {
    output_root: PathBuf,
    phases: PhaseStates,
}

impl ArtifactReporter {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            phases: PhaseStates::new(),
        }
    }

    /// Phase-boundary hook
    pub async fn report(
        &self,
        run_id: RunId,
        outcome: &TestOutcome,
        fixtures: &FixtureSet,
        sink: &dyn AttachmentSink,
    ) -> PhaseReport {
        match outcome.phase {
            TestPhase::Call => self.on_call(run_id, outcome, fixtures, sink).await,
            TestPhase::Teardown => self.on_teardown(run_id, outcome, sink),
        }
    }

    pub async fn on_call(
        &self,
        run_id: RunId,
        outcome: &TestOutcome,
        fixtures: &FixtureSet,
        sink: &dyn AttachmentSink,
    ) -> PhaseReport {
        let mut report = PhaseReport::default();
        self.phases.record(
            run_id,
            CallPhaseState {
                failed: !outcome.passed,
            },
        );

        let page = fixtures.resolve_page();
        if page.is_none() {
            debug!(
                "[DEBUG] No browser page found for test: {}",
                outcome.test_name
            );
        }

        if outcome.passed {
            info!("[EVENT] --- TEST PASSED: {} ---", outcome.test_name);
        } else {
            error!("[EVENT] --- TEST FAILED: {} ---", outcome.test_name);
            let reason = outcome
                .failure
                .as_ref()
                .map(|f| f.summary())
                .unwrap_or_else(|| "unknown failure".to_string());
            error!("[ERROR] Reason: {}", reason);
        }

        let Some(page) = page else {
            return report;
        };

        let status = outcome.status_label();
        info!("[ACTION] Capturing {} screenshot...", status);
        let name = screenshot_attachment_name(outcome);
        let attached = match page.screenshot(ScreenshotOptions::default()).await {
            Ok(png) => sink.attach(Attachment::bytes(&name, AttachmentKind::Png, png)),
            Err(e) => Err(e),
        };

        match attached {
            Ok(()) => {
                info!("[SUCCESS] Screenshot attached to report");
                report.attachments.push(name);
            }
            Err(e) => warn!("[WARNING] Could not capture screenshot: {:#}", e),
        }
        report
    }

    pub fn on_teardown(
        &self,
        run_id: RunId,
        outcome: &TestOutcome,
        sink: &dyn AttachmentSink,
    ) -> PhaseReport {
        let mut report = PhaseReport::default();
        let failed = self.phases.take(run_id).map(|s| s.failed).unwrap_or(false);

        if !failed {
            info!("[EVENT] Test PASSED. Skipping Trace and Video attachments.");
            return report;
        }

        info!("[ACTION] Test FAILED. Searching for Trace and Video artifacts...");
        if !self.output_root.exists() {
            error!(
                "[ERROR] Artifacts directory not found: {}",
                self.output_root.display()
            );
            return report;
        }

        let test_method_name = canonical_test_name(&outcome.test_name);
        let folders = match find_artifact_folders(&self.output_root, test_method_name) {
            Ok(folders) => folders,
            Err(e) => {
                error!("[ERROR] {:#}", e);
                return report;
            }
        };

        if folders.is_empty() {
            warn!(
                "[WARNING] No artifact folder found for test: {}",
                test_method_name
            );
            return report;
        }

        for folder in &folders {
            debug!("[DEBUG] Matching artifact folder found: {}", folder.display());
            let candidates = [
                (TRACE_FILE_NAME, TRACE_ATTACHMENT_NAME, AttachmentKind::Zip, "Trace"),
                (VIDEO_FILE_NAME, VIDEO_ATTACHMENT_NAME, AttachmentKind::Webm, "Video"),
            ];
            for (file_name, attachment_name, kind, label) in candidates {
                let file = folder.join(file_name);
                if !file.exists() {
                    debug!("[DEBUG] {} file not found in {}", label, folder.display());
                    continue;
                }
                info!("[ATTACH] Attaching {} file: {}", label, file.display());
                match sink.attach(Attachment::file(attachment_name, kind, &file)) {
                    Ok(()) => report.attachments.push(attachment_name.to_string()),
                    Err(e) => warn!("[WARNING] Could not attach {}: {:#}", file.display(), e),
                }
            }
        }

        report.matched_folders = folders;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::MockPage;
    use crate::driver::traits::PageProvider;
    use crate::driver::BrowserPage;
    use crate::report::types::{AttachmentPayload, FailureDetail, RecordingSink};
    use std::sync::Arc;

    fn failure() -> Option<FailureDetail> {
        Some(FailureDetail::new("Locator expected to be visible", "raw"))
    }

    fn fixtures_with_page(page: Arc<MockPage>) -> FixtureSet {
        let fixtures = FixtureSet::default();
        fixtures.register_page(page);
        fixtures
    }

    fn artifact_folder(root: &Path, name: &str, files: &[&str]) -> PathBuf {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        for file in files {
            std::fs::write(dir.join(file), b"data").unwrap();
        }
        dir
    }

    #[test]
    fn test_canonical_test_name() {
        assert_eq!(canonical_test_name("test_foo[chromium]"), "test_foo");
        assert_eq!(canonical_test_name("test_foo"), "test_foo");
        assert_eq!(
            canonical_test_name("test_foo[chromium]"),
            canonical_test_name("test_foo")
        );
        assert_eq!(canonical_test_name("test_foo[a[b]]"), "test_foo");
    }

    #[test]
    fn test_normalize_folder_name() {
        assert_eq!(
            normalize_folder_name("login-test-reset-password-chromium"),
            "login_test_reset_password_chromium"
        );
    }

    #[tokio::test]
    async fn test_call_phase_attaches_labelled_screenshot() {
        let reporter = ArtifactReporter::new("unused");
        let page = Arc::new(MockPage::new("https://www.phptravels.net/login"));
        let fixtures = fixtures_with_page(page.clone());

        let sink = RecordingSink::default();
        let passed = TestOutcome::call("test_a[chromium]", None);
        let report = reporter.on_call(RunId::new(), &passed, &fixtures, &sink).await;
        assert_eq!(report.attachments, vec!["Screenshot_PASSED_Call"]);

        let failed_sink = RecordingSink::default();
        let failed = TestOutcome::call("test_b[chromium]", failure());
        reporter
            .on_call(RunId::new(), &failed, &fixtures, &failed_sink)
            .await;

        let attachments = failed_sink.taken();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].name, "Screenshot_FAILED_Call");
        assert_eq!(attachments[0].kind, AttachmentKind::Png);
        assert_eq!(page.screenshot_count(), 2);
    }

    #[tokio::test]
    async fn test_call_phase_without_page_attaches_nothing() {
        let reporter = ArtifactReporter::new("unused");
        let sink = RecordingSink::default();
        let outcome = TestOutcome::call("test_a[chromium]", failure());

        let report = reporter
            .on_call(RunId::new(), &outcome, &FixtureSet::default(), &sink)
            .await;
        assert!(report.attachments.is_empty());
        assert!(sink.names().is_empty());
    }

    #[tokio::test]
    async fn test_call_phase_finds_page_through_provider() {
        struct LoginPageObject(Arc<MockPage>);
        impl PageProvider for LoginPageObject {
            fn page(&self) -> Option<Arc<dyn BrowserPage>> {
                Some(self.0.clone())
            }
        }

        let page = Arc::new(MockPage::new("about:blank"));
        let fixtures = FixtureSet::default();
        fixtures.register_provider("customer_login_page", Arc::new(LoginPageObject(page.clone())));

        let sink = RecordingSink::default();
        let outcome = TestOutcome::call("test_a[chromium]", None);
        ArtifactReporter::new("unused")
            .on_call(RunId::new(), &outcome, &fixtures, &sink)
            .await;
        assert_eq!(sink.names(), vec!["Screenshot_PASSED_Call"]);
    }

    #[tokio::test]
    async fn test_screenshot_failure_is_not_fatal() {
        let page = Arc::new(MockPage::new("about:blank").failing_screenshots("page crashed"));
        let fixtures = fixtures_with_page(page);
        let reporter = ArtifactReporter::new("unused");
        let sink = RecordingSink::default();
        let run = RunId::new();

        let outcome = TestOutcome::call("test_a[chromium]", failure());
        let report = reporter.on_call(run, &outcome, &fixtures, &sink).await;
        assert!(report.attachments.is_empty());

        // The failure flag is still recorded for teardown
        assert_eq!(reporter.phases.take(run), Some(CallPhaseState { failed: true }));
    }

    #[tokio::test]
    async fn test_passed_test_skips_artifacts() {
        let root = tempfile::tempdir().unwrap();
        artifact_folder(
            root.path(),
            "login-test-a-chromium",
            &[TRACE_FILE_NAME, VIDEO_FILE_NAME],
        );
        let reporter = ArtifactReporter::new(root.path());
        let run = RunId::new();
        let sink = RecordingSink::default();

        reporter
            .on_call(run, &TestOutcome::call("test_a[chromium]", None), &FixtureSet::default(), &sink)
            .await;
        let report = reporter.on_teardown(run, &TestOutcome::teardown("test_a[chromium]", None), &sink);

        assert!(report.attachments.is_empty());
        assert!(report.matched_folders.is_empty());
        assert!(sink.names().is_empty());
    }

    #[tokio::test]
    async fn test_failed_test_attaches_trace_and_video() {
        let root = tempfile::tempdir().unwrap();
        let folder = artifact_folder(
            root.path(),
            "test-customer-login-page-test-a-chromium",
            &[TRACE_FILE_NAME, VIDEO_FILE_NAME],
        );
        artifact_folder(root.path(), "test-customer-login-page-test-b-chromium", &[TRACE_FILE_NAME]);

        let reporter = ArtifactReporter::new(root.path());
        let run = RunId::new();
        let sink = RecordingSink::default();

        reporter
            .on_call(run, &TestOutcome::call("test_a[chromium]", failure()), &FixtureSet::default(), &sink)
            .await;
        let report = reporter.on_teardown(run, &TestOutcome::teardown("test_a[chromium]", None), &sink);

        assert_eq!(report.matched_folders, vec![folder.clone()]);
        let attachments = sink.taken();
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].name, TRACE_ATTACHMENT_NAME);
        assert_eq!(attachments[0].kind, AttachmentKind::Zip);
        assert_eq!(
            attachments[0].payload,
            AttachmentPayload::File(folder.join(TRACE_FILE_NAME))
        );
        assert_eq!(attachments[1].name, VIDEO_ATTACHMENT_NAME);
        assert_eq!(attachments[1].kind, AttachmentKind::Webm);
    }

    #[tokio::test]
    async fn test_missing_artifact_files_are_omitted() {
        let root = tempfile::tempdir().unwrap();
        artifact_folder(root.path(), "suite-test-a-chromium", &[VIDEO_FILE_NAME]);

        let reporter = ArtifactReporter::new(root.path());
        let run = RunId::new();
        let sink = RecordingSink::default();
        reporter
            .on_call(run, &TestOutcome::call("test_a", failure()), &FixtureSet::default(), &sink)
            .await;
        let report = reporter.on_teardown(run, &TestOutcome::teardown("test_a", None), &sink);

        assert_eq!(report.attachments, vec![VIDEO_ATTACHMENT_NAME]);
    }

    #[tokio::test]
    async fn test_every_matching_folder_is_used() {
        let root = tempfile::tempdir().unwrap();
        artifact_folder(root.path(), "suite-test-a-chromium", &[TRACE_FILE_NAME]);
        artifact_folder(root.path(), "suite-test-a-chromium-retry1", &[TRACE_FILE_NAME]);
        std::fs::write(root.path().join("suite-test-a-notes.txt"), b"not a folder").unwrap();

        let reporter = ArtifactReporter::new(root.path());
        let run = RunId::new();
        let sink = RecordingSink::default();
        reporter
            .on_call(run, &TestOutcome::call("test_a[chromium]", failure()), &FixtureSet::default(), &sink)
            .await;
        let report = reporter.on_teardown(run, &TestOutcome::teardown("test_a[chromium]", None), &sink);

        assert_eq!(report.matched_folders.len(), 2);
        assert_eq!(sink.names(), vec![TRACE_ATTACHMENT_NAME, TRACE_ATTACHMENT_NAME]);
    }

    #[tokio::test]
    async fn test_missing_output_root_is_not_fatal() {
        let root = tempfile::tempdir().unwrap();
        let reporter = ArtifactReporter::new(root.path().join("does-not-exist"));
        let run = RunId::new();
        let sink = RecordingSink::default();
        reporter
            .on_call(run, &TestOutcome::call("test_a", failure()), &FixtureSet::default(), &sink)
            .await;

        let report = reporter.on_teardown(run, &TestOutcome::teardown("test_a", None), &sink);
        assert_eq!(report, PhaseReport::default());
    }

    #[test]
    fn test_teardown_without_call_state_counts_as_passed() {
        let root = tempfile::tempdir().unwrap();
        artifact_folder(root.path(), "suite-test-a-chromium", &[TRACE_FILE_NAME]);
        let reporter = ArtifactReporter::new(root.path());
        let sink = RecordingSink::default();

        let report = reporter.on_teardown(RunId::new(), &TestOutcome::teardown("test_a", None), &sink);
        assert!(report.attachments.is_empty());
    }

    #[tokio::test]
    async fn test_report_dispatches_on_phase() {
        let root = tempfile::tempdir().unwrap();
        artifact_folder(root.path(), "suite-test-a-chromium", &[TRACE_FILE_NAME, VIDEO_FILE_NAME]);
        let page = Arc::new(MockPage::new("about:blank"));
        let fixtures = fixtures_with_page(page);
        let reporter = ArtifactReporter::new(root.path());
        let run = RunId::new();
        let sink = RecordingSink::default();

        reporter
            .report(run, &TestOutcome::call("test_a[chromium]", failure()), &fixtures, &sink)
            .await;
        reporter
            .report(run, &TestOutcome::teardown("test_a[chromium]", None), &fixtures, &sink)
            .await;

        assert_eq!(
            sink.names(),
            vec!["Screenshot_FAILED_Call", TRACE_ATTACHMENT_NAME, VIDEO_ATTACHMENT_NAME]
        );
    }
}
