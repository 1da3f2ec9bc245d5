use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::runner::state::{RunSummary, TestRunReport};

/// Attachment type tag understood by the reporting backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Png,
    Zip,
    Webm,
    Json,
    Text,
}

impl AttachmentKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            AttachmentKind::Png => "image/png",
            AttachmentKind::Zip => "application/zip",
            AttachmentKind::Webm => "video/webm",
            AttachmentKind::Json => "application/json",
            AttachmentKind::Text => "text/plain",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AttachmentKind::Png => "png",
            AttachmentKind::Zip => "zip",
            AttachmentKind::Webm => "webm",
            AttachmentKind::Json => "json",
            AttachmentKind::Text => "txt",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentPayload {
    Bytes(Vec<u8>),
    File(PathBuf),
}

/// A piece of evidence for a test result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub kind: AttachmentKind,
    pub payload: AttachmentPayload,
}

impl Attachment {
    pub fn bytes(name: impl Into<String>, kind: AttachmentKind, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            kind,
            payload: AttachmentPayload::Bytes(bytes),
        }
    }

    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::bytes(name, AttachmentKind::Text, text.into().into_bytes())
    }

    pub fn file(name: impl Into<String>, kind: AttachmentKind, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind,
            payload: AttachmentPayload::File(path.into()),
        }
    }
}

/// Receives attachments for the test currently being reported
pub trait AttachmentSink: Send + Sync {
    fn attach(&self, attachment: Attachment) -> Result<()>;
}

/// Lifecycle point of a test invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestPhase {
    Call,
    Teardown,
}

/// Source position of a failed assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashLocation {
    pub path: String,
    pub line: u32,
}

impl From<&std::panic::Location<'_>> for CrashLocation {
    fn from(location: &std::panic::Location<'_>) -> Self {
        Self {
            path: location.file().to_string(),
            line: location.line(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetail {
    pub message: String,
    pub location: Option<CrashLocation>,
    /// Full failure representation (error chain or panic payload)
    pub raw: String,
}

impl FailureDetail {
    pub fn new(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            raw: raw.into(),
        }
    }

    pub fn with_location(mut self, location: CrashLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// One-line crash summary, `<message> (at <path>:<line>)` when the location is known
    pub fn summary(&self) -> String {
        match &self.location {
            Some(loc) => format!("{} (at {}:{})", self.message, loc.path, loc.line),
            None => self.raw.clone(),
        }
    }
}

/// Result of one phase of a test invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub test_name: String,
    pub phase: TestPhase,
    pub passed: bool,
    pub failure: Option<FailureDetail>,
}

impl TestOutcome {
    pub fn new(test_name: &str, phase: TestPhase, failure: Option<FailureDetail>) -> Self {
        Self {
            test_name: test_name.to_string(),
            phase,
            passed: failure.is_none(),
            failure,
        }
    }

    pub fn call(test_name: &str, failure: Option<FailureDetail>) -> Self {
        Self::new(test_name, TestPhase::Call, failure)
    }

    pub fn teardown(test_name: &str, failure: Option<FailureDetail>) -> Self {
        Self::new(test_name, TestPhase::Teardown, failure)
    }

    pub fn status_label(&self) -> &'static str {
        if self.passed {
            "PASSED"
        } else {
            "FAILED"
        }
    }
}

/// Everything written to `results.json` at the end of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResults {
    pub session_id: String,
    pub tests: Vec<TestRunReport>,
    pub summary: RunSummary,
    pub generated_at: String,
}

impl RunResults {
    pub fn new(session_id: &str, tests: Vec<TestRunReport>) -> Self {
        Self {
            session_id: session_id.to_string(),
            summary: RunSummary::from_reports(session_id, &tests),
            tests,
            generated_at: chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}

#[cfg(test)]
pub use recording::RecordingSink;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_summary_prefers_location() {
        let detail = FailureDetail::new("Expected URL", "full chain").with_location(CrashLocation {
            path: "src/scenarios/customer_login.rs".to_string(),
            line: 42,
        });
        assert_eq!(
            detail.summary(),
            "Expected URL (at src/scenarios/customer_login.rs:42)"
        );

        let raw = FailureDetail::new("boom", "boom\n\nCaused by: io");
        assert_eq!(raw.summary(), "boom\n\nCaused by: io");
    }

    #[test]
    fn test_outcome_passed_follows_failure() {
        assert!(TestOutcome::call("test_a", None).passed);
        let failed = TestOutcome::teardown("test_a", Some(FailureDetail::new("x", "x")));
        assert!(!failed.passed);
        assert_eq!(failed.status_label(), "FAILED");
        assert_eq!(failed.phase, TestPhase::Teardown);
    }
}
