//! Allure results writer
//!
//! Produces the `allure-results` directory layout consumed by `allure generate`:
//! one `<uuid>-result.json` per test and one `<uuid>-attachment.<ext>` per attachment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::types::{Attachment, AttachmentPayload, AttachmentSink, FailureDetail};
use crate::runner::state::TestStatus;

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub value: String,
}

impl Label {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDetails {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

impl From<&FailureDetail> for StatusDetails {
    fn from(detail: &FailureDetail) -> Self {
        Self {
            message: detail.summary(),
            trace: Some(detail.raw.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllureAttachment {
    pub name: String,
    pub source: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllureStep {
    pub name: String,
    pub status: Option<TestStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_details: Option<StatusDetails>,
    pub stage: String,
    pub start: i64,
    pub stop: Option<i64>,
    pub steps: Vec<AllureStep>,
    pub attachments: Vec<AllureAttachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllureResult {
    pub uuid: String,
    pub history_id: String,
    pub test_case_id: String,
    pub name: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: Option<TestStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_details: Option<StatusDetails>,
    pub stage: String,
    pub start: i64,
    pub stop: Option<i64>,
    pub labels: Vec<Label>,
    pub parameters: Vec<Parameter>,
    pub steps: Vec<AllureStep>,
    pub attachments: Vec<AllureAttachment>,
}

/// Static description of a test, used to open its result
#[derive(Debug, Clone, Default)]
pub struct TestMetadata {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub labels: Vec<Label>,
    pub parameters: Vec<Parameter>,
}

/// Owns the results directory
pub struct AllureResultsWriter {
    dir: PathBuf,
}

impl AllureResultsWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Remove results left over from earlier runs
    pub fn clean(&self) -> Result<()> {
        for entry in std::fs::read_dir(&self.dir)?.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_file() {
                std::fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
            }
        }
        Ok(())
    }

    pub fn start_test(&self, meta: TestMetadata) -> AllureTest {
        let history_id = history_id(&meta.full_name, &meta.parameters);
        let result = AllureResult {
            uuid: uuid::Uuid::new_v4().to_string(),
            history_id: history_id.clone(),
            test_case_id: history_id,
            name: meta.name,
            full_name: meta.full_name,
            description: meta.description,
            status: None,
            status_details: None,
            stage: "running".to_string(),
            start: now_ms(),
            stop: None,
            labels: meta.labels,
            parameters: meta.parameters,
            steps: Vec::new(),
            attachments: Vec::new(),
        };

        AllureTest {
            dir: self.dir.clone(),
            inner: Mutex::new(TestRecord {
                result,
                open_steps: Vec::new(),
            }),
        }
    }
}

/// Stable identifier of a test across runs: name-based UUID of the full name plus
/// parameter values
fn history_id(full_name: &str, parameters: &[Parameter]) -> String {
    let mut key = full_name.to_string();
    for p in parameters {
        key.push_str(&format!("\n{}={}", p.name, p.value));
    }
    uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, key.as_bytes())
        .simple()
        .to_string()
}

struct TestRecord {
    result: AllureResult,
    open_steps: Vec<AllureStep>,
}

impl TestRecord {
    fn push_attachment(&mut self, attachment: AllureAttachment) {
        match self.open_steps.last_mut() {
            Some(step) => step.attachments.push(attachment),
            None => self.result.attachments.push(attachment),
        }
    }

    fn close_step(&mut self, status: TestStatus, details: Option<StatusDetails>) {
        let Some(mut step) = self.open_steps.pop() else {
            return;
        };
        step.status = Some(status);
        step.status_details = details;
        step.stage = "finished".to_string();
        step.stop = Some(now_ms());
        match self.open_steps.last_mut() {
            Some(parent) => parent.steps.push(step),
            None => self.result.steps.push(step),
        }
    }
}

/// Result of a single test while it is being recorded
pub struct AllureTest {
    dir: PathBuf,
    inner: Mutex<TestRecord>,
}

impl AllureTest {
    fn lock(&self) -> std::sync::MutexGuard<'_, TestRecord> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn start_step(&self, name: &str) {
        self.lock().open_steps.push(AllureStep {
            name: name.to_string(),
            status: None,
            status_details: None,
            stage: "running".to_string(),
            start: now_ms(),
            stop: None,
            steps: Vec::new(),
            attachments: Vec::new(),
        });
    }

    pub fn stop_step(&self, status: TestStatus, message: Option<String>) {
        let details = message.map(|message| StatusDetails {
            message,
            trace: None,
        });
        self.lock().close_step(status, details);
    }

    /// Close steps a body left open (it panicked mid-step). Later attachments then land
    /// on the test itself.
    pub fn close_open_steps(&self, status: TestStatus) {
        let mut record = self.lock();
        while !record.open_steps.is_empty() {
            record.close_step(status, None);
        }
    }

    /// Close the result and write `<uuid>-result.json`
    pub fn finish(&self, status: TestStatus, failure: Option<&FailureDetail>) -> Result<PathBuf> {
        self.close_open_steps(TestStatus::Broken);
        let mut record = self.lock();
        record.result.status = Some(status);
        record.result.status_details = failure.map(StatusDetails::from);
        record.result.stage = "finished".to_string();
        record.result.stop = Some(now_ms());

        let path = self.dir.join(format!("{}-result.json", record.result.uuid));
        let json = serde_json::to_string_pretty(&record.result)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn snapshot(&self) -> AllureResult {
        self.lock().result.clone()
    }
}

impl AttachmentSink for AllureTest {
    fn attach(&self, attachment: Attachment) -> Result<()> {
        let source = format!(
            "{}-attachment.{}",
            uuid::Uuid::new_v4(),
            attachment.kind.extension()
        );
        let target = self.dir.join(&source);

        match &attachment.payload {
            AttachmentPayload::Bytes(bytes) => std::fs::write(&target, bytes)
                .with_context(|| format!("Failed to write {}", target.display()))?,
            AttachmentPayload::File(path) => {
                std::fs::copy(path, &target)
                    .with_context(|| format!("Failed to copy {}", path.display()))?;
            }
        }

        self.lock().push_attachment(AllureAttachment {
            name: attachment.name,
            source,
            mime_type: attachment.kind.mime_type().to_string(),
        });
        Ok(())
    }
}

/// Read every `*-result.json` in `dir`
pub fn load_results(dir: &Path) -> Result<Vec<AllureResult>> {
    let mut results = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        let is_result = path
            .file_name()
            .map(|n| n.to_string_lossy().ends_with("-result.json"))
            .unwrap_or(false);
        if !is_result {
            continue;
        }
        let content = std::fs::read_to_string(&path)?;
        let result: AllureResult = serde_json::from_str(&content)
            .with_context(|| format!("Invalid result file {}", path.display()))?;
        results.push(result);
    }
    results.sort_by_key(|r| r.start);
    Ok(results)
}
