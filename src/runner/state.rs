use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Identity of a single test invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(uuid::Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the call phase leaves behind for the teardown phase of the same invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPhaseState {
    pub failed: bool,
}

/// Per-invocation phase state, keyed by run ID
///
/// An entry is written once at call phase and taken once at teardown, so concurrent
/// invocations never see each other's state.
#[derive(Default)]
pub struct PhaseStates {
    entries: Mutex<HashMap<RunId, CallPhaseState>>,
}

impl PhaseStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, run_id: RunId, state: CallPhaseState) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(run_id, state);
        }
    }

    /// Remove and return the call-phase state of `run_id`
    pub fn take(&self, run_id: RunId) -> Option<CallPhaseState> {
        self.entries
            .lock()
            .ok()
            .and_then(|mut entries| entries.remove(&run_id))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Final status of a test invocation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    /// Could not run (browser failed to start, fixture error)
    Broken,
    Skipped,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Broken => "broken",
            TestStatus::Skipped => "skipped",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TestStatus::Failed | TestStatus::Broken)
    }
}

/// Serializable result of one test invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunReport {
    pub name: String,
    pub class_name: String,
    pub status: TestStatus,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub skip_reason: Option<String>,
}

/// Aggregate counts for a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub session_id: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub broken: usize,
    pub skipped: usize,
    pub total_duration_ms: u64,
}

impl RunSummary {
    pub fn from_reports(session_id: &str, reports: &[TestRunReport]) -> Self {
        let count = |status: TestStatus| reports.iter().filter(|r| r.status == status).count();
        Self {
            session_id: session_id.to_string(),
            total: reports.len(),
            passed: count(TestStatus::Passed),
            failed: count(TestStatus::Failed),
            broken: count(TestStatus::Broken),
            skipped: count(TestStatus::Skipped),
            total_duration_ms: reports.iter().map(|r| r.duration_ms).sum(),
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed + self.broken > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_state_is_taken_once() {
        let states = PhaseStates::new();
        let run = RunId::new();
        states.record(run, CallPhaseState { failed: true });

        assert_eq!(states.take(run), Some(CallPhaseState { failed: true }));
        assert_eq!(states.take(run), None);
        assert!(states.is_empty());
    }

    #[test]
    fn test_phase_states_are_isolated_per_run() {
        let states = PhaseStates::new();
        let failing = RunId::new();
        let passing = RunId::new();
        states.record(failing, CallPhaseState { failed: true });
        states.record(passing, CallPhaseState { failed: false });

        assert_eq!(states.take(passing), Some(CallPhaseState { failed: false }));
        assert_eq!(states.take(failing), Some(CallPhaseState { failed: true }));
    }

    #[test]
    fn test_summary_counts() {
        let report = |status| TestRunReport {
            name: "t".to_string(),
            class_name: "c".to_string(),
            status,
            duration_ms: 10,
            error: None,
            skip_reason: None,
        };
        let reports = vec![
            report(TestStatus::Passed),
            report(TestStatus::Failed),
            report(TestStatus::Broken),
            report(TestStatus::Skipped),
        ];
        let summary = RunSummary::from_reports("s", &reports);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.broken, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.total_duration_ms, 40);
        assert!(summary.has_failures());
    }
}
