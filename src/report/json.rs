use anyhow::Result;
use log::info;
use std::path::{Path, PathBuf};

use super::types::RunResults;

pub const RESULTS_FILE_NAME: &str = "results.json";

/// Write `results.json` into `output_dir`
pub fn write_report(results: &RunResults, output_dir: &Path) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(results)?;
    let path = output_dir.join(RESULTS_FILE_NAME);
    std::fs::write(&path, json)?;
    info!("JSON report saved to: {}", path.display());
    Ok(path)
}

pub fn read_report(path: &Path) -> Result<RunResults> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::state::{TestRunReport, TestStatus};
    use tempfile::TempDir;

    #[test]
    fn test_results_file_is_camel_case() {
        let dir = TempDir::new().unwrap();
        let results = RunResults::new(
            "session-1",
            vec![TestRunReport {
                name: "test_signup_form_submission_success[chromium]".to_string(),
                class_name: "test_customer_signup_page.TestCustomerSignupPage".to_string(),
                status: TestStatus::Passed,
                duration_ms: 42,
                error: None,
                skip_reason: None,
            }],
        );

        let path = write_report(&results, dir.path()).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"sessionId\": \"session-1\""));
        assert!(raw.contains("\"totalDurationMs\": 42"));

        let loaded = read_report(&path).unwrap();
        assert_eq!(loaded.summary.passed, 1);
    }
}
