pub mod allure;
pub mod artifacts;
pub mod json;
pub mod junit;
pub mod types;

use anyhow::Result;
use log::info;
use std::path::Path;

use allure::{load_results, AllureResult};
use types::RunResults;
use crate::runner::state::{TestRunReport, TestStatus};

fn label<'a>(result: &'a AllureResult, name: &str) -> Option<&'a str> {
    result
        .labels
        .iter()
        .find(|l| l.name == name)
        .map(|l| l.value.as_str())
}

/// Rebuild a run report from one Allure result file
pub fn report_from_allure(result: &AllureResult) -> TestRunReport {
    let method = label(result, "testMethod").unwrap_or(&result.name);
    let name = match result.parameters.iter().find(|p| p.name == "browser_name") {
        Some(browser) => format!("{}[{}]", method, browser.value),
        None => method.to_string(),
    };
    let class_name = match (label(result, "package"), label(result, "testClass")) {
        (Some(package), Some(class)) => format!("{}.{}", package, class),
        (None, Some(class)) => class.to_string(),
        _ => result.full_name.clone(),
    };
    let status = result.status.unwrap_or(TestStatus::Broken);
    let message = result.status_details.as_ref().map(|d| d.message.clone());

    TestRunReport {
        name,
        class_name,
        status,
        duration_ms: result
            .stop
            .map(|stop| (stop - result.start).max(0) as u64)
            .unwrap_or(0),
        error: if status.is_failure() { message.clone() } else { None },
        skip_reason: if status == TestStatus::Skipped { message } else { None },
    }
}

/// Regenerate `junit.xml` and `results.json` from an Allure results directory
pub fn generate_report(alluredir: &Path, output_dir: &Path) -> Result<RunResults> {
    let mut allure_results = load_results(alluredir)?;
    allure_results.sort_by_key(|r| r.start);
    info!(
        "Loaded {} Allure results from {}",
        allure_results.len(),
        alluredir.display()
    );

    let session_id = uuid::Uuid::new_v4().to_string();
    let tests = allure_results.iter().map(report_from_allure).collect();
    let results = RunResults::new(&session_id, tests);

    std::fs::create_dir_all(output_dir)?;
    junit::write_report(&results, output_dir)?;
    json::write_report(&results, output_dir)?;
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::allure::{AllureResultsWriter, Label, Parameter, TestMetadata};
    use crate::report::types::FailureDetail;
    use tempfile::TempDir;

    fn metadata(method: &str) -> TestMetadata {
        TestMetadata {
            name: "Reset password with empty email".to_string(),
            full_name: format!("test_customer_login_page.TestCustomerLoginPage#{}", method),
            description: None,
            labels: vec![
                Label::new("package", "test_customer_login_page"),
                Label::new("testClass", "TestCustomerLoginPage"),
                Label::new("testMethod", method),
            ],
            parameters: vec![Parameter {
                name: "browser_name".to_string(),
                value: "chromium".to_string(),
            }],
        }
    }

    #[test]
    fn test_generate_report_from_allure_results() {
        let allure_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();
        let writer = AllureResultsWriter::new(allure_dir.path()).unwrap();

        writer
            .start_test(metadata("test_reset_password_with_empty_email"))
            .finish(TestStatus::Passed, None)
            .unwrap();
        writer
            .start_test(metadata("test_cancel_reset_password_with_button"))
            .finish(
                TestStatus::Failed,
                Some(&FailureDetail::new("modal still visible", "raw")),
            )
            .unwrap();

        let results = generate_report(allure_dir.path(), output_dir.path()).unwrap();

        assert_eq!(results.summary.total, 2);
        assert_eq!(results.summary.failed, 1);
        let failed = results
            .tests
            .iter()
            .find(|t| t.status == TestStatus::Failed)
            .unwrap();
        assert_eq!(failed.name, "test_cancel_reset_password_with_button[chromium]");
        assert_eq!(failed.class_name, "test_customer_login_page.TestCustomerLoginPage");
        assert_eq!(failed.error.as_deref(), Some("raw"));
        assert!(output_dir.path().join(junit::JUNIT_FILE_NAME).exists());
        assert!(output_dir.path().join(json::RESULTS_FILE_NAME).exists());
    }
}
