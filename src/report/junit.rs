use super::types::RunResults;
use crate::runner::state::{TestRunReport, TestStatus};
use anyhow::Result;
use log::info;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub const JUNIT_FILE_NAME: &str = "junit.xml";

fn seconds(ms: u64) -> String {
    (ms as f64 / 1000.0).to_string()
}

/// Generate JUnit XML report string from RunResults
pub fn generate_junit_xml(results: &RunResults) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let summary = &results.summary;
    let tests = summary.total.to_string();
    let failures = summary.failed.to_string();
    let errors = summary.broken.to_string();
    let skipped = summary.skipped.to_string();
    let time = seconds(summary.total_duration_ms);

    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", "phptravels-e2e-run"));
    suites_start.push_attribute(("tests", tests.as_str()));
    suites_start.push_attribute(("failures", failures.as_str()));
    suites_start.push_attribute(("errors", errors.as_str()));
    suites_start.push_attribute(("skipped", skipped.as_str()));
    suites_start.push_attribute(("time", time.as_str()));
    writer.write_event(Event::Start(suites_start))?;

    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", "e2e"));
    suite_start.push_attribute(("tests", tests.as_str()));
    suite_start.push_attribute(("failures", failures.as_str()));
    suite_start.push_attribute(("errors", errors.as_str()));
    suite_start.push_attribute(("skipped", skipped.as_str()));
    suite_start.push_attribute(("id", results.session_id.as_str()));
    suite_start.push_attribute(("time", time.as_str()));
    suite_start.push_attribute(("timestamp", results.generated_at.as_str()));
    writer.write_event(Event::Start(suite_start))?;

    for test in &results.tests {
        write_test_case(&mut writer, test)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let xml = String::from_utf8(writer.into_inner().into_inner())?;
    Ok(xml)
}

fn write_test_case<W: std::io::Write>(writer: &mut Writer<W>, test: &TestRunReport) -> Result<()> {
    let mut case_start = BytesStart::new("testcase");
    case_start.push_attribute(("name", test.name.as_str()));
    case_start.push_attribute(("classname", test.class_name.as_str()));
    case_start.push_attribute(("time", seconds(test.duration_ms).as_str()));
    writer.write_event(Event::Start(case_start))?;

    match test.status {
        TestStatus::Failed | TestStatus::Broken => {
            // Assertion failures and infrastructure errors are separate JUnit elements
            let (tag, kind) = if test.status == TestStatus::Failed {
                ("failure", "AssertionError")
            } else {
                ("error", "Error")
            };
            let message = test.error.as_deref().unwrap_or("Unknown error");
            let mut start = BytesStart::new(tag);
            start.push_attribute(("message", message));
            start.push_attribute(("type", kind));
            writer.write_event(Event::Start(start))?;
            if let Some(err) = &test.error {
                writer.write_event(Event::Text(BytesText::new(err)))?;
            }
            writer.write_event(Event::End(BytesEnd::new(tag)))?;
        }
        TestStatus::Skipped => {
            let mut start = BytesStart::new("skipped");
            if let Some(reason) = &test.skip_reason {
                start.push_attribute(("message", reason.as_str()));
            }
            writer.write_event(Event::Empty(start))?;
        }
        TestStatus::Passed => {}
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// Write `junit.xml` into `output_dir`
pub fn write_report(results: &RunResults, output_dir: &Path) -> Result<PathBuf> {
    let xml = generate_junit_xml(results)?;
    let path = output_dir.join(JUNIT_FILE_NAME);
    std::fs::write(&path, xml)?;
    info!("Generated JUnit report: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(name: &str, status: TestStatus, error: Option<&str>) -> TestRunReport {
        TestRunReport {
            name: name.to_string(),
            class_name: "test_customer_login_page.TestCustomerLoginPage".to_string(),
            status,
            duration_ms: 1500,
            error: error.map(str::to_string),
            skip_reason: None,
        }
    }

    #[test]
    fn test_generate_junit_xml() {
        let mut skipped = report(
            "test_remember_me_checkbox_is_checkable[chromium]",
            TestStatus::Skipped,
            None,
        );
        skipped.skip_reason = Some("Checkbox input is hidden".to_string());
        let results = RunResults::new(
            "test-session",
            vec![
                report("test_login_with_not_existed_account[chromium]", TestStatus::Passed, None),
                report(
                    "test_reset_password_with_empty_email[chromium]",
                    TestStatus::Failed,
                    Some("Expected: a, but got: b"),
                ),
                report(
                    "test_login_with_unactivated_account[firefox]",
                    TestStatus::Broken,
                    Some("browser crashed"),
                ),
                skipped,
            ],
        );

        let xml = generate_junit_xml(&results).expect("Failed to generate XML");

        assert!(xml.contains(r#"<testsuites name="phptravels-e2e-run""#));
        assert!(xml.contains(r#"tests="4""#));
        assert!(xml.contains(r#"failures="1""#));
        assert!(xml.contains(r#"errors="1""#));
        assert!(xml.contains(r#"skipped="1""#));
        assert!(xml.contains(r#"<testcase name="test_login_with_not_existed_account[chromium]""#));
        assert!(xml.contains(r#"message="Expected: a, but got: b""#));
        assert!(xml.contains(r#"<error message="browser crashed" type="Error">"#));
        assert!(xml.contains(r#"<skipped message="Checkbox input is hidden"/>"#));
    }
}
