pub mod context;
pub mod expect;
pub mod scenario;
pub mod state;

use anyhow::{Context, Result};
use colored::Colorize;
use futures::{stream, FutureExt, StreamExt};
use log::{debug, info, warn};
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::driver::web::WebDriver;
use crate::driver::PageFactory;
use crate::report::allure::{AllureResultsWriter, AllureTest};
use crate::report::artifacts::ArtifactReporter;
use crate::report::types::{FailureDetail, RunResults, TestOutcome};
use crate::report::{json, junit};
use crate::scenarios;
use crate::utils::config::{RunConfig, VideoMode};
use context::ScenarioContext;
use expect::{failure_from_error, failure_from_panic, status_for_error};
use scenario::TestItem;

pub use state::*;

/// Start every run with an empty artifact directory so folder lookups only see
/// this run's invocations
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        debug!("[CONFIG] Removing previous artifacts in {}", dir.display());
        std::fs::remove_dir_all(dir)
            .with_context(|| format!("Failed to clean {}", dir.display()))?;
    }
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))
}

/// Executes test items against pages handed out by a [`PageFactory`]
pub struct Runner {
    config: Arc<RunConfig>,
    factory: Arc<dyn PageFactory>,
    reporter: ArtifactReporter,
    allure: AllureResultsWriter,
    session_id: String,
}

impl Runner {
    pub fn new(config: RunConfig, factory: Arc<dyn PageFactory>) -> Result<Self> {
        let allure = AllureResultsWriter::new(&config.alluredir)?;
        if config.clean_alluredir {
            info!("[CONFIG] Cleaning {}", config.alluredir.display());
            allure.clean()?;
        }
        prepare_output_dir(&config.output_dir)?;

        Ok(Self {
            reporter: ArtifactReporter::new(config.output_dir.clone()),
            config: Arc::new(config),
            factory,
            allure,
            session_id: uuid::Uuid::new_v4().to_string(),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Run `items` with at most `workers` invocations in flight. Reports keep the
    /// order of `items`.
    pub async fn run(&self, items: &[TestItem]) -> RunResults {
        let workers = self.config.workers.max(1);
        let reports: Vec<TestRunReport> = stream::iter(items)
            .map(|item| self.run_item(item))
            .buffered(workers)
            .collect()
            .await;
        RunResults::new(&self.session_id, reports)
    }

    /// Write `junit.xml` and `results.json` into the output directory
    pub fn write_reports(&self, results: &RunResults) -> Result<()> {
        junit::write_report(results, &self.config.output_dir)?;
        json::write_report(results, &self.config.output_dir)?;
        Ok(())
    }

    async fn run_item(&self, item: &TestItem) -> TestRunReport {
        let started = Instant::now();
        let recorder = Arc::new(self.allure.start_test(item.metadata()));
        println!("{} {}", "▶".cyan(), item.name);

        if let Some(reason) = item.scenario.skip {
            info!("[EVENT] Skipping {}: {}", item.name, reason);
            let detail = FailureDetail::new(reason, reason);
            return self.finish(item, &recorder, TestStatus::Skipped, Some(&detail), started);
        }

        let artifact_dir = self.config.output_dir.join(item.artifact_folder_name());
        let video_dir = self.config.records_video().then_some(artifact_dir.as_path());

        let page = match self.factory.open_page(item.browser, video_dir).await {
            Ok(page) => page,
            Err(e) => {
                let detail = failure_from_error(&e.context("Failed to open browser page"));
                return self.finish(item, &recorder, TestStatus::Broken, Some(&detail), started);
            }
        };

        let run_id = RunId::new();
        let ctx = ScenarioContext::new(
            run_id,
            item.name.clone(),
            self.config.clone(),
            page.clone(),
            recorder.clone(),
        );

        let (mut status, mut failure) =
            match AssertUnwindSafe((item.scenario.run)(&ctx)).catch_unwind().await {
                Ok(Ok(())) => (TestStatus::Passed, None),
                Ok(Err(e)) => (status_for_error(&e), Some(failure_from_error(&e))),
                Err(panic) => (TestStatus::Broken, Some(failure_from_panic(panic))),
            };
        recorder.close_open_steps(TestStatus::Broken);

        let call = TestOutcome::call(&item.name, failure.clone());
        self.reporter
            .report(run_id, &call, ctx.fixtures(), recorder.as_ref())
            .await;

        // Closing the context finalizes the video file
        let closed = page.close().await;
        let teardown_failure = match &closed {
            Ok(_) => None,
            Err(e) => {
                warn!("[WARNING] Failed to close page for {}: {:#}", item.name, e);
                Some(FailureDetail::new(format!("{:#}", e), format!("{:?}", e)))
            }
        };
        let teardown = TestOutcome::teardown(&item.name, teardown_failure.clone());
        self.reporter
            .report(run_id, &teardown, ctx.fixtures(), recorder.as_ref())
            .await;

        if status == TestStatus::Passed {
            if let Some(detail) = teardown_failure {
                status = TestStatus::Broken;
                failure = Some(detail);
            }
        }

        if status == TestStatus::Passed
            && self.config.video == VideoMode::RetainOnFailure
            && artifact_dir.exists()
        {
            debug!("[DEBUG] Removing artifacts of passing test: {}", artifact_dir.display());
            if let Err(e) = std::fs::remove_dir_all(&artifact_dir) {
                warn!("[WARNING] Could not remove {}: {}", artifact_dir.display(), e);
            }
        }

        self.finish(item, &recorder, status, failure.as_ref(), started)
    }

    fn finish(
        &self,
        item: &TestItem,
        recorder: &AllureTest,
        status: TestStatus,
        failure: Option<&FailureDetail>,
        started: Instant,
    ) -> TestRunReport {
        if let Err(e) = recorder.finish(status, failure) {
            warn!("[WARNING] Could not write Allure result for {}: {:#}", item.name, e);
        }

        let label = match status {
            TestStatus::Passed => "PASSED".green(),
            TestStatus::Failed => "FAILED".red(),
            TestStatus::Broken => "BROKEN".red().bold(),
            TestStatus::Skipped => "SKIPPED".yellow(),
        };
        println!("  {} {}", label, item.name);

        let message = failure.map(|f| f.summary());
        TestRunReport {
            name: item.name.clone(),
            class_name: item.class_name(),
            status,
            duration_ms: started.elapsed().as_millis() as u64,
            error: if status.is_failure() { message.clone() } else { None },
            skip_reason: if status == TestStatus::Skipped { message } else { None },
        }
    }
}

pub fn print_summary(summary: &RunSummary) {
    println!("\n{}", "═".repeat(50).dimmed());
    println!(
        "{} {} passed, {} failed, {} broken, {} skipped ({} total) in {:.2}s",
        if summary.has_failures() {
            "✗".red()
        } else {
            "✓".green()
        },
        summary.passed.to_string().green(),
        summary.failed.to_string().red(),
        summary.broken.to_string().red(),
        summary.skipped.to_string().yellow(),
        summary.total,
        summary.total_duration_ms as f64 / 1000.0
    );
}

/// Collect the registered scenarios, run them in real browsers and write the reports
pub async fn run_tests(
    config: RunConfig,
    keyword: Option<&str>,
    marker: Option<&str>,
) -> Result<RunResults> {
    let items = TestItem::collect(&scenarios::registry(), &config.browsers, keyword, marker);
    println!(
        "{} Collected {} test item(s) across {} browser(s)",
        "ℹ".blue(),
        items.len(),
        config.browsers.len()
    );

    let driver = WebDriver::new(config.web_driver_config()).await?;
    let runner = Runner::new(config, Arc::new(driver))?;
    let results = runner.run(&items).await;
    runner.write_reports(&results)?;
    print_summary(&results.summary);
    Ok(results)
}
