use anyhow::Result;
use log::{debug, error, info};
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use super::expect::ExpectationError;
use super::state::{RunId, TestStatus};
use crate::driver::traits::{BrowserPage, PageProvider, ScreenshotOptions};
use crate::report::allure::AllureTest;
use crate::report::types::{Attachment, AttachmentKind, AttachmentSink};
use crate::utils::config::RunConfig;

/// Name under which the raw browser page is registered
pub const PAGE_FIXTURE: &str = "page";

pub enum FixtureValue {
    Page(Arc<dyn BrowserPage>),
    Provider(Arc<dyn PageProvider>),
}

/// Fixtures requested by one test invocation, in request order
#[derive(Default)]
pub struct FixtureSet {
    entries: Mutex<Vec<(String, FixtureValue)>>,
}

impl FixtureSet {
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, FixtureValue)>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register the direct `page` fixture. Registering twice keeps the first page.
    pub fn register_page(&self, page: Arc<dyn BrowserPage>) {
        let mut entries = self.lock();
        if entries.iter().any(|(name, _)| name == PAGE_FIXTURE) {
            return;
        }
        entries.push((PAGE_FIXTURE.to_string(), FixtureValue::Page(page)));
    }

    pub fn register_provider(&self, name: &str, provider: Arc<dyn PageProvider>) {
        self.lock()
            .push((name.to_string(), FixtureValue::Provider(provider)));
    }

    pub fn names(&self) -> Vec<String> {
        self.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    /// The direct `page` fixture if requested, otherwise the page of the first
    /// page-object fixture that exposes one
    pub fn resolve_page(&self) -> Option<Arc<dyn BrowserPage>> {
        let entries = self.lock();
        let direct = entries.iter().find_map(|(_, value)| match value {
            FixtureValue::Page(page) => Some(page.clone()),
            FixtureValue::Provider(_) => None,
        });
        if direct.is_some() {
            return direct;
        }

        entries.iter().find_map(|(_, value)| match value {
            FixtureValue::Provider(provider) => provider.page(),
            FixtureValue::Page(_) => None,
        })
    }
}

/// What a page object needs to be constructed
#[derive(Clone)]
pub struct PageEnv {
    pub page: Arc<dyn BrowserPage>,
    pub sink: Arc<dyn AttachmentSink>,
    pub base_url: String,
}

/// Everything a scenario body can reach during one test invocation
pub struct ScenarioContext {
    pub run_id: RunId,
    pub test_name: String,
    config: Arc<RunConfig>,
    page: Arc<dyn BrowserPage>,
    recorder: Arc<AllureTest>,
    fixtures: FixtureSet,
    instances: Mutex<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl ScenarioContext {
    pub fn new(
        run_id: RunId,
        test_name: impl Into<String>,
        config: Arc<RunConfig>,
        page: Arc<dyn BrowserPage>,
        recorder: Arc<AllureTest>,
    ) -> Self {
        Self {
            run_id,
            test_name: test_name.into(),
            config,
            page,
            recorder,
            fixtures: FixtureSet::default(),
            instances: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// The raw browser page. Requesting it registers the `page` fixture.
    pub fn page(&self) -> Arc<dyn BrowserPage> {
        self.fixtures.register_page(self.page.clone());
        self.page.clone()
    }

    pub fn fixtures(&self) -> &FixtureSet {
        &self.fixtures
    }

    pub fn sink(&self) -> Arc<dyn AttachmentSink> {
        self.recorder.clone()
    }

    pub fn env(&self) -> PageEnv {
        PageEnv {
            page: self.page.clone(),
            sink: self.sink(),
            base_url: self.config.base_url.clone(),
        }
    }

    /// Page-object fixture, built on first request and shared for the rest of the test
    pub fn fixture<T, F>(&self, name: &str, make: F) -> Arc<T>
    where
        T: PageProvider + 'static,
        F: FnOnce(PageEnv) -> T,
    {
        let cached = self
            .instances
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned();
        if let Some(existing) = cached.and_then(|any| any.downcast::<T>().ok()) {
            return existing;
        }

        debug!("[CONFIG] Initializing {} fixture", name);
        let instance = Arc::new(make(self.env()));
        self.instances
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), instance.clone());
        self.fixtures.register_provider(name, instance.clone());
        instance
    }

    /// Run `body` as a named report step
    pub async fn step<T, Fut>(&self, name: &str, body: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        self.recorder.start_step(name);
        let result = body.await;
        match &result {
            Ok(_) => self.recorder.stop_step(TestStatus::Passed, None),
            Err(e) => {
                let status = if e.downcast_ref::<ExpectationError>().is_some() {
                    TestStatus::Failed
                } else {
                    TestStatus::Broken
                };
                error!("[ERROR] Step '{}' {}: {:#}", name, status.as_str(), e);
                self.recorder.stop_step(status, Some(format!("{:#}", e)));
            }
        }
        result
    }

    pub fn attach_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.recorder
            .attach(Attachment::bytes(name, AttachmentKind::Json, json.into_bytes()))
    }

    /// Full-page screenshot with animations disabled, attached under `name`
    pub async fn attach_screenshot(&self, name: &str) -> Result<()> {
        let png = self.page.screenshot(ScreenshotOptions::default()).await?;
        self.recorder
            .attach(Attachment::bytes(name, AttachmentKind::Png, png))?;
        info!("[ATTACH] Screenshot '{}' attached", name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::MockPage;
    use crate::report::allure::AllureResultsWriter;
    use crate::runner::expect::verify_equal;

    struct Holder(Arc<dyn BrowserPage>);

    impl PageProvider for Holder {
        fn page(&self) -> Option<Arc<dyn BrowserPage>> {
            Some(self.0.clone())
        }
    }

    struct Detached;

    impl PageProvider for Detached {
        fn page(&self) -> Option<Arc<dyn BrowserPage>> {
            None
        }
    }

    fn context(dir: &std::path::Path) -> (ScenarioContext, Arc<AllureTest>) {
        let writer = AllureResultsWriter::new(dir).unwrap();
        let recorder = Arc::new(writer.start_test(Default::default()));
        let ctx = ScenarioContext::new(
            RunId::new(),
            "test_a[chromium]",
            Arc::new(RunConfig::default()),
            Arc::new(MockPage::new("about:blank")),
            recorder.clone(),
        );
        (ctx, recorder)
    }

    #[test]
    fn test_direct_page_wins_over_providers() {
        let direct: Arc<dyn BrowserPage> = Arc::new(MockPage::new("direct"));
        let other: Arc<dyn BrowserPage> = Arc::new(MockPage::new("other"));
        let fixtures = FixtureSet::default();
        fixtures.register_provider("customer_login_page", Arc::new(Holder(other)));
        fixtures.register_page(direct.clone());

        let resolved = fixtures.resolve_page().unwrap();
        assert!(Arc::ptr_eq(&resolved, &direct));
    }

    #[test]
    fn test_first_provider_with_a_page_is_used() {
        let page: Arc<dyn BrowserPage> = Arc::new(MockPage::new("login"));
        let fixtures = FixtureSet::default();
        fixtures.register_provider("detached", Arc::new(Detached));
        fixtures.register_provider("customer_login_page", Arc::new(Holder(page.clone())));

        let resolved = fixtures.resolve_page().unwrap();
        assert!(Arc::ptr_eq(&resolved, &page));
        assert_eq!(fixtures.names(), vec!["detached", "customer_login_page"]);
    }

    #[test]
    fn test_no_fixtures_resolve_nothing() {
        assert!(FixtureSet::default().resolve_page().is_none());
    }

    #[test]
    fn test_fixture_is_built_once() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _) = context(dir.path());
        let mut builds = 0;

        let first = ctx.fixture("customer_login_page", |env| {
            builds += 1;
            Holder(env.page)
        });
        let second = ctx.fixture("customer_login_page", |env| Holder(env.page));

        assert_eq!(builds, 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(ctx.fixtures().names(), vec!["customer_login_page"]);
    }

    #[test]
    fn test_requesting_page_registers_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _) = context(dir.path());
        ctx.page();
        ctx.page();
        assert_eq!(ctx.fixtures().names(), vec![PAGE_FIXTURE]);
    }

    #[tokio::test]
    async fn test_step_status_follows_error_kind() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, recorder) = context(dir.path());

        ctx.step("Step 1: ok", async { Ok(()) }).await.unwrap();
        let failed: Result<()> = ctx
            .step("Step 2: assertion", async { verify_equal("a", Some("b")) })
            .await;
        let broken: Result<()> = ctx
            .step("Step 3: driver", async { anyhow::bail!("page crashed") })
            .await;
        assert!(failed.is_err());
        assert!(broken.is_err());

        let steps = recorder.snapshot().steps;
        assert_eq!(steps[0].status, Some(TestStatus::Passed));
        assert_eq!(steps[1].status, Some(TestStatus::Failed));
        assert_eq!(steps[2].status, Some(TestStatus::Broken));
    }

    #[tokio::test]
    async fn test_attachments_go_to_recorder() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, recorder) = context(dir.path());

        ctx.attach_json("Data_Input_Login", &serde_json::json!({"email": "a@b.c"}))
            .unwrap();
        ctx.attach_screenshot("Screenshot_Open_Modal").await.unwrap();

        let names: Vec<String> = recorder
            .snapshot()
            .attachments
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Data_Input_Login", "Screenshot_Open_Modal"]);
    }
}
