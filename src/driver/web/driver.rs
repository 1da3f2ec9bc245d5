//! Web driver implementation using Playwright
//!
//! One Playwright instance and one browser per engine are shared by the whole run.
//! Every test invocation gets its own browser context and page.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use playwright::api::browser_type::RecordVideo;
use playwright::api::frame::Frame;
use playwright::api::{Browser, BrowserContext, Page, ScreenshotType, Viewport};
use playwright::Playwright;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::driver::traits::{
    BrowserPage, DialogHandle, DialogKind, Locator, ScreenshotOptions, WaitState,
};
use crate::driver::{BrowserType, PageFactory};
use crate::report::artifacts::VIDEO_FILE_NAME;

/// Installed on every new document. Native dialogs are answered immediately (accept
/// semantics) and queued so the test can inspect them.
const DIALOG_CAPTURE_SCRIPT: &str = r#"
(() => {
    if (window.__e2eDialogs) return;
    window.__e2eDialogs = [];
    const record = (type, message, answer) => {
        window.__e2eDialogs.push({ type, message: String(message ?? '') });
        return answer;
    };
    window.alert = (message) => { record('alert', message, undefined); };
    window.confirm = (message) => record('confirm', message, true);
    window.prompt = (message, value) => record('prompt', message, value ?? '');
})();
"#;

const NEXT_DIALOG_EXPRESSION: &str = "(window.__e2eDialogs || []).shift() || null";

const DISABLE_ANIMATIONS_SCRIPT: &str = r#"
(() => {
    if (document.getElementById('__e2e_no_animations')) return;
    const style = document.createElement('style');
    style.id = '__e2e_no_animations';
    style.textContent = '*, *::before, *::after { animation: none !important; transition: none !important; caret-color: transparent !important; }';
    (document.head || document.documentElement).appendChild(style);
})()
"#;

const POLL_INTERVAL_MS: u64 = 100;

/// Web driver configuration
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Default timeout for clicks and fills (ms)
    pub action_timeout_ms: u64,
    /// Explicit browser executable (Chromium only)
    pub executable: Option<PathBuf>,
}

/// Shared Playwright handle with one lazily launched browser per engine
pub struct WebDriver {
    playwright: Arc<Playwright>,
    browsers: Mutex<HashMap<BrowserType, Arc<Browser>>>,
    config: WebDriverConfig,
}

impl WebDriver {
    pub async fn new(config: WebDriverConfig) -> Result<Self> {
        let playwright = Playwright::initialize()
            .await
            .context("Failed to initialize Playwright")?;

        Ok(Self {
            playwright: Arc::new(playwright),
            browsers: Mutex::new(HashMap::new()),
            config,
        })
    }

    async fn browser(&self, kind: BrowserType) -> Result<Arc<Browser>> {
        let mut browsers = self.browsers.lock().await;
        if let Some(browser) = browsers.get(&kind) {
            return Ok(browser.clone());
        }

        info!("[CONFIG] Launching {} (headless: {})", kind, self.config.headless);
        let browser = match kind {
            BrowserType::Chromium => {
                launch_chromium_browser(&self.playwright.chromium(), &self.config).await?
            }
            BrowserType::Firefox => {
                self.playwright
                    .firefox()
                    .launcher()
                    .headless(self.config.headless)
                    .launch()
                    .await?
            }
            BrowserType::Webkit => {
                self.playwright
                    .webkit()
                    .launcher()
                    .headless(self.config.headless)
                    .launch()
                    .await?
            }
        };

        let browser = Arc::new(browser);
        browsers.insert(kind, browser.clone());
        Ok(browser)
    }
}

#[async_trait]
impl PageFactory for WebDriver {
    async fn open_page(
        &self,
        browser: BrowserType,
        video_dir: Option<&Path>,
    ) -> Result<Arc<dyn BrowserPage>> {
        let browser = self.browser(browser).await?;

        let context = match video_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
                browser
                    .context_builder()
                    .record_video(RecordVideo { dir, size: None })
                    .build()
                    .await?
            }
            None => browser.context_builder().build().await?,
        };

        let page = context.new_page().await?;
        page.set_viewport_size(Viewport {
            width: self.config.viewport_width as i32,
            height: self.config.viewport_height as i32,
        })
        .await?;
        page.add_init_script(DIALOG_CAPTURE_SCRIPT).await?;

        Ok(Arc::new(WebPage {
            context,
            page: Mutex::new(page),
            video_dir: video_dir.map(Path::to_path_buf),
            action_timeout_ms: self.config.action_timeout_ms,
        }))
    }
}

/// A Playwright page owned by a single test invocation
pub struct WebPage {
    context: BrowserContext,
    page: Mutex<Page>,
    video_dir: Option<PathBuf>,
    action_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
struct CapturedDialog {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

/// Dialog already answered by the capture script
struct WebDialog {
    kind: DialogKind,
    message: String,
}

#[async_trait]
impl DialogHandle for WebDialog {
    fn kind(&self) -> DialogKind {
        self.kind
    }

    fn message(&self) -> &str {
        &self.message
    }

    async fn accept(&self) -> Result<()> {
        debug!("[DEBUG] Dialog '{}' accepted by capture script", self.message);
        Ok(())
    }
}

impl WebPage {
    /// Frame the locator resolves in, plus the selector inside that frame
    async fn target(&self, page: &Page, locator: &Locator) -> Result<(Frame, String)> {
        let (frame_locator, inner) = locator.frame_scope();
        let frame = match frame_locator {
            None => page.main_frame(),
            Some(frame_locator) => {
                let handle = page
                    .query_selector(&frame_locator.to_selector())
                    .await?
                    .with_context(|| format!("Frame element not found: {}", frame_locator))?;
                handle
                    .content_frame()
                    .await?
                    .with_context(|| format!("Element has no content frame: {}", frame_locator))?
            }
        };
        Ok((frame, inner.to_selector()))
    }

    async fn is_attached(&self, locator: &Locator) -> Result<bool> {
        let page = self.page.lock().await;
        let (frame, selector) = match self.target(&page, locator).await {
            Ok(target) => target,
            Err(_) => return Ok(false),
        };
        Ok(frame.query_selector(&selector).await?.is_some())
    }

    async fn poll_until<F, Fut>(&self, timeout_ms: u64, mut check: F) -> Result<bool>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<bool>>,
    {
        let start = Instant::now();
        loop {
            if check().await? {
                return Ok(true);
            }
            if start.elapsed() >= Duration::from_millis(timeout_ms) {
                return Ok(false);
            }
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
    }
}

#[async_trait]
impl BrowserPage for WebPage {
    async fn goto(&self, url: &str) -> Result<()> {
        let page = self.page.lock().await;
        page.goto_builder(url)
            .goto()
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let page = self.page.lock().await;
        let url: String = page.evaluate::<(), String>("window.location.href", ()).await?;
        Ok(url)
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        let page = self.page.lock().await;
        let (frame, selector) = self.target(&page, locator).await?;
        frame
            .click_builder(&selector)
            .timeout(self.action_timeout_ms as f64)
            .click()
            .await
            .with_context(|| format!("Failed to click {}", locator))?;
        Ok(())
    }

    async fn fill(&self, locator: &Locator, text: &str) -> Result<()> {
        let page = self.page.lock().await;
        let (frame, selector) = self.target(&page, locator).await?;
        frame
            .fill_builder(&selector, text)
            .timeout(self.action_timeout_ms as f64)
            .fill()
            .await
            .with_context(|| format!("Failed to fill {}", locator))?;
        Ok(())
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        let page = self.page.lock().await;
        let (frame, selector) = match self.target(&page, locator).await {
            Ok(target) => target,
            Err(_) => return Ok(false),
        };
        match frame.query_selector(&selector).await? {
            Some(element) => Ok(element.is_visible().await?),
            None => Ok(false),
        }
    }

    async fn is_checked(&self, locator: &Locator) -> Result<bool> {
        let page = self.page.lock().await;
        let (frame, selector) = self.target(&page, locator).await?;
        let checked = frame
            .evaluate_on_selector::<String, bool>(&selector, "el => !!el.checked", None::<String>)
            .await
            .with_context(|| format!("Failed to read checked state of {}", locator))?;
        Ok(checked)
    }

    async fn text_content(&self, locator: &Locator) -> Result<String> {
        let page = self.page.lock().await;
        let (frame, selector) = self.target(&page, locator).await?;
        let js = "el => el.value || el.innerText || el.textContent || ''";
        match frame
            .evaluate_on_selector::<String, _>(&selector, js, None::<String>)
            .await
        {
            Ok(text) => Ok(text),
            Err(_) => Ok(String::new()),
        }
    }

    async fn wait_for(&self, locator: &Locator, state: WaitState, timeout_ms: u64) -> Result<()> {
        let reached = match state {
            WaitState::Visible => {
                let page = self.page.lock().await;
                let (frame, selector) = self.target(&page, locator).await?;
                frame
                    .wait_for_selector_builder(&selector)
                    .timeout(timeout_ms as f64)
                    .wait_for_selector()
                    .await
                    .is_ok()
            }
            WaitState::Attached => {
                self.poll_until(timeout_ms, || self.is_attached(locator))
                    .await?
            }
            WaitState::Detached => {
                self.poll_until(timeout_ms, || async move {
                    anyhow::Ok(!self.is_attached(locator).await?)
                })
                .await?
            }
            WaitState::Hidden => {
                self.poll_until(timeout_ms, || async move {
                    anyhow::Ok(!self.is_visible(locator).await?)
                })
                .await?
            }
        };

        if !reached {
            anyhow::bail!(
                "Timeout {}ms exceeded waiting for {} to be {:?}",
                timeout_ms,
                locator,
                state
            );
        }
        Ok(())
    }

    async fn screenshot(&self, options: ScreenshotOptions) -> Result<Vec<u8>> {
        let page = self.page.lock().await;
        if options.animations_disabled {
            page.evaluate::<(), ()>(DISABLE_ANIMATIONS_SCRIPT, ())
                .await
                .context("Failed to disable animations")?;
        }
        let bytes = page
            .screenshot_builder()
            .r#type(ScreenshotType::Png)
            .full_page(options.full_page)
            .screenshot()
            .await?;
        Ok(bytes)
    }

    async fn wait_for_dialog(&self, timeout_ms: u64) -> Result<Box<dyn DialogHandle>> {
        let start = Instant::now();
        loop {
            let captured = {
                let page = self.page.lock().await;
                page.evaluate::<(), Option<CapturedDialog>>(NEXT_DIALOG_EXPRESSION, ())
                    .await?
            };

            if let Some(dialog) = captured {
                info!("[EVENT] Browser dialog captured: '{}'", dialog.message);
                return Ok(Box::new(WebDialog {
                    kind: DialogKind::from_name(&dialog.kind),
                    message: dialog.message,
                }));
            }

            if start.elapsed() >= Duration::from_millis(timeout_ms) {
                anyhow::bail!("Timeout {}ms exceeded waiting for a dialog", timeout_ms);
            }
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
    }

    async fn close(&self) -> Result<Option<PathBuf>> {
        let recorded = {
            let page = self.page.lock().await;
            match page.video() {
                Ok(Some(video)) => video.path().ok(),
                _ => None,
            }
        };

        // Closing the context flushes the video to disk
        self.context
            .close()
            .await
            .context("Failed to close browser context")?;

        let (Some(source), Some(dir)) = (recorded, self.video_dir.as_ref()) else {
            return Ok(None);
        };

        let target = dir.join(VIDEO_FILE_NAME);
        if source != target {
            if let Err(e) = std::fs::rename(&source, &target) {
                warn!(
                    "[WARNING] Could not move video {} to {}: {}",
                    source.display(),
                    target.display(),
                    e
                );
                return Ok(Some(source));
            }
        }
        debug!("[DEBUG] Video saved to {}", target.display());
        Ok(Some(target))
    }
}

/// Launch Chromium, preferring an explicit or system-installed executable
async fn launch_chromium_browser(
    chromium: &playwright::api::BrowserType,
    config: &WebDriverConfig,
) -> Result<Browser> {
    let mut launcher = chromium.launcher().headless(config.headless);

    let executable = config.executable.clone().or_else(find_system_browser);
    if let Some(ref path) = executable {
        info!("[CONFIG] Using browser executable: {}", path.display());
        launcher = launcher.executable(path);
    } else {
        debug!("[DEBUG] No browser executable found, using Playwright's bundled Chromium");
    }

    let args: Vec<String> = [
        "--no-sandbox",
        "--disable-setuid-sandbox",
        "--disable-dev-shm-usage",
        "--ignore-certificate-errors",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    launcher = launcher.args(&args);

    Ok(launcher.launch().await?)
}

fn find_system_browser() -> Option<PathBuf> {
    let common_paths = [
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
    ];

    common_paths
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
}
