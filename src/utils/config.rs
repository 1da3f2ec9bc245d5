use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::driver::web::WebDriverConfig;
use crate::driver::BrowserType;
use crate::report::artifacts::DEFAULT_OUTPUT_DIR;

pub const DEFAULT_BASE_URL: &str = "https://www.phptravels.net";
pub const DEFAULT_ALLURE_DIR: &str = "allure-results";
pub const DEFAULT_CONFIG_FILE: &str = "e2e.yaml";

/// When a per-test video is recorded and kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum VideoMode {
    Off,
    On,
    /// Record every test, delete the recording of passing ones
    #[default]
    RetainOnFailure,
}

/// Run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Scheme and host of the application under test
    pub base_url: String,

    pub browsers: Vec<BrowserType>,

    pub headless: bool,

    /// Per-test artifact folders (videos, traces) and the JUnit summary
    pub output_dir: PathBuf,

    /// Allure result files
    pub alluredir: PathBuf,

    /// Remove old Allure results before the run
    pub clean_alluredir: bool,

    pub video: VideoMode,

    /// Concurrent test invocations
    pub workers: usize,

    /// Timeout for clicks and fills (ms)
    pub default_timeout_ms: u64,

    /// Timeout for auto-retrying assertions (ms)
    pub expect_timeout_ms: u64,

    /// Timeout for a browser dialog to appear (ms)
    pub dialog_timeout_ms: u64,

    /// Time allowed for the captcha to be solved (ms)
    pub captcha_timeout_ms: u64,

    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Explicit Chromium executable
    pub browser_executable: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            browsers: vec![BrowserType::Chromium],
            headless: true,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            alluredir: PathBuf::from(DEFAULT_ALLURE_DIR),
            clean_alluredir: false,
            video: VideoMode::default(),
            workers: 1,
            default_timeout_ms: 30_000,
            expect_timeout_ms: 5_000,
            dialog_timeout_ms: 10_000,
            captcha_timeout_ms: 30_000,
            viewport_width: 1280,
            viewport_height: 720,
            browser_executable: None,
        }
    }
}

impl RunConfig {
    /// Load `path`, or `e2e.yaml` in the working directory when present, then apply
    /// environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: RunConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        info!("[CONFIG] Loaded {}", path.display());
        Ok(config)
    }

    /// `E2E_HEADLESS`, `E2E_BASE_URL` and `PLAYWRIGHT_CHROMIUM_EXECUTABLE_PATH`
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(headless) = var("E2E_HEADLESS") {
            self.headless = headless == "true" || headless == "1";
        }
        if let Some(url) = var("E2E_BASE_URL") {
            self.base_url = url;
        }
        if let Some(path) = var("PLAYWRIGHT_CHROMIUM_EXECUTABLE_PATH") {
            self.browser_executable = Some(PathBuf::from(path));
        }
    }

    /// Absolute URL of an application path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn records_video(&self) -> bool {
        self.video != VideoMode::Off
    }

    pub fn web_driver_config(&self) -> WebDriverConfig {
        WebDriverConfig {
            headless: self.headless,
            viewport_width: self.viewport_width,
            viewport_height: self.viewport_height,
            action_timeout_ms: self.default_timeout_ms,
            executable: self.browser_executable.clone(),
        }
    }
}
