#[cfg(test)]
pub mod mock;
pub mod traits;
pub mod web;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

pub use traits::{BrowserPage, DialogHandle, Locator, PageProvider, WaitState};

/// Browser engine a test item runs against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserType::Chromium => "chromium",
            BrowserType::Firefox => "firefox",
            BrowserType::Webkit => "webkit",
        }
    }
}

impl FromStr for BrowserType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "chromium" | "chrome" => Ok(BrowserType::Chromium),
            "firefox" => Ok(BrowserType::Firefox),
            "webkit" | "safari" => Ok(BrowserType::Webkit),
            _ => anyhow::bail!("Unknown browser: {}", s),
        }
    }
}

impl std::fmt::Display for BrowserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opens a fresh page (and browser context) for one test invocation
#[async_trait]
pub trait PageFactory: Send + Sync {
    /// `video_dir` is the test's artifact folder when video recording is enabled
    async fn open_page(
        &self,
        browser: BrowserType,
        video_dir: Option<&Path>,
    ) -> Result<Arc<dyn BrowserPage>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_type_parsing() {
        assert_eq!("chromium".parse::<BrowserType>().unwrap(), BrowserType::Chromium);
        assert_eq!("Firefox".parse::<BrowserType>().unwrap(), BrowserType::Firefox);
        assert_eq!("safari".parse::<BrowserType>().unwrap(), BrowserType::Webkit);
        assert!("opera".parse::<BrowserType>().is_err());
    }
}
