//! Scripted in-memory page for unit tests

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::traits::{
    BrowserPage, DialogHandle, DialogKind, Locator, ScreenshotOptions, WaitState,
};
use super::{BrowserType, PageFactory};
use crate::report::artifacts::{TRACE_FILE_NAME, VIDEO_FILE_NAME};

/// Ordered log of side effects shared between mocks
pub type Journal = Arc<Mutex<Vec<String>>>;

pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

/// What happens when an element is clicked
#[derive(Debug, Clone)]
pub enum Effect {
    Navigate(String),
    Show(Locator),
    Hide(Locator),
    SetText(Locator, String),
    Check(Locator),
    Dialog(String),
}

#[derive(Default)]
struct MockState {
    url: String,
    visible: HashSet<Locator>,
    texts: HashMap<Locator, String>,
    checked: HashSet<Locator>,
    on_click: HashMap<Locator, Vec<Effect>>,
    on_goto: HashMap<String, Vec<Effect>>,
    dialogs: VecDeque<String>,
    fills: Vec<(Locator, String)>,
    clicks: Vec<Locator>,
    screenshot_error: Option<String>,
    screenshots: usize,
    closed: bool,
}

pub struct MockPage {
    state: Mutex<MockState>,
    journal: Journal,
}

impl MockPage {
    pub fn new(url: &str) -> Self {
        Self::with_journal(url, Journal::default())
    }

    pub fn with_journal(url: &str, journal: Journal) -> Self {
        Self {
            state: Mutex::new(MockState {
                url: url.to_string(),
                ..Default::default()
            }),
            journal,
        }
    }

    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    pub fn show(self, locator: &Locator) -> Self {
        self.state.lock().unwrap().visible.insert(locator.clone());
        self
    }

    pub fn on_click(self, locator: &Locator, effect: Effect) -> Self {
        self.state
            .lock()
            .unwrap()
            .on_click
            .entry(locator.clone())
            .or_default()
            .push(effect);
        self
    }

    pub fn on_goto(self, url: &str, effect: Effect) -> Self {
        self.state
            .lock()
            .unwrap()
            .on_goto
            .entry(url.to_string())
            .or_default()
            .push(effect);
        self
    }

    pub fn failing_screenshots(self, reason: &str) -> Self {
        self.state.lock().unwrap().screenshot_error = Some(reason.to_string());
        self
    }

    pub fn clicks(&self) -> Vec<Locator> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn fills(&self) -> Vec<(Locator, String)> {
        self.state.lock().unwrap().fills.clone()
    }

    pub fn screenshot_count(&self) -> usize {
        self.state.lock().unwrap().screenshots
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn apply(state: &mut MockState, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Navigate(url) => state.url = url,
                Effect::Show(loc) => {
                    state.visible.insert(loc);
                }
                Effect::Hide(loc) => {
                    state.visible.remove(&loc);
                }
                Effect::SetText(loc, text) => {
                    state.visible.insert(loc.clone());
                    state.texts.insert(loc, text);
                }
                Effect::Check(loc) => {
                    state.checked.insert(loc);
                }
                Effect::Dialog(message) => state.dialogs.push_back(message),
            }
        }
    }
}

pub struct MockDialog {
    message: String,
    journal: Journal,
}

impl MockDialog {
    pub fn new(message: &str, journal: Journal) -> Self {
        Self {
            message: message.to_string(),
            journal,
        }
    }
}

#[async_trait]
impl DialogHandle for MockDialog {
    fn kind(&self) -> DialogKind {
        DialogKind::Alert
    }

    fn message(&self) -> &str {
        &self.message
    }

    async fn accept(&self) -> Result<()> {
        self.journal
            .lock()
            .unwrap()
            .push(format!("dialog:accept:{}", self.message));
        Ok(())
    }
}

#[async_trait]
impl BrowserPage for MockPage {
    async fn goto(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.url = url.to_string();
        let effects = state.on_goto.get(url).cloned().unwrap_or_default();
        Self::apply(&mut state, effects);
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.clicks.push(locator.clone());
        let effects = state.on_click.get(locator).cloned().unwrap_or_default();
        Self::apply(&mut state, effects);
        Ok(())
    }

    async fn fill(&self, locator: &Locator, text: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.fills.push((locator.clone(), text.to_string()));
        state.texts.insert(locator.clone(), text.to_string());
        Ok(())
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        Ok(self.state.lock().unwrap().visible.contains(locator))
    }

    async fn is_checked(&self, locator: &Locator) -> Result<bool> {
        Ok(self.state.lock().unwrap().checked.contains(locator))
    }

    async fn text_content(&self, locator: &Locator) -> Result<String> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .texts
            .get(locator)
            .cloned()
            .unwrap_or_default())
    }

    async fn wait_for(&self, locator: &Locator, state: WaitState, timeout_ms: u64) -> Result<()> {
        let visible = self.state.lock().unwrap().visible.contains(locator);
        let reached = match state {
            WaitState::Visible | WaitState::Attached => visible,
            WaitState::Hidden | WaitState::Detached => !visible,
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

    async fn screenshot(&self, _options: ScreenshotOptions) -> Result<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        if let Some(reason) = &state.screenshot_error {
            anyhow::bail!("{}", reason);
        }
        state.screenshots += 1;
        Ok(FAKE_PNG.to_vec())
    }

    async fn wait_for_dialog(&self, timeout_ms: u64) -> Result<Box<dyn DialogHandle>> {
        let message = self.state.lock().unwrap().dialogs.pop_front();
        match message {
            Some(message) => Ok(Box::new(MockDialog {
                message,
                journal: self.journal.clone(),
            })),
            None => anyhow::bail!("Timeout {}ms exceeded waiting for a dialog", timeout_ms),
        }
    }

    async fn close(&self) -> Result<Option<PathBuf>> {
        self.state.lock().unwrap().closed = true;
        Ok(None)
    }
}

/// Hands out blank mock pages and, like a real browser run, leaves a trace and a
/// video in the artifact folder of every invocation that records
#[derive(Default)]
pub struct MockPageFactory {
    pub opened: Mutex<Vec<Arc<MockPage>>>,
}

#[async_trait]
impl PageFactory for MockPageFactory {
    async fn open_page(
        &self,
        _browser: BrowserType,
        video_dir: Option<&Path>,
    ) -> Result<Arc<dyn BrowserPage>> {
        if let Some(dir) = video_dir {
            std::fs::create_dir_all(dir)?;
            std::fs::write(dir.join(TRACE_FILE_NAME), b"PK\x03\x04trace")?;
            std::fs::write(dir.join(VIDEO_FILE_NAME), b"\x1a\x45\xdf\xa3video")?;
        }
        let page = Arc::new(MockPage::new("about:blank"));
        self.opened.lock().unwrap().push(page.clone());
        Ok(page)
    }
}
