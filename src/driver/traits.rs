use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Element locator descriptor
///
/// Locators are plain data. Page objects build them once in their constructor and the
/// driver renders them to a selector when an action runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Raw CSS selector
    Css(String),
    /// ARIA role with an optional accessible name
    Role {
        role: String,
        name: Option<RoleName>,
        exact: bool,
    },
    /// Visible text (substring, case-insensitive)
    Text(String),
    /// Input placeholder text
    Placeholder(String),
    /// `inner` resolved inside the elements matched by `root`
    Within {
        root: Box<Locator>,
        inner: Box<Locator>,
    },
    /// The n-th (0-based) element matched by `base`
    Nth { base: Box<Locator>, index: usize },
    /// Elements matched by `base` that contain `text`
    HasText { base: Box<Locator>, text: String },
    /// `inner` resolved inside the content frame of the `frame` element
    Frame {
        frame: Box<Locator>,
        inner: Box<Locator>,
    },
}

/// Accessible name matcher for role locators
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoleName {
    Text(String),
    /// Regular expression, rendered as `/pattern/`
    Pattern(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn role(role: impl Into<String>) -> Self {
        Locator::Role {
            role: role.into(),
            name: None,
            exact: false,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Locator::Text(text.into())
    }

    pub fn placeholder(text: impl Into<String>) -> Self {
        Locator::Placeholder(text.into())
    }

    /// Set the accessible name of a role locator. No-op for other kinds.
    pub fn named(self, name: impl Into<String>) -> Self {
        match self {
            Locator::Role { role, exact, .. } => Locator::Role {
                role,
                name: Some(RoleName::Text(name.into())),
                exact,
            },
            other => other,
        }
    }

    /// Match the accessible name of a role locator against a regex.
    pub fn name_matching(self, pattern: impl Into<String>) -> Self {
        match self {
            Locator::Role { role, exact, .. } => Locator::Role {
                role,
                name: Some(RoleName::Pattern(pattern.into())),
                exact,
            },
            other => other,
        }
    }

    /// Require an exact, case-sensitive name match
    pub fn exact(self) -> Self {
        match self {
            Locator::Role { role, name, .. } => Locator::Role {
                role,
                name,
                exact: true,
            },
            other => other,
        }
    }

    pub fn locator(&self, inner: Locator) -> Self {
        Locator::Within {
            root: Box::new(self.clone()),
            inner: Box::new(inner),
        }
    }

    pub fn nth(&self, index: usize) -> Self {
        Locator::Nth {
            base: Box::new(self.clone()),
            index,
        }
    }

    pub fn first(&self) -> Self {
        self.nth(0)
    }

    pub fn filter_has_text(&self, text: impl Into<String>) -> Self {
        Locator::HasText {
            base: Box::new(self.clone()),
            text: text.into(),
        }
    }

    /// Resolve `inner` inside the iframe matched by this locator
    pub fn content_frame(&self, inner: Locator) -> Self {
        Locator::Frame {
            frame: Box::new(self.clone()),
            inner: Box::new(inner),
        }
    }

    /// Split into an optional frame locator and the selector resolved inside it.
    ///
    /// Only a single level of frame nesting is supported.
    pub fn frame_scope(&self) -> (Option<&Locator>, &Locator) {
        match self {
            Locator::Frame { frame, inner } => (Some(frame.as_ref()), inner.as_ref()),
            other => (None, other),
        }
    }

    /// Render as a Playwright selector string
    pub fn to_selector(&self) -> String {
        match self {
            Locator::Css(css) => css.clone(),
            Locator::Role { role, name, exact } => match name {
                None => format!("role={}", role),
                Some(RoleName::Text(text)) => {
                    let flag = if *exact { "s" } else { "i" };
                    format!("role={}[name=\"{}\"{}]", role, escape_quotes(text), flag)
                }
                Some(RoleName::Pattern(pattern)) => {
                    format!("role={}[name=/{}/]", role, pattern)
                }
            },
            Locator::Text(text) => format!("text={}", text),
            Locator::Placeholder(text) => {
                format!("[placeholder=\"{}\"]", escape_quotes(text))
            }
            Locator::Within { root, inner } => {
                format!("{} >> {}", root.to_selector(), inner.to_selector())
            }
            Locator::Nth { base, index } => format!("{} >> nth={}", base.to_selector(), index),
            Locator::HasText { base, text } => format!(
                "{} >> :scope:has-text(\"{}\")",
                base.to_selector(),
                escape_quotes(text)
            ),
            Locator::Frame { frame, inner } => format!(
                "{} >> internal:control=enter-frame >> {}",
                frame.to_selector(),
                inner.to_selector()
            ),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Locator({})", self.to_selector())
    }
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Element state to wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    Attached,
    Detached,
    Visible,
    Hidden,
}

/// Screenshot capture options
#[derive(Debug, Clone, Copy)]
pub struct ScreenshotOptions {
    pub full_page: bool,
    pub animations_disabled: bool,
}

impl Default for ScreenshotOptions {
    fn default() -> Self {
        Self {
            full_page: true,
            animations_disabled: true,
        }
    }
}

/// Kind of native browser dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Alert,
    Confirm,
    Prompt,
    BeforeUnload,
}

impl DialogKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "confirm" => DialogKind::Confirm,
            "prompt" => DialogKind::Prompt,
            "beforeunload" => DialogKind::BeforeUnload,
            _ => DialogKind::Alert,
        }
    }
}

/// A native browser dialog (alert/confirm/prompt) raised by the page
#[async_trait]
pub trait DialogHandle: Send + Sync {
    fn kind(&self) -> DialogKind;

    /// Message text shown by the dialog
    fn message(&self) -> &str;

    /// Accept (confirm) the dialog
    async fn accept(&self) -> Result<()>;
}

/// Browser page interface
///
/// All UI interaction in the suite goes through this trait, so page objects, the
/// result reporter and scenarios can run against Playwright or an in-memory page.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Navigate to an absolute URL
    async fn goto(&self, url: &str) -> Result<()>;

    /// URL of the current document
    async fn current_url(&self) -> Result<String>;

    async fn click(&self, locator: &Locator) -> Result<()>;

    /// Replace the value of an input
    async fn fill(&self, locator: &Locator, text: &str) -> Result<()>;

    async fn is_visible(&self, locator: &Locator) -> Result<bool>;

    async fn is_checked(&self, locator: &Locator) -> Result<bool>;

    /// Value or text content of the first matching element, empty if not found
    async fn text_content(&self, locator: &Locator) -> Result<String>;

    /// Wait until the element reaches `state`, failing after `timeout_ms`
    async fn wait_for(&self, locator: &Locator, state: WaitState, timeout_ms: u64) -> Result<()>;

    /// Capture a PNG screenshot
    async fn screenshot(&self, options: ScreenshotOptions) -> Result<Vec<u8>>;

    /// Wait for the next dialog raised by the page
    async fn wait_for_dialog(&self, timeout_ms: u64) -> Result<Box<dyn DialogHandle>>;

    /// Close the page and its context.
    ///
    /// Returns the path of the recorded video when recording was enabled.
    async fn close(&self) -> Result<Option<PathBuf>>;
}

/// Anything that owns a browser page and exposes it for evidence capture
///
/// Page objects register themselves as fixtures through this accessor so the result
/// reporter can find a page without knowing the concrete fixture types.
pub trait PageProvider: Send + Sync {
    fn page(&self) -> Option<Arc<dyn BrowserPage>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_selector() {
        let loc = Locator::role("button").named("Login");
        assert_eq!(loc.to_selector(), r#"role=button[name="Login"i]"#);

        let exact = Locator::role("button").named("Signup").exact();
        assert_eq!(exact.to_selector(), r#"role=button[name="Signup"s]"#);

        let pattern = Locator::role("button").name_matching("^(USD|GBP)$");
        assert_eq!(pattern.to_selector(), "role=button[name=/^(USD|GBP)$/]");
    }

    #[test]
    fn test_chained_selectors() {
        let root = Locator::css("section.footer-area");
        let link = root.locator(Locator::role("link").named("About Us"));
        assert_eq!(
            link.to_selector(),
            r#"section.footer-area >> role=link[name="About Us"i]"#
        );

        let card = Locator::css("div")
            .filter_has_text("Your account has been created")
            .nth(2);
        assert_eq!(
            card.to_selector(),
            r#"div >> :scope:has-text("Your account has been created") >> nth=2"#
        );
    }

    #[test]
    fn test_frame_scope() {
        let checkbox = Locator::css("iframe[title=\"captcha\"]").content_frame(Locator::css("#checkbox"));
        let (frame, inner) = checkbox.frame_scope();
        assert_eq!(frame, Some(&Locator::css("iframe[title=\"captcha\"]")));
        assert_eq!(inner, &Locator::css("#checkbox"));

        let plain = Locator::css("#email");
        assert_eq!(plain.frame_scope(), (None, &plain));
    }

    #[test]
    fn test_named_ignored_for_non_role() {
        let loc = Locator::css("#email").named("ignored");
        assert_eq!(loc, Locator::css("#email"));
    }

    #[test]
    fn test_placeholder_escapes_quotes() {
        let loc = Locator::placeholder("say \"hi\"");
        assert_eq!(loc.to_selector(), r#"[placeholder="say \"hi\""]"#);
    }
}
