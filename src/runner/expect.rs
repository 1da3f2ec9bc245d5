//! Auto-retrying assertions
//!
//! Expectations poll the page until the condition holds or the timeout elapses. The
//! source location of the `expect*` call is captured when the expectation is built and
//! travels with the resulting [`ExpectationError`] so the reporter can point at it.

use anyhow::Result;
use std::any::Any;
use std::future::Future;
use std::panic::Location;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

use super::state::TestStatus;
use crate::driver::traits::{BrowserPage, Locator};
use crate::report::types::{CrashLocation, FailureDetail};

pub const DEFAULT_EXPECT_TIMEOUT_MS: u64 = 5_000;
const POLL_INTERVAL_MS: u64 = 100;

/// A failed assertion
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ExpectationError {
    pub message: String,
    pub location: CrashLocation,
}

impl ExpectationError {
    fn at(location: &'static Location<'static>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: location.into(),
        }
    }
}

/// Poll `check` until it returns true or `timeout_ms` elapses. Returns the last
/// observation either way.
async fn poll<T, F, Fut>(timeout_ms: u64, mut check: F) -> Result<(bool, T)>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(bool, T)>>,
{
    let start = Instant::now();
    loop {
        let (ok, observed) = check().await?;
        if ok || start.elapsed() >= Duration::from_millis(timeout_ms) {
            return Ok((ok, observed));
        }
        tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }
}

pub struct PageExpectation<'a> {
    page: &'a dyn BrowserPage,
    timeout_ms: u64,
    location: &'static Location<'static>,
}

#[track_caller]
pub fn expect(page: &Arc<dyn BrowserPage>) -> PageExpectation<'_> {
    PageExpectation {
        page: page.as_ref(),
        timeout_ms: DEFAULT_EXPECT_TIMEOUT_MS,
        location: Location::caller(),
    }
}

impl PageExpectation<'_> {
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub async fn to_have_url(&self, expected: &str) -> Result<()> {
        let (ok, actual) = poll(self.timeout_ms, || async move {
            let url = self.page.current_url().await?;
            Ok((url == expected, url))
        })
        .await?;

        if !ok {
            return Err(ExpectationError::at(
                self.location,
                format!(
                    "Page URL expected to be '{}'\nActual value: '{}'",
                    expected, actual
                ),
            )
            .into());
        }
        Ok(())
    }
}

pub struct LocatorExpectation<'a> {
    page: &'a dyn BrowserPage,
    locator: &'a Locator,
    timeout_ms: u64,
    location: &'static Location<'static>,
}

#[track_caller]
pub fn expect_locator<'a>(
    page: &'a Arc<dyn BrowserPage>,
    locator: &'a Locator,
) -> LocatorExpectation<'a> {
    LocatorExpectation {
        page: page.as_ref(),
        locator,
        timeout_ms: DEFAULT_EXPECT_TIMEOUT_MS,
        location: Location::caller(),
    }
}

impl LocatorExpectation<'_> {
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn fail(&self, message: String) -> anyhow::Error {
        ExpectationError::at(self.location, message).into()
    }

    async fn visible_within(&self, wanted: bool) -> Result<bool> {
        let (ok, _) = poll(self.timeout_ms, || async move {
            let visible = self.page.is_visible(self.locator).await?;
            Ok((visible == wanted, ()))
        })
        .await?;
        Ok(ok)
    }

    pub async fn to_be_visible(&self) -> Result<()> {
        if !self.visible_within(true).await? {
            return Err(self.fail(format!(
                "{} expected to be visible\nActual value: hidden",
                self.locator
            )));
        }
        Ok(())
    }

    pub async fn not_to_be_visible(&self) -> Result<()> {
        if !self.visible_within(false).await? {
            return Err(self.fail(format!(
                "{} expected not to be visible\nActual value: visible",
                self.locator
            )));
        }
        Ok(())
    }

    pub async fn to_contain_text(&self, expected: &str) -> Result<()> {
        let (ok, actual) = poll(self.timeout_ms, || async move {
            let text = self.page.text_content(self.locator).await?;
            Ok((text.contains(expected), text))
        })
        .await?;

        if !ok {
            return Err(self.fail(format!(
                "{} expected to contain text '{}'\nActual value: '{}'",
                self.locator, expected, actual
            )));
        }
        Ok(())
    }

    pub async fn to_contain_all(&self, alert: &AlertExpectation) -> Result<()> {
        for message in alert.messages() {
            self.to_contain_text(message).await?;
        }
        Ok(())
    }

    pub async fn to_be_checked(&self) -> Result<()> {
        let (ok, _) = poll(self.timeout_ms, || async move {
            Ok((self.page.is_checked(self.locator).await?, ()))
        })
        .await?;

        if !ok {
            return Err(self.fail(format!(
                "{} expected to be checked\nActual value: unchecked",
                self.locator
            )));
        }
        Ok(())
    }
}

/// Substrings a UI alert must contain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertExpectation {
    messages: Vec<String>,
}

impl AlertExpectation {
    pub fn new(messages: &[&str]) -> Self {
        Self {
            messages: messages.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Messages missing from `text`
    pub fn missing_from(&self, text: &str) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| !text.contains(m.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub async fn verify(&self, expectation: &LocatorExpectation<'_>) -> Result<()> {
        expectation.to_contain_all(self).await
    }
}

/// Plain equality assertion with an `Expected: .., but got: ..` message
#[track_caller]
pub fn verify_equal(expected: &str, actual: Option<&str>) -> Result<()> {
    if actual == Some(expected) {
        return Ok(());
    }
    Err(ExpectationError::at(
        Location::caller(),
        format!(
            "Expected: {}, but got: {}",
            expected,
            actual.unwrap_or("None")
        ),
    )
    .into())
}

/// Assertion failures fail a test, anything else breaks it
pub fn status_for_error(err: &anyhow::Error) -> TestStatus {
    if err.downcast_ref::<ExpectationError>().is_some() {
        TestStatus::Failed
    } else {
        TestStatus::Broken
    }
}

pub fn failure_from_error(err: &anyhow::Error) -> FailureDetail {
    let raw = format!("{:?}", err);
    match err.downcast_ref::<ExpectationError>() {
        Some(expectation) => FailureDetail::new(expectation.message.clone(), raw)
            .with_location(expectation.location.clone()),
        None => FailureDetail::new(format!("{:#}", err), raw),
    }
}

pub fn failure_from_panic(payload: Box<dyn Any + Send>) -> FailureDetail {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "test panicked".to_string()
    };
    FailureDetail::new(message.clone(), format!("panicked: {}", message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::{Effect, MockPage};

    fn page(mock: MockPage) -> Arc<dyn BrowserPage> {
        Arc::new(mock)
    }

    #[tokio::test]
    async fn test_to_have_url() {
        let page = page(MockPage::new("https://www.phptravels.net/login"));
        expect(&page)
            .to_have_url("https://www.phptravels.net/login")
            .await
            .unwrap();

        let err = expect(&page)
            .with_timeout(0)
            .to_have_url("https://www.phptravels.net/signup")
            .await
            .unwrap_err();
        let expectation = err.downcast_ref::<ExpectationError>().unwrap();
        assert!(expectation.message.contains("Actual value: 'https://www.phptravels.net/login'"));
        assert!(expectation.location.path.ends_with("expect.rs"));
    }

    #[tokio::test]
    async fn test_visibility() {
        let alert = Locator::css("div.vt-card.error");
        let modal = Locator::css("#forget_pass");
        let page = page(MockPage::new("about:blank").show(&alert));

        expect_locator(&page, &alert).to_be_visible().await.unwrap();
        expect_locator(&page, &modal).not_to_be_visible().await.unwrap();
        assert!(expect_locator(&page, &modal)
            .with_timeout(0)
            .to_be_visible()
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_contain_text_retries_until_present() {
        let button = Locator::role("button").named("Login");
        let alert = Locator::css("div.vt-card.error");
        let page = page(MockPage::new("about:blank").on_click(
            &button,
            Effect::SetText(
                alert.clone(),
                "Account not active. Please contact admin to activate your account".to_string(),
            ),
        ));

        assert!(expect_locator(&page, &alert)
            .with_timeout(0)
            .to_contain_text("Account not active")
            .await
            .is_err());

        page.click(&button).await.unwrap();
        let expected = AlertExpectation::new(&[
            "Account not active",
            "Please contact admin to activate your account",
        ]);
        expected
            .verify(&expect_locator(&page, &alert))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_to_be_checked() {
        let label = Locator::text("Remember Me");
        let checkbox = Locator::role("checkbox").named("Remember Me");
        let page = page(MockPage::new("about:blank").on_click(&label, Effect::Check(checkbox.clone())));

        assert!(expect_locator(&page, &checkbox).with_timeout(0).to_be_checked().await.is_err());
        page.click(&label).await.unwrap();
        expect_locator(&page, &checkbox).to_be_checked().await.unwrap();
    }

    #[test]
    fn test_missing_messages() {
        let expected = AlertExpectation::new(&["Invalid Login", "Please check your email and password"]);
        assert_eq!(
            expected.missing_from("Invalid Login"),
            vec!["Please check your email and password"]
        );
        assert!(expected
            .missing_from("Invalid Login. Please check your email and password")
            .is_empty());
    }

    #[test]
    fn test_verify_equal_records_caller() {
        assert!(verify_equal("a", Some("a")).is_ok());

        let err = verify_equal("Please add email address to reset password", None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected: Please add email address to reset password, but got: None"
        );
        let detail = failure_from_error(&err);
        let location = detail.location.clone().unwrap();
        assert!(location.path.ends_with("expect.rs"));
        assert!(detail.summary().starts_with("Expected: Please add email"));
        assert_eq!(status_for_error(&err), TestStatus::Failed);
    }

    #[test]
    fn test_other_errors_are_broken() {
        let err = anyhow::anyhow!("connection refused").context("Failed to navigate");
        assert_eq!(status_for_error(&err), TestStatus::Broken);
        let detail = failure_from_error(&err);
        assert!(detail.location.is_none());
        assert_eq!(detail.message, "Failed to navigate: connection refused");
    }

    #[test]
    fn test_failure_from_panic() {
        let payload: Box<dyn Any + Send> = Box::new("assertion failed");
        let detail = failure_from_panic(payload);
        assert_eq!(detail.message, "assertion failed");
    }
}
