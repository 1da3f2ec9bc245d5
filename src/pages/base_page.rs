use anyhow::Result;
use log::{info, warn};
use std::future::Future;
use std::sync::Arc;

use crate::components::{FooterComponent, MobileAppComponent, NavbarComponent};
use crate::driver::{BrowserPage, DialogHandle};
use crate::report::types::{Attachment, AttachmentSink};
use crate::runner::context::PageEnv;

pub const DIALOG_ATTACHMENT_NAME: &str = "Log_Output_DialogContent";

/// Slot the dialog handler writes the message into
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DialogResult {
    pub message: Option<String>,
}

/// Layout shared by every page: navigation bar, app promotion and footer
pub struct BasePage {
    pub page: Arc<dyn BrowserPage>,
    pub sink: Arc<dyn AttachmentSink>,
    pub base_url: String,
    pub navbar: NavbarComponent,
    pub mobile_app: MobileAppComponent,
    pub footer: FooterComponent,
}

impl BasePage {
    pub fn new(env: PageEnv) -> Self {
        Self {
            navbar: NavbarComponent::new(env.page.clone()),
            mobile_app: MobileAppComponent::new(env.page.clone()),
            footer: FooterComponent::new(env.page.clone()),
            page: env.page,
            sink: env.sink,
            base_url: env.base_url,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub async fn navigate(&self, url: &str) -> Result<()> {
        info!("[ACTION] Navigating to URL: '{}'...", url);
        self.page.goto(url).await?;
        info!("[SUCCESS] Navigation to URL: '{}' completed.", url);
        Ok(())
    }

    /// Record the dialog message in `result`, attach it to the report, then accept
    /// the dialog. The dialog is accepted even when the attachment fails.
    pub async fn handle_browser_dialog(
        &self,
        dialog: &dyn DialogHandle,
        result: &mut DialogResult,
    ) -> Result<()> {
        let message = dialog.message().to_string();
        info!("[EVENT] Browser dialog detected with message: '{}'.", message);

        result.message = Some(message.clone());

        let content = format!("Alert dialog content: {}", message);
        if let Err(e) = self
            .sink
            .attach(Attachment::text(DIALOG_ATTACHMENT_NAME, content))
        {
            warn!("[WARNING] Could not attach dialog content: {:#}", e);
        }

        info!("[ACTION] Accepting browser dialog: '{}'...", message);
        dialog.accept().await?;
        info!("[SUCCESS] Browser dialog accepted.");
        Ok(())
    }

    /// Run `action`, then wait for the dialog it raises and handle it
    pub async fn expect_dialog<Fut>(
        &self,
        action: Fut,
        result: &mut DialogResult,
        timeout_ms: u64,
    ) -> Result<()>
    where
        Fut: Future<Output = Result<()>>,
    {
        action.await?;
        let dialog = self.page.wait_for_dialog(timeout_ms).await?;
        self.handle_browser_dialog(dialog.as_ref(), result).await
    }
}
