use anyhow::Result;
use log::info;
use std::sync::Arc;

use crate::driver::{BrowserPage, Locator};

/// "Get The App!" promotion block
pub struct MobileAppComponent {
    page: Arc<dyn BrowserPage>,
    pub root: Locator,
    pub promotion_title: Locator,
    pub promotion_desc: Locator,
    pub playstore_button: Locator,
    pub appstore_button: Locator,
    pub mobile_mockup_img: Locator,
}

impl MobileAppComponent {
    pub fn new(page: Arc<dyn BrowserPage>) -> Self {
        let root = Locator::css("div.mobile_apps");
        Self {
            page,
            promotion_title: root.locator(Locator::text("Get The App!")),
            promotion_desc: root.locator(Locator::text("Our app has all your travel needs covered")),
            playstore_button: root.locator(Locator::role("link").named("PLAYSTORE")),
            appstore_button: root.locator(Locator::role("link").named("APP STORE")),
            mobile_mockup_img: root.locator(Locator::role("img").named("app")),
            root,
        }
    }

    pub async fn click_playstore_button(&self) -> Result<()> {
        info!("[ACTION] Clicking on 'Google Play Store' button...");
        self.page.click(&self.playstore_button).await?;
        info!("[SUCCESS] 'Google Play Store' button clicked.");
        Ok(())
    }

    pub async fn click_appstore_button(&self) -> Result<()> {
        info!("[ACTION] Clicking on 'Apple App Store' button...");
        self.page.click(&self.appstore_button).await?;
        info!("[SUCCESS] 'Apple App Store' button clicked.");
        Ok(())
    }
}
