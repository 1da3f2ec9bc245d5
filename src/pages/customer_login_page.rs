use anyhow::Result;
use std::sync::Arc;

use super::base_page::BasePage;
use crate::components::LoginFormComponent;
use crate::driver::{BrowserPage, PageProvider};
use crate::runner::context::PageEnv;

pub struct CustomerLoginPage {
    pub base: BasePage,
    pub login_form: LoginFormComponent,
    pub url: String,
}

impl CustomerLoginPage {
    pub const PATH: &'static str = "/login";

    pub fn new(env: PageEnv) -> Self {
        let base = BasePage::new(env);
        Self {
            login_form: LoginFormComponent::new(base.page.clone()),
            url: base.url(Self::PATH),
            base,
        }
    }

    pub async fn navigate(&self) -> Result<()> {
        self.base.navigate(&self.url).await
    }
}

impl PageProvider for CustomerLoginPage {
    fn page(&self) -> Option<Arc<dyn BrowserPage>> {
        Some(self.base.page.clone())
    }
}
