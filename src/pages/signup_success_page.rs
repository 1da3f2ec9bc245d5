use std::sync::Arc;

use super::base_page::BasePage;
use crate::driver::{BrowserPage, Locator, PageProvider};
use crate::runner::context::PageEnv;
use crate::runner::expect::AlertExpectation;

pub const ACTIVATE_ACCOUNT_MSGS: [&str; 2] = [
    "Your account has been created",
    "Please check your mailbox for activation",
];

pub struct SignupSuccessPage {
    pub base: BasePage,
    pub url: String,
    pub activate_account_msgs: AlertExpectation,
    pub notification_card: Locator,
}

impl SignupSuccessPage {
    pub const PATH: &'static str = "/signup_success";

    pub fn new(env: PageEnv) -> Self {
        let base = BasePage::new(env);
        Self {
            url: base.url(Self::PATH),
            activate_account_msgs: AlertExpectation::new(&ACTIVATE_ACCOUNT_MSGS),
            notification_card: Locator::css("div")
                .filter_has_text(ACTIVATE_ACCOUNT_MSGS[0])
                .nth(2),
            base,
        }
    }
}

impl PageProvider for SignupSuccessPage {
    fn page(&self) -> Option<Arc<dyn BrowserPage>> {
        Some(self.base.page.clone())
    }
}
