use anyhow::Result;
use log::info;
use std::sync::Arc;

use super::base_page::BasePage;
use crate::driver::{BrowserPage, Locator, PageProvider, WaitState};
use crate::helpers::mask_text;
use crate::models::CustomerSignupData;
use crate::runner::context::PageEnv;

pub const CAPTCHA_FRAME_SELECTOR: &str =
    "iframe[title=\"Widget containing checkbox for hCaptcha security challenge\"]";

pub struct CustomerSignupPage {
    pub base: BasePage,
    pub url: String,

    pub first_name_input: Locator,
    pub last_name_input: Locator,
    pub country_dropdown: Locator,
    pub country_search_input: Locator,
    pub phone_input: Locator,
    pub email_input: Locator,
    pub password_input: Locator,

    pub captcha_frame: Locator,
    pub captcha_checkbox: Locator,
    pub captcha_solved: Locator,

    pub signup_button: Locator,
    pub loading_spinner: Locator,
}

impl CustomerSignupPage {
    pub const PATH: &'static str = "/signup";

    pub fn new(env: PageEnv) -> Self {
        let base = BasePage::new(env);
        let captcha_frame = Locator::css(CAPTCHA_FRAME_SELECTOR);

        Self {
            url: base.url(Self::PATH),
            first_name_input: Locator::role("textbox").named("First Name"),
            last_name_input: Locator::role("textbox").named("Last Name"),
            country_dropdown: Locator::css("button[data-bs-toggle='dropdown']"),
            country_search_input: Locator::role("combobox").named("Search"),
            phone_input: Locator::role("spinbutton").named("Phone"),
            email_input: Locator::role("textbox").named("Email Address"),
            password_input: Locator::role("textbox").named("Password"),

            captcha_checkbox: captcha_frame.content_frame(Locator::css("#checkbox")),
            captcha_solved: captcha_frame
                .content_frame(Locator::css("#checkbox[aria-checked='true']")),
            captcha_frame,

            signup_button: Locator::role("button").named("Signup").exact(),
            loading_spinner: Locator::role("button").named("Creating account..."),
            base,
        }
    }

    fn browser(&self) -> &dyn BrowserPage {
        self.base.page.as_ref()
    }

    pub async fn navigate(&self) -> Result<()> {
        self.base.navigate(&self.url).await
    }

    pub async fn enter_first_name(&self, first_name: &str) -> Result<()> {
        info!("[INPUT] Entering first name: '{}'...", first_name);
        self.browser().fill(&self.first_name_input, first_name).await?;
        info!("[SUCCESS] First name entered.");
        Ok(())
    }

    pub async fn enter_last_name(&self, last_name: &str) -> Result<()> {
        info!("[INPUT] Entering last name: '{}'...", last_name);
        self.browser().fill(&self.last_name_input, last_name).await?;
        info!("[SUCCESS] Last name entered.");
        Ok(())
    }

    pub async fn select_country(&self, country_name: &str) -> Result<()> {
        info!("[INPUT] Selecting country: '{}'...", country_name);
        self.browser().click(&self.country_dropdown).await?;
        self.browser()
            .fill(&self.country_search_input, country_name)
            .await?;
        let option = Locator::role("option").named(country_name).first();
        self.browser().click(&option).await?;
        info!("[SUCCESS] Country '{}' selected.", country_name);
        Ok(())
    }

    pub async fn enter_phone(&self, phone: &str) -> Result<()> {
        info!("[INPUT] Entering phone number: '{}'...", phone);
        self.browser().fill(&self.phone_input, phone).await?;
        info!("[SUCCESS] Phone number entered.");
        Ok(())
    }

    pub async fn enter_email(&self, email: &str) -> Result<()> {
        info!("[INPUT] Entering email address: '{}'...", email);
        self.browser().fill(&self.email_input, email).await?;
        info!("[SUCCESS] Email address entered.");
        Ok(())
    }

    pub async fn enter_password(&self, password: &str) -> Result<()> {
        info!("[INPUT] Entering password: '{}'...", mask_text(password));
        self.browser().fill(&self.password_input, password).await?;
        info!("[SUCCESS] Password entered.");
        Ok(())
    }

    pub async fn click_signup_button(&self) -> Result<()> {
        info!("[ACTION] Clicking 'Signup' button...");
        self.browser().click(&self.signup_button).await?;
        info!("[SUCCESS] 'Signup' button clicked.");
        Ok(())
    }

    pub async fn click_captcha_checkbox(&self) -> Result<()> {
        info!("[ACTION] Clicking captcha checkbox...");
        self.browser().click(&self.captcha_checkbox).await?;
        info!("[SUCCESS] Captcha checkbox clicked.");
        Ok(())
    }

    /// Wait until the captcha checkbox reports `aria-checked="true"`
    pub async fn wait_for_solve_captcha(&self, timeout_ms: u64) -> Result<()> {
        info!("[EVENT] Waiting for captcha to be solved...");
        self.browser()
            .wait_for(&self.captcha_solved, WaitState::Attached, timeout_ms)
            .await?;
        info!("[SUCCESS] Captcha solved.");
        Ok(())
    }

    pub async fn register_account(
        &self,
        user_data: &CustomerSignupData,
        captcha_timeout_ms: u64,
    ) -> Result<()> {
        info!("[ACTION] Registering account for email: '{}'...", user_data.email);

        self.enter_first_name(&user_data.first_name).await?;
        self.enter_last_name(&user_data.last_name).await?;
        self.select_country(&user_data.country).await?;
        self.enter_phone(&user_data.phone).await?;
        self.enter_email(&user_data.email).await?;
        self.enter_password(&user_data.password).await?;

        self.click_captcha_checkbox().await?;
        self.wait_for_solve_captcha(captcha_timeout_ms).await?;

        self.click_signup_button().await?;

        info!("[SUCCESS] Registration sequence completed.");
        Ok(())
    }
}

impl PageProvider for CustomerSignupPage {
    fn page(&self) -> Option<Arc<dyn BrowserPage>> {
        Some(self.base.page.clone())
    }
}
