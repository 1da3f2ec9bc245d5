use anyhow::Result;
use log::{error, info};
use std::sync::Arc;

use crate::driver::{BrowserPage, Locator};
use crate::helpers::mask_text;
use crate::runner::expect::AlertExpectation;

pub const RESET_PW_ADD_EMAIL_ALERT_MSG: &str = "Please add email address to reset password";
pub const RESET_PW_INVALID_EMAIL_ALERT_MSG: &str = "Invalid or no account found with this email";
pub const NOT_ACTIVE_ACCOUNT_ALERT_MSGS: [&str; 2] = [
    "Account not active",
    "Please contact admin to activate your account",
];
pub const INVALID_LOGIN_ALERT_MSGS: [&str; 2] =
    ["Invalid Login", "Please check your email and password"];

/// Customer login form with its "Reset Password" modal
pub struct LoginFormComponent {
    page: Arc<dyn BrowserPage>,

    pub email_input: Locator,
    pub password_input: Locator,

    pub remember_me_checkbox: Locator,
    pub remember_me_text: Locator,

    pub reset_password_link: Locator,
    pub reset_password_modal: Locator,
    pub reset_pw_email_input: Locator,
    pub reset_pw_cancel_button: Locator,
    pub reset_pw_reset_button: Locator,
    pub reset_pw_add_email_alert_msg: &'static str,
    pub reset_pw_invalid_email_alert_msg: &'static str,

    pub login_button: Locator,
    pub signup_button: Locator,

    pub alert_card: Locator,
    pub not_active_account_alert: AlertExpectation,
    pub invalid_login_alert: AlertExpectation,
}

impl LoginFormComponent {
    pub fn new(page: Arc<dyn BrowserPage>) -> Self {
        Self {
            page,
            email_input: Locator::css("#email"),
            password_input: Locator::role("textbox").named("Password"),

            // The checkbox input itself is covered by a styled span; the label is clickable
            remember_me_checkbox: Locator::role("checkbox").named("Remember Me"),
            remember_me_text: Locator::text("Remember Me"),

            reset_password_link: Locator::css("#login").locator(Locator::text("Reset Password")),
            reset_password_modal: Locator::css("#forget_pass"),
            reset_pw_email_input: Locator::role("dialog")
                .named("Reset Password")
                .locator(Locator::placeholder("name@example.com")),
            reset_pw_cancel_button: Locator::role("button").named("Cancel"),
            reset_pw_reset_button: Locator::role("button").named("Reset Email"),
            reset_pw_add_email_alert_msg: RESET_PW_ADD_EMAIL_ALERT_MSG,
            reset_pw_invalid_email_alert_msg: RESET_PW_INVALID_EMAIL_ALERT_MSG,

            login_button: Locator::role("button").named("Login"),
            signup_button: Locator::role("link").named("Signup"),

            alert_card: Locator::css("div.vt-card.error"),
            not_active_account_alert: AlertExpectation::new(&NOT_ACTIVE_ACCOUNT_ALERT_MSGS),
            invalid_login_alert: AlertExpectation::new(&INVALID_LOGIN_ALERT_MSGS),
        }
    }

    pub async fn enter_email(&self, email: &str) -> Result<()> {
        info!("[INPUT] Entering email: '{}'...", email);
        self.page.fill(&self.email_input, email).await?;
        info!("[SUCCESS] Email entered.");
        Ok(())
    }

    pub async fn enter_password(&self, password: &str) -> Result<()> {
        info!("[INPUT] Entering password: '{}'...", mask_text(password));
        self.page.fill(&self.password_input, password).await?;
        info!("[SUCCESS] Password entered.");
        Ok(())
    }

    pub async fn click_login_button(&self) -> Result<()> {
        info!("[ACTION] Clicking 'Login' button...");
        self.page.click(&self.login_button).await?;
        info!("[SUCCESS] 'Login' button clicked.");
        Ok(())
    }

    pub async fn click_remember_me_text(&self) -> Result<()> {
        info!("[ACTION] Clicking 'Remember Me' label text...");
        self.page.click(&self.remember_me_text).await?;
        info!("[SUCCESS] 'Remember Me' label text clicked.");
        Ok(())
    }

    pub async fn check_remember_me(&self) -> Result<()> {
        info!("[ACTION] Checking 'Remember Me' checkbox via label...");
        self.click_remember_me_text().await?;
        info!("[SUCCESS] 'Remember Me' checkbox checked.");
        Ok(())
    }

    pub async fn click_reset_button(&self) -> Result<()> {
        info!("[ACTION] Clicking 'Reset Email' button...");
        if let Err(e) = self.page.click(&self.reset_pw_reset_button).await {
            error!("[ERROR] Failed to click 'Reset Email' button: {:#}.", e);
            return Err(e);
        }
        info!("[SUCCESS] 'Reset Email' button clicked.");
        Ok(())
    }

    pub async fn click_cancel_button(&self) -> Result<()> {
        info!("[ACTION] Clicking 'Cancel' button on 'Reset password' Modal...");
        self.page.click(&self.reset_pw_cancel_button).await?;
        info!("[SUCCESS] 'Cancel' button on 'Reset password' clicked.");
        Ok(())
    }

    pub async fn click_reset_password_link(&self) -> Result<()> {
        info!("[ACTION] Clicking 'Reset Password' link...");
        self.page.click(&self.reset_password_link).await?;
        info!("[SUCCESS] 'Reset Password' link clicked.");
        Ok(())
    }

    /// Submit the reset form; `None` submits it with the email field left empty
    pub async fn reset_password(&self, email: Option<&str>) -> Result<()> {
        match email.filter(|e| !e.is_empty()) {
            Some(email) => {
                info!("[INPUT] Filling reset email: '{}'...", email);
                self.page.fill(&self.reset_pw_email_input, email).await?;
                info!("[SUCCESS] Reset email filled.");
            }
            None => info!("[ACTION] Resetting password with empty email field..."),
        }

        self.click_reset_button().await?;
        info!("[SUCCESS] Password reset sequence completed.");
        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        info!("[ACTION] Performing full login sequence for: '{}'...", email);
        self.enter_email(email).await?;
        self.enter_password(password).await?;
        self.click_login_button().await?;
        info!("[SUCCESS] Login sequence completed.");
        Ok(())
    }

    pub async fn click_signup_button(&self) -> Result<()> {
        info!("[ACTION] Clicking 'Signup' button...");
        self.page.click(&self.signup_button).await?;
        info!("[SUCCESS] 'Signup' button clicked.");
        Ok(())
    }
}
