use anyhow::Result;
use log::info;
use regex::Regex;
use std::sync::Arc;

use crate::driver::{BrowserPage, Locator};

/// Accessible name of the currency dropdown: the selected currency code
pub const CURRENCY_PATTERN: &str = "^(USD|GBP|SAR|EUR|PHP)$";

/// Top navigation bar
pub struct NavbarComponent {
    page: Arc<dyn BrowserPage>,
    pub root: Locator,
    pub agency_logo: Locator,
    pub flights_link: Locator,
    pub hotels_link: Locator,
    pub tours_link: Locator,
    pub cars_link: Locator,
    pub visa_link: Locator,
    pub blogs_link: Locator,
    pub language_dropdown: Locator,
    pub currency_dropdown: Locator,
    pub agents_dropdown: Locator,
    pub customer_dropdown: Locator,
    /// Entries of whichever dropdown is open
    pub open_menu: Locator,
    pub login_link: Locator,
    pub signup_link: Locator,
}

impl NavbarComponent {
    pub fn new(page: Arc<dyn BrowserPage>) -> Self {
        let root = Locator::role("banner");
        let link = |name: &str| root.locator(Locator::role("link").named(name));
        let button = |name: &str| root.locator(Locator::role("button").named(name));
        let open_menu = root.locator(Locator::css("ul.dropdown-menu:visible"));

        Self {
            page,
            agency_logo: link("logo"),
            flights_link: link("Flights"),
            hotels_link: link("Hotels"),
            tours_link: link("Tours"),
            cars_link: link("Cars"),
            visa_link: link("Visa"),
            blogs_link: link("Blogs"),
            language_dropdown: button("flag"),
            currency_dropdown: root
                .locator(Locator::role("button").name_matching(CURRENCY_PATTERN)),
            agents_dropdown: button("Agents"),
            customer_dropdown: button("Customer"),
            login_link: open_menu.locator(Locator::role("link").named("Login")),
            signup_link: open_menu.locator(Locator::role("link").named("Signup")),
            open_menu,
            root,
        }
    }

    /// Whether `code` is a currency the dropdown can show
    pub fn is_currency_code(code: &str) -> bool {
        Regex::new(CURRENCY_PATTERN)
            .map(|re| re.is_match(code))
            .unwrap_or(false)
    }

    pub async fn click_agency_logo(&self) -> Result<()> {
        info!("[ACTION] Clicking 'Agency Logo' in navigation bar...");
        self.page.click(&self.agency_logo).await?;
        info!("[SUCCESS] 'Agency Logo' clicked.");
        Ok(())
    }

    pub async fn click_navbar_link(&self, link: &Locator) -> Result<()> {
        info!("[ACTION] Clicking navbar link: {}...", link);
        self.page.click(link).await?;
        info!("[SUCCESS] {} clicked.", link);
        Ok(())
    }

    pub async fn select_language(&self, language_name: &str) -> Result<()> {
        info!("[ACTION] Selecting language: '{}'...", language_name);
        self.page.click(&self.language_dropdown).await?;
        let target = self
            .open_menu
            .locator(Locator::role("link").named(language_name));
        self.page.click(&target).await?;
        info!("[SUCCESS] Language '{}' selected.", language_name);
        Ok(())
    }

    pub async fn select_currency(&self, currency_code: &str) -> Result<()> {
        info!("[ACTION] Selecting currency: '{}'...", currency_code);
        if !Self::is_currency_code(currency_code) {
            anyhow::bail!("Unsupported currency: {}", currency_code);
        }
        self.page.click(&self.currency_dropdown).await?;
        let target = self
            .open_menu
            .locator(Locator::role("link").named(currency_code));
        self.page.click(&target).await?;
        info!("[SUCCESS] Currency '{}' selected.", currency_code);
        Ok(())
    }

    pub async fn go_to_agents_login(&self) -> Result<()> {
        info!("[ACTION] Navigating to 'Agents Login' page...");
        self.page.click(&self.agents_dropdown).await?;
        self.page.click(&self.login_link).await?;
        info!("[SUCCESS] Navigation to 'Agents Login' page completed.");
        Ok(())
    }

    pub async fn go_to_agents_signup(&self) -> Result<()> {
        info!("[ACTION] Navigating to 'Agents Signup' page...");
        self.page.click(&self.agents_dropdown).await?;
        self.page.click(&self.signup_link).await?;
        info!("[SUCCESS] Navigation to 'Agents Signup' page completed.");
        Ok(())
    }

    pub async fn go_to_customer_login(&self) -> Result<()> {
        info!("[ACTION] Navigating to 'Customer Login' page...");
        self.page.click(&self.customer_dropdown).await?;
        self.page.click(&self.login_link).await?;
        info!("[SUCCESS] Navigation to 'Customer Login' page completed.");
        Ok(())
    }

    pub async fn go_to_customer_signup(&self) -> Result<()> {
        info!("[ACTION] Navigating to 'Customer Signup' page...");
        self.page.click(&self.customer_dropdown).await?;
        self.page.click(&self.signup_link).await?;
        info!("[SUCCESS] Navigation to 'Customer Signup' page completed.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::{Effect, MockPage};

    #[test]
    fn test_currency_codes() {
        assert!(NavbarComponent::is_currency_code("USD"));
        assert!(NavbarComponent::is_currency_code("PHP"));
        assert!(!NavbarComponent::is_currency_code("usd"));
        assert!(!NavbarComponent::is_currency_code("USDT"));
    }

    #[test]
    fn test_currency_dropdown_uses_pattern() {
        let navbar = NavbarComponent::new(Arc::new(MockPage::new("about:blank")));
        assert_eq!(
            navbar.currency_dropdown.to_selector(),
            "role=banner >> role=button[name=/^(USD|GBP|SAR|EUR|PHP)$/]"
        );
    }

    #[tokio::test]
    async fn test_go_to_customer_login_opens_menu_first() {
        let mock = MockPage::new("https://www.phptravels.net/");
        let navbar = NavbarComponent::new(Arc::new(MockPage::new("unused")));
        let page = Arc::new(mock.on_click(
            &navbar.login_link,
            Effect::Navigate("https://www.phptravels.net/login".to_string()),
        ));
        let navbar = NavbarComponent::new(page.clone());

        navbar.go_to_customer_login().await.unwrap();

        assert_eq!(page.clicks(), vec![navbar.customer_dropdown.clone(), navbar.login_link.clone()]);
        assert_eq!(
            page.current_url().await.unwrap(),
            "https://www.phptravels.net/login"
        );
    }

    #[tokio::test]
    async fn test_unknown_currency_is_rejected() {
        let page = Arc::new(MockPage::new("about:blank"));
        let navbar = NavbarComponent::new(page.clone());
        assert!(navbar.select_currency("BTC").await.is_err());
        assert!(page.clicks().is_empty());

        navbar.select_currency("EUR").await.unwrap();
        assert_eq!(page.clicks().len(), 2);
    }
}
