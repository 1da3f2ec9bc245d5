use anyhow::Result;
use log::info;
use std::sync::Arc;

use crate::driver::{BrowserPage, Locator};

pub struct FooterComponent {
    page: Arc<dyn BrowserPage>,
    pub root: Locator,

    pub about_us_link: Locator,
    pub privacy_policy_link: Locator,
    pub file_a_claim_link: Locator,
    pub contact_us_link: Locator,
    pub become_a_supplier_link: Locator,
    pub careers_and_jobs_link: Locator,
    pub faq_link: Locator,
    pub how_to_book_link: Locator,
    pub terms_of_use_link: Locator,
    pub cookies_policy_link: Locator,
    pub booking_tips_link: Locator,

    pub agency_logo: Locator,
    pub phone: Locator,
    pub email: Locator,
    pub contact_icon: Locator,

    pub newsletter_name_input: Locator,
    pub newsletter_email_input: Locator,
    pub subscribe_button: Locator,

    pub copyright: Locator,
    pub powered_by: Locator,
    pub platform_logo: Locator,

    pub facebook_icon: Locator,
    pub twitter_icon: Locator,
    pub linkedin_icon: Locator,
    pub google_plus_icon: Locator,
    pub youtube_icon: Locator,
    pub whatsapp_icon: Locator,
    pub instagram_icon: Locator,
}

impl FooterComponent {
    pub fn new(page: Arc<dyn BrowserPage>) -> Self {
        let root = Locator::css("section.footer-area");
        let link = |name: &str| root.locator(Locator::role("link").named(name));
        let social = |href: &str| {
            root.locator(Locator::css(format!(
                "ul.social-profile a[href=\"{}\"]",
                href
            )))
        };

        Self {
            page,
            about_us_link: link("About Us"),
            privacy_policy_link: link("Privacy Policy"),
            file_a_claim_link: link("File A Claim"),
            contact_us_link: root
                .locator(Locator::css("ul.dropdown-menu-item"))
                .locator(Locator::role("link").named("Contact Us")),
            become_a_supplier_link: link("Become A Supplier"),
            careers_and_jobs_link: link("Careers And Jobs"),
            faq_link: link("Faq"),
            how_to_book_link: link("How To Book"),
            terms_of_use_link: link("Terms Of Use"),
            cookies_policy_link: link("Cookies Policy"),
            booking_tips_link: link("Booking Tips"),

            agency_logo: link("logo"),
            phone: root.locator(Locator::text("+123456789")),
            email: root.locator(Locator::text("email@agency.com")),
            contact_icon: root
                .locator(Locator::css("ul.list-items"))
                .locator(Locator::role("link").named("Contact Us")),

            newsletter_name_input: root.locator(Locator::css("input[name='name']")),
            newsletter_email_input: root.locator(Locator::css("input[name='email']")),
            subscribe_button: root.locator(Locator::role("button").named("Signup Newsletter")),

            copyright: root.locator(Locator::text("All Rights Reserved by PHPTARVELS")),
            powered_by: root.locator(Locator::text("Powered by PHPTRAVELS v9.1")),
            platform_logo: link("phptravels"),

            facebook_icon: social("https://facebook.com/phptravels"),
            twitter_icon: social("https://twitter.com/phptravelss"),
            linkedin_icon: social("https://twitter.com/phptravels"),
            google_plus_icon: social("https://google.com/phptravels"),
            youtube_icon: social("https://youtube.com/phptravels"),
            whatsapp_icon: social("https://whatsapp.com/phptravels"),
            instagram_icon: social("https://instagram.com/phptravels"),
            root,
        }
    }

    pub async fn click_footer_link(&self, link: &Locator) -> Result<()> {
        info!("[ACTION] Clicking on footer link: {}...", link);
        self.page.click(link).await?;
        info!("[SUCCESS] {} clicked.", link);
        Ok(())
    }

    pub async fn click_social_icon(&self, icon: &Locator) -> Result<()> {
        info!("[ACTION] Navigating to social media profile: {}...", icon);
        self.page.click(icon).await?;
        info!("[SUCCESS] {} navigation completed.", icon);
        Ok(())
    }

    pub async fn click_agency_logo(&self) -> Result<()> {
        info!("[ACTION] Clicking 'Agency Logo' in footer...");
        self.page.click(&self.agency_logo).await?;
        info!("[SUCCESS] 'Agency Logo' clicked.");
        Ok(())
    }

    pub async fn click_platform_logo(&self) -> Result<()> {
        info!("[ACTION] Clicking 'PHPTRAVELS' platform logo...");
        self.page.click(&self.platform_logo).await?;
        info!("[SUCCESS] 'PHPTRAVELS' platform logo clicked.");
        Ok(())
    }

    pub async fn click_contact_link(&self) -> Result<()> {
        info!("[ACTION] Clicking 'Contact Us' info link in footer...");
        self.page.click(&self.contact_icon).await?;
        info!("[SUCCESS] 'Contact Us' info link clicked.");
        Ok(())
    }

    pub async fn enter_name(&self, name: &str) -> Result<()> {
        info!("[INPUT] Entering name for newsletter: '{}'...", name);
        self.page.fill(&self.newsletter_name_input, name).await?;
        info!("[SUCCESS] Name entered.");
        Ok(())
    }

    pub async fn enter_email(&self, email: &str) -> Result<()> {
        info!("[INPUT] Entering email for newsletter: '{}'...", email);
        self.page.fill(&self.newsletter_email_input, email).await?;
        info!("[SUCCESS] Email entered.");
        Ok(())
    }

    pub async fn click_subscribe_button(&self) -> Result<()> {
        info!("[ACTION] Clicking 'Signup' button on Newsletter form...");
        self.page.click(&self.subscribe_button).await?;
        info!("[SUCCESS] 'Signup' button clicked.");
        Ok(())
    }

    pub async fn subscribe_newsletter(&self, name: &str, email: &str) -> Result<()> {
        info!("[ACTION] Performing full newsletter subscription for: '{}'...", email);
        self.enter_name(name).await?;
        self.enter_email(email).await?;
        self.click_subscribe_button().await?;
        info!("[SUCCESS] Newsletter subscription form submitted.");
        Ok(())
    }
}
