//! Reusable page regions

pub mod footer;
pub mod login_form;
pub mod mobile_app;
pub mod navbar;

pub use footer::FooterComponent;
pub use login_form::LoginFormComponent;
pub use mobile_app::MobileAppComponent;
pub use navbar::NavbarComponent;
