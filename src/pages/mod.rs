//! Page objects

pub mod base_page;
pub mod customer_login_page;
pub mod customer_signup_page;
pub mod signup_success_page;

pub use base_page::{BasePage, DialogResult};
pub use customer_login_page::CustomerLoginPage;
pub use customer_signup_page::CustomerSignupPage;
pub use signup_success_page::SignupSuccessPage;
