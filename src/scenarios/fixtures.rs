//! Page-object fixtures, built once per test on first request

use std::sync::Arc;

use crate::pages::{CustomerLoginPage, CustomerSignupPage, SignupSuccessPage};
use crate::runner::context::ScenarioContext;

pub fn customer_login_page(ctx: &ScenarioContext) -> Arc<CustomerLoginPage> {
    ctx.fixture("customer_login_page", CustomerLoginPage::new)
}

pub fn customer_signup_page(ctx: &ScenarioContext) -> Arc<CustomerSignupPage> {
    ctx.fixture("customer_signup_page", CustomerSignupPage::new)
}

pub fn signup_success_page(ctx: &ScenarioContext) -> Arc<SignupSuccessPage> {
    ctx.fixture("signup_success_page", SignupSuccessPage::new)
}
