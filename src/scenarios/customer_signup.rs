//! Customer signup page scenarios

use anyhow::Result;
use log::info;

use super::fixtures::{customer_signup_page, signup_success_page};
use crate::helpers::timestamp_email;
use crate::models::CustomerSignupData;
use crate::runner::context::ScenarioContext;
use crate::runner::expect::{expect, expect_locator};
use crate::runner::scenario::{Scenario, Severity};

pub static SCENARIOS: &[&Scenario] = &[&SIGNUP_FORM_SUBMISSION_SUCCESS];

pub static SIGNUP_FORM_SUBMISSION_SUCCESS: Scenario = Scenario {
    id: "TC-001",
    name: "test_signup_form_submission_success",
    module: "test_customer_signup_page",
    class: "TestCustomerSignupPage",
    title: "Successful signup form submission",
    description: r#"### Test Objective
Verify that a new customer can successfully submit the signup form using valid credentials.

### Pre-conditions
* User is on the Signup page.

### Expected Results
* **Redirection**: System redirects to url: `https://www.phptravels.net/signup_success`.
* **Notification**: A success message is displayed: *"Your account has been created. Please check your mailbox for activation"*
"#,
    parent_suite: "User Management",
    suite: "Customer Signup",
    sub_suite: "Positive cases",
    owner: "Mai Anh",
    severity: Severity::Blocker,
    tags: &["Signup"],
    markers: &["auth", "smoke"],
    skip: None,
    run: |ctx| Box::pin(signup_form_submission_success(ctx)),
};

async fn signup_form_submission_success(ctx: &ScenarioContext) -> Result<()> {
    info!("--- STARTING TEST: [TC-001] - Successful signup form submission ---");

    let data = CustomerSignupData {
        first_name: "Ha Lan".to_string(),
        last_name: "Nguyen".to_string(),
        country: "Viet Nam".to_string(),
        phone: "0987356278".to_string(),
        email: timestamp_email(),
        password: "************".to_string(),
    };
    ctx.attach_json("Data_Input_Signup", &data.masked())?;
    info!("[PRE-CONDITION] Preparing signup data for: '{:?}'...", data);

    let signup_page = customer_signup_page(ctx);
    let success_page = signup_success_page(ctx);

    ctx.step("Step 1: Navigating to Customer Signup page", signup_page.navigate())
        .await?;
    ctx.step(
        &format!("Step 2: Entering first name: '{}'", data.first_name),
        signup_page.enter_first_name(&data.first_name),
    )
    .await?;
    ctx.step(
        &format!("Step 3: Entering last name: '{}'", data.last_name),
        signup_page.enter_last_name(&data.last_name),
    )
    .await?;
    ctx.step(
        &format!("Step 4: Selecting country: '{}'", data.country),
        signup_page.select_country(&data.country),
    )
    .await?;
    ctx.step(
        &format!("Step 5: Entering phone number: '{}'", data.phone),
        signup_page.enter_phone(&data.phone),
    )
    .await?;
    ctx.step(
        &format!("Step 6: Entering email address: '{}'", data.email),
        signup_page.enter_email(&data.email),
    )
    .await?;
    ctx.step("Step 7: Entering password", signup_page.enter_password(&data.password))
        .await?;
    ctx.step("Step 8: Clicking captcha checkbox", signup_page.click_captcha_checkbox())
        .await?;
    ctx.step(
        "Step 9: Solving captcha challenge",
        signup_page.wait_for_solve_captcha(ctx.config().captcha_timeout_ms),
    )
    .await?;
    ctx.step("Step 10: Clicking the 'Signup' button", signup_page.click_signup_button())
        .await?;

    info!("[VERIFICATION] Verifying signup success redirection and messages...");
    let page = &signup_page.base.page;
    let card = &success_page.notification_card;
    let timeout = ctx.config().expect_timeout_ms;

    ctx.step("Step 11: Verifying Actual Results", async {
        ctx.step("Verifying redirection to the Success Page", async {
            info!("[VERIFICATION] Verifying redirection to URL: '{}'...", success_page.url);
            expect(page)
                .with_timeout(timeout)
                .to_have_url(&success_page.url)
                .await?;
            info!("[SUCCESS] URL verified.");
            anyhow::Ok(())
        })
        .await?;

        ctx.step("Verifying the activate account notification card is visible", async {
            info!("[VERIFICATION] Verifying notification card visibility...");
            expect_locator(page, card)
                .with_timeout(timeout)
                .to_be_visible()
                .await?;
            info!("[SUCCESS] Notification card visible.");
            anyhow::Ok(())
        })
        .await?;

        ctx.step("Verifying the activate account notification content", async {
            info!("[VERIFICATION] Verifying notification text content...");
            success_page
                .activate_account_msgs
                .verify(&expect_locator(page, card).with_timeout(timeout))
                .await?;
            info!("[SUCCESS] Notification content verified.");
            anyhow::Ok(())
        })
        .await
    })
    .await?;

    info!("--- TEST COMPLETED: [TC-001] ---");
    Ok(())
}
