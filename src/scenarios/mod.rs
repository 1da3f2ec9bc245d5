//! Registered test scenarios

pub mod customer_login;
pub mod customer_signup;
pub mod fixtures;

use crate::runner::scenario::Scenario;

/// Every scenario in collection order
pub fn registry() -> Vec<&'static Scenario> {
    customer_login::SCENARIOS
        .iter()
        .chain(customer_signup::SCENARIOS.iter())
        .copied()
        .collect()
}
