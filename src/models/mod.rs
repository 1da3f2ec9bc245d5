use serde::{Deserialize, Serialize};
use std::fmt;

use crate::helpers::mask_text;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSignupData {
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub phone: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerLoginData {
    pub email: String,
    pub password: String,
}

impl CustomerSignupData {
    /// Copy with the password masked, safe to log or attach
    pub fn masked(&self) -> Self {
        Self {
            password: mask_text(&self.password),
            ..self.clone()
        }
    }

    /// Credentials of the account this data registers
    pub fn login(&self) -> CustomerLoginData {
        CustomerLoginData {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

impl CustomerLoginData {
    pub fn masked(&self) -> Self {
        Self {
            password: mask_text(&self.password),
            ..self.clone()
        }
    }
}

// Debug output never shows the password
impl fmt::Debug for CustomerSignupData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomerSignupData")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("country", &self.country)
            .field("phone", &self.phone)
            .field("email", &self.email)
            .field("password", &mask_text(&self.password))
            .finish()
    }
}

impl fmt::Debug for CustomerLoginData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomerLoginData")
            .field("email", &self.email)
            .field("password", &mask_text(&self.password))
            .finish()
    }
}
