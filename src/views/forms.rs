//! Login, registration and checkout forms.
//!
//! Fields are checked before anything is submitted: required fields must be
//! non-blank and email fields must look like an address.

use crate::models::User;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

/// A field that failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn required(errors: &mut Vec<FieldError>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError {
            field,
            message: "is required".to_string(),
        });
    }
}

fn email(errors: &mut Vec<FieldError>, field: &'static str, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        required(errors, field, value);
    } else if !EMAIL.is_match(value) {
        errors.push(FieldError {
            field,
            message: format!("'{}' is not a valid email address", value),
        });
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Joins field errors into one notice line
pub fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        email(&mut errors, "email", &self.email);
        required(&mut errors, "password", &self.password);
        finish(errors)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        required(&mut errors, "name", &self.name);
        email(&mut errors, "email", &self.email);
        required(&mut errors, "password", &self.password);
        finish(errors)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
}

impl CheckoutForm {
    /// Starts from the signed-in user's name and email
    pub fn prefilled(user: Option<&User>) -> Self {
        user.map(|u| Self {
            name: u.name.clone(),
            email: u.email.clone(),
        })
        .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        required(&mut errors, "name", &self.name);
        email(&mut errors, "email", &self.email);
        finish(errors)
    }
}
