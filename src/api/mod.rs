//! REST contract of the storefront backend.

mod client;

pub use client::Client;

use crate::error::ShopError;
use crate::models::{AuthResponse, Cart, MutationAck, Product, Receipt, User};

/// Authorization header derived from the session token.
///
/// Empty when the session is anonymous; requests built with an empty header
/// carry no `Authorization` line at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthHeader(Option<String>);

impl AuthHeader {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn bearer(token: &str) -> Self {
        Self(Some(format!("Bearer {}", token)))
    }

    pub fn value(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Header set as name/value pairs: zero or one entry
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        self.value()
            .map(|v| vec![("Authorization", v)])
            .unwrap_or_default()
    }
}

/// Trait for storefront backends to allow mocking and abstraction
pub trait ShopApi {
    fn current_user(&self, auth: &AuthHeader) -> Result<User, ShopError>;
    fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ShopError>;
    fn register(&self, email: &str, password: &str, name: &str)
        -> Result<AuthResponse, ShopError>;
    fn products(&self) -> Result<Vec<Product>, ShopError>;
    fn product(&self, id: &str) -> Result<Product, ShopError>;
    fn cart(&self, auth: &AuthHeader) -> Result<Cart, ShopError>;
    fn add_to_cart(
        &self,
        auth: &AuthHeader,
        product_id: &str,
        quantity: u32,
    ) -> Result<MutationAck, ShopError>;
    fn update_cart_item(
        &self,
        auth: &AuthHeader,
        item_id: &str,
        quantity: u32,
    ) -> Result<MutationAck, ShopError>;
    fn remove_cart_item(&self, auth: &AuthHeader, item_id: &str)
        -> Result<MutationAck, ShopError>;
    fn checkout(&self, auth: &AuthHeader, name: &str, email: &str)
        -> Result<Receipt, ShopError>;
}
