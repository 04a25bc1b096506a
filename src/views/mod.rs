//! Terminal views over the stores.
//!
//! Renderers return plain text; the REPL decides where it goes. Routing
//! mirrors the storefront pages, including the guards on protected pages.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod forms;
pub mod nav;

use crate::error::ShopError;
use crate::models::Cart;
use crate::session::SessionStore;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Loading,
    Login,
    Register,
    Products,
    Cart,
    Checkout,
}

impl View {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Loading => "",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Products => "/",
            Self::Cart => "/cart",
            Self::Checkout => "/checkout",
        }
    }

    fn is_protected(&self) -> bool {
        matches!(self, Self::Products | Self::Cart | Self::Checkout)
    }
}

/// Where a navigation request actually lands
pub fn navigate(requested: View, session: &SessionStore, cart: &Cart) -> View {
    if requested.is_protected() {
        if session.is_loading() {
            return View::Loading;
        }
        if !session.is_authenticated() {
            return View::Login;
        }
    }
    if requested == View::Checkout && cart.is_empty() {
        return View::Cart;
    }
    requested
}

/// Transient user-visible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self::Success(message.into())
    }

    /// Backend detail if there is one, otherwise `fallback`
    pub fn failure(err: &ShopError, fallback: &str) -> Self {
        Self::Error(err.user_message(fallback))
    }

    pub fn render(&self) -> String {
        match self {
            Self::Success(m) => format!("✓ {}", m),
            Self::Error(m) => format!("✗ {}", m),
        }
    }
}

pub fn money(amount: Decimal) -> String {
    format!("${:.2}", amount)
}

/// Line totals that could not be computed render as "n/a"
pub fn line_money(amount: Option<Decimal>) -> String {
    amount.map(money).unwrap_or_else(|| "n/a".to_string())
}
