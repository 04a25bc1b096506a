use thiserror::Error;

/// Failure of a single storefront action.
///
/// Nothing here is fatal to the process; every variant is scoped to the
/// command that produced it.
#[derive(Debug, Error)]
pub enum ShopError {
    /// Backend unreachable, timed out, or the connection dropped.
    #[error("Network error: {0}")]
    Network(String),

    /// Missing, invalid, or expired bearer token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Backend rejected the input (400/422).
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Referenced product or cart item does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unexpected non-2xx status.
    #[error("Server error {status}: {detail}")]
    Server { status: u16, detail: String },

    /// Response body did not match the expected shape.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Action requires a signed-in user.
    #[error("Not signed in")]
    NotSignedIn,
}

/// Coarse classification used when deciding how to present a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Auth,
    Validation,
    Business,
}

impl ShopError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) | Self::Decode(_) | Self::Server { .. } => ErrorKind::Network,
            Self::Unauthorized(_) | Self::NotSignedIn => ErrorKind::Auth,
            Self::Rejected(_) | Self::NotFound(_) => ErrorKind::Validation,
            Self::EmptyCart => ErrorKind::Business,
        }
    }

    /// Backend-provided message, if the failure carried one
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Unauthorized(d) | Self::Rejected(d) | Self::NotFound(d) => {
                Some(d.as_str()).filter(|d| !d.is_empty())
            }
            Self::Server { detail, .. } => Some(detail.as_str()).filter(|d| !d.is_empty()),
            Self::EmptyCart => Some("Cart is empty"),
            _ => None,
        }
    }

    /// Message for a user-visible notice, preferring the backend detail
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }
}
