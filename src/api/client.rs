//! ureq-backed implementation of [`ShopApi`].

use super::{AuthHeader, ShopApi};
use crate::error::ShopError;
use crate::models::{
    AddToCartRequest, AuthResponse, Cart, CheckoutRequest, LoginRequest, MutationAck, Product,
    Receipt, RegisterRequest, UpdateCartRequest, User,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

pub struct Client {
    base_url: String,
    agent: ureq::Agent,
}

impl Client {
    /// `base_url` already includes the API base path (e.g. `http://localhost:8000/api`)
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(req: ureq::Request, auth: &AuthHeader) -> ureq::Request {
        auth.pairs()
            .into_iter()
            .fold(req, |req, (name, value)| req.set(name, value))
    }

    fn send<T: DeserializeOwned>(
        &self,
        req: ureq::Request,
        body: Option<Value>,
    ) -> Result<T, ShopError> {
        let method = req.method().to_string();
        let url = req.url().to_string();
        tracing::debug!(%method, %url, "request");

        let req = req.set("Accept", "application/json");
        let resp = match body {
            Some(body) => req.send_json(body),
            None => req.call(),
        };

        match resp {
            Ok(r) => r
                .into_json::<T>()
                .map_err(|e| ShopError::Decode(e.to_string())),
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                tracing::debug!(%method, %url, status = code, "request rejected");
                Err(classify(code, &body))
            }
            Err(e) => Err(ShopError::Network(e.to_string())),
        }
    }

    fn encode<B: serde::Serialize>(body: &B) -> Result<Value, ShopError> {
        serde_json::to_value(body).map_err(|e| ShopError::Decode(e.to_string()))
    }
}

/// Map a non-2xx response onto the error taxonomy
pub(crate) fn classify(status: u16, body: &str) -> ShopError {
    let detail = extract_detail(body);
    match status {
        401 | 403 => ShopError::Unauthorized(detail),
        400 | 422 => ShopError::Rejected(detail),
        404 => ShopError::NotFound(detail),
        _ => ShopError::Server { status, detail },
    }
}

/// Pull the human-readable message out of a `{"detail": ...}` body.
/// List-valued details (schema validation) are joined into one line.
fn extract_detail(body: &str) -> String {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return body.trim().to_string(),
    };

    match value.get("detail") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| {
                entry
                    .get("msg")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| entry.to_string())
            })
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None => body.trim().to_string(),
    }
}

impl ShopApi for Client {
    fn current_user(&self, auth: &AuthHeader) -> Result<User, ShopError> {
        let req = Self::authorized(self.agent.get(&self.url("/auth/me")), auth);
        self.send(req, None)
    }

    fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ShopError> {
        let body = Self::encode(&LoginRequest { email, password })?;
        self.send(self.agent.post(&self.url("/auth/login")), Some(body))
    }

    fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthResponse, ShopError> {
        let body = Self::encode(&RegisterRequest {
            email,
            password,
            name,
        })?;
        self.send(self.agent.post(&self.url("/auth/register")), Some(body))
    }

    fn products(&self) -> Result<Vec<Product>, ShopError> {
        self.send(self.agent.get(&self.url("/products")), None)
    }

    fn product(&self, id: &str) -> Result<Product, ShopError> {
        self.send(self.agent.get(&self.url(&format!("/products/{}", id))), None)
    }

    fn cart(&self, auth: &AuthHeader) -> Result<Cart, ShopError> {
        let req = Self::authorized(self.agent.get(&self.url("/cart")), auth);
        self.send(req, None)
    }

    fn add_to_cart(
        &self,
        auth: &AuthHeader,
        product_id: &str,
        quantity: u32,
    ) -> Result<MutationAck, ShopError> {
        let body = Self::encode(&AddToCartRequest {
            product_id,
            quantity,
        })?;
        let req = Self::authorized(self.agent.post(&self.url("/cart")), auth);
        self.send(req, Some(body))
    }

    fn update_cart_item(
        &self,
        auth: &AuthHeader,
        item_id: &str,
        quantity: u32,
    ) -> Result<MutationAck, ShopError> {
        let body = Self::encode(&UpdateCartRequest { quantity })?;
        let url = self.url(&format!("/cart/{}", item_id));
        let req = Self::authorized(self.agent.patch(&url), auth);
        self.send(req, Some(body))
    }

    fn remove_cart_item(
        &self,
        auth: &AuthHeader,
        item_id: &str,
    ) -> Result<MutationAck, ShopError> {
        let url = self.url(&format!("/cart/{}", item_id));
        let req = Self::authorized(self.agent.delete(&url), auth);
        self.send(req, None)
    }

    fn checkout(&self, auth: &AuthHeader, name: &str, email: &str) -> Result<Receipt, ShopError> {
        let body = Self::encode(&CheckoutRequest { name, email })?;
        let req = Self::authorized(self.agent.post(&self.url("/checkout")), auth);
        self.send(req, Some(body))
    }
}
