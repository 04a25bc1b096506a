//! Wire types exchanged with the storefront backend.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CartItem {
    pub id: String,
    #[serde(default)]
    pub product_id: String,
    pub quantity: u32,
    pub product: Product,
}

impl CartItem {
    /// Unit price times quantity, for display only. `None` if it overflows.
    pub fn line_total(&self) -> Option<Decimal> {
        self.product.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Server-confirmed cart snapshot. `total` comes from the backend and is
/// never recomputed on the client.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total: Decimal,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all lines (the navbar badge)
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .fold(0u64, |count, item| count.saturating_add(u64::from(item.quantity)))
    }

    pub fn find_item(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: User,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MutationAck {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub cart_item_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OrderLine {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub price: Decimal,
}

impl OrderLine {
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Immutable record of a completed checkout
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Receipt {
    pub order_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub items: Vec<OrderLine>,
    pub total: Decimal,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct AddToCartRequest<'a> {
    pub product_id: &'a str,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct UpdateCartRequest {
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct CheckoutRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cart_from_backend_json() {
        let cart: Cart = serde_json::from_value(json!({
            "items": [
                {
                    "id": "ci-1",
                    "product_id": "p1",
                    "quantity": 2,
                    "product": {
                        "id": "p1",
                        "name": "Yoga Mat",
                        "description": "Non-slip exercise mat",
                        "price": 29.99,
                        "category": "Sports",
                        "image": "https://example.com/mat.jpg"
                    }
                }
            ],
            "total": 59.98
        }))
        .unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total, Decimal::new(5998, 2));
        assert_eq!(cart.items[0].line_total(), Some(Decimal::new(5998, 2)));
        assert!(cart.find_item("ci-1").is_some());
        assert!(cart.find_item("nope").is_none());
    }

    fn line(id: &str, price: Decimal, quantity: u32) -> CartItem {
        CartItem {
            id: id.to_string(),
            product_id: "p1".to_string(),
            quantity,
            product: Product {
                id: "p1".to_string(),
                name: "Yoga Mat".to_string(),
                description: String::new(),
                price,
                category: String::new(),
                image: String::new(),
            },
        }
    }

    #[test]
    fn test_item_count_beyond_u32() {
        let cart = Cart {
            items: vec![
                line("ci-1", Decimal::ONE, 3_000_000_000),
                line("ci-2", Decimal::ONE, 3_000_000_000),
            ],
            total: Decimal::ZERO,
        };
        assert_eq!(cart.item_count(), 6_000_000_000);
    }

    #[test]
    fn test_line_total_overflow_is_none() {
        assert_eq!(line("ci-1", Decimal::MAX, 2).line_total(), None);
        let order = OrderLine {
            product_id: "p1".into(),
            product_name: "Yoga Mat".into(),
            quantity: 2,
            price: Decimal::MAX,
        };
        assert_eq!(order.line_total(), None);
    }

    #[test]
    fn test_default_cart_is_empty() {
        let cart = Cart::default();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total, Decimal::ZERO);
    }

    #[test]
    fn test_receipt_parses_python_isoformat() {
        let receipt: Receipt = serde_json::from_value(json!({
            "order_id": "ord-1",
            "total": 49.98,
            "items": [
                {"product_id": "p1", "product_name": "Yoga Mat", "quantity": 1, "price": 29.99},
                {"product_id": "p2", "product_name": "Water Bottle", "quantity": 1, "price": 19.99}
            ],
            "timestamp": "2025-03-01T10:15:30.123456+00:00",
            "customer_name": "Ada",
            "customer_email": "ada@example.com"
        }))
        .unwrap();

        assert_eq!(receipt.items.len(), 2);
        assert_eq!(receipt.total, Decimal::new(4998, 2));
        assert_eq!(receipt.items[1].line_total(), Some(Decimal::new(1999, 2)));
        assert_eq!(receipt.timestamp.format("%Y-%m-%d").to_string(), "2025-03-01");
    }

    #[test]
    fn test_auth_response_without_token_type() {
        let resp: AuthResponse = serde_json::from_value(json!({
            "access_token": "abc",
            "user": {"id": "u1", "email": "a@b.co", "name": "A"}
        }))
        .unwrap();
        assert_eq!(resp.access_token, "abc");
        assert!(resp.token_type.is_none());
    }
}
