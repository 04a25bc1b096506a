//! In-memory backend used by store tests.
//!
//! Follows the REST contract: duplicate product additions merge into one
//! line, totals are rounded to cents, checkout clears the cart.

use crate::api::{AuthHeader, ShopApi};
use crate::error::ShopError;
use crate::models::{AuthResponse, Cart, CartItem, MutationAck, OrderLine, Product, Receipt, User};
use chrono::Utc;
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::collections::HashMap;

struct Account {
    user: User,
    password: String,
}

struct Line {
    id: String,
    user_id: String,
    product_id: String,
    quantity: u32,
}

#[derive(Default)]
struct State {
    products: Vec<Product>,
    accounts: Vec<Account>,
    tokens: HashMap<String, String>,
    lines: Vec<Line>,
    next_id: u64,
    fail_next: Option<ShopError>,
    fail_on: Option<(String, ShopError)>,
    calls: Vec<String>,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn issue_token(&mut self, user_id: &str) -> String {
        let token = self.next_id("tok");
        self.tokens.insert(token.clone(), user_id.to_string());
        token
    }

    fn user_for(&self, auth: &AuthHeader) -> Result<User, ShopError> {
        let token = auth
            .value()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| ShopError::Unauthorized("Not authenticated".into()))?;
        let user_id = self
            .tokens
            .get(token)
            .ok_or_else(|| ShopError::Unauthorized("Invalid token".into()))?;
        self.accounts
            .iter()
            .find(|a| &a.user.id == user_id)
            .map(|a| a.user.clone())
            .ok_or_else(|| ShopError::Unauthorized("User not found".into()))
    }

    fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    fn cart_for(&self, user_id: &str) -> Cart {
        let mut total = Decimal::ZERO;
        let mut items = Vec::new();
        for line in self.lines.iter().filter(|l| l.user_id == user_id) {
            if let Some(product) = self.product(&line.product_id) {
                total += product.price * Decimal::from(line.quantity);
                items.push(CartItem {
                    id: line.id.clone(),
                    product_id: line.product_id.clone(),
                    quantity: line.quantity,
                    product: product.clone(),
                });
            }
        }
        Cart {
            items,
            total: total.round_dp(2),
        }
    }

    fn auth_response(&mut self, user: User) -> AuthResponse {
        let access_token = self.issue_token(&user.id);
        AuthResponse {
            access_token,
            token_type: Some("bearer".into()),
            user,
        }
    }
}

pub fn product(id: &str, name: &str, cents: i64) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{} description", name),
        price: Decimal::new(cents, 2),
        category: "Sports".to_string(),
        image: format!("https://img.example.com/{}.jpg", id),
    }
}

pub struct FakeBackend {
    state: RefCell<State>,
}

impl FakeBackend {
    /// Seeded with `p1` Yoga Mat $29.99 and `p2` Water Bottle $19.99
    pub fn new() -> Self {
        let state = State {
            products: vec![
                product("p1", "Yoga Mat", 2999),
                product("p2", "Water Bottle", 1999),
            ],
            ..State::default()
        };
        Self {
            state: RefCell::new(state),
        }
    }

    pub fn with_account(self, email: &str, password: &str, name: &str) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let id = state.next_id("user");
            state.accounts.push(Account {
                user: User {
                    id,
                    email: email.to_string(),
                    name: name.to_string(),
                },
                password: password.to_string(),
            });
        }
        self
    }

    /// Mint a valid token for an existing account
    pub fn token_for(&self, email: &str) -> String {
        let mut state = self.state.borrow_mut();
        let user_id = state
            .accounts
            .iter()
            .find(|a| a.user.email == email)
            .map(|a| a.user.id.clone())
            .expect("unknown account");
        state.issue_token(&user_id)
    }

    /// Next API call fails with `err` without touching server state
    pub fn fail_next(&self, err: ShopError) {
        self.state.borrow_mut().fail_next = Some(err);
    }

    /// Change a cart behind the client's back
    pub fn server_add(&self, email: &str, product_id: &str, quantity: u32) {
        let mut state = self.state.borrow_mut();
        let user_id = state
            .accounts
            .iter()
            .find(|a| a.user.email == email)
            .map(|a| a.user.id.clone())
            .expect("unknown account");
        let id = state.next_id("ci");
        state.lines.push(Line {
            id,
            user_id,
            product_id: product_id.to_string(),
            quantity,
        });
    }

    /// Next call to `call` (e.g. "GET /cart") fails with `err`; other calls go through
    pub fn fail_on(&self, call: &str, err: ShopError) {
        self.state.borrow_mut().fail_on = Some((call.to_string(), err));
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    fn enter(&self, call: &str) -> Result<std::cell::RefMut<'_, State>, ShopError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call.to_string());
        if let Some(err) = state.fail_next.take() {
            return Err(err);
        }
        if state.fail_on.as_ref().is_some_and(|(target, _)| target == call) {
            if let Some((_, err)) = state.fail_on.take() {
                return Err(err);
            }
        }
        Ok(state)
    }
}

impl ShopApi for FakeBackend {
    fn current_user(&self, auth: &AuthHeader) -> Result<User, ShopError> {
        let state = self.enter("GET /auth/me")?;
        state.user_for(auth)
    }

    fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ShopError> {
        let mut state = self.enter("POST /auth/login")?;
        let user = state
            .accounts
            .iter()
            .find(|a| a.user.email == email && a.password == password)
            .map(|a| a.user.clone())
            .ok_or_else(|| ShopError::Unauthorized("Invalid credentials".into()))?;
        Ok(state.auth_response(user))
    }

    fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthResponse, ShopError> {
        let mut state = self.enter("POST /auth/register")?;
        if state.accounts.iter().any(|a| a.user.email == email) {
            return Err(ShopError::Rejected("Email already registered".into()));
        }
        let user = User {
            id: state.next_id("user"),
            email: email.to_string(),
            name: name.to_string(),
        };
        state.accounts.push(Account {
            user: user.clone(),
            password: password.to_string(),
        });
        Ok(state.auth_response(user))
    }

    fn products(&self) -> Result<Vec<Product>, ShopError> {
        let state = self.enter("GET /products")?;
        Ok(state.products.clone())
    }

    fn product(&self, id: &str) -> Result<Product, ShopError> {
        let state = self.enter("GET /products/{id}")?;
        state
            .product(id)
            .cloned()
            .ok_or_else(|| ShopError::NotFound("Product not found".into()))
    }

    fn cart(&self, auth: &AuthHeader) -> Result<Cart, ShopError> {
        let state = self.enter("GET /cart")?;
        let user = state.user_for(auth)?;
        Ok(state.cart_for(&user.id))
    }

    fn add_to_cart(
        &self,
        auth: &AuthHeader,
        product_id: &str,
        quantity: u32,
    ) -> Result<MutationAck, ShopError> {
        let mut state = self.enter("POST /cart")?;
        let user = state.user_for(auth)?;
        if state.product(product_id).is_none() {
            return Err(ShopError::NotFound("Product not found".into()));
        }
        if let Some(line) = state
            .lines
            .iter_mut()
            .find(|l| l.user_id == user.id && l.product_id == product_id)
        {
            line.quantity += quantity;
            return Ok(MutationAck {
                message: "Cart updated".into(),
                cart_item_id: Some(line.id.clone()),
            });
        }
        let id = state.next_id("ci");
        state.lines.push(Line {
            id: id.clone(),
            user_id: user.id,
            product_id: product_id.to_string(),
            quantity,
        });
        Ok(MutationAck {
            message: "Added to cart".into(),
            cart_item_id: Some(id),
        })
    }

    fn update_cart_item(
        &self,
        auth: &AuthHeader,
        item_id: &str,
        quantity: u32,
    ) -> Result<MutationAck, ShopError> {
        let mut state = self.enter("PATCH /cart/{id}")?;
        let user = state.user_for(auth)?;
        let line = state
            .lines
            .iter_mut()
            .find(|l| l.id == item_id && l.user_id == user.id)
            .ok_or_else(|| ShopError::NotFound("Cart item not found".into()))?;
        if quantity == 0 {
            return Err(ShopError::Rejected("Quantity must be greater than 0".into()));
        }
        line.quantity = quantity;
        Ok(MutationAck {
            message: "Cart item updated".into(),
            cart_item_id: None,
        })
    }

    fn remove_cart_item(
        &self,
        auth: &AuthHeader,
        item_id: &str,
    ) -> Result<MutationAck, ShopError> {
        let mut state = self.enter("DELETE /cart/{id}")?;
        let user = state.user_for(auth)?;
        let before = state.lines.len();
        state
            .lines
            .retain(|l| !(l.id == item_id && l.user_id == user.id));
        if state.lines.len() == before {
            return Err(ShopError::NotFound("Cart item not found".into()));
        }
        Ok(MutationAck {
            message: "Item removed from cart".into(),
            cart_item_id: None,
        })
    }

    fn checkout(&self, auth: &AuthHeader, name: &str, email: &str) -> Result<Receipt, ShopError> {
        let mut state = self.enter("POST /checkout")?;
        let user = state.user_for(auth)?;
        let cart = state.cart_for(&user.id);
        if cart.is_empty() {
            return Err(ShopError::Rejected("Cart is empty".into()));
        }
        let items = cart
            .items
            .iter()
            .map(|item| OrderLine {
                product_id: item.product.id.clone(),
                product_name: item.product.name.clone(),
                quantity: item.quantity,
                price: item.product.price,
            })
            .collect();
        state.lines.retain(|l| l.user_id != user.id);
        let order_id = state.next_id("order");
        Ok(Receipt {
            order_id,
            customer_name: name.to_string(),
            customer_email: email.to_string(),
            items,
            total: cart.total,
            timestamp: Utc::now(),
        })
    }
}
