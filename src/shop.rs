//! Application-wide store wiring.
//!
//! `Shop` is built once at startup and handed to the views. It owns both
//! stores and keeps the cart in step with the session: a new identity
//! triggers a cart refresh, signing out empties it.

use crate::api::ShopApi;
use crate::cart::CartStore;
use crate::checkout::Checkout;
use crate::error::ShopError;
use crate::models::{Product, Receipt, User};
use crate::session::SessionStore;
use crate::token::TokenFile;
use crate::views::forms::CheckoutForm;
use std::rc::Rc;

pub struct Shop {
    api: Rc<dyn ShopApi>,
    session: SessionStore,
    cart: CartStore,
    checkout: Checkout,
}

impl Shop {
    pub fn new(api: Rc<dyn ShopApi>, tokens: TokenFile) -> Self {
        Self {
            session: SessionStore::new(api.clone(), tokens),
            cart: CartStore::new(api.clone()),
            checkout: Checkout::new(api.clone()),
            api,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionStore {
        &mut self.session
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    /// Startup: restore the session, then load its cart
    pub fn start(&mut self) {
        self.session.verify();
        self.sync_cart(None);
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<User, ShopError> {
        let previous = self.current_user_id();
        let user = self.session.login(email, password)?;
        self.sync_cart(previous);
        Ok(user)
    }

    pub fn register(&mut self, email: &str, password: &str, name: &str) -> Result<User, ShopError> {
        let previous = self.current_user_id();
        let user = self.session.register(email, password, name)?;
        self.sync_cart(previous);
        Ok(user)
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.cart.reset();
    }

    /// Fetched fresh on every call
    pub fn products(&self) -> Result<Vec<Product>, ShopError> {
        self.api.products()
    }

    pub fn product(&self, id: &str) -> Result<Product, ShopError> {
        self.api.product(id)
    }

    pub fn add_to_cart(&mut self, product_id: &str, quantity: u32) -> Result<(), ShopError> {
        self.cart.add(self.session.session(), product_id, quantity)
    }

    pub fn update_quantity(&mut self, item_id: &str, quantity: u32) -> Result<(), ShopError> {
        self.cart
            .update_quantity(self.session.session(), item_id, quantity)
    }

    pub fn remove_item(&mut self, item_id: &str) -> Result<(), ShopError> {
        self.cart.remove(self.session.session(), item_id)
    }

    pub fn refresh_cart(&mut self) -> Result<(), ShopError> {
        self.cart.refresh(self.session.session())
    }

    pub fn place_order(&mut self, form: &CheckoutForm) -> Result<Receipt, ShopError> {
        self.checkout
            .place_order(self.session.session(), &mut self.cart, form)
    }

    fn current_user_id(&self) -> Option<String> {
        self.session.user().map(|u| u.id.clone())
    }

    fn sync_cart(&mut self, previous: Option<String>) {
        let current = self.current_user_id();
        match current {
            None => self.cart.reset(),
            Some(id) if previous.as_deref() != Some(id.as_str()) => {
                if let Err(e) = self.cart.refresh(self.session.session()) {
                    tracing::warn!(error = %e, "failed to load cart");
                }
            }
            Some(_) => {}
        }
    }
}
