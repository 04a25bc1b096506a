//! Cart state mirrored from the backend.
//!
//! The cart is never patched locally. Every mutation is followed by a full
//! refetch, and each refetch replaces the snapshot wholesale, so the client
//! only ever shows server-confirmed contents and the server's total.

use crate::api::ShopApi;
use crate::error::ShopError;
use crate::listeners::{Listeners, SubscriptionId};
use crate::models::Cart;
use crate::session::Session;
use std::rc::Rc;

/// Issued when a refresh starts. Responses are applied only if their ticket
/// is newer than the last applied one, so a late response cannot overwrite
/// a fresher snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

pub struct CartStore {
    api: Rc<dyn ShopApi>,
    cart: Cart,
    issued: u64,
    applied: u64,
    listeners: Listeners<Cart>,
}

impl CartStore {
    pub fn new(api: Rc<dyn ShopApi>) -> Self {
        Self {
            api,
            cart: Cart::default(),
            issued: 0,
            applied: 0,
            listeners: Listeners::default(),
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    pub fn subscribe(&mut self, callback: impl Fn(&Cart) + 'static) -> SubscriptionId {
        self.listeners.subscribe(callback)
    }

    #[allow(dead_code)] // For future views that close before the store does
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket(self.issued)
    }

    /// Apply a fetched cart. Returns `Ok(false)` when the response was stale
    /// and discarded; a failed fetch leaves the current snapshot in place.
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<Cart, ShopError>,
    ) -> Result<bool, ShopError> {
        let cart = result?;
        if ticket.0 <= self.applied {
            tracing::debug!(ticket = ticket.0, applied = self.applied, "discarding stale cart");
            return Ok(false);
        }
        self.applied = ticket.0;
        self.replace(cart);
        Ok(true)
    }

    /// Refetch the authoritative cart. Anonymous sessions have an empty cart.
    pub fn refresh(&mut self, session: &Session) -> Result<(), ShopError> {
        if !session.is_authenticated() {
            self.reset();
            return Ok(());
        }
        let ticket = self.begin_refresh();
        let result = self.api.cart(&session.auth_header());
        self.complete_refresh(ticket, result).map(|_| ())
    }

    /// Drop the snapshot and invalidate any refresh still outstanding
    pub fn reset(&mut self) {
        self.applied = self.issued;
        if self.cart != Cart::default() {
            self.replace(Cart::default());
        }
    }

    pub fn add(&mut self, session: &Session, product_id: &str, quantity: u32) -> Result<(), ShopError> {
        require_signed_in(session)?;
        let ack = self
            .api
            .add_to_cart(&session.auth_header(), product_id, quantity)?;
        tracing::debug!(
            product_id,
            quantity,
            cart_item_id = ?ack.cart_item_id,
            message = %ack.message,
            "added to cart"
        );
        self.refresh_after_mutation(session);
        Ok(())
    }

    /// The caller keeps `quantity >= 1`; the store passes it through as is
    pub fn update_quantity(
        &mut self,
        session: &Session,
        item_id: &str,
        quantity: u32,
    ) -> Result<(), ShopError> {
        require_signed_in(session)?;
        self.api
            .update_cart_item(&session.auth_header(), item_id, quantity)?;
        tracing::debug!(item_id, quantity, "cart item updated");
        self.refresh_after_mutation(session);
        Ok(())
    }

    pub fn remove(&mut self, session: &Session, item_id: &str) -> Result<(), ShopError> {
        require_signed_in(session)?;
        self.api.remove_cart_item(&session.auth_header(), item_id)?;
        tracing::debug!(item_id, "cart item removed");
        self.refresh_after_mutation(session);
        Ok(())
    }

    fn refresh_after_mutation(&mut self, session: &Session) {
        if let Err(e) = self.refresh(session) {
            tracing::warn!(error = %e, "failed to refresh cart");
        }
    }

    fn replace(&mut self, cart: Cart) {
        self.cart = cart;
        self.listeners.notify(&self.cart);
    }
}

fn require_signed_in(session: &Session) -> Result<(), ShopError> {
    if session.is_authenticated() {
        Ok(())
    } else {
        Err(ShopError::NotSignedIn)
    }
}
