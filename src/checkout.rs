//! Order placement.
//!
//! Checkout holds no state of its own. The backend turns the server-side
//! cart into an order; the client sends only the customer details and then
//! refetches the cart, which should come back empty.

use crate::api::ShopApi;
use crate::cart::CartStore;
use crate::error::ShopError;
use crate::models::Receipt;
use crate::session::Session;
use crate::views::forms::{self, CheckoutForm};
use std::rc::Rc;

pub struct Checkout {
    api: Rc<dyn ShopApi>,
}

impl Checkout {
    pub fn new(api: Rc<dyn ShopApi>) -> Self {
        Self { api }
    }

    /// Place the order for whatever the server holds in the cart.
    ///
    /// Fails without a request when signed out, when the cart is empty, or
    /// when the form is incomplete. A failed submission changes nothing.
    pub fn place_order(
        &self,
        session: &Session,
        cart: &mut CartStore,
        form: &CheckoutForm,
    ) -> Result<Receipt, ShopError> {
        if !session.is_authenticated() {
            return Err(ShopError::NotSignedIn);
        }
        if cart.cart().is_empty() {
            return Err(ShopError::EmptyCart);
        }
        if let Err(errors) = form.validate() {
            return Err(ShopError::Rejected(forms::describe(&errors)));
        }

        let receipt = self.api.checkout(
            &session.auth_header(),
            form.name.trim(),
            form.email.trim(),
        )?;
        tracing::info!(order_id = %receipt.order_id, total = %receipt.total, "order placed");

        if let Err(e) = cart.refresh(session) {
            tracing::warn!(error = %e, "failed to refresh cart after checkout");
        }
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use crate::testing::FakeBackend;
    use crate::token::{TokenFile, TOKEN_KEY};
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn setup() -> (Rc<FakeBackend>, SessionStore, CartStore, TempDir) {
        let api = Rc::new(FakeBackend::new().with_account("ada@example.com", "secret", "Ada"));
        let dir = TempDir::new().unwrap();
        let mut session = SessionStore::new(api.clone(), TokenFile::new(dir.path().join(TOKEN_KEY)));
        session.login("ada@example.com", "secret").unwrap();
        let cart = CartStore::new(api.clone());
        (api, session, cart, dir)
    }

    #[test]
    fn test_receipt_matches_cart_and_cart_empties() {
        let (api, session, mut cart, _dir) = setup();
        cart.add(session.session(), "p1", 1).unwrap();
        cart.add(session.session(), "p2", 1).unwrap();
        let before = cart.cart().clone();
        assert_eq!(before.total, Decimal::new(4998, 2));

        let checkout = Checkout::new(api);
        let form = CheckoutForm::prefilled(session.user());
        let receipt = checkout
            .place_order(session.session(), &mut cart, &form)
            .unwrap();

        assert_eq!(receipt.total, before.total);
        assert_eq!(receipt.customer_name, "Ada");
        assert_eq!(receipt.customer_email, "ada@example.com");
        assert_eq!(receipt.items.len(), before.items.len());
        for (line, item) in receipt.items.iter().zip(before.items.iter()) {
            assert_eq!(line.product_id, item.product.id);
            assert_eq!(line.quantity, item.quantity);
            assert_eq!(line.price, item.product.price);
        }
        assert!(cart.cart().is_empty());
    }

    #[test]
    fn test_empty_cart_blocked_before_submit() {
        let (api, session, mut cart, _dir) = setup();
        let checkout = Checkout::new(api.clone());
        let form = CheckoutForm::prefilled(session.user());

        let err = checkout
            .place_order(session.session(), &mut cart, &form)
            .unwrap_err();
        assert!(matches!(err, ShopError::EmptyCart));
        assert!(!api.calls().iter().any(|c| c == "POST /checkout"));
    }

    #[test]
    fn test_incomplete_form_rejected_locally() {
        let (api, session, mut cart, _dir) = setup();
        cart.add(session.session(), "p1", 1).unwrap();
        let checkout = Checkout::new(api.clone());
        let form = CheckoutForm {
            name: "Ada".into(),
            email: "nope".into(),
        };

        let err = checkout
            .place_order(session.session(), &mut cart, &form)
            .unwrap_err();
        assert!(matches!(err, ShopError::Rejected(ref m) if m.contains("email")));
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_backend_failure_changes_nothing() {
        let (api, session, mut cart, _dir) = setup();
        cart.add(session.session(), "p1", 1).unwrap();
        let before = cart.cart().clone();
        api.fail_next(ShopError::Network("connection reset".into()));

        let checkout = Checkout::new(api);
        let form = CheckoutForm::prefilled(session.user());
        assert!(checkout
            .place_order(session.session(), &mut cart, &form)
            .is_err());
        assert_eq!(cart.cart(), &before);
    }

    #[test]
    fn test_refresh_failure_after_checkout_keeps_receipt() {
        let (api, session, mut cart, _dir) = setup();
        cart.add(session.session(), "p1", 2).unwrap();
        let before = cart.cart().clone();

        api.fail_on("GET /cart", ShopError::Network("connection reset".into()));
        let checkout = Checkout::new(api.clone());
        let form = CheckoutForm::prefilled(session.user());
        let receipt = checkout
            .place_order(session.session(), &mut cart, &form)
            .unwrap();

        assert_eq!(receipt.total, before.total);
        assert_eq!(receipt.items[0].quantity, 2);
        // stale until the next refresh
        assert_eq!(cart.cart(), &before);
        cart.refresh(session.session()).unwrap();
        assert!(cart.cart().is_empty());
    }
}
