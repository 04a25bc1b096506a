use crate::models::{Cart, User};

/// Badge is hidden while the cart is empty
pub fn cart_badge(cart: &Cart) -> String {
    match cart.item_count() {
        0 => "Cart".to_string(),
        n => format!("Cart ({})", n),
    }
}

pub fn render_navbar(user: Option<&User>, cart: &Cart) -> String {
    match user {
        Some(user) => format!("SHOPFRONT | Products | {} | {} | Logout", cart_badge(cart), user.name),
        None => "SHOPFRONT | Login | Register".to_string(),
    }
}

pub fn prompt(user: Option<&User>, cart: &Cart) -> String {
    match (user, cart.item_count()) {
        (None, _) => "shop> ".to_string(),
        (Some(u), 0) => format!("{}@shop> ", u.name),
        (Some(u), n) => format!("{}@shop [{}]> ", u.name, n),
    }
}
