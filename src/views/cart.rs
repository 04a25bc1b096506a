use super::{line_money, money};
use crate::models::{Cart, CartItem};

pub const EMPTY_CART: &str = "Your cart is empty";

pub fn render_cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return format!(
            "Shopping Cart\n\n  {}\n  Start adding some products! (/products)",
            EMPTY_CART
        );
    }

    let mut out = String::from("Shopping Cart\n");
    for (i, item) in cart.items.iter().enumerate() {
        out.push_str(&format!(
            "\n  ({}) {}\n      {} x {} = {}",
            i + 1,
            item.product.name,
            money(item.product.price),
            item.quantity,
            line_money(item.line_total())
        ));
    }
    out.push_str(&format!(
        "\n\n  Items:    {}\n  Subtotal: {}\n  Shipping: Free\n  Total:    {}\n\nUse /checkout to place your order.",
        cart.item_count(),
        money(cart.total),
        money(cart.total)
    ));
    out
}

/// Resolve a 1-based cart line, or a cart item id
pub fn select<'a>(cart: &'a Cart, selector: &str) -> Option<&'a CartItem> {
    if let Ok(n) = selector.parse::<usize>() {
        if n >= 1 {
            if let Some(item) = cart.items.get(n - 1) {
                return Some(item);
            }
        }
    }
    cart.find_item(selector)
}

/// Largest quantity a single command may request for one line
pub const MAX_QUANTITY: u32 = 999;

/// Quantity typed by the user: a whole number from 1 to `MAX_QUANTITY`
pub fn parse_quantity(raw: &str) -> Result<u32, String> {
    match raw.trim().parse::<u32>() {
        Ok(q) if (1..=MAX_QUANTITY).contains(&q) => Ok(q),
        _ => Err(format!(
            "Quantity must be a whole number from 1 to {}",
            MAX_QUANTITY
        )),
    }
}

/// Quantity after an increment, or `None` once the line is at `MAX_QUANTITY`
pub fn incremented(item: &CartItem) -> Option<u32> {
    item.quantity.checked_add(1).filter(|q| *q <= MAX_QUANTITY)
}

/// Quantity after a decrement, or `None` when it would drop below one
pub fn decremented(item: &CartItem) -> Option<u32> {
    item.quantity.checked_sub(1).filter(|q| *q >= 1)
}
