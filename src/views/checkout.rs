use super::forms::CheckoutForm;
use super::{line_money, money};
use crate::models::{Cart, Receipt};
use chrono::Local;

pub fn render_summary(cart: &Cart, form: &CheckoutForm) -> String {
    let mut out = String::from("Checkout\n\nOrder Summary\n");
    for item in &cart.items {
        out.push_str(&format!(
            "  {} (Qty: {})  {}\n",
            item.product.name,
            item.quantity,
            line_money(item.line_total())
        ));
    }
    out.push_str(&format!(
        "\n  Subtotal: {}\n  Shipping: Free\n  Total:    {}\n\nCustomer Information\n  Name:  {}\n  Email: {}",
        money(cart.total),
        money(cart.total),
        blank_or(&form.name),
        blank_or(&form.email)
    ));
    out
}

fn blank_or(value: &str) -> &str {
    if value.trim().is_empty() {
        "(required)"
    } else {
        value
    }
}

pub fn render_receipt(receipt: &Receipt) -> String {
    let mut out = format!(
        "Order Successful!\nYour order has been placed successfully\n\n  Order ID: {}\n  Customer: {} <{}>\n\n  Items\n",
        receipt.order_id, receipt.customer_name, receipt.customer_email
    );
    for line in &receipt.items {
        out.push_str(&format!(
            "    {} x{}  {}\n",
            line.product_name,
            line.quantity,
            line_money(line.line_total())
        ));
    }
    out.push_str(&format!(
        "\n  Total: {}\n  {}",
        money(receipt.total),
        receipt
            .timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
    ));
    out
}
