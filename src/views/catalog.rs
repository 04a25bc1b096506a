use super::money;
use crate::models::Product;

pub fn render_products(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products available.".to_string();
    }

    let mut out = String::from("BEST SELLERS\n");
    for (i, product) in products.iter().enumerate() {
        out.push_str(&format!(
            "\n  [{}] {}  {}\n      {} | {}\n",
            i + 1,
            product.name,
            money(product.price),
            product.category,
            product.description
        ));
    }
    out.push_str("\nUse /add <number> [qty] to add a product to your cart.");
    out
}

pub fn render_product(product: &Product) -> String {
    format!(
        "{}\n  Price:    {}\n  Category: {}\n  {}\n  Image:    {}\n  Id:       {}",
        product.name,
        money(product.price),
        product.category,
        product.description,
        product.image,
        product.id
    )
}

/// Resolve a 1-based position from the last listing, or a product id
pub fn select<'a>(products: &'a [Product], selector: &str) -> Option<&'a Product> {
    if let Ok(n) = selector.parse::<usize>() {
        if n >= 1 {
            if let Some(product) = products.get(n - 1) {
                return Some(product);
            }
        }
    }
    products.iter().find(|p| p.id == selector)
}
