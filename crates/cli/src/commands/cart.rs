//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! rs-cart show
//!
//! # Add one unit of product 1
//! rs-cart add 1
//!
//! # Set product 1 to three units
//! rs-cart update 1 3
//!
//! # Remove product 1
//! rs-cart remove 1
//! ```
//!
//! # Environment Variables
//!
//! - `CATALOG_API_URL` - Catalog/stock API base URL
//! - `CART_STORAGE_PATH` - File backing the cart storage

use std::fmt::Write as _;
use std::sync::Arc;

use rocketshoes_cart::catalog::CatalogClient;
use rocketshoes_cart::notify::Notifier;
use rocketshoes_cart::storage::CartStorage;
use rocketshoes_cart::{CartStore, UpdateProductAmount};
use rocketshoes_core::{Cart, ProductId};

/// A single cart action requested from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartCommand {
    Show,
    Add(ProductId),
    Remove(ProductId),
    Update { product_id: ProductId, amount: i64 },
}

/// Apply `command` to the store and return the resulting cart.
pub async fn run<C, S, N>(store: &CartStore<C, S, N>, command: CartCommand) -> Arc<Cart>
where
    C: CatalogClient,
    S: CartStorage,
    N: Notifier,
{
    match command {
        CartCommand::Show => store.cart(),
        CartCommand::Add(product_id) => store.add_product(product_id).await,
        CartCommand::Remove(product_id) => store.remove_product(product_id).await,
        CartCommand::Update { product_id, amount } => {
            store
                .update_product_amount(UpdateProductAmount::new(product_id, amount))
                .await
        }
    }
}

/// Render the cart as a plain-text table with a totals line.
#[must_use]
pub fn render(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Your cart is empty.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6} {:<36} {:>5} {:>12} {:>12}",
        "ID", "PRODUCT", "QTY", "PRICE", "SUBTOTAL"
    );
    for item in cart {
        let _ = writeln!(
            out,
            "{:<6} {:<36} {:>5} {:>12} {:>12}",
            item.id(),
            truncate(item.product.title().unwrap_or("-"), 36),
            item.amount,
            item.product.price.display(),
            item.subtotal().display(),
        );
    }

    let summary = cart.summary();
    let _ = writeln!(
        out,
        "\n{} item(s), {} product(s), total {}",
        summary.item_count,
        summary.distinct_items,
        summary.subtotal.display()
    );
    out
}

/// Cut a title to `max` characters, marking the cut with an ellipsis.
fn truncate(title: &str, max: usize) -> String {
    if title.chars().count() <= max {
        return title.to_string();
    }
    let mut cut: String = title.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
