//! Cart error taxonomy and Sentry helpers.
//!
//! Cart operations never hand errors back to their callers. Each failure is
//! turned into one of a handful of user-facing messages for the [`Notifier`],
//! and collaborator failures are additionally captured to Sentry.
//!
//! [`Notifier`]: crate::notify::Notifier

use rocketshoes_core::ProductId;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::storage::StorageError;

/// Message shown when the requested quantity exceeds available stock.
pub const OUT_OF_STOCK_MESSAGE: &str = "Requested quantity is out of stock";

/// The cart operation an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOperation {
    Add,
    Remove,
    UpdateAmount,
}

impl CartOperation {
    /// Generic failure message for this operation.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Add => "Failed to add product",
            Self::Remove => "Failed to remove product",
            Self::UpdateAmount => "Failed to update product quantity",
        }
    }
}

impl std::fmt::Display for CartOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "add_product"),
            Self::Remove => write!(f, "remove_product"),
            Self::UpdateAmount => write!(f, "update_product_amount"),
        }
    }
}

/// Why a cart operation was abandoned.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested amount exceeds available stock.
    #[error("Out of stock: product {product_id} requested {requested}, available {available}")]
    OutOfStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// Product is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// Requested amount is zero, negative, or too large.
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    /// Catalog lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Persisting the cart failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The cart could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CartError {
    /// The message shown to the user for this error in `operation`.
    #[must_use]
    pub const fn user_message(&self, operation: CartOperation) -> &'static str {
        match self {
            Self::OutOfStock { .. } => OUT_OF_STOCK_MESSAGE,
            _ => operation.failure_message(),
        }
    }

    /// Whether the cart rejected the request itself, as opposed to a
    /// collaborator failing.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::OutOfStock { .. } | Self::NotInCart(_) | Self::InvalidAmount(_)
        )
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart
/// actions leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        let err = CartError::OutOfStock {
            product_id: ProductId::new(7),
            requested: 1,
            available: 0,
        };
        assert_eq!(
            err.to_string(),
            "Out of stock: product 7 requested 1, available 0"
        );

        let err = CartError::NotInCart(ProductId::new(3));
        assert_eq!(err.to_string(), "Product 3 is not in the cart");
    }

    #[test]
    fn test_user_messages() {
        let out_of_stock = CartError::OutOfStock {
            product_id: ProductId::new(1),
            requested: 2,
            available: 1,
        };
        assert_eq!(
            out_of_stock.user_message(CartOperation::Add),
            OUT_OF_STOCK_MESSAGE
        );
        assert_eq!(
            out_of_stock.user_message(CartOperation::UpdateAmount),
            OUT_OF_STOCK_MESSAGE
        );

        let storage = CartError::Storage(StorageError::Poisoned);
        assert_eq!(
            storage.user_message(CartOperation::Add),
            "Failed to add product"
        );
        assert_eq!(
            CartError::NotInCart(ProductId::new(1)).user_message(CartOperation::Remove),
            "Failed to remove product"
        );
        assert_eq!(
            CartError::InvalidAmount(0).user_message(CartOperation::UpdateAmount),
            "Failed to update product quantity"
        );
    }

    #[test]
    fn test_rejections_vs_failures() {
        assert!(CartError::InvalidAmount(-1).is_rejection());
        assert!(CartError::NotInCart(ProductId::new(1)).is_rejection());
        assert!(!CartError::Storage(StorageError::Poisoned).is_rejection());
        assert!(!CartError::Catalog(CatalogError::RateLimited(1)).is_rejection());
    }
}
