//! Catalog and stock lookups.
//!
//! # Architecture
//!
//! - [`CatalogClient`] is the seam the cart store depends on
//! - [`HttpCatalogClient`] talks to the REST catalog (`stock/{id}`, `products/{id}`)
//! - Product records are cached in memory via `moka`; stock levels never are,
//!   since every cart mutation must be checked against fresh stock
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_cart::catalog::{CatalogClient, HttpCatalogClient};
//!
//! let client = HttpCatalogClient::new(&config.catalog)?;
//! let stock = client.stock(ProductId::new(1)).await?;
//! let product = client.product(ProductId::new(1)).await?;
//! ```

mod http;

use std::future::Future;
use std::sync::Arc;

use rocketshoes_core::{Product, ProductId, StockRecord};
use thiserror::Error;

pub use http::HttpCatalogClient;

/// Errors that can occur when interacting with the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the catalog.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Read-only access to product records and stock levels.
pub trait CatalogClient: Send + Sync {
    /// Fetch the current stock level for a product.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<StockRecord, CatalogError>> + Send;

    /// Fetch the catalog record for a product.
    fn product(&self, id: ProductId) -> impl Future<Output = Result<Product, CatalogError>> + Send;
}

impl<T: CatalogClient> CatalogClient for Arc<T> {
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<StockRecord, CatalogError>> + Send {
        (**self).stock(id)
    }

    fn product(&self, id: ProductId) -> impl Future<Output = Result<Product, CatalogError>> + Send {
        (**self).product(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::NotFound("stock/7".to_string());
        assert_eq!(err.to_string(), "Not found: stock/7");

        let err = CatalogError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 500 - boom");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = CatalogError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
