//! The cart state container.
//!
//! [`CartStore`] owns the cart for the lifetime of a session. It is loaded
//! once from storage at construction; every successful mutation is written
//! back to storage before the in-memory snapshot is replaced, so the two never
//! disagree after an operation completes.
//!
//! Mutations are serialized: each one holds a write gate for its whole
//! read-check-persist sequence, so two rapid adds of the same product are
//! applied one after the other instead of both starting from the same stale
//! snapshot. Reads never wait on the gate.
//!
//! # Example
//!
//! ```rust,ignore
//! let store = CartStore::new(catalog, FileStorage::new(path), TracingNotifier);
//!
//! store.add_product(ProductId::new(1)).await;
//! store.update_product_amount(UpdateProductAmount::new(ProductId::new(1), 3)).await;
//! store.remove_product(ProductId::new(1)).await;
//!
//! for item in store.cart().iter() { /* render */ }
//! ```

use std::sync::Arc;

use arc_swap::ArcSwap;
use rocketshoes_core::{Cart, ProductId};
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use crate::catalog::CatalogClient;
use crate::error::{CartError, CartOperation, Result, add_breadcrumb};
use crate::notify::Notifier;
use crate::storage::{CART_STORAGE_KEY, CartStorage};

/// Request to set a cart item's amount.
///
/// `amount` is signed because it usually comes straight from a UI input;
/// values of zero or below are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

impl UpdateProductAmount {
    #[must_use]
    pub const fn new(product_id: ProductId, amount: i64) -> Self {
        Self { product_id, amount }
    }
}

/// Cart state container backed by a catalog, a storage slot, and a notifier.
pub struct CartStore<C, S, N> {
    catalog: C,
    storage: S,
    notifier: N,
    cart: ArcSwap<Cart>,
    write_gate: Mutex<()>,
}

impl<C, S, N> CartStore<C, S, N>
where
    C: CatalogClient,
    S: CartStorage,
    N: Notifier,
{
    /// Create a store, loading the initial cart from `storage`.
    ///
    /// A missing slot yields an empty cart. An unreadable slot or one that
    /// does not hold a valid cart is logged and also yields an empty cart;
    /// the stored value is left alone until the next successful mutation.
    pub fn new(catalog: C, storage: S, notifier: N) -> Self {
        let cart = load_cart(&storage);
        info!(items = cart.len(), "Cart loaded from storage");

        Self {
            catalog,
            storage,
            notifier,
            cart: ArcSwap::from_pointee(cart),
            write_gate: Mutex::new(()),
        }
    }

    /// Current cart snapshot.
    #[must_use]
    pub fn cart(&self) -> Arc<Cart> {
        self.cart.load_full()
    }

    /// Add one unit of a product, inserting it if it is not in the cart yet.
    ///
    /// Returns the cart as it stands after the operation; on failure that is
    /// the unchanged cart and the notifier has been told why.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Arc<Cart> {
        let _gate = self.write_gate.lock().await;
        let result = self.try_add_product(product_id).await;
        self.settle(CartOperation::Add, product_id, result)
    }

    /// Remove a product from the cart entirely.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) -> Arc<Cart> {
        let _gate = self.write_gate.lock().await;
        let result = self.try_remove_product(product_id);
        self.settle(CartOperation::Remove, product_id, result)
    }

    /// Set a product's amount, checked against current stock.
    #[instrument(skip(self), fields(product_id = %request.product_id, amount = request.amount))]
    pub async fn update_product_amount(&self, request: UpdateProductAmount) -> Arc<Cart> {
        let _gate = self.write_gate.lock().await;
        let result = self.try_update_product_amount(request).await;
        self.settle(CartOperation::UpdateAmount, request.product_id, result)
    }

    async fn try_add_product(&self, product_id: ProductId) -> Result<Cart> {
        let current = self.cart.load_full();
        let desired = current
            .amount_of(product_id)
            .checked_add(1)
            .ok_or(CartError::InvalidAmount(i64::from(u32::MAX) + 1))?;

        let stock = self.catalog.stock(product_id).await?;
        if !stock.covers(desired) {
            return Err(CartError::OutOfStock {
                product_id,
                requested: desired,
                available: stock.amount,
            });
        }

        let product = self.catalog.product(product_id).await?;
        // Appends when desired == 1, otherwise bumps the existing item in place.
        let next = current.with_item(product, desired);

        self.persist(&next)?;
        Ok(next)
    }

    fn try_remove_product(&self, product_id: ProductId) -> Result<Cart> {
        let next = self
            .cart
            .load()
            .without(product_id)
            .ok_or(CartError::NotInCart(product_id))?;

        self.persist(&next)?;
        Ok(next)
    }

    async fn try_update_product_amount(&self, request: UpdateProductAmount) -> Result<Cart> {
        let UpdateProductAmount { product_id, amount } = request;
        if amount <= 0 {
            return Err(CartError::InvalidAmount(amount));
        }
        let amount = u32::try_from(amount).map_err(|_| CartError::InvalidAmount(amount))?;

        let stock = self.catalog.stock(product_id).await?;
        if !stock.covers(amount) {
            return Err(CartError::OutOfStock {
                product_id,
                requested: amount,
                available: stock.amount,
            });
        }

        let next = self
            .cart
            .load()
            .with_amount(product_id, amount)
            .ok_or(CartError::NotInCart(product_id))?;

        self.persist(&next)?;
        Ok(next)
    }

    fn persist(&self, cart: &Cart) -> Result<()> {
        let serialized = serde_json::to_string(cart)?;
        self.storage.set(CART_STORAGE_KEY, &serialized)?;
        Ok(())
    }

    /// Adopt a successful result or report a failure; returns the snapshot
    /// current afterwards.
    fn settle(
        &self,
        operation: CartOperation,
        product_id: ProductId,
        result: Result<Cart>,
    ) -> Arc<Cart> {
        match result {
            Ok(next) => {
                let next = Arc::new(next);
                self.cart.store(Arc::clone(&next));

                let id = product_id.to_string();
                add_breadcrumb(
                    "cart",
                    &operation.to_string(),
                    Some(&[("product_id", id.as_str())]),
                );
                info!(
                    operation = %operation,
                    items = next.len(),
                    "Cart updated"
                );
                next
            }
            Err(err) => {
                self.report(operation, &err);
                self.cart.load_full()
            }
        }
    }

    fn report(&self, operation: CartOperation, err: &CartError) {
        if err.is_rejection() {
            warn!(operation = %operation, error = %err, "Cart operation rejected");
        } else {
            let event_id = sentry::capture_error(err);
            error!(
                operation = %operation,
                error = %err,
                sentry_event_id = %event_id,
                "Cart operation failed"
            );
        }
        self.notifier.error(err.user_message(operation));
    }
}

/// Read the persisted cart, falling back to an empty one.
fn load_cart<S: CartStorage>(storage: &S) -> Cart {
    match storage.get(CART_STORAGE_KEY) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "Stored cart is invalid, starting empty");
            Cart::empty()
        }),
        Ok(None) => Cart::empty(),
        Err(e) => {
            warn!(error = %e, "Failed to read stored cart, starting empty");
            Cart::empty()
        }
    }
}
