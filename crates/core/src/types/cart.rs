//! The cart value and its pure operations.
//!
//! A [`Cart`] is immutable: every change produces a new cart, leaving the
//! original untouched. Callers hold snapshots and swap them wholesale.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// Errors raised when building a cart from untrusted data (e.g. storage).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartDataError {
    #[error("product {0} appears more than once")]
    DuplicateItem(ProductId),
    #[error("product {0} has an amount of zero")]
    ZeroAmount(ProductId),
}

/// A cart line: the catalog record captured at insertion time plus a quantity.
///
/// Serialized flat, with the catalog fields and `amount` side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(flatten)]
    pub product: Product,
    pub amount: u32,
}

/// Catalog key that the cart's own `amount` replaces.
const AMOUNT_KEY: &str = "amount";

impl Item {
    /// Capture `product` as a cart line.
    ///
    /// A catalog field named `amount` is dropped; the line's amount takes its
    /// place in the serialized item.
    #[must_use]
    pub fn new(mut product: Product, amount: u32) -> Self {
        product.extra.remove(AMOUNT_KEY);
        Self { product, amount }
    }

    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times amount.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.product.price.times(self.amount)
    }
}

/// Ordered list of items, unique by product id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Item>", into = "Vec<Item>")]
pub struct Cart {
    items: Vec<Item>,
}

/// Totals derived from a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    /// Sum of all item amounts.
    pub item_count: u32,
    /// Number of distinct products.
    pub distinct_items: usize,
    pub subtotal: Price,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from items, checking id uniqueness and non-zero amounts.
    ///
    /// # Errors
    ///
    /// Returns `CartDataError` if an id repeats or an amount is zero.
    pub fn from_items(items: Vec<Item>) -> Result<Self, CartDataError> {
        for (i, item) in items.iter().enumerate() {
            if item.amount == 0 {
                return Err(CartDataError::ZeroAmount(item.id()));
            }
            if items.iter().take(i).any(|earlier| earlier.id() == item.id()) {
                return Err(CartDataError::DuplicateItem(item.id()));
            }
        }
        Ok(Self { items })
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Current amount of a product, or 0 when it is not in the cart.
    #[must_use]
    pub fn amount_of(&self, id: ProductId) -> u32 {
        self.get(id).map_or(0, |item| item.amount)
    }

    /// Put `product` in the cart with the given amount.
    ///
    /// Appends a new item when the product is absent; otherwise the existing
    /// item keeps its position and catalog fields and only its amount changes.
    #[must_use]
    pub fn with_item(&self, product: Product, amount: u32) -> Self {
        if let Some(updated) = self.with_amount(product.id, amount) {
            return updated;
        }
        let mut items = self.items.clone();
        items.push(Item::new(product, amount));
        Self { items }
    }

    /// Set the amount of an existing item.
    ///
    /// Returns `None` if the product is not in the cart or `amount` is zero.
    #[must_use]
    pub fn with_amount(&self, id: ProductId, amount: u32) -> Option<Self> {
        if amount == 0 || !self.contains(id) {
            return None;
        }
        let items = self
            .items
            .iter()
            .map(|item| {
                if item.id() == id {
                    Item {
                        product: item.product.clone(),
                        amount,
                    }
                } else {
                    item.clone()
                }
            })
            .collect();
        Some(Self { items })
    }

    /// Remove an item, preserving the order of the rest.
    ///
    /// Returns `None` if the product is not in the cart.
    #[must_use]
    pub fn without(&self, id: ProductId) -> Option<Self> {
        let mut found = false;
        let items = self
            .items
            .iter()
            .filter(|item| {
                let matches = item.id() == id;
                found |= matches;
                !matches
            })
            .cloned()
            .collect();
        found.then_some(Self { items })
    }

    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary {
            item_count: self.items.iter().map(|item| item.amount).sum(),
            distinct_items: self.items.len(),
            subtotal: self.items.iter().map(Item::subtotal).sum(),
        }
    }
}

impl TryFrom<Vec<Item>> for Cart {
    type Error = CartDataError;

    fn try_from(items: Vec<Item>) -> Result<Self, Self::Error> {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<Item> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i32, cents: i64) -> Product {
        Product::new(
            ProductId::new(id),
            format!("Sneaker {id}"),
            Price::from_cents(cents),
            format!("https://img.example/{id}.jpg"),
        )
    }

    fn cart_of(lines: &[(i32, u32)]) -> Cart {
        lines
            .iter()
            .fold(Cart::empty(), |cart, &(id, amount)| cart.with_item(product(id, 1000), amount))
    }

    fn ids(cart: &Cart) -> Vec<i32> {
        cart.iter().map(|item| item.id().as_i32()).collect()
    }

    #[test]
    fn test_with_item_appends_new_product() {
        let cart = cart_of(&[(1, 2)]).with_item(product(2, 500), 1);
        assert_eq!(ids(&cart), vec![1, 2]);
        assert_eq!(cart.amount_of(ProductId::new(2)), 1);
    }

    #[test]
    fn test_with_item_updates_in_place() {
        let cart = cart_of(&[(1, 2), (2, 1), (3, 1)]);
        let updated = cart.with_item(product(2, 9999), 4);

        assert_eq!(ids(&updated), vec![1, 2, 3]);
        assert_eq!(updated.amount_of(ProductId::new(2)), 4);
        // Catalog fields captured at insertion time are kept.
        assert_eq!(
            updated.get(ProductId::new(2)).unwrap().product.price,
            Price::from_cents(1000)
        );
        // The original snapshot is untouched.
        assert_eq!(cart.amount_of(ProductId::new(2)), 1);
    }

    #[test]
    fn test_with_amount_missing_or_zero() {
        let cart = cart_of(&[(1, 2)]);
        assert!(cart.with_amount(ProductId::new(9), 1).is_none());
        assert!(cart.with_amount(ProductId::new(1), 0).is_none());
    }

    #[test]
    fn test_without_preserves_order() {
        let cart = cart_of(&[(1, 1), (2, 3), (3, 1)]);
        let removed = cart.without(ProductId::new(2)).unwrap();

        assert_eq!(ids(&removed), vec![1, 3]);
        assert_eq!(removed.get(ProductId::new(1)), cart.get(ProductId::new(1)));
        assert_eq!(removed.get(ProductId::new(3)), cart.get(ProductId::new(3)));
    }

    #[test]
    fn test_without_absent_product() {
        assert!(cart_of(&[(1, 1)]).without(ProductId::new(2)).is_none());
        assert!(Cart::empty().without(ProductId::new(1)).is_none());
    }

    #[test]
    fn test_summary() {
        let cart = Cart::empty()
            .with_item(product(1, 17990), 2)
            .with_item(product(2, 13990), 1);
        let summary = cart.summary();

        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.distinct_items, 2);
        assert_eq!(summary.subtotal.display(), "$499.70");
    }

    #[test]
    fn test_cart_serializes_as_flat_item_array() {
        let cart = Cart::empty().with_item(product(1, 17990), 2);
        let json = serde_json::to_value(&cart).unwrap();

        assert_eq!(
            json,
            serde_json::json!([{
                "id": 1,
                "title": "Sneaker 1",
                "price": 179.9,
                "image": "https://img.example/1.jpg",
                "amount": 2
            }])
        );

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_deserialize_rejects_duplicates_and_zero_amounts() {
        let dup = r#"[{"id":1,"title":"a","price":1,"image":"x","amount":1},
                      {"id":1,"title":"a","price":1,"image":"x","amount":2}]"#;
        assert!(serde_json::from_str::<Cart>(dup).is_err());

        let zero = r#"[{"id":1,"title":"a","price":1,"image":"x","amount":0}]"#;
        assert!(serde_json::from_str::<Cart>(zero).is_err());
    }

    #[test]
    fn test_catalog_amount_field_is_replaced() {
        let mut stocked = product(1, 1000);
        stocked.extra.insert("amount".to_string(), serde_json::json!(9));

        let cart = Cart::empty().with_item(stocked, 2);
        let json = serde_json::to_string(&cart).unwrap();

        assert_eq!(json.matches("\"amount\"").count(), 1);
        let back: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(back.amount_of(ProductId::new(1)), 2);
    }

    #[test]
    fn test_deserialize_items_without_title() {
        let cart: Cart =
            serde_json::from_str(r#"[{"id":4,"name":"Shoe","price":2.5,"amount":3}]"#).unwrap();

        let item = cart.get(ProductId::new(4)).unwrap();
        assert_eq!(item.amount, 3);
        assert_eq!(item.product.title(), Some("Shoe"));
        assert_eq!(item.subtotal(), Price::from_cents(750));
    }

    #[test]
    fn test_from_items_errors() {
        let item = Item {
            product: product(5, 100),
            amount: 1,
        };
        assert_eq!(
            Cart::from_items(vec![item.clone(), item]),
            Err(CartDataError::DuplicateItem(ProductId::new(5)))
        );
    }
}
