//! Catalog records as returned by the stock/catalog API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::ProductId;
use super::price::Price;

/// A product record from the catalog (`GET products/{id}`).
///
/// Only `id` and `price` are interpreted. Every other field (`title`, `name`,
/// `image`, ...) is kept in `extra` as the catalog sent it, so records of any
/// shape survive a round trip through storage unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub price: Price,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Create a product with a title and image and no other catalog fields.
    #[must_use]
    pub fn new(id: ProductId, title: impl Into<String>, price: Price, image: impl Into<String>) -> Self {
        let mut extra = Map::new();
        extra.insert("title".to_string(), Value::String(title.into()));
        extra.insert("image".to_string(), Value::String(image.into()));
        Self { id, price, extra }
    }

    /// Display name: `title`, falling back to `name`.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.text_field("title").or_else(|| self.text_field("name"))
    }

    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.text_field("image")
    }

    fn text_field(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

/// Available quantity for a product (`GET stock/{id}`).
///
/// The catalog keys stock rows by `id`; `productId` is accepted as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    #[serde(rename = "id", alias = "productId")]
    pub product_id: ProductId,
    pub amount: u32,
}

impl StockRecord {
    /// Whether `requested` units can be served from this stock level.
    #[must_use]
    pub const fn covers(&self, requested: u32) -> bool {
        requested <= self.amount
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_keeps_unknown_fields() {
        let json = r#"{"id":1,"title":"Tênis de Caminhada","price":179.9,"image":"https://img/1.jpg","brand":"Rocket"}"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Price::from_cents(17990));
        assert_eq!(product.extra.get("brand"), Some(&Value::from("Rocket")));

        let back = serde_json::to_value(&product).unwrap();
        assert_eq!(back["brand"], "Rocket");
    }

    #[test]
    fn test_product_requires_only_id_and_price() {
        let product: Product = serde_json::from_str(r#"{"id":1,"price":1.5}"#).unwrap();

        assert_eq!(product.price, Price::from_cents(150));
        assert_eq!(product.title(), None);
        assert_eq!(product.image(), None);
        assert_eq!(serde_json::to_value(&product).unwrap(), serde_json::json!({"id":1,"price":1.5}));
    }

    #[test]
    fn test_product_title_falls_back_to_name() {
        let named: Product =
            serde_json::from_str(r#"{"id":1,"name":"Shoe","price":1.5,"image":"i"}"#).unwrap();
        assert_eq!(named.title(), Some("Shoe"));
        assert_eq!(named.image(), Some("i"));

        let both = Product::new(ProductId::new(2), "Runner", Price::from_cents(100), "j");
        assert_eq!(both.title(), Some("Runner"));
    }

    #[test]
    fn test_product_rejects_missing_price() {
        assert!(serde_json::from_str::<Product>(r#"{"id":1,"title":"Shoe"}"#).is_err());
    }

    #[test]
    fn test_stock_record_accepts_either_id_key() {
        let by_id: StockRecord = serde_json::from_str(r#"{"id":3,"amount":2}"#).unwrap();
        let by_product: StockRecord = serde_json::from_str(r#"{"productId":3,"amount":2}"#).unwrap();
        assert_eq!(by_id, by_product);
    }

    #[test]
    fn test_stock_record_rejects_negative_amount() {
        assert!(serde_json::from_str::<StockRecord>(r#"{"id":3,"amount":-1}"#).is_err());
    }

    #[test]
    fn test_stock_covers() {
        let stock = StockRecord {
            product_id: ProductId::new(1),
            amount: 5,
        };
        assert!(stock.covers(5));
        assert!(!stock.covers(6));
    }
}
