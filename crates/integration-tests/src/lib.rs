//! Integration tests for the RocketShoes cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store_http` - `CartStore` against a mocked catalog API and file storage
//!
//! The tests need no external services: the catalog is served by `mockito`
//! and storage lives in a temporary directory.
