//! RocketShoes cart library.
//!
//! A shopping-cart state container: holds the cart in memory, mirrors it to a
//! persistent key-value slot, and checks quantities against a remote stock
//! API.
//!
//! # Modules
//!
//! - [`store`] - [`CartStore`], the state container callers talk to
//! - [`catalog`] - Product and stock lookups (`CatalogClient`, HTTP adapter)
//! - [`storage`] - Persistent key-value slot (`CartStorage`, file and memory adapters)
//! - [`notify`] - User-facing error messages (`Notifier`)
//! - [`config`] - Environment configuration
//! - [`error`] - Error taxonomy and Sentry helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod storage;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use store::{CartStore, UpdateProductAmount};
