//! STG Catalog Core - Shared types library.
//!
//! This crate provides the common types used across the STG Catalog
//! components:
//! - `storefront` - Customer-facing catalog and checkout service
//! - `integration-tests` - Black-box API tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This
//! keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money formatting,
//!   and order status

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
