//! Trellis Core - Shared types library.
//!
//! This crate provides common types used across all Trellis components:
//! - `storefront` - Client-side storefront data layer
//! - `integration-tests` - Cross-store scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, and the product/category/user domain types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
