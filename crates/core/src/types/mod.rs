//! Core types for Trellis.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod product;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use product::{Category, Product, ProductCategory, Rating};
pub use user::User;
