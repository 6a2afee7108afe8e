//! Cache types for catalog API responses.

use trellis_core::{Category, Product};

/// Cached value types.
///
/// Only point lookups and the category list are cached; product list and
/// filter responses always go to the network so the filtered view reflects
/// the most recent request.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Category(Box<Category>),
    Categories(Vec<Category>),
}
