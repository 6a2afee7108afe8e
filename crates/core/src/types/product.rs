//! Product and category domain types.
//!
//! These mirror the remote catalog service's JSON contract. Products are
//! immutable once fetched and replaced wholesale on re-fetch; categories are
//! read-only reference data.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::{CategoryId, ProductId};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Category image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// The category field of a product.
///
/// The remote service has shipped two shapes over time: an inline name
/// string, and a full category reference object. Both deserialize here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductCategory {
    /// Full category reference.
    Reference(Category),
    /// Inline category name.
    Name(String),
}

impl ProductCategory {
    /// The category ID, if the reference shape was provided.
    #[must_use]
    pub const fn id(&self) -> Option<CategoryId> {
        match self {
            Self::Reference(category) => Some(category.id),
            Self::Name(_) => None,
        }
    }

    /// The category display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Reference(category) => &category.name,
            Self::Name(name) => name,
        }
    }
}

/// Aggregate review rating for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Average rating value (e.g., 4.5).
    pub rate: f64,
    /// Total number of reviews.
    pub count: i64,
}

/// A product from the remote catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price in the store currency. Non-negative.
    pub price: Decimal,
    /// Long-form description.
    pub description: String,
    /// Category, either inline name or full reference.
    pub category: ProductCategory,
    /// Primary image URL (legacy single-image shape).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Image URLs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    /// Aggregate review rating, when the service provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
}

impl Product {
    /// The category ID, if the catalog returned a category reference.
    #[must_use]
    pub const fn category_id(&self) -> Option<CategoryId> {
        self.category.id()
    }

    /// The category display name.
    #[must_use]
    pub fn category_name(&self) -> &str {
        self.category.name()
    }
}
