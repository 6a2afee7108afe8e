//! Combined-filter query construction.
//!
//! Independently-settable filter dimensions (title substring, price bounds,
//! category) merge into one outgoing request. The remote service ANDs the
//! dimensions together, so no local intersection of result sets is needed.

use rust_decimal::Decimal;
use serde::Serialize;

use trellis_core::CategoryId;

/// A combined product filter.
///
/// Unset dimensions are omitted from the query string entirely - the remote
/// service treats an absent field as "no constraint", not as "match empty".
/// A blank or whitespace-only title counts as unset.
///
/// # Example
///
/// ```
/// use trellis_storefront::catalog::ProductFilter;
///
/// let filter = ProductFilter::new()
///     .with_title("shirt")
///     .with_price_range(10.into(), 50.into());
/// assert!(!filter.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductFilter {
    /// Case-insensitive title substring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Inclusive lower price bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_min: Option<Decimal>,
    /// Inclusive upper price bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_max: Option<Decimal>,
    /// Category constraint, carried by ID end-to-end.
    #[serde(rename = "categoryId", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
}

impl ProductFilter {
    /// An empty filter (no constraints).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title substring. Blank input leaves the dimension unset.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        let trimmed = title.trim();
        self.title = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        };
        self
    }

    /// Set the minimum price bound.
    #[must_use]
    pub const fn with_price_min(mut self, min: Decimal) -> Self {
        self.price_min = Some(min);
        self
    }

    /// Set the maximum price bound.
    #[must_use]
    pub const fn with_price_max(mut self, max: Decimal) -> Self {
        self.price_max = Some(max);
        self
    }

    /// Set both price bounds at once.
    #[must_use]
    pub const fn with_price_range(self, min: Decimal, max: Decimal) -> Self {
        self.with_price_min(min).with_price_max(max)
    }

    /// Set the category constraint.
    #[must_use]
    pub const fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// True when no dimension is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
            && self.category_id.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Build the query string reqwest would send for this filter.
    fn query_string(filter: &ProductFilter) -> String {
        reqwest::Client::new()
            .get("https://catalog.test/products")
            .query(filter)
            .build()
            .unwrap()
            .url()
            .query()
            .unwrap_or_default()
            .to_owned()
    }

    #[test]
    fn test_empty_filter_serializes_to_nothing() {
        assert!(ProductFilter::new().is_empty());
        assert_eq!(query_string(&ProductFilter::new()), "");
    }

    #[test]
    fn test_title_only_omits_other_fields() {
        let filter = ProductFilter::new().with_title("shirt");
        assert_eq!(query_string(&filter), "title=shirt");
    }

    #[test]
    fn test_blank_title_is_unset() {
        let filter = ProductFilter::new().with_title("   ");
        assert!(filter.is_empty());
        assert_eq!(query_string(&filter), "");
    }

    #[test]
    fn test_title_is_trimmed() {
        let filter = ProductFilter::new().with_title("  hoodie ");
        assert_eq!(filter.title.as_deref(), Some("hoodie"));
    }

    #[test]
    fn test_price_range_only() {
        let filter = ProductFilter::new().with_price_range(50.into(), 200.into());
        assert_eq!(query_string(&filter), "price_min=50&price_max=200");
    }

    #[test]
    fn test_all_dimensions() {
        let filter = ProductFilter::new()
            .with_title("shirt")
            .with_price_range(10.into(), 99.into())
            .with_category(CategoryId::new(4));
        assert_eq!(
            query_string(&filter),
            "title=shirt&price_min=10&price_max=99&categoryId=4"
        );
    }

    #[test]
    fn test_category_only() {
        let filter = ProductFilter::new().with_category(CategoryId::new(2));
        assert_eq!(query_string(&filter), "categoryId=2");
    }
}
