//! Wishlist store: the set of favorited product IDs.
//!
//! Purely local and transient; nothing here touches the network or survives
//! a restart.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use trellis_core::ProductId;

/// Store owning the favorited-product set.
///
/// Cheaply cloneable; clones share state. All operations are synchronous;
/// add and remove are idempotent.
#[derive(Clone, Default)]
pub struct WishlistStore {
    items: Arc<Mutex<BTreeSet<ProductId>>>,
}

impl WishlistStore {
    /// Create an empty wishlist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeSet<ProductId>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark a product as favorited. Idempotent.
    pub fn add(&self, product_id: ProductId) {
        self.lock().insert(product_id);
    }

    /// Unmark a product. No-op if absent.
    pub fn remove(&self, product_id: ProductId) {
        self.lock().remove(&product_id);
    }

    /// Add if absent, remove if present. Returns whether the product is
    /// favorited afterward.
    pub fn toggle(&self, product_id: ProductId) -> bool {
        let mut items = self.lock();
        if items.remove(&product_id) {
            false
        } else {
            items.insert(product_id);
            true
        }
    }

    /// Whether a product is currently favorited.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.lock().contains(&product_id)
    }

    /// Number of favorited products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing is favorited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Empty the wishlist.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// The favorited IDs in ascending order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ProductId> {
        self.lock().iter().copied().collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let wishlist = WishlistStore::new();
        wishlist.add(ProductId::new(1));
        wishlist.add(ProductId::new(1));

        assert_eq!(wishlist.len(), 1);
        assert!(wishlist.contains(ProductId::new(1)));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let wishlist = WishlistStore::new();
        wishlist.add(ProductId::new(1));
        wishlist.remove(ProductId::new(2));

        assert_eq!(wishlist.snapshot(), vec![ProductId::new(1)]);
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let wishlist = WishlistStore::new();
        wishlist.add(ProductId::new(1));
        let before = wishlist.snapshot();

        assert!(wishlist.toggle(ProductId::new(5)));
        assert!(!wishlist.toggle(ProductId::new(5)));

        assert_eq!(wishlist.snapshot(), before);
    }

    #[test]
    fn test_clear() {
        let wishlist = WishlistStore::new();
        wishlist.add(ProductId::new(1));
        wishlist.add(ProductId::new(2));
        wishlist.clear();

        assert!(wishlist.is_empty());
    }
}
