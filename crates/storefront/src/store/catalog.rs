//! Catalog store: product/category data and the active filtered view.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use trellis_core::{Category, CategoryId, Product};

use crate::catalog::{CatalogApi, CatalogError, ProductFilter};

/// Default price-range filter bounds.
fn default_price_range() -> (Decimal, Decimal) {
    (Decimal::ZERO, Decimal::ONE_THOUSAND)
}

/// Catalog state as seen by the UI.
///
/// `filtered_items` is always either the full `items` set or the result of
/// the most recent successful filter request - never a stale mix of two
/// query results.
#[derive(Debug, Clone)]
pub struct CatalogState {
    /// Full unfiltered product set.
    pub items: Vec<Product>,
    /// Currently displayed view.
    pub filtered_items: Vec<Product>,
    /// Read-only category reference data.
    pub categories: Vec<Category>,
    /// Category picked in the filter panel (UI bookkeeping).
    pub selected_category: Option<CategoryId>,
    /// Free-text search input (UI bookkeeping).
    pub search_query: String,
    /// Price slider bounds (UI bookkeeping).
    pub price_range: (Decimal, Decimal),
    /// True while a catalog request is in flight.
    pub is_loading: bool,
    /// Human-readable message from the last failed request.
    pub error: Option<String>,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            filtered_items: Vec::new(),
            categories: Vec::new(),
            selected_category: None,
            search_query: String::new(),
            price_range: default_price_range(),
            is_loading: false,
            error: None,
        }
    }
}

/// Store owning catalog state.
///
/// Cheaply cloneable; clones share state. Every outgoing request takes a
/// monotonically increasing sequence number, and a response is installed
/// only if its number is still the latest issued - an older response that
/// resolves after a newer one is discarded rather than overwriting it.
pub struct CatalogStore<A> {
    inner: Arc<CatalogStoreInner<A>>,
}

impl<A> Clone for CatalogStore<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CatalogStoreInner<A> {
    api: A,
    state: Mutex<CatalogState>,
    latest_request: AtomicU64,
}

impl<A: CatalogApi> CatalogStore<A> {
    /// Create a store over the given catalog API.
    pub fn new(api: A) -> Self {
        Self {
            inner: Arc::new(CatalogStoreInner {
                api,
                state: Mutex::new(CatalogState::default()),
                latest_request: AtomicU64::new(0),
            }),
        }
    }

    /// A copy of the current state for rendering.
    #[must_use]
    pub fn snapshot(&self) -> CatalogState {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CatalogState> {
        // The lock is never held across an await, so poisoning can only come
        // from a panicked reader; the state itself stays consistent.
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue a request sequence number and flip the loading flag.
    fn begin_request(&self) -> u64 {
        let seq = self.inner.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.lock();
        state.is_loading = true;
        state.error = None;
        seq
    }

    /// Install a finished request's outcome, unless it has been superseded.
    fn finish_request<T>(
        &self,
        seq: u64,
        result: Result<T, CatalogError>,
        apply: impl FnOnce(&mut CatalogState, T),
    ) {
        let mut state = self.lock();
        if seq != self.inner.latest_request.load(Ordering::SeqCst) {
            debug!(seq, "discarding superseded catalog response");
            return;
        }

        state.is_loading = false;
        match result {
            Ok(value) => {
                apply(&mut state, value);
                state.error = None;
            }
            Err(err) => {
                error!(error = %err, "catalog request failed");
                state.error = Some(err.to_string());
            }
        }
    }

    // =========================================================================
    // Fetch Operations
    // =========================================================================

    /// Fetch the full product list, replacing both `items` and
    /// `filtered_items` on success. On failure the prior data is left
    /// untouched and `error` carries a message.
    pub async fn fetch_products(&self) {
        let seq = self.begin_request();
        let result = self.inner.api.list_products().await;
        self.finish_request(seq, result, |state, products| {
            state.items = products;
            state.filtered_items = state.items.clone();
        });
    }

    /// Fetch the category list.
    ///
    /// Categories are an independent failure domain: a failure here is
    /// logged but does not touch the shared `error` field or loading flag.
    pub async fn fetch_categories(&self) {
        match self.inner.api.list_categories().await {
            Ok(categories) => self.lock().categories = categories,
            Err(err) => warn!(error = %err, "category fetch failed"),
        }
    }

    // =========================================================================
    // Filter Requests
    // =========================================================================

    /// Apply a combined filter, replacing `filtered_items` with the response.
    /// The unfiltered `items` set is untouched; on failure the prior view is
    /// retained.
    pub async fn apply_filters(&self, filter: &ProductFilter) {
        let seq = self.begin_request();
        let result = self.inner.api.filter_products(filter).await;
        self.install_filtered(seq, result);
    }

    /// Search by title substring, replacing `filtered_items`.
    pub async fn search_products(&self, title: &str) {
        let seq = self.begin_request();
        let result = self.inner.api.search_by_title(title).await;
        self.install_filtered(seq, result);
    }

    /// Filter by inclusive price range, replacing `filtered_items`.
    pub async fn filter_by_price_range(&self, min: Decimal, max: Decimal) {
        let seq = self.begin_request();
        let result = self.inner.api.products_by_price_range(min, max).await;
        self.install_filtered(seq, result);
    }

    /// Filter by category, replacing `filtered_items`.
    pub async fn filter_by_category(&self, category_id: CategoryId) {
        let seq = self.begin_request();
        let result = self.inner.api.products_by_category(category_id).await;
        self.install_filtered(seq, result);
    }

    fn install_filtered(&self, seq: u64, result: Result<Vec<Product>, CatalogError>) {
        self.finish_request(seq, result, |state, products| {
            state.filtered_items = products;
        });
    }

    // =========================================================================
    // Local State Updates (no network)
    // =========================================================================

    /// Record the search input.
    pub fn set_search_query(&self, query: impl Into<String>) {
        self.lock().search_query = query.into();
    }

    /// Record the category picked in the filter panel.
    pub fn set_selected_category(&self, category_id: Option<CategoryId>) {
        self.lock().selected_category = category_id;
    }

    /// Record the price slider bounds.
    pub fn set_price_range(&self, min: Decimal, max: Decimal) {
        self.lock().price_range = (min, max);
    }

    /// Reset all filter inputs and restore `filtered_items` to the full
    /// `items` set. No network round-trip.
    pub fn clear_filters(&self) {
        let mut state = self.lock();
        state.search_query.clear();
        state.selected_category = None;
        state.price_range = default_price_range();
        state.filtered_items = state.items.clone();
    }
}
