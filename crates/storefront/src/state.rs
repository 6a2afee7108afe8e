//! Application state shared across screens.

use std::sync::Arc;

use crate::catalog::{CatalogApi, CatalogClient};
use crate::config::StorefrontConfig;
use crate::services::auth::{AuthProvider, RestAuthProvider, SessionMirror};
use crate::store::{CartStore, CatalogStore, WishlistStore};

/// Application state shared across all screens.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// shared stores and configuration. The catalog API and auth provider are
/// type parameters so tests can inject fakes behind the same surface.
pub struct Storefront<A = CatalogClient, P = RestAuthProvider> {
    inner: Arc<StorefrontInner<A, P>>,
}

impl<A, P> Clone for Storefront<A, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct StorefrontInner<A, P> {
    config: StorefrontConfig,
    catalog: CatalogStore<A>,
    cart: CartStore,
    wishlist: WishlistStore,
    session: SessionMirror<P>,
}

impl Storefront {
    /// Create the application state from configuration, wiring the real
    /// catalog client and auth provider.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let api = CatalogClient::new(&config.catalog);
        let provider = RestAuthProvider::new(&config.auth);
        Self::from_parts(config, api, provider)
    }
}

impl<A: CatalogApi, P: AuthProvider> Storefront<A, P> {
    /// Assemble the application state from explicit collaborators.
    pub fn from_parts(config: StorefrontConfig, api: A, provider: P) -> Self {
        Self {
            inner: Arc::new(StorefrontInner {
                config,
                catalog: CatalogStore::new(api),
                cart: CartStore::new(),
                wishlist: WishlistStore::new(),
                session: SessionMirror::new(provider),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog store.
    #[must_use]
    pub fn catalog(&self) -> &CatalogStore<A> {
        &self.inner.catalog
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the wishlist store.
    #[must_use]
    pub fn wishlist(&self) -> &WishlistStore {
        &self.inner.wishlist
    }

    /// Get a reference to the auth session mirror.
    #[must_use]
    pub fn session(&self) -> &SessionMirror<P> {
        &self.inner.session
    }
}
