//! Integration tests for Trellis.
//!
//! These tests wire the full state layer together - catalog store, cart,
//! wishlist, and session mirror assembled into a `Storefront` - against
//! in-memory doubles of the two remote services. No network, no external
//! credentials; run with plain `cargo test -p trellis-integration-tests`.
//!
//! # Fixtures
//!
//! - [`InMemoryCatalog`] - catalog service double that actually evaluates
//!   search/range/category filters against a seeded product set, the same
//!   way the remote service evaluates query parameters
//! - [`ScriptedAuthProvider`] - identity provider double with a registered
//!   account table and a drivable current-principal channel
//! - [`test_config`] - a `StorefrontConfig` that never reads the environment

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use tokio::sync::watch;
use url::Url;

use trellis_core::{Category, CategoryId, Email, Product, ProductCategory, ProductId, Rating, User};
use trellis_storefront::catalog::{CatalogApi, CatalogError, ProductFilter};
use trellis_storefront::config::{AuthConfig, CatalogConfig, StorefrontConfig};
use trellis_storefront::services::auth::{AuthError, AuthProvider};

/// Install a tracing subscriber for test debugging. Idempotent; honors
/// `RUST_LOG`.
pub fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Builders
// ============================================================================

/// Build a product in the given category at an integer price.
#[must_use]
pub fn product(id: i64, title: &str, price: i64, category: Category) -> Product {
    Product {
        id: ProductId::new(id),
        title: title.to_owned(),
        price: Decimal::from(price),
        description: format!("{title} description"),
        category: ProductCategory::Reference(category),
        image: None,
        images: Vec::new(),
        rating: Some(Rating {
            rate: 4.0,
            count: 10,
        }),
    }
}

/// Build a category.
#[must_use]
pub fn category(id: i64, name: &str) -> Category {
    Category {
        id: CategoryId::new(id),
        name: name.to_owned(),
        image: None,
    }
}

/// A configuration that never touches the environment.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        catalog: CatalogConfig {
            base_url: Url::parse("https://catalog.test/api/v1").expect("static test URL is valid"),
            timeout: Duration::from_secs(10),
        },
        auth: AuthConfig {
            endpoint: Url::parse("https://auth.test/v1").expect("static test URL is valid"),
            api_key: SecretString::from("kY7#mP2$qR9@vX4!wZ8&"),
        },
    }
}

// ============================================================================
// InMemoryCatalog
// ============================================================================

/// Catalog service double.
///
/// Holds a seeded product and category set and evaluates filter requests
/// against it with the remote service's semantics: case-insensitive title
/// substring, inclusive price bounds, exact category match, unset filter
/// dimensions matching everything. Can be switched into a failing state to
/// simulate an outage.
///
/// Cheaply cloneable; a test keeps one clone for driving the outage switch
/// while the store owns another.
#[derive(Clone)]
pub struct InMemoryCatalog {
    inner: Arc<InMemoryCatalogInner>,
}

struct InMemoryCatalogInner {
    products: Vec<Product>,
    categories: Vec<Category>,
    failing: AtomicBool,
}

impl InMemoryCatalog {
    /// Seed the catalog.
    #[must_use]
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Self {
        Self {
            inner: Arc::new(InMemoryCatalogInner {
                products,
                categories,
                failing: AtomicBool::new(false),
            }),
        }
    }

    /// Make every subsequent request fail with HTTP 503 (or recover).
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), CatalogError> {
        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(CatalogError::Status { code: 503 });
        }
        Ok(())
    }

    fn select(&self, filter: &ProductFilter) -> Vec<Product> {
        self.inner
            .products
            .iter()
            .filter(|p| matches_filter(p, filter))
            .cloned()
            .collect()
    }
}

fn matches_filter(product: &Product, filter: &ProductFilter) -> bool {
    if let Some(title) = &filter.title {
        if !product
            .title
            .to_lowercase()
            .contains(&title.to_lowercase())
        {
            return false;
        }
    }
    if let Some(min) = filter.price_min {
        if product.price < min {
            return false;
        }
    }
    if let Some(max) = filter.price_max {
        if product.price > max {
            return false;
        }
    }
    if let Some(category_id) = filter.category_id {
        if product.category_id() != Some(category_id) {
            return false;
        }
    }
    true
}

impl CatalogApi for InMemoryCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        self.check_available()?;
        Ok(self.inner.products.clone())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.check_available()?;
        Ok(self.inner.categories.clone())
    }

    async fn search_by_title(&self, title: &str) -> Result<Vec<Product>, CatalogError> {
        self.filter_products(&ProductFilter::new().with_title(title))
            .await
    }

    async fn products_by_price_range(
        &self,
        min: Decimal,
        max: Decimal,
    ) -> Result<Vec<Product>, CatalogError> {
        self.filter_products(&ProductFilter::new().with_price_range(min, max))
            .await
    }

    async fn products_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, CatalogError> {
        self.filter_products(&ProductFilter::new().with_category(category_id))
            .await
    }

    async fn filter_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, CatalogError> {
        self.check_available()?;
        Ok(self.select(filter))
    }
}

// ============================================================================
// ScriptedAuthProvider
// ============================================================================

/// Identity provider double with a registered account table.
pub struct ScriptedAuthProvider {
    accounts: Mutex<HashMap<String, String>>,
    current: watch::Sender<Option<User>>,
}

impl Default for ScriptedAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedAuthProvider {
    /// Create a provider with no registered accounts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            current: watch::channel(None).0,
        }
    }

    /// Pre-register an account without going through sign-up.
    pub fn register(&self, email: &str, password: &str) {
        self.lock_accounts()
            .insert(email.to_owned(), password.to_owned());
    }

    /// A handle the test can use to push out-of-band principal changes.
    #[must_use]
    pub fn principal(&self) -> watch::Sender<Option<User>> {
        self.current.clone()
    }

    fn lock_accounts(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn user_for(email: &Email, display_name: Option<&str>) -> User {
        User {
            id: format!("uid-{}", email.local_part()),
            email: email.as_str().to_owned(),
            display_name: display_name.map(str::to_owned),
            photo_url: None,
        }
    }
}

impl AuthProvider for ScriptedAuthProvider {
    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<User, AuthError> {
        {
            let mut accounts = self.lock_accounts();
            if accounts.contains_key(email.as_str()) {
                return Err(AuthError::EmailInUse);
            }
            accounts.insert(email.as_str().to_owned(), password.to_owned());
        }

        let user = Self::user_for(email, display_name);
        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in(&self, email: &Email, password: &str) -> Result<User, AuthError> {
        let registered = self.lock_accounts().get(email.as_str()).cloned();
        match registered {
            Some(expected) if expected == password => {
                let user = Self::user_for(email, None);
                self.current.send_replace(Some(user.clone()));
                Ok(user)
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.current.send_replace(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.current.subscribe()
    }
}
