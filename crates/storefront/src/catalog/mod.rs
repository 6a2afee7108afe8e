//! Remote catalog service client.
//!
//! Thin REST consumption of the third-party product/category API: plain GETs
//! with query parameters, JSON responses passed through with minimal
//! transformation. Point lookups (product by id, categories) are cached via
//! `moka` (5-minute TTL); list and filter requests always hit the network so
//! the filtered view reflects the most recent request.

mod cache;
mod query;

pub use query::ProductFilter;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, instrument};

use trellis_core::{Category, CategoryId, Product, ProductId};

use crate::config::CatalogConfig;
use cache::CacheValue;

/// Errors that can occur when talking to the catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request did not complete within the configured timeout.
    #[error("catalog request timed out")]
    Timeout,

    /// Transport-level failure (connect, TLS, DNS).
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("catalog service returned HTTP {code}")]
    Status {
        /// HTTP status code.
        code: u16,
    },

    /// The response body did not match the expected shape.
    #[error("malformed catalog response: {0}")]
    Decode(#[source] reqwest::Error),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),
}

/// The catalog operations the stores consume.
///
/// The production implementation is [`CatalogClient`]; tests inject fakes.
pub trait CatalogApi {
    /// Fetch the full unfiltered product list.
    fn list_products(&self) -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send;

    /// Fetch the category list.
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, CatalogError>> + Send;

    /// Search products by title substring.
    fn search_by_title(
        &self,
        title: &str,
    ) -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send;

    /// Fetch products within an inclusive price range.
    fn products_by_price_range(
        &self,
        min: rust_decimal::Decimal,
        max: rust_decimal::Decimal,
    ) -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send;

    /// Fetch products in a category.
    fn products_by_category(
        &self,
        category_id: CategoryId,
    ) -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send;

    /// Fetch products matching a combined filter.
    fn filter_products(
        &self,
        filter: &ProductFilter,
    ) -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send;
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the remote catalog REST API.
///
/// Cheaply cloneable; clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    cache: Cache<String, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.as_str().trim_end_matches('/').to_owned(),
                timeout: config.timeout,
                cache,
            }),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }

    /// Send a GET request and decode the JSON body.
    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, CatalogError> {
        let response = request
            .timeout(self.inner.timeout)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = %status, "catalog service returned non-success status");
            return Err(CatalogError::Status {
                code: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(map_transport_error)
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Fetch the full product list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        self.send_json(self.inner.client.get(self.endpoint("products")))
            .await
    }

    /// Fetch a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product does not exist, or
    /// another error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product_by_id(&self, product_id: ProductId) -> Result<Product, CatalogError> {
        let cache_key = format!("product:{product_id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let result: Result<Product, CatalogError> = self
            .send_json(
                self.inner
                    .client
                    .get(self.endpoint(&format!("products/{product_id}"))),
            )
            .await;

        let product = match result {
            Err(CatalogError::Status { code: 404 }) => {
                return Err(CatalogError::NotFound(format!(
                    "Product not found: {product_id}"
                )));
            }
            other => other?,
        };

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Search products by title substring.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(title = %title))]
    pub async fn search_by_title(&self, title: &str) -> Result<Vec<Product>, CatalogError> {
        self.send_json(
            self.inner
                .client
                .get(self.endpoint("products"))
                .query(&[("title", title)]),
        )
        .await
    }

    /// Fetch products at an exact price point.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(price = %price))]
    pub async fn products_by_price(
        &self,
        price: rust_decimal::Decimal,
    ) -> Result<Vec<Product>, CatalogError> {
        self.send_json(
            self.inner
                .client
                .get(self.endpoint("products"))
                .query(&[("price", price.to_string())]),
        )
        .await
    }

    /// Fetch products within an inclusive price range.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(min = %min, max = %max))]
    pub async fn products_by_price_range(
        &self,
        min: rust_decimal::Decimal,
        max: rust_decimal::Decimal,
    ) -> Result<Vec<Product>, CatalogError> {
        self.send_json(
            self.inner
                .client
                .get(self.endpoint("products"))
                .query(&[
                    ("price_min", min.to_string()),
                    ("price_max", max.to_string()),
                ]),
        )
        .await
    }

    /// Fetch products in a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn products_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, CatalogError> {
        self.send_json(
            self.inner
                .client
                .get(self.endpoint("products"))
                .query(&[("categoryId", category_id.to_string())]),
        )
        .await
    }

    /// Fetch products matching a combined filter.
    ///
    /// Unset filter dimensions are omitted from the query string.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, filter))]
    pub async fn filter_products(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, CatalogError> {
        self.send_json(
            self.inner
                .client
                .get(self.endpoint("products"))
                .query(filter),
        )
        .await
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// Fetch the category list.
    ///
    /// Categories are read-only reference data fetched once per session, so
    /// the list is cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let cache_key = "categories".to_owned();

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self
            .send_json(self.inner.client.get(self.endpoint("categories")))
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Fetch a category by its ID.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the category does not exist, or
    /// another error if the request fails.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn category_by_id(&self, category_id: CategoryId) -> Result<Category, CatalogError> {
        let cache_key = format!("category:{category_id}");

        if let Some(CacheValue::Category(category)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category");
            return Ok(*category);
        }

        let result: Result<Category, CatalogError> = self
            .send_json(
                self.inner
                    .client
                    .get(self.endpoint(&format!("categories/{category_id}"))),
            )
            .await;

        let category = match result {
            Err(CatalogError::Status { code: 404 }) => {
                return Err(CatalogError::NotFound(format!(
                    "Category not found: {category_id}"
                )));
            }
            other => other?,
        };

        self.inner
            .cache
            .insert(cache_key, CacheValue::Category(Box::new(category.clone())))
            .await;

        Ok(category)
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate a cached product.
    pub async fn invalidate_product(&self, product_id: ProductId) {
        self.inner
            .cache
            .invalidate(&format!("product:{product_id}"))
            .await;
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

impl CatalogApi for CatalogClient {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        Self::list_products(self).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        Self::list_categories(self).await
    }

    async fn search_by_title(&self, title: &str) -> Result<Vec<Product>, CatalogError> {
        Self::search_by_title(self, title).await
    }

    async fn products_by_price_range(
        &self,
        min: rust_decimal::Decimal,
        max: rust_decimal::Decimal,
    ) -> Result<Vec<Product>, CatalogError> {
        Self::products_by_price_range(self, min, max).await
    }

    async fn products_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, CatalogError> {
        Self::products_by_category(self, category_id).await
    }

    async fn filter_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, CatalogError> {
        Self::filter_products(self, filter).await
    }
}

/// Classify a transport-level reqwest failure.
fn map_transport_error(err: reqwest::Error) -> CatalogError {
    if err.is_timeout() {
        CatalogError::Timeout
    } else if err.is_decode() {
        CatalogError::Decode(err)
    } else {
        CatalogError::Http(err)
    }
}
