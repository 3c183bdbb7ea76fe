//! Catalog reads with a last-known-good fallback.
//!
//! Every listing is read from the document store. Successful reads are kept
//! in a `moka` cache, and when the store fails the cached listing is served
//! instead, so the shop stays browsable through a database blip.

use std::time::Duration;

use moka::future::Cache;
use tracing::{instrument, warn};

use coronda_core::{Advertisement, Category, Product, SliderItem};
use coronda_platform::StoreError;
use coronda_platform::store::{
    AdvertisementRepository, CategoryRepository, DocumentStore, ProductRepository,
};

/// How long a stale listing may still be served.
const FALLBACK_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Cache key for catalog listings.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Categories,
    Advertisements,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Categories(Vec<Category>),
    Advertisements(Vec<Advertisement>),
}

/// Last-known-good listings.
#[derive(Clone)]
pub struct CatalogCache {
    cache: Cache<CacheKey, CacheValue>,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(16)
                .time_to_live(FALLBACK_TTL)
                .build(),
        }
    }

    async fn remember(&self, key: CacheKey, value: CacheValue) {
        self.cache.insert(key, value).await;
    }

    async fn recall(&self, key: CacheKey) -> Option<CacheValue> {
        self.cache.get(&key).await
    }
}

/// Catalog service.
pub struct CatalogService<'a> {
    store: &'a dyn DocumentStore,
    cache: &'a CatalogCache,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore, cache: &'a CatalogCache) -> Self {
        Self { store, cache }
    }

    /// All products.
    ///
    /// # Errors
    ///
    /// Returns the store error when the read fails and nothing is cached.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, StoreError> {
        match ProductRepository::new(self.store).list().await {
            Ok(products) => {
                self.cache
                    .remember(CacheKey::Products, CacheValue::Products(products.clone()))
                    .await;
                Ok(products)
            }
            Err(e) => match self.cache.recall(CacheKey::Products).await {
                Some(CacheValue::Products(products)) => {
                    warn!(error = %e, "Serving cached products after store failure");
                    Ok(products)
                }
                _ => Err(e),
            },
        }
    }

    /// Products filtered by exact category name and a search term.
    ///
    /// # Errors
    ///
    /// See [`products`](Self::products).
    pub async fn search(
        &self,
        category: Option<&str>,
        term: Option<&str>,
    ) -> Result<Vec<Product>, StoreError> {
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        let term = term.unwrap_or_default();
        Ok(self
            .products()
            .await?
            .into_iter()
            .filter(|p| category.is_none_or(|c| p.category == c))
            .filter(|p| p.matches_search(term))
            .collect())
    }

    /// All categories.
    ///
    /// # Errors
    ///
    /// Returns the store error when the read fails and nothing is cached.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        match CategoryRepository::new(self.store).list().await {
            Ok(categories) => {
                self.cache
                    .remember(
                        CacheKey::Categories,
                        CacheValue::Categories(categories.clone()),
                    )
                    .await;
                Ok(categories)
            }
            Err(e) => match self.cache.recall(CacheKey::Categories).await {
                Some(CacheValue::Categories(categories)) => {
                    warn!(error = %e, "Serving cached categories after store failure");
                    Ok(categories)
                }
                _ => Err(e),
            },
        }
    }

    /// All advertisements.
    ///
    /// # Errors
    ///
    /// Returns the store error when the read fails and nothing is cached.
    #[instrument(skip(self))]
    pub async fn advertisements(&self) -> Result<Vec<Advertisement>, StoreError> {
        match AdvertisementRepository::new(self.store).list().await {
            Ok(ads) => {
                self.cache
                    .remember(CacheKey::Advertisements, CacheValue::Advertisements(ads.clone()))
                    .await;
                Ok(ads)
            }
            Err(e) => match self.cache.recall(CacheKey::Advertisements).await {
                Some(CacheValue::Advertisements(ads)) => {
                    warn!(error = %e, "Serving cached advertisements after store failure");
                    Ok(ads)
                }
                _ => Err(e),
            },
        }
    }

    /// Home slider: featured products followed by advertisements.
    ///
    /// # Errors
    ///
    /// Returns the store error when either listing is unavailable.
    pub async fn slider(&self) -> Result<Vec<SliderItem>, StoreError> {
        let products = self.products().await?;
        let ads = self.advertisements().await?;

        Ok(products
            .iter()
            .filter(|p| p.is_featured())
            .map(SliderItem::from)
            .chain(ads.iter().map(SliderItem::from))
            .collect())
    }
}
