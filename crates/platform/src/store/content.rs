//! Advertisements and site settings.

use tracing::instrument;

use coronda_core::{AboutData, Advertisement, AdvertisementId, Money, ShippingSettings};

use super::{Collection, DocumentStore, StoreError, collections, decode, encode};

/// Settings document holding the about section.
pub const ABOUT_US: &str = "aboutUs";
/// Settings document holding the flat shipping cost.
pub const SHIPPING: &str = "shipping";

/// Repository for the `advertisements` collection.
pub struct AdvertisementRepository<'a> {
    ads: Collection<'a, Advertisement>,
}

impl<'a> AdvertisementRepository<'a> {
    /// Create a new advertisement repository.
    #[must_use]
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            ads: Collection::new(store),
        }
    }

    /// List all advertisements.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails.
    pub async fn list(&self) -> Result<Vec<Advertisement>, StoreError> {
        self.ads.list().await
    }

    /// Create or merge an advertisement under its id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    pub async fn save(&self, ad: &Advertisement) -> Result<(), StoreError> {
        self.ads.upsert(ad).await
    }

    /// Delete an advertisement.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the delete fails.
    pub async fn delete(&self, id: &AdvertisementId) -> Result<(), StoreError> {
        self.ads.delete(id.as_str()).await
    }
}

/// Repository for the singleton documents in `settings`.
pub struct SettingsRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// The stored about section, if one was ever saved.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails or the document is malformed.
    pub async fn about(&self) -> Result<Option<AboutData>, StoreError> {
        self.store
            .get(collections::SETTINGS, ABOUT_US)
            .await?
            .map(|doc| decode(collections::SETTINGS, doc))
            .transpose()
    }

    /// The about section, falling back to the built-in default.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails.
    pub async fn about_or_default(&self) -> Result<AboutData, StoreError> {
        Ok(self.about().await?.unwrap_or_default())
    }

    /// Overwrite the about section.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    #[instrument(skip(self, about))]
    pub async fn save_about(&self, about: &AboutData) -> Result<(), StoreError> {
        self.store
            .merge(collections::SETTINGS, ABOUT_US, encode(about)?)
            .await
    }

    /// The stored shipping settings, if ever saved.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails or the document is malformed.
    pub async fn shipping(&self) -> Result<Option<ShippingSettings>, StoreError> {
        self.store
            .get(collections::SETTINGS, SHIPPING)
            .await?
            .map(|doc| decode(collections::SETTINGS, doc))
            .transpose()
    }

    /// Shipping cost, or the default of 1500 when never configured.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails.
    pub async fn shipping_cost(&self) -> Result<Money, StoreError> {
        Ok(self.shipping().await?.unwrap_or_default().cost)
    }

    /// Overwrite the shipping cost.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    #[instrument(skip(self))]
    pub async fn save_shipping(&self, cost: Money) -> Result<(), StoreError> {
        self.store
            .merge(
                collections::SETTINGS,
                SHIPPING,
                encode(&ShippingSettings { cost })?,
            )
            .await
    }

    /// Write the default about and shipping documents when they are missing,
    /// and return the effective values.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if a read or write fails.
    pub async fn load_or_initialize(&self) -> Result<(AboutData, Money), StoreError> {
        let about = if let Some(about) = self.about().await? {
            about
        } else {
            let about = AboutData::default();
            self.save_about(&about).await?;
            about
        };

        let cost = if let Some(shipping) = self.shipping().await? {
            shipping.cost
        } else {
            let shipping = ShippingSettings::default();
            self.save_shipping(shipping.cost).await?;
            shipping.cost
        };

        Ok((about, cost))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::MemoryDocumentStore;

    #[tokio::test]
    async fn test_shipping_cost_defaults_when_missing() {
        let store = MemoryDocumentStore::new();
        let repo = SettingsRepository::new(&store);
        assert_eq!(repo.shipping_cost().await.unwrap(), Money::from_units(1500));

        repo.save_shipping(Money::from_units(2200)).await.unwrap();
        assert_eq!(repo.shipping_cost().await.unwrap(), Money::from_units(2200));
    }

    #[tokio::test]
    async fn test_load_or_initialize_writes_defaults() {
        let store = MemoryDocumentStore::new();
        let repo = SettingsRepository::new(&store);
        let (about, cost) = repo.load_or_initialize().await.unwrap();

        assert_eq!(about, AboutData::default());
        assert_eq!(cost, Money::from_units(1500));
        assert!(store.raw("settings", ABOUT_US).await.is_some());
        assert!(store.raw("settings", SHIPPING).await.is_some());
    }

    #[tokio::test]
    async fn test_load_or_initialize_keeps_existing() {
        let store = MemoryDocumentStore::new();
        store
            .seed(
                "settings",
                ABOUT_US,
                json!({"title": "Quiénes somos", "text": "t", "imageUrl": "https://x.test/a.png"}),
            )
            .await;
        let (about, _) = SettingsRepository::new(&store)
            .load_or_initialize()
            .await
            .unwrap();
        assert_eq!(about.title, "Quiénes somos");
    }

    #[tokio::test]
    async fn test_advertisement_crud() {
        let store = MemoryDocumentStore::new();
        let repo = AdvertisementRepository::new(&store);
        let ad = Advertisement {
            id: AdvertisementId::new("ad-1"),
            name: "Hot Sale".to_owned(),
            description: "20% off".to_owned(),
            image_url: "https://cdn.example.com/hot.png".to_owned(),
            kind: coronda_core::AdvertisementKind::Advertisement,
        };
        repo.save(&ad).await.unwrap();
        assert_eq!(repo.list().await.unwrap(), vec![ad.clone()]);

        repo.delete(&ad.id).await.unwrap();
        assert!(repo.list().await.unwrap().is_empty());
    }
}
