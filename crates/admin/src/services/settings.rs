//! Site settings: about section, shipping cost, featured products and
//! slider advertisements.

use futures::future::{BoxFuture, FutureExt, try_join_all};
use tracing::instrument;
use url::Url;

use coronda_core::Advertisement;
use coronda_platform::StoreError;
use coronda_platform::store::{
    AdvertisementRepository, DocumentStore, ProductRepository, SettingsRepository,
};

use crate::error::{AppError, Result};
use crate::models::{SettingsUpdate, SettingsView};

/// Load the settings screen, writing defaults for a missing about section
/// or shipping cost.
///
/// # Errors
///
/// Returns an error if a read or a default write fails.
#[instrument(skip(store))]
pub async fn load_settings(store: &dyn DocumentStore) -> Result<SettingsView> {
    let settings = SettingsRepository::new(store);
    let products = ProductRepository::new(store);
    let ads = AdvertisementRepository::new(store);

    let ((about, shipping_cost), products, advertisements) = futures::try_join!(
        settings.load_or_initialize(),
        products.list(),
        ads.list()
    )?;

    Ok(SettingsView {
        about,
        shipping_cost,
        products,
        advertisements,
    })
}

/// Save the settings screen.
///
/// Input is validated first. Then every write runs concurrently: about,
/// shipping, one featured flag per product, one save per advertisement and
/// one delete per removed advertisement. The first failure is returned;
/// writes that already landed stay.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for a negative shipping cost or an
/// advertisement image URL that does not parse, and the first store error
/// otherwise.
#[instrument(skip_all, fields(
    featured = update.featured.len(),
    ads = update.advertisements.len(),
    deleted = update.deleted_advertisement_ids.len(),
))]
pub async fn save_settings(store: &dyn DocumentStore, update: SettingsUpdate) -> Result<()> {
    if update.shipping_cost.is_negative() {
        return Err(AppError::BadRequest("Costo de envío inválido.".to_string()));
    }

    let advertisements = update
        .advertisements
        .into_iter()
        .map(normalize_advertisement)
        .collect::<Result<Vec<_>>>()?;

    let settings = SettingsRepository::new(store);
    let products = ProductRepository::new(store);
    let ads = AdvertisementRepository::new(store);

    let mut writes: Vec<BoxFuture<'_, std::result::Result<(), StoreError>>> = vec![
        settings.save_about(&update.about).boxed(),
        settings.save_shipping(update.shipping_cost).boxed(),
    ];
    writes.extend(update.featured.iter().map(|flag| {
        let products = &products;
        async move {
            match products.set_featured(&flag.id, flag.featured).await {
                Err(StoreError::NotFound(_)) => {
                    tracing::warn!(product_id = %flag.id, "Skipping featured flag for missing product");
                    Ok(())
                }
                other => other,
            }
        }
        .boxed()
    }));
    writes.extend(advertisements.iter().map(|ad| ads.save(ad).boxed()));
    writes.extend(
        update
            .deleted_advertisement_ids
            .iter()
            .map(|id| ads.delete(id).boxed()),
    );

    try_join_all(writes).await?;
    tracing::info!("Settings saved");
    Ok(())
}

fn normalize_advertisement(mut ad: Advertisement) -> Result<Advertisement> {
    ad.image_url = normalize_image_url(&ad.image_url).ok_or_else(|| {
        AppError::BadRequest(format!(
            "La URL de imagen de la publicidad \"{}\" no es válida.",
            ad.name
        ))
    })?;
    Ok(ad)
}

/// Make an image URL absolute.
///
/// Protocol-relative URLs get `https:` and scheme-less ones `https://`.
/// An empty URL stays empty. Returns `None` when the result does not
/// parse.
#[must_use]
pub fn normalize_image_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(String::new());
    }

    let absolute = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else if let Some(rest) = raw.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        format!("https://{raw}")
    };

    let parsed = Url::parse(&absolute).ok()?;
    parsed.host_str()?;
    Some(parsed.into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use coronda_core::{AboutData, AdvertisementId, AdvertisementKind, Money, ProductId};
    use coronda_platform::store::{MemoryDocumentStore, collections};
    use serde_json::json;

    use super::*;
    use crate::models::FeaturedFlag;

    #[test]
    fn test_normalize_image_url() {
        assert_eq!(
            normalize_image_url("https://cdn.example.com/a.png").as_deref(),
            Some("https://cdn.example.com/a.png")
        );
        assert_eq!(
            normalize_image_url("//cdn.example.com/a.png").as_deref(),
            Some("https://cdn.example.com/a.png")
        );
        assert_eq!(
            normalize_image_url(" placehold.co/1280x720.png ").as_deref(),
            Some("https://placehold.co/1280x720.png")
        );
        assert_eq!(normalize_image_url("").as_deref(), Some(""));
        assert_eq!(normalize_image_url("https://"), None);
        assert_eq!(normalize_image_url("no spaces allowed.png"), None);
    }

    fn ad(id: &str, image_url: &str) -> Advertisement {
        Advertisement {
            id: AdvertisementId::new(id),
            name: "Promo".to_string(),
            description: "Descuento".to_string(),
            image_url: image_url.to_string(),
            kind: AdvertisementKind::Advertisement,
        }
    }

    async fn seeded() -> MemoryDocumentStore {
        let store = MemoryDocumentStore::new();
        store
            .seed(
                collections::PRODUCTS,
                "p1",
                json!({"name": "Miel", "price": 2500, "stock": 1}),
            )
            .await;
        store
            .seed(collections::ADVERTISEMENTS, "ad-old", json!({"name": "Vieja"}))
            .await;
        store
    }

    #[tokio::test]
    async fn test_load_writes_defaults() {
        let store = seeded().await;
        let view = load_settings(&store).await.unwrap();

        assert_eq!(view.about, AboutData::default());
        assert_eq!(view.shipping_cost, Money::from_units(1500));
        assert_eq!(view.products.len(), 1);
        assert_eq!(view.advertisements.len(), 1);
        assert!(store.raw(collections::SETTINGS, "aboutUs").await.is_some());
        assert!(store.raw(collections::SETTINGS, "shipping").await.is_some());
    }

    #[tokio::test]
    async fn test_save_writes_everything() {
        let store = seeded().await;
        let update = SettingsUpdate {
            about: AboutData {
                title: "Quiénes somos".to_string(),
                ..AboutData::default()
            },
            shipping_cost: Money::from_units(2000),
            featured: vec![FeaturedFlag {
                id: ProductId::new("p1"),
                featured: true,
            }],
            advertisements: vec![ad("ad-new", "//cdn.example.com/promo.png")],
            deleted_advertisement_ids: vec![AdvertisementId::new("ad-old")],
        };

        save_settings(&store, update).await.unwrap();

        let shipping = store.raw(collections::SETTINGS, "shipping").await.unwrap();
        assert_eq!(shipping["cost"], json!(2000));
        let product = store.raw(collections::PRODUCTS, "p1").await.unwrap();
        assert_eq!(product["featured"], json!(true));
        let saved_ad = store.raw(collections::ADVERTISEMENTS, "ad-new").await.unwrap();
        assert_eq!(saved_ad["imageUrl"], json!("https://cdn.example.com/promo.png"));
        assert!(store.raw(collections::ADVERTISEMENTS, "ad-old").await.is_none());
    }

    #[tokio::test]
    async fn test_featured_flag_for_deleted_product_is_skipped() {
        let store = seeded().await;
        let update = SettingsUpdate {
            about: AboutData::default(),
            shipping_cost: Money::from_units(1500),
            featured: vec![
                FeaturedFlag {
                    id: ProductId::new("p1"),
                    featured: true,
                },
                FeaturedFlag {
                    id: ProductId::new("borrado-en-otra-pestana"),
                    featured: true,
                },
            ],
            advertisements: Vec::new(),
            deleted_advertisement_ids: Vec::new(),
        };

        save_settings(&store, update).await.unwrap();

        assert!(
            store
                .raw(collections::PRODUCTS, "borrado-en-otra-pestana")
                .await
                .is_none()
        );
        let products = ProductRepository::new(&store).list().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].featured, Some(true));
    }

    #[tokio::test]
    async fn test_bad_ad_url_writes_nothing() {
        let store = seeded().await;
        let update = SettingsUpdate {
            about: AboutData::default(),
            shipping_cost: Money::from_units(2000),
            featured: Vec::new(),
            advertisements: vec![ad("ad-new", "https://")],
            deleted_advertisement_ids: Vec::new(),
        };

        let err = save_settings(&store, update).await.unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(store.raw(collections::SETTINGS, "shipping").await.is_none());
    }

    #[tokio::test]
    async fn test_store_failure_is_reported() {
        let store = seeded().await;
        store.fail_writes_to(collections::ADVERTISEMENTS).await;
        let update = SettingsUpdate {
            about: AboutData::default(),
            shipping_cost: Money::from_units(1800),
            featured: Vec::new(),
            advertisements: vec![ad("ad-new", "https://cdn.example.com/a.png")],
            deleted_advertisement_ids: Vec::new(),
        };

        let err = save_settings(&store, update).await.unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
    }
}
