//! Seed the catalog and default settings from a YAML file.
//!
//! Documents whose id already exists are left alone, so seeding twice is
//! harmless and never overwrites edits made in the back-office.

use std::path::Path;

use serde::Deserialize;

use coronda_core::{AboutData, Advertisement, Category, Money, Product};
use coronda_platform::StoreError;
use coronda_platform::config::{get_database_url, load_dotenv};
use coronda_platform::db::create_pool;
use coronda_platform::store::{
    Collection, DocumentStore, PgDocumentStore, Record, SettingsRepository,
};

/// Contents of a seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedFile {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub advertisements: Vec<Advertisement>,
    pub about: Option<AboutData>,
    pub shipping_cost: Option<Money>,
}

/// What a seed run wrote.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Seed the database from `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or a store
/// operation fails.
pub async fn run(file_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    load_dotenv();

    let contents = std::fs::read_to_string(file_path)?;
    let seed: SeedFile = serde_yaml::from_str(&contents)?;
    tracing::info!(
        file = %file_path.display(),
        categories = seed.categories.len(),
        products = seed.products.len(),
        "Seed file loaded"
    );

    let pool = create_pool(&get_database_url("DATABASE_URL")?).await?;
    let store = PgDocumentStore::new(pool);

    let report = apply(&store, &seed).await?;
    tracing::info!(
        inserted = report.inserted,
        skipped = report.skipped,
        "Seeding complete"
    );
    Ok(())
}

/// Write every record in `seed` that does not exist yet.
///
/// # Errors
///
/// Returns `StoreError` if a read or write fails.
pub async fn apply(store: &dyn DocumentStore, seed: &SeedFile) -> Result<SeedReport, StoreError> {
    let mut report = SeedReport::default();
    insert_missing(store, &seed.categories, &mut report).await?;
    insert_missing(store, &seed.products, &mut report).await?;
    insert_missing(store, &seed.advertisements, &mut report).await?;

    let settings = SettingsRepository::new(store);
    if let Some(about) = &seed.about {
        if settings.about().await?.is_none() {
            settings.save_about(about).await?;
            report.inserted += 1;
        } else {
            report.skipped += 1;
        }
    }
    if let Some(cost) = seed.shipping_cost {
        if settings.shipping().await?.is_none() {
            settings.save_shipping(cost).await?;
            report.inserted += 1;
        } else {
            report.skipped += 1;
        }
    }

    Ok(report)
}

async fn insert_missing<T: Record>(
    store: &dyn DocumentStore,
    records: &[T],
    report: &mut SeedReport,
) -> Result<(), StoreError> {
    let collection = Collection::<T>::new(store);
    for record in records {
        if collection.get(record.document_id()).await?.is_some() {
            tracing::debug!(collection = T::COLLECTION, id = record.document_id(), "Exists, skipping");
            report.skipped += 1;
            continue;
        }
        collection.upsert(record).await?;
        report.inserted += 1;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use coronda_platform::store::{MemoryDocumentStore, collections};
    use serde_json::json;

    use super::*;

    const SEED: &str = r"
categories:
  - id: dulces
    name: Dulces
  - id: mates
    name: Mates
products:
  - id: dulce-de-leche
    name: Dulce de leche artesanal
    description: Receta de campo
    price: 3500
    category: Dulces
    stock: 12
about:
  title: Nuestra Esencia
  text: Hecho a mano en Coronda.
  imageUrl: https://placehold.co/600x600.png
shippingCost: 1800
";

    #[tokio::test]
    async fn test_seed_skips_existing() {
        let store = MemoryDocumentStore::new();
        store
            .seed(collections::CATEGORIES, "mates", json!({"name": "Mates y bombillas"}))
            .await;
        let seed: SeedFile = serde_yaml::from_str(SEED).unwrap();

        let report = apply(&store, &seed).await.unwrap();

        assert_eq!(report, SeedReport { inserted: 4, skipped: 1 });
        assert_eq!(
            store.raw(collections::CATEGORIES, "mates").await.unwrap()["name"],
            json!("Mates y bombillas")
        );
        assert_eq!(
            store.raw(collections::SETTINGS, "shipping").await.unwrap()["cost"],
            json!(1800)
        );

        let again = apply(&store, &seed).await.unwrap();
        assert_eq!(again, SeedReport { inserted: 0, skipped: 5 });
    }
}
