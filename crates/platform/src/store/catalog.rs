//! Product and category repositories.

use serde_json::json;
use tracing::instrument;

use coronda_core::{Category, CategoryId, Product, ProductFields, ProductId};

use super::{Collection, DocumentStore, StoreError};

/// Repository for the `products` collection.
pub struct ProductRepository<'a> {
    products: Collection<'a, Product>,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            products: Collection::new(store),
        }
    }

    /// List all products.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails or a product is malformed.
    pub async fn list(&self) -> Result<Vec<Product>, StoreError> {
        self.products.list().await
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails or the product is malformed.
    pub async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        self.products.get(id.as_str()).await
    }

    /// Create a product from form fields.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: ProductFields) -> Result<Product, StoreError> {
        let id = self.products.insert(&input).await?;
        Ok(input.into_product(ProductId::new(id)))
    }

    /// Merge form fields into an existing product.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the product does not exist.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update(&self, id: &ProductId, input: &ProductFields) -> Result<Product, StoreError> {
        if self.get(id).await?.is_none() {
            return Err(StoreError::NotFound(format!("product {id}")));
        }
        self.products.merge(id.as_str(), input).await?;
        self.get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("product {id}")))
    }

    /// Set or clear the home-slider flag.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the product does not exist, so a
    /// flag is never merged into an empty document.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn set_featured(&self, id: &ProductId, featured: bool) -> Result<(), StoreError> {
        if self.get(id).await?.is_none() {
            return Err(StoreError::NotFound(format!("product {id}")));
        }
        self.products
            .merge(id.as_str(), &json!({ "featured": featured }))
            .await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the delete fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: &ProductId) -> Result<(), StoreError> {
        self.products.delete(id.as_str()).await
    }

    /// Whether any product is filed under the category `name`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if listing products fails.
    pub async fn any_in_category(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.list().await?.iter().any(|p| p.category == name))
    }
}

/// Repository for the `categories` collection.
pub struct CategoryRepository<'a> {
    categories: Collection<'a, Category>,
    products: ProductRepository<'a>,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            categories: Collection::new(store),
            products: ProductRepository::new(store),
        }
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails or a category is malformed.
    pub async fn list(&self) -> Result<Vec<Category>, StoreError> {
        self.categories.list().await
    }

    /// Get a category by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails.
    pub async fn get(&self, id: &CategoryId) -> Result<Option<Category>, StoreError> {
        self.categories.get(id.as_str()).await
    }

    /// Create a category with a generated id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    #[instrument(skip(self))]
    pub async fn create(&self, name: &str) -> Result<Category, StoreError> {
        let id = self.categories.insert(&json!({ "name": name })).await?;
        Ok(Category {
            id: CategoryId::new(id),
            name: name.to_owned(),
        })
    }

    /// Create or overwrite a category under its own id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    pub async fn upsert(&self, category: &Category) -> Result<(), StoreError> {
        self.categories.upsert(category).await
    }

    /// Whether a product still refers to this category name.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if listing products fails.
    pub async fn is_in_use(&self, name: &str) -> Result<bool, StoreError> {
        self.products.any_in_category(name).await
    }

    /// Delete a category unless a product is filed under it.
    ///
    /// Only the application scan guards this; a product saved concurrently
    /// with the delete can still end up pointing at a removed name.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the category is in use and
    /// `StoreError::NotFound` if it does not exist.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete(&self, id: &CategoryId) -> Result<(), StoreError> {
        let category = self
            .get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("category {id}")))?;

        if self.is_in_use(&category.name).await? {
            return Err(StoreError::Conflict(format!(
                "La categoría \"{}\" está en uso por al menos un producto.",
                category.name
            )));
        }

        self.categories.delete(id.as_str()).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use coronda_core::Money;
    use serde_json::json;

    use super::*;
    use crate::store::MemoryDocumentStore;

    fn fields(name: &str, category: &str) -> ProductFields {
        ProductFields {
            name: name.to_owned(),
            description: "Hecho a mano".to_owned(),
            price: Money::from_units(2500),
            image_url: "https://placehold.co/400.png".to_owned(),
            category: category.to_owned(),
            stock: 5,
        }
    }

    #[tokio::test]
    async fn test_set_featured_on_missing_product() {
        let store = MemoryDocumentStore::new();
        let repo = ProductRepository::new(&store);
        let product = repo.create(fields("Mate de calabaza", "Mates")).await.unwrap();

        repo.set_featured(&product.id, true).await.unwrap();
        assert_eq!(repo.get(&product.id).await.unwrap().unwrap().featured, Some(true));

        let result = repo.set_featured(&ProductId::new("borrado"), true).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert!(store.raw("products", "borrado").await.is_none());
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_and_update_product_keeps_reviews() {
        let store = MemoryDocumentStore::new();
        let repo = ProductRepository::new(&store);
        let product = repo.create(fields("Poncho", "Textiles")).await.unwrap();

        store
            .merge(
                "products",
                product.id.as_str(),
                serde_json::from_value(json!({"reviews": [{
                    "id": "r1", "author": "Ana", "rating": 5, "comment": "", "date": ""
                }]}))
                .unwrap(),
            )
            .await
            .unwrap();

        let mut edited = fields("Poncho salteño", "Textiles");
        edited.stock = 0;
        let updated = repo.update(&product.id, &edited).await.unwrap();
        assert_eq!(updated.name, "Poncho salteño");
        assert_eq!(updated.reviews.len(), 1);
        assert!(!updated.in_stock());
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let store = MemoryDocumentStore::new();
        let repo = ProductRepository::new(&store);
        let result = repo.update(&ProductId::new("ghost"), &fields("x", "y")).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_category_in_use_cannot_be_deleted() {
        let store = MemoryDocumentStore::new();
        let categories = CategoryRepository::new(&store);
        let textiles = categories.create("Textiles").await.unwrap();
        let ceramica = categories.create("Cerámica").await.unwrap();
        ProductRepository::new(&store)
            .create(fields("Poncho", "Textiles"))
            .await
            .unwrap();

        let result = categories.delete(&textiles.id).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));

        categories.delete(&ceramica.id).await.unwrap();
        let names: Vec<_> = categories
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Textiles"]);
    }

    #[tokio::test]
    async fn test_malformed_product_is_data_corruption() {
        let store = MemoryDocumentStore::new();
        store.seed("products", "bad", json!({"name": 7})).await;
        let result = ProductRepository::new(&store).list().await;
        assert!(matches!(result, Err(StoreError::DataCorruption(msg)) if msg.contains("products/bad")));
    }
}
