//! Sale repository.

use std::cmp::Reverse;

use serde_json::json;
use tracing::instrument;

use coronda_core::{NewSale, Sale, SaleId, SaleStatus, StoredUser};

use super::{Collection, DocumentStore, StoreError};

/// Repository for the `sales` collection.
pub struct SaleRepository<'a> {
    sales: Collection<'a, Sale>,
}

impl<'a> SaleRepository<'a> {
    /// Create a new sale repository.
    #[must_use]
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            sales: Collection::new(store),
        }
    }

    /// All sales, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails or a sale is malformed.
    pub async fn list(&self) -> Result<Vec<Sale>, StoreError> {
        let mut sales = self.sales.list().await?;
        sort_newest_first(&mut sales);
        Ok(sales)
    }

    /// Get a sale by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails or the sale is malformed.
    pub async fn get(&self, id: &SaleId) -> Result<Option<Sale>, StoreError> {
        self.sales.get(id.as_str()).await
    }

    /// Write a new sale and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    #[instrument(skip(self, sale), fields(total = %sale.total, items = sale.items.len()))]
    pub async fn create(&self, sale: NewSale) -> Result<Sale, StoreError> {
        let id = self.sales.insert(&sale).await?;
        Ok(sale.into_sale(SaleId::new(id)))
    }

    /// Change a sale's status.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the sale does not exist.
    #[instrument(skip(self), fields(sale_id = %id))]
    pub async fn set_status(&self, id: &SaleId, status: SaleStatus) -> Result<Sale, StoreError> {
        let mut sale = self
            .get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("sale {id}")))?;
        self.sales
            .merge(id.as_str(), &json!({ "status": status }))
            .await?;
        sale.status = status;
        Ok(sale)
    }

    /// Delete a sale. User `saleIds` pointing at it are left dangling.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the delete fails.
    #[instrument(skip(self), fields(sale_id = %id))]
    pub async fn delete(&self, id: &SaleId) -> Result<(), StoreError> {
        self.sales.delete(id.as_str()).await
    }

    /// Sales referenced by a user's `saleIds`, newest first.
    ///
    /// Ids whose sale no longer exists are skipped.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if any read fails.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn find_for_user(&self, user: &StoredUser) -> Result<Vec<Sale>, StoreError> {
        let mut sales = Vec::with_capacity(user.sale_ids().len());
        for id in user.sale_ids() {
            if let Some(sale) = self.get(id).await? {
                sales.push(sale);
            }
        }
        sort_newest_first(&mut sales);
        Ok(sales)
    }
}

/// Sort by parsed date, newest first. Unparseable dates sort last.
fn sort_newest_first(sales: &mut [Sale]) {
    sales.sort_by_key(|s| Reverse(s.parsed_date()));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use coronda_core::{CustomerInfo, Money, UserId};
    use serde_json::json;

    use super::*;
    use crate::store::MemoryDocumentStore;

    fn new_sale(date: &str) -> NewSale {
        NewSale {
            customer_info: CustomerInfo {
                name: "Julieta Romero".to_owned(),
                ..CustomerInfo::default()
            },
            date: date.to_owned(),
            total: Money::from_units(4000),
            status: SaleStatus::Processing,
            items: vec![],
        }
    }

    #[tokio::test]
    async fn test_list_sorted_newest_first() {
        let store = MemoryDocumentStore::new();
        let repo = SaleRepository::new(&store);
        repo.create(new_sale("2024-01-05T10:00:00Z")).await.unwrap();
        repo.create(new_sale("2024-03-01T10:00:00Z")).await.unwrap();
        repo.create(new_sale("2023-12-24T10:00:00Z")).await.unwrap();

        let dates: Vec<_> = repo.list().await.unwrap().into_iter().map(|s| s.date).collect();
        assert_eq!(
            dates,
            vec![
                "2024-03-01T10:00:00Z",
                "2024-01-05T10:00:00Z",
                "2023-12-24T10:00:00Z"
            ]
        );
    }

    #[tokio::test]
    async fn test_find_for_user_skips_deleted_sales() {
        let store = MemoryDocumentStore::new();
        let repo = SaleRepository::new(&store);
        let older = repo.create(new_sale("2024-01-05T10:00:00Z")).await.unwrap();
        let newer = repo.create(new_sale("2024-02-05T10:00:00Z")).await.unwrap();

        let user: StoredUser = serde_json::from_value(json!({
            "id": "uid-1",
            "name": "Julieta",
            "email": "juli@example.com",
            "isAdmin": false,
            "saleIds": [older.id.clone(), "deleted-sale", newer.id.clone()]
        }))
        .unwrap();
        assert_eq!(user.id, UserId::new("uid-1"));

        let found = repo.find_for_user(&user).await.unwrap();
        assert_eq!(
            found.into_iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![newer.id, older.id]
        );
    }

    #[tokio::test]
    async fn test_set_status() {
        let store = MemoryDocumentStore::new();
        let repo = SaleRepository::new(&store);
        let sale = repo.create(new_sale("2024-01-05T10:00:00Z")).await.unwrap();

        let updated = repo.set_status(&sale.id, SaleStatus::Completed).await.unwrap();
        assert_eq!(updated.status, SaleStatus::Completed);

        let raw = store.raw("sales", sale.id.as_str()).await.unwrap();
        assert_eq!(raw.get("status"), Some(&json!("Completado")));
    }
}
