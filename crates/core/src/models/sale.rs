//! Sales and the customer information captured at checkout.

use serde::{Deserialize, Serialize};

use crate::types::{Money, ProductId, SaleId, SaleStatus, UserId};

/// Contact and delivery details entered on the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip: String,
}

/// A required checkout field was left blank.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("missing required field: {field}")]
pub struct CustomerInfoError {
    /// camelCase name of the blank field.
    pub field: &'static str,
}

impl CustomerInfo {
    /// Check that every form field is non-empty after trimming.
    ///
    /// # Errors
    ///
    /// Returns the first blank field in form order.
    pub fn validate(&self) -> Result<(), CustomerInfoError> {
        let fields = [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("zip", &self.zip),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(CustomerInfoError { field });
            }
        }
        Ok(())
    }

    /// Split the full name into the payer's first name and surname.
    ///
    /// The first whitespace-separated word is the name; the remaining words,
    /// joined by single spaces, are the surname.
    #[must_use]
    pub fn split_name(&self) -> (String, String) {
        let mut words = self.name.split_whitespace();
        let first = words.next().unwrap_or_default().to_owned();
        let rest = words.collect::<Vec<_>>().join(" ");
        (first, rest)
    }
}

/// A line of a sale: the product as it was when purchased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    pub quantity: u32,
}

impl SaleItem {
    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }
}

/// A persisted checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: SaleId,
    pub customer_info: CustomerInfo,
    /// RFC 3339 timestamp.
    pub date: String,
    pub total: Money,
    #[serde(default)]
    pub status: SaleStatus,
    #[serde(default)]
    pub items: Vec<SaleItem>,
}

/// A sale about to be written; the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    pub customer_info: CustomerInfo,
    pub date: String,
    pub total: Money,
    pub status: SaleStatus,
    pub items: Vec<SaleItem>,
}

impl NewSale {
    /// Attach the id assigned by the store.
    #[must_use]
    pub fn into_sale(self, id: SaleId) -> Sale {
        Sale {
            id,
            customer_info: self.customer_info,
            date: self.date,
            total: self.total,
            status: self.status,
            items: self.items,
        }
    }
}

impl Sale {
    /// Parsed sale date, when it is a valid RFC 3339 timestamp.
    #[must_use]
    pub fn parsed_date(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::parse_from_rfc3339(&self.date)
            .ok()
            .map(|d| d.with_timezone(&chrono::Utc))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn complete_info() -> CustomerInfo {
        CustomerInfo {
            user_id: None,
            name: "María José Fernández".to_owned(),
            email: "mj@example.com".to_owned(),
            phone: "3415551234".to_owned(),
            address: "Av. Pellegrini 1234".to_owned(),
            city: "Rosario".to_owned(),
            zip: "2000".to_owned(),
        }
    }

    #[test]
    fn test_validate_accepts_complete_form() {
        assert!(complete_info().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_whitespace_only() {
        let mut info = complete_info();
        info.city = "   ".to_owned();
        assert_eq!(info.validate(), Err(CustomerInfoError { field: "city" }));
    }

    #[test]
    fn test_split_name() {
        assert_eq!(
            complete_info().split_name(),
            ("María".to_owned(), "José Fernández".to_owned())
        );

        let single = CustomerInfo {
            name: "Cher".to_owned(),
            ..CustomerInfo::default()
        };
        assert_eq!(single.split_name(), ("Cher".to_owned(), String::new()));
    }

    #[test]
    fn test_sale_status_defaults_to_processing() {
        let sale: Sale = serde_json::from_value(serde_json::json!({
            "id": "s1",
            "customerInfo": {"name": "Ana"},
            "date": "2024-03-10T12:00:00Z",
            "total": 3000
        }))
        .unwrap();
        assert_eq!(sale.status, SaleStatus::Processing);
        assert!(sale.parsed_date().is_some());
        assert!(sale.customer_info.user_id.is_none());
    }
}
