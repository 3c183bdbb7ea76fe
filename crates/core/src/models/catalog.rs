//! Products, reviews, and categories.

use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Money, ProductId, ReviewId};

/// A product offered in the catalog.
///
/// `category` holds the category *name*, not an id. Renaming a category does
/// not update the products that carry the old name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Product {
    /// Mean review rating, or `0.0` when there are no reviews.
    #[must_use]
    pub fn average_rating(&self) -> f64 {
        if self.reviews.is_empty() {
            return 0.0;
        }
        let sum: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
        f64::from(sum) / f64::from(u32::try_from(self.reviews.len()).unwrap_or(u32::MAX))
    }

    /// Whether at least one unit is available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Whether the product is shown in the home slider.
    #[must_use]
    pub fn is_featured(&self) -> bool {
        self.featured.unwrap_or(false)
    }

    /// Case-insensitive substring match over name and description.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
    }
}

/// Editable product fields, as submitted by the admin product form.
///
/// Saving these onto an existing product is a shallow merge, so reviews and
/// the featured flag survive an edit that does not mention them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFields {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub stock: i64,
}

impl ProductFields {
    /// Build a new product with these fields and no reviews.
    #[must_use]
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
            category: self.category,
            stock: self.stock,
            featured: None,
            reviews: Vec::new(),
        }
    }
}

/// A customer review attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub author: String,
    /// 1 through 5.
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub date: String,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: ProductId::new("mate-1"),
            name: "Mate de calabaza".to_owned(),
            description: "Mate artesanal curado a mano".to_owned(),
            price: Money::from_units(8500),
            image_url: String::new(),
            category: "Mates".to_owned(),
            stock: 3,
            featured: None,
            reviews: vec![],
        }
    }

    fn review(rating: u8) -> Review {
        Review {
            id: ReviewId::new(format!("r{rating}")),
            author: "Ana".to_owned(),
            rating,
            comment: String::new(),
            date: "2024-05-01".to_owned(),
        }
    }

    #[test]
    fn test_average_rating() {
        let mut p = product();
        assert!(p.average_rating().abs() < f64::EPSILON);

        p.reviews = vec![review(5), review(4)];
        assert!((p.average_rating() - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_matches_search_is_case_insensitive() {
        let p = product();
        assert!(p.matches_search("CALABAZA"));
        assert!(p.matches_search("curado"));
        assert!(p.matches_search(""));
        assert!(!p.matches_search("bombilla"));
    }

    #[test]
    fn test_decodes_sparse_document() {
        let p: Product = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "name": "Dulce de leche",
            "price": 1230.5
        }))
        .unwrap();
        assert_eq!(p.stock, 0);
        assert!(!p.in_stock());
        assert!(!p.is_featured());
        assert!(p.reviews.is_empty());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(product()).unwrap();
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("featured").is_none());
    }
}
