//! Site content: the about section, shipping settings, and slider ads.

use serde::{Deserialize, Serialize};

use crate::types::{AdvertisementId, Money, ProductId};

/// Shipping cost used when `settings/shipping` has never been written.
pub const DEFAULT_SHIPPING_COST: i64 = 1500;

/// The "about us" block shown on the home page (`settings/aboutUs`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutData {
    pub title: String,
    pub text: String,
    pub image_url: String,
    #[serde(default)]
    pub image_hint: String,
    #[serde(default)]
    pub highlight: String,
}

impl Default for AboutData {
    fn default() -> Self {
        Self {
            title: "Nuestra Esencia".to_owned(),
            text: "Desde nuestra historia familiar, tejemos calidad y autenticidad en cada \
                   producto. Creemos en cuidar a las personas y al planeta, ofreciendo \
                   soluciones que inspiran confianza. Nos guían la responsabilidad, la \
                   innovación y un compromiso sincero con nuestra comunidad."
                .to_owned(),
            image_url: "https://placehold.co/600x600.png".to_owned(),
            image_hint: "craftsmanship teamwork".to_owned(),
            highlight: "Calidad, Compromiso, Comunidad.".to_owned(),
        }
    }
}

/// Flat shipping cost (`settings/shipping`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingSettings {
    pub cost: Money,
}

impl Default for ShippingSettings {
    fn default() -> Self {
        Self {
            cost: Money::from_units(DEFAULT_SHIPPING_COST),
        }
    }
}

/// Discriminator stored on advertisement documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvertisementKind {
    #[default]
    Advertisement,
}

/// A promotional slide in the home slider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advertisement {
    pub id: AdvertisementId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(rename = "type", default)]
    pub kind: AdvertisementKind,
}

/// One entry in the home slider: a featured product or an advertisement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SliderItem {
    #[serde(rename_all = "camelCase")]
    Product {
        id: ProductId,
        name: String,
        description: String,
        image_url: String,
        price: Money,
    },
    #[serde(rename_all = "camelCase")]
    Advertisement {
        id: AdvertisementId,
        name: String,
        description: String,
        image_url: String,
    },
}

impl From<&crate::models::Product> for SliderItem {
    fn from(p: &crate::models::Product) -> Self {
        Self::Product {
            id: p.id.clone(),
            name: p.name.clone(),
            description: p.description.clone(),
            image_url: p.image_url.clone(),
            price: p.price,
        }
    }
}

impl From<&Advertisement> for SliderItem {
    fn from(ad: &Advertisement) -> Self {
        Self::Advertisement {
            id: ad.id.clone(),
            name: ad.name.clone(),
            description: ad.description.clone(),
            image_url: ad.image_url.clone(),
        }
    }
}
