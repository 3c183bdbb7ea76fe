//! Sale status values.
//!
//! Sale documents carry their status as the Spanish label shown to shoppers
//! and admins, so serialization uses those labels verbatim.

use serde::{Deserialize, Serialize};

/// Status of a recorded sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SaleStatus {
    /// Payment completed and the order is being fulfilled or was delivered.
    #[serde(rename = "Completado")]
    Completed,
    /// Sale recorded, payment not yet confirmed.
    #[default]
    #[serde(rename = "Procesando")]
    Processing,
    /// Sale abandoned or cancelled by an admin.
    #[serde(rename = "Cancelado")]
    Cancelled,
}

impl SaleStatus {
    /// The label stored in sale documents.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Completed => "Completado",
            Self::Processing => "Procesando",
            Self::Cancelled => "Cancelado",
        }
    }
}

impl std::fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown sale status label.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid sale status: {0}")]
pub struct SaleStatusError(pub String);

impl std::str::FromStr for SaleStatus {
    type Err = SaleStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Completado" => Ok(Self::Completed),
            "Procesando" => Ok(Self::Processing),
            "Cancelado" => Ok(Self::Cancelled),
            _ => Err(SaleStatusError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_uses_spanish_labels() {
        let json = serde_json::to_string(&SaleStatus::Processing).ok();
        assert_eq!(json.as_deref(), Some("\"Procesando\""));

        let parsed: Option<SaleStatus> = serde_json::from_str("\"Completado\"").ok();
        assert_eq!(parsed, Some(SaleStatus::Completed));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Cancelado".parse::<SaleStatus>(), Ok(SaleStatus::Cancelled));
        assert!("Shipped".parse::<SaleStatus>().is_err());
    }
}
