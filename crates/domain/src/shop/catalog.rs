//! Services and products offered by the shop

use serde::{Deserialize, Serialize};

use crate::id::EntityId;

/// Whether a catalog entry is a service or a retail product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    /// Haircut, shave and so on.
    #[default]
    Service,
    /// Retail product.
    Product,
}

/// A service or product with its list price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Server id.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Service or product.
    #[serde(default, rename = "type")]
    pub kind: CatalogKind,
    /// List price as sent by the server.
    pub price: f64,
    /// Typical duration for services.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    /// Whether it can be sold.
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

/// Body for creating a catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCatalogItem {
    /// Display name.
    pub name: String,
    /// Service or product.
    #[serde(rename = "type")]
    pub kind: CatalogKind,
    /// List price.
    pub price: f64,
    /// Typical duration for services.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

/// Partial update of a catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogItemUpdate {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// New duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    /// Enable or retire the entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}
