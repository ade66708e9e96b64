use serde::{Deserialize, Serialize};

pub mod busy;
pub mod debounce;
pub mod flash;
pub mod lazy;
pub mod lightbox;
pub mod masks;
pub mod modal;
pub mod nav;
pub mod preview;
pub mod stats;
pub mod storage;
pub mod table;
pub mod toast;
pub mod upload;
pub mod validation;

/// A product as listed in the storefront and the admin table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Database identifier
    pub id: u32,
    /// Display name (e.g., "Bolo de Cenoura")
    pub name: String,
    /// Free-form description shown on the product card
    #[serde(default)]
    pub description: String,
    /// Price in BRL
    pub price: f64,
    /// Status key used by the admin status filter (e.g., "ativo", "inativo")
    pub status: String,
    /// Creation date as ISO text (YYYY-MM-DD), so text order is chronological
    pub created: String,
    /// Embedded asset path of the product photo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Product {
    /// Price as rendered in tables and cards, e.g. "R$ 12.50".
    pub fn price_display(&self) -> String {
        format!("R$ {:.2}", self.price)
    }
}

/// A dashboard counter card on the admin home page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatCard {
    /// Lookup key (e.g., "total_produtos")
    pub key: String,
    /// Card caption
    pub label: String,
    /// Current value
    pub value: i64,
}

/// Root type for the catalog data file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub products: Vec<Product>,
    #[serde(default)]
    pub stats: Vec<StatCard>,
}
