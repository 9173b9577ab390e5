use serde::{Deserialize, Serialize};

/// Association between a client and a product: the license holder.
///
/// At most one link exists per (client, product) pair; vigencias always
/// reference exactly one link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientProduct {
    pub id: String,
    pub client_id: String,
    pub product_id: String,
    pub license_quantity: Option<i64>,
    /// When the client acquired the product (unix seconds).
    pub acquired_at: Option<i64>,
    pub notes: Option<String>,
    pub created_at: i64,
}

/// Link joined with product metadata, for per-client listings.
#[derive(Debug, Clone, Serialize)]
pub struct ClientProductWithProduct {
    #[serde(flatten)]
    pub link: ClientProduct,
    pub product_name: String,
    pub product_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateClientProduct {
    pub product_id: String,
    #[serde(default)]
    pub license_quantity: Option<i64>,
    #[serde(default)]
    pub acquired_at: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}
