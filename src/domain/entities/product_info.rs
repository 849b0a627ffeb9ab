use serde::{Deserialize, Serialize};

/// Normalized product information, resolved once a purchase settles.
///
/// Metadata fields are merged from the remote catalog entry and the terminal
/// transaction record. A bare value carrying only the product id is attached
/// to errors raised before metadata is available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub product_id: String,
    pub name: Option<String>,
    pub small_image_url: Option<String>,
    pub price_point: Option<String>,
}

impl ProductInfo {
    pub fn from_id(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            name: None,
            small_image_url: None,
            price_point: None,
        }
    }
}
