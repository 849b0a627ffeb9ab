use serde::Deserialize;

use crate::domain::entities::product_info::ProductInfo;

/// Catalog entry returned by the payment API's in-app product endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductModel {
    /// Opaque product identifier, unique per product.
    pub(crate) product_id: String,
    /// Display name.
    pub(crate) name: Option<String>,
    /// URL of a small product image suitable for purchase UI.
    pub(crate) small_image_url: Option<String>,
}

impl ProductModel {
    pub(crate) fn into_product_info(self) -> ProductInfo {
        ProductInfo {
            product_id: self.product_id,
            name: self.name,
            small_image_url: self.small_image_url,
            price_point: None,
        }
    }
}
