use async_trait::async_trait;

use crate::config::PurchaseOptions;
use crate::domain::entities::product_info::ProductInfo;
use crate::errors::PayError;

#[async_trait]
pub trait PurchaseRepository: Send + Sync {
    /// Runs one purchase attempt for `product_id` to a terminal outcome:
    /// token acquisition, platform payment dialog, transaction settlement,
    /// receipt persistence, and product-info resolution.
    async fn purchase(
        &self,
        product_id: &str,
        options: PurchaseOptions,
    ) -> Result<ProductInfo, PayError>;

    /// Lists the in-app product catalog.
    async fn get_products(&self) -> Result<Vec<ProductInfo>, PayError>;
}
