use std::sync::Arc;

use crate::config::{PayConfig, PurchaseOptions};
use crate::data::datasources::pay_platform_datasource::PayPlatformDatasource;
use crate::data::datasources::receipt_store_datasource::{DeviceReceiptStore, LocalStorage};
use crate::data::repositories::purchase_repository_impl::PurchaseRepositoryImpl;
use crate::domain::entities::product_info::ProductInfo;
use crate::domain::repositories::purchase_repository::PurchaseRepository;
use crate::errors::PayError;

/// Public entry point for in-app purchases.
///
/// Collaborators are injected once at construction: the platform payment
/// dialog is required; the device receipt store and the local fallback store
/// are optional capabilities, and passing `None` for both leaves the
/// platform unable to persist receipts (purchases that yield one will fail
/// with `PayPlatformUnavailable`).
pub struct WebpayUtil<R: PurchaseRepository> {
    purchase_repository: Arc<R>,
}

impl<R: PurchaseRepository + 'static> WebpayUtil<R> {
    /// Purchases `product_id` with the configured poll defaults, resolving
    /// with the normalized product info once the transaction settles and the
    /// receipt (if any) is persisted.
    pub async fn purchase(&self, product_id: &str) -> Result<ProductInfo, PayError> {
        self.purchase_repository
            .purchase(product_id, PurchaseOptions::default())
            .await
    }

    /// Like [`WebpayUtil::purchase`], with per-call overrides for the
    /// transaction-status poll loop.
    pub async fn purchase_with_options(
        &self,
        product_id: &str,
        options: PurchaseOptions,
    ) -> Result<ProductInfo, PayError> {
        self.purchase_repository.purchase(product_id, options).await
    }

    /// Legacy two-argument calling convention.
    ///
    /// Runs the same purchase flow as [`WebpayUtil::purchase_with_options`]
    /// and delivers the outcome as `(error, product_info)`: `(None,
    /// Some(info))` on success, `(Some(error), error.product_info)` on
    /// failure, so callers can still show which product failed. The callback
    /// fires exactly once, on the host's async runtime.
    pub fn purchase_with_callback<F>(&self, product_id: &str, options: PurchaseOptions, callback: F)
    where
        F: FnOnce(Option<PayError>, Option<ProductInfo>) + Send + 'static,
    {
        let repository = Arc::clone(&self.purchase_repository);
        let product_id = product_id.to_owned();
        tokio::spawn(async move {
            match repository.purchase(&product_id, options).await {
                Ok(info) => callback(None, Some(info)),
                Err(error) => {
                    let product_info = error.product_info.clone();
                    callback(Some(error), product_info)
                }
            }
        });
    }

    /// Lists the in-app product catalog (the stub catalog in fake-products
    /// mode).
    pub async fn get_products(&self) -> Result<Vec<ProductInfo>, PayError> {
        self.purchase_repository.get_products().await
    }
}

impl WebpayUtil<PurchaseRepositoryImpl> {
    pub fn new(
        config: PayConfig,
        pay_platform: Arc<dyn PayPlatformDatasource>,
        device_receipt_store: Option<Arc<dyn DeviceReceiptStore>>,
        local_storage: Option<Arc<dyn LocalStorage>>,
    ) -> Result<Self, PayError> {
        config.validate()?;
        Ok(Self {
            purchase_repository: Arc::new(PurchaseRepositoryImpl::new(
                config,
                pay_platform,
                device_receipt_store,
                local_storage,
            )),
        })
    }
}
