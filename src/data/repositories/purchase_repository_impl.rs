use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::{PayConfig, PollConfig, PurchaseOptions};
use crate::data::datasources::{
    fake_payment_api_datasource::FakePaymentApiDatasource,
    pay_platform_datasource::{invoke_payment, PayPlatformDatasource},
    payment_api_datasource::{PaymentApiDatasource, PaymentApiDatasourceImpl},
    receipt_store_datasource::{DeviceReceiptStore, LocalStorage, ReceiptStoreImpl},
};
use crate::data::models::payment_api::transaction_state_model::TransactionStateModel;
use crate::domain::entities::product_info::ProductInfo;
use crate::domain::entities::receipt::Receipt;
use crate::domain::entities::transaction::{TransactionRecord, TransactionStatus};
use crate::domain::repositories::purchase_repository::PurchaseRepository;
use crate::errors::{codes, PayError};

pub struct PurchaseRepositoryImpl {
    config: PayConfig,
    payment_api: Arc<dyn PaymentApiDatasource>,
    pay_platform: Arc<dyn PayPlatformDatasource>,
    receipt_store: ReceiptStoreImpl,
}

#[async_trait]
impl PurchaseRepository for PurchaseRepositoryImpl {
    async fn purchase(
        &self,
        product_id: &str,
        options: PurchaseOptions,
    ) -> Result<ProductInfo, PayError> {
        // Carried through every stage so failures can name the product they
        // belong to; enriched with catalog metadata only on resolution.
        let product = ProductInfo::from_id(product_id);
        let poll = options
            .resolve(&self.config)
            .map_err(|e| e.with_product(product.clone()))?;
        info!(%product_id, "starting purchase attempt");

        let prepared = self
            .payment_api
            .prepare_transaction(product_id)
            .await
            .map_err(|e| e.with_product(product.clone()))?;

        let platform_result =
            invoke_payment(self.pay_platform.as_ref(), &prepared.webpay_jwt, &product).await?;

        let record = match platform_result
            .transaction
            .filter(|t| t.status.is_terminal())
        {
            Some(record) => {
                debug!(status = ?record.status, "platform reported a settled transaction, skipping polling");
                if record.status == TransactionStatus::Failed {
                    return Err(Self::declined(&record).with_product(product));
                }
                record
            }
            None => {
                self.poll_transaction(&product, &prepared.transaction_status_url, poll)
                    .await?
            }
        };

        if let Some(receipt) = &record.receipt {
            self.receipt_store
                .store_receipt(receipt)
                .await
                .map_err(|e| e.with_product(product.clone()))?;
        } else {
            debug!("completed transaction carried no receipt, nothing to store");
        }

        let catalog_entry = self
            .payment_api
            .get_product(product_id)
            .await
            .map_err(|e| e.with_product(product.clone()))?;
        info!(%product_id, "purchase complete");
        Ok(ProductInfo {
            product_id: product_id.to_owned(),
            name: catalog_entry.name,
            small_image_url: catalog_entry.small_image_url,
            price_point: record.price_point,
        })
    }

    async fn get_products(&self) -> Result<Vec<ProductInfo>, PayError> {
        Ok(self
            .payment_api
            .get_products()
            .await?
            .into_iter()
            .map(|product| product.into_product_info())
            .collect())
    }
}

impl PurchaseRepositoryImpl {
    pub(crate) fn new(
        config: PayConfig,
        pay_platform: Arc<dyn PayPlatformDatasource>,
        device_receipt_store: Option<Arc<dyn DeviceReceiptStore>>,
        local_storage: Option<Arc<dyn LocalStorage>>,
    ) -> Self {
        let payment_api: Arc<dyn PaymentApiDatasource> = if config.fake_products {
            Arc::new(FakePaymentApiDatasource)
        } else {
            Arc::new(PaymentApiDatasourceImpl::new(&config))
        };
        Self {
            config,
            payment_api,
            pay_platform,
            receipt_store: ReceiptStoreImpl::new(device_receipt_store, local_storage),
        }
    }

    /// Queries the transaction-status endpoint until the transaction reaches
    /// a terminal status or `poll.max_tries` queries have been issued.
    ///
    /// Only engaged when the platform's own result did not settle the
    /// transaction. An unrecognized status is a contract bug and fails
    /// without consuming further attempts; `failed` rejects with the
    /// server-supplied reason.
    async fn poll_transaction(
        &self,
        product: &ProductInfo,
        status_url: &str,
        poll: PollConfig,
    ) -> Result<TransactionRecord, PayError> {
        for attempt in 1..=poll.max_tries {
            debug!(attempt, max_tries = poll.max_tries, "querying transaction status");
            let state = self
                .payment_api
                .get_transaction_state(status_url)
                .await
                .map_err(|e| e.with_product(product.clone()))?;
            let record = TransactionRecord::from_state(product.product_id.clone(), state);
            match &record.status {
                TransactionStatus::Completed => {
                    debug!("transaction completed");
                    return Ok(record);
                }
                TransactionStatus::Failed => {
                    return Err(Self::declined(&record).with_product(product.clone()))
                }
                TransactionStatus::Unrecognized(value) => {
                    return Err(PayError::configuration(
                        codes::INVALID_TRANSACTION_STATE,
                        format!("transaction reported unrecognized status '{value}'"),
                    )
                    .with_product(product.clone()))
                }
                TransactionStatus::Pending | TransactionStatus::Incomplete => {
                    if attempt < poll.max_tries {
                        sleep(poll.interval).await;
                    }
                }
            }
        }
        Err(PayError::purchase_timeout(format!(
            "transaction did not reach a terminal status after {} checks",
            poll.max_tries
        ))
        .with_product(product.clone()))
    }

    /// A transaction that settled as `failed` without a platform-level error
    /// is surfaced as a platform failure, coded with whatever reason the
    /// remote API supplied.
    fn declined(record: &TransactionRecord) -> PayError {
        let code = record
            .reason
            .clone()
            .unwrap_or_else(|| codes::TRANSACTION_FAILED.to_owned());
        PayError::pay_platform(code, "transaction settled as failed")
    }
}

impl TransactionRecord {
    pub(crate) fn from_state(product_id: impl Into<String>, state: TransactionStateModel) -> Self {
        let raw = state.to_raw();
        Self {
            product_id: product_id.into(),
            status: TransactionStatus::parse(&state.status),
            receipt: state.receipt.map(Receipt),
            price_point: state.price_point,
            reason: state.reason,
            raw,
        }
    }
}
