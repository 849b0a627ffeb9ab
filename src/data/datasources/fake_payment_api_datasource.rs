use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::datasources::payment_api_datasource::PaymentApiDatasource;
use crate::data::models::payment_api::{
    prepare_response_model::PrepareResponseModel, product_model::ProductModel,
    transaction_state_model::TransactionStateModel,
};
use crate::errors::{codes, PayError};

const FAKE_TOKEN_SECRET: &[u8] = b"webpay-fake-products";
const FAKE_STATUS_PREFIX: &str = "/webpay/transactions/fake/";

static FAKE_CATALOG: Lazy<Vec<ProductModel>> = Lazy::new(|| {
    vec![
        ProductModel {
            product_id: "fake-product-1".to_owned(),
            name: Some("Piece of Cheese".to_owned()),
            small_image_url: Some("https://fake.payments.example/img/cheese.png".to_owned()),
        },
        ProductModel {
            product_id: "fake-product-2".to_owned(),
            name: Some("Magic Whistle".to_owned()),
            small_image_url: Some("https://fake.payments.example/img/whistle.png".to_owned()),
        },
    ]
});

/// Stands in for the remote payment API when fake-products mode is
/// configured: payment tokens are minted locally, the catalog is static, and
/// every transaction settles as completed with a deterministic receipt, so
/// the whole purchase flow runs offline.
pub(crate) struct FakePaymentApiDatasource;

#[async_trait]
impl PaymentApiDatasource for FakePaymentApiDatasource {
    async fn prepare_transaction(
        &self,
        product_id: &str,
    ) -> Result<PrepareResponseModel, PayError> {
        debug!(%product_id, "minting stub payment token");
        Ok(PrepareResponseModel {
            webpay_jwt: build_stub_token(product_id)?,
            transaction_status_url: format!("{FAKE_STATUS_PREFIX}{product_id}/"),
        })
    }

    async fn get_transaction_state(
        &self,
        status_url: &str,
    ) -> Result<TransactionStateModel, PayError> {
        let product_id = status_url
            .strip_prefix(FAKE_STATUS_PREFIX)
            .map(|rest| rest.trim_end_matches('/'))
            .unwrap_or(status_url);
        Ok(TransactionStateModel {
            status: "completed".to_owned(),
            receipt: Some(format!("fake-receipt~{product_id}")),
            price_point: Some("1".to_owned()),
            reason: None,
            extra: serde_json::Map::new(),
        })
    }

    async fn get_product(&self, product_id: &str) -> Result<ProductModel, PayError> {
        Ok(FAKE_CATALOG
            .iter()
            .find(|product| product.product_id == product_id)
            .cloned()
            .unwrap_or_else(|| ProductModel {
                product_id: product_id.to_owned(),
                name: Some(format!("Fake Product ({product_id})")),
                small_image_url: None,
            }))
    }

    async fn get_products(&self) -> Result<Vec<ProductModel>, PayError> {
        Ok(FAKE_CATALOG.clone())
    }
}

fn build_stub_token(product_id: &str) -> Result<String, PayError> {
    #[derive(Debug, Serialize, Deserialize)]
    struct Request {
        id: String,
    }
    #[derive(Debug, Serialize, Deserialize)]
    struct Claims {
        iss: String,
        aud: String,
        typ: String,
        iat: usize,
        exp: usize,
        request: Request,
    }
    let claims = Claims {
        iss: "webpay-fake-products".to_owned(),
        aud: "fake.payments.example".to_owned(),
        typ: "payments/inapp/v1".to_owned(),
        iat: chrono::Utc::now().timestamp() as usize,
        exp: (chrono::Utc::now() + chrono::Duration::minutes(10)).timestamp() as usize,
        request: Request {
            id: product_id.to_owned(),
        },
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(FAKE_TOKEN_SECRET),
    )
    .map_err(|e| {
        PayError::configuration(
            codes::INVALID_CONFIG,
            format!("stub payment token could not be encoded: {e}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_token_decodes_with_the_fake_secret() {
        let prepared = FakePaymentApiDatasource
            .prepare_transaction("fake-product-1")
            .await
            .unwrap();

        let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.set_audience(&["fake.payments.example"]);
        let decoded = jsonwebtoken::decode::<serde_json::Value>(
            &prepared.webpay_jwt,
            &jsonwebtoken::DecodingKey::from_secret(FAKE_TOKEN_SECRET),
            &validation,
        )
        .unwrap();
        assert_eq!(decoded.claims["request"]["id"], "fake-product-1");
    }

    #[tokio::test]
    async fn transactions_settle_with_deterministic_receipts() {
        let prepared = FakePaymentApiDatasource
            .prepare_transaction("fake-product-2")
            .await
            .unwrap();
        let state = FakePaymentApiDatasource
            .get_transaction_state(&prepared.transaction_status_url)
            .await
            .unwrap();
        assert_eq!(state.status, "completed");
        assert_eq!(state.receipt.as_deref(), Some("fake-receipt~fake-product-2"));
    }

    #[tokio::test]
    async fn unknown_products_get_synthesized_metadata() {
        let product = FakePaymentApiDatasource
            .get_product("some-guid")
            .await
            .unwrap();
        assert_eq!(product.product_id, "some-guid");
        assert!(product.name.unwrap().contains("some-guid"));
    }

    #[tokio::test]
    async fn catalog_lists_the_stub_products() {
        let products = FakePaymentApiDatasource.get_products().await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].product_id, "fake-product-1");
    }
}
