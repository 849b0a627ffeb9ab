use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::PayConfig;
use crate::data::models::payment_api::{
    error_response_model::ErrorResponseModel, prepare_response_model::PrepareResponseModel,
    product_model::ProductModel, transaction_state_model::TransactionStateModel,
};
use crate::errors::{codes, PayError};

/// Boundary to the remote payment API.
#[async_trait]
pub(crate) trait PaymentApiDatasource: Send + Sync {
    /// Prepare an in-app payment:
    /// `POST <apiUrlBase><apiVersionPrefix>/webpay/inapp/prepare/`
    ///
    /// productId:
    ///   Opaque identifier of the product being purchased.
    ///
    /// Returns the signed payment token for the attempt together with the
    /// transaction-status path to poll after the dialog runs.
    async fn prepare_transaction(&self, product_id: &str)
        -> Result<PrepareResponseModel, PayError>;

    /// Query the state of an in-flight transaction:
    /// `GET <apiUrlBase><status_url>`
    ///
    /// status_url:
    ///   Path returned by `prepare_transaction`, relative to the API base
    ///   URL.
    async fn get_transaction_state(
        &self,
        status_url: &str,
    ) -> Result<TransactionStateModel, PayError>;

    /// Fetch one catalog entry:
    /// `GET <apiUrlBase><apiVersionPrefix>/payments/inapp/products/<productId>/`
    async fn get_product(&self, product_id: &str) -> Result<ProductModel, PayError>;

    /// Fetch the full in-app product catalog:
    /// `GET <apiUrlBase><apiVersionPrefix>/payments/inapp/products/`
    async fn get_products(&self) -> Result<Vec<ProductModel>, PayError>;
}

pub(crate) struct PaymentApiDatasourceImpl {
    http: reqwest::Client,
    api_url_base: String,
    api_root: String,
}

#[async_trait]
impl PaymentApiDatasource for PaymentApiDatasourceImpl {
    async fn prepare_transaction(
        &self,
        product_id: &str,
    ) -> Result<PrepareResponseModel, PayError> {
        let url = format!("{}/webpay/inapp/prepare/", self.api_root);
        debug!(%product_id, "preparing payment token");
        self.post(&url, &serde_json::json!({ "productId": product_id }), "prepare")
            .await
    }

    async fn get_transaction_state(
        &self,
        status_url: &str,
    ) -> Result<TransactionStateModel, PayError> {
        let url = format!("{}{}", self.api_url_base, status_url);
        self.get(&url, "transaction-status").await
    }

    async fn get_product(&self, product_id: &str) -> Result<ProductModel, PayError> {
        let url = format!("{}/payments/inapp/products/{product_id}/", self.api_root);
        self.get(&url, "product").await
    }

    async fn get_products(&self) -> Result<Vec<ProductModel>, PayError> {
        let url = format!("{}/payments/inapp/products/", self.api_root);
        self.get(&url, "products").await
    }
}

impl PaymentApiDatasourceImpl {
    pub(crate) fn new(config: &PayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url_base: config.api_url_base.clone(),
            api_root: config.api_root(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, operation: &str) -> Result<T, PayError> {
        let response = self.http.get(url).send().await.map_err(|e| {
            PayError::api(
                codes::API_REQUEST_ERROR,
                format!("{operation} callout failed to send: {e}"),
            )
        })?;
        Self::decode(response, operation).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
        operation: &str,
    ) -> Result<T, PayError> {
        let response = self.http.post(url).json(body).send().await.map_err(|e| {
            PayError::api(
                codes::API_REQUEST_ERROR,
                format!("{operation} callout failed to send: {e}"),
            )
        })?;
        Self::decode(response, operation).await
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        operation: &str,
    ) -> Result<T, PayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::rejection(operation, status, &body));
        }
        response.json().await.map_err(|e| {
            PayError::api(
                codes::BAD_JSON_RESPONSE,
                format!("{operation} response could not be parsed: {e}"),
            )
        })
    }

    /// Maps a non-success response to the taxonomy, surfacing app-identity
    /// rejection codes from the error envelope when present.
    fn rejection(operation: &str, status: reqwest::StatusCode, body: &str) -> PayError {
        let code = serde_json::from_str::<ErrorResponseModel>(body)
            .ok()
            .and_then(|envelope| envelope.error);
        match code.as_deref() {
            Some(codes::INVALID_APP) => {
                PayError::invalid_app(format!("{operation} rejected the calling app"))
            }
            Some(codes::INVALID_APP_ORIGIN) => {
                PayError::invalid_app_origin(format!("{operation} rejected the app origin"))
            }
            Some(other) => PayError::api(
                other.to_owned(),
                format!("{operation} callout returned {status}"),
            ),
            None => PayError::api(
                codes::BAD_API_RESPONSE,
                format!("{operation} callout returned {status}"),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PayErrorKind;

    #[test]
    fn rejection_surfaces_app_identity_codes() {
        let status = reqwest::StatusCode::FORBIDDEN;
        let err = PaymentApiDatasourceImpl::rejection(
            "prepare",
            status,
            r#"{"error": "INVALID_APP"}"#,
        );
        assert_eq!(err.kind, PayErrorKind::InvalidApp);

        let err = PaymentApiDatasourceImpl::rejection(
            "prepare",
            status,
            r#"{"error": "INVALID_APP_ORIGIN"}"#,
        );
        assert_eq!(err.kind, PayErrorKind::InvalidAppOrigin);
    }

    #[test]
    fn rejection_keeps_server_codes() {
        let err = PaymentApiDatasourceImpl::rejection(
            "prepare",
            reqwest::StatusCode::CONFLICT,
            r#"{"error": "ALREADY_PURCHASED"}"#,
        );
        assert_eq!(err.kind, PayErrorKind::Api);
        assert_eq!(err.code, "ALREADY_PURCHASED");
    }

    #[test]
    fn rejection_without_envelope_is_bad_api_response() {
        let err = PaymentApiDatasourceImpl::rejection(
            "transaction-status",
            reqwest::StatusCode::BAD_GATEWAY,
            "<html>upstream error</html>",
        );
        assert_eq!(err.kind, PayErrorKind::Api);
        assert_eq!(err.code, codes::BAD_API_RESPONSE);
    }
}
