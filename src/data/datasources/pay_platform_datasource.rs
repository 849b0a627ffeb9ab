use tokio::sync::oneshot;

use crate::domain::entities::product_info::ProductInfo;
use crate::domain::entities::transaction::TransactionRecord;
use crate::errors::{codes, PayError};

/// Outcome reported by the platform payment dialog on success.
///
/// Some platforms settle the transaction inside the dialog and hand back a
/// terminal record; others only confirm that the dialog ran, leaving
/// settlement to be observed through the transaction-status endpoint.
#[derive(Debug, Clone, Default)]
pub struct PlatformResult {
    pub transaction: Option<TransactionRecord>,
}

/// Error reported by the platform payment dialog, carrying the platform's
/// own error name (e.g. `DIALOG_CLOSED_BY_USER`).
#[derive(Debug, Clone)]
pub struct PlatformError {
    pub name: String,
}

impl PlatformError {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Consumed-once delivery handle for a payment dialog invocation.
///
/// The platform contract is one success callback or one error callback,
/// mutually exclusive, exactly once. Both methods take `self` by value, so a
/// second delivery is unrepresentable. Dropping the handle without calling
/// either fails the attempt with `PAY_REQUEST_ABORTED`.
pub struct PaymentCompletion {
    tx: oneshot::Sender<Result<PlatformResult, PlatformError>>,
}

impl PaymentCompletion {
    pub fn resolve(self, result: PlatformResult) {
        let _ = self.tx.send(Ok(result));
    }

    pub fn reject(self, error: PlatformError) {
        let _ = self.tx.send(Err(error));
    }
}

/// The platform's payment dialog primitive, implemented by the host.
///
/// `payment_jwts` always contains exactly one signed payment token for the
/// purchase being authorized. Implementations must eventually consume the
/// completion handle; they are not expected to retry or to validate the
/// token.
pub trait PayPlatformDatasource: Send + Sync {
    fn request_payment(&self, payment_jwts: &[String], completion: PaymentCompletion);
}

/// Wraps one dialog invocation into a single awaited outcome.
///
/// No retries at this layer: a dismissed or rejected dialog is terminal for
/// the attempt. The platform's error name is kept verbatim as the error
/// code.
pub(crate) async fn invoke_payment(
    platform: &dyn PayPlatformDatasource,
    jwt: &str,
    product: &ProductInfo,
) -> Result<PlatformResult, PayError> {
    let (tx, rx) = oneshot::channel();
    let payment_jwts = [jwt.to_owned()];
    platform.request_payment(&payment_jwts, PaymentCompletion { tx });
    match rx.await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(platform_error)) => Err(PayError::pay_platform(
            platform_error.name,
            "platform payment dialog reported an error",
        )
        .with_product(product.clone())),
        Err(_) => Err(PayError::pay_platform(
            codes::PAY_REQUEST_ABORTED,
            "platform payment dialog went away without reporting an outcome",
        )
        .with_product(product.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PayErrorKind;

    struct ResolvingPlatform;

    impl PayPlatformDatasource for ResolvingPlatform {
        fn request_payment(&self, payment_jwts: &[String], completion: PaymentCompletion) {
            assert_eq!(payment_jwts.len(), 1);
            completion.resolve(PlatformResult::default());
        }
    }

    struct RejectingPlatform;

    impl PayPlatformDatasource for RejectingPlatform {
        fn request_payment(&self, _payment_jwts: &[String], completion: PaymentCompletion) {
            completion.reject(PlatformError::new("DIALOG_CLOSED_BY_USER"));
        }
    }

    struct SilentPlatform;

    impl PayPlatformDatasource for SilentPlatform {
        fn request_payment(&self, _payment_jwts: &[String], completion: PaymentCompletion) {
            drop(completion);
        }
    }

    #[tokio::test]
    async fn success_yields_platform_result() {
        let product = ProductInfo::from_id("product-1");
        let result = invoke_payment(&ResolvingPlatform, "jwt", &product)
            .await
            .unwrap();
        assert!(result.transaction.is_none());
    }

    #[tokio::test]
    async fn platform_error_name_becomes_error_code() {
        let product = ProductInfo::from_id("product-1");
        let err = invoke_payment(&RejectingPlatform, "jwt", &product)
            .await
            .unwrap_err();
        assert_eq!(err.kind, PayErrorKind::PayPlatform);
        assert_eq!(err.code, "DIALOG_CLOSED_BY_USER");
        assert_eq!(
            err.product_info.as_ref().map(|p| p.product_id.as_str()),
            Some("product-1")
        );
    }

    #[tokio::test]
    async fn dropped_completion_aborts_the_attempt() {
        let product = ProductInfo::from_id("product-1");
        let err = invoke_payment(&SilentPlatform, "jwt", &product)
            .await
            .unwrap_err();
        assert_eq!(err.code, codes::PAY_REQUEST_ABORTED);
    }
}
