use thiserror::Error;

use crate::domain::entities::product_info::ProductInfo;

/// Machine-readable error codes raised by the crate itself. Platform-defined
/// codes (e.g. `DIALOG_CLOSED_BY_USER`) are passed through verbatim and are
/// not listed here.
pub mod codes {
    pub const INVALID_CONFIG: &str = "INVALID_CONFIG";
    pub const UNKNOWN_CONFIG_KEY: &str = "UNKNOWN_CONFIG_KEY";
    pub const INVALID_TRANSACTION_STATE: &str = "INVALID_TRANSACTION_STATE";
    pub const API_REQUEST_ERROR: &str = "API_REQUEST_ERROR";
    pub const BAD_API_RESPONSE: &str = "BAD_API_RESPONSE";
    pub const BAD_JSON_RESPONSE: &str = "BAD_JSON_RESPONSE";
    pub const TRANSACTION_TIMEOUT: &str = "TRANSACTION_TIMEOUT";
    pub const TRANSACTION_FAILED: &str = "TRANSACTION_FAILED";
    pub const PAY_REQUEST_ABORTED: &str = "PAY_REQUEST_ABORTED";
    pub const PAY_PLATFORM_UNAVAILABLE: &str = "PAY_PLATFORM_UNAVAILABLE";
    pub const ADD_RECEIPT_ERROR: &str = "ADD_RECEIPT_ERROR";
    pub const INVALID_APP: &str = "INVALID_APP";
    pub const INVALID_APP_ORIGIN: &str = "INVALID_APP_ORIGIN";
}

/// Classification of a purchase failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayErrorKind {
    /// Settings are missing or contradictory, or the remote API reported a
    /// transaction status outside the documented set.
    Configuration,
    /// The remote payment API callout failed at the transport or protocol
    /// level.
    Api,
    /// Transaction-status polling exhausted its attempts without reaching a
    /// terminal status.
    PurchaseTimeout,
    /// The platform payment dialog reported an error, never delivered an
    /// outcome, or the transaction settled as failed.
    PayPlatform,
    /// No receipt storage mechanism is available on this platform.
    PayPlatformUnavailable,
    /// The device-native receipt store rejected the receipt.
    AddReceipt,
    /// The remote API could not establish the calling app's identity.
    InvalidApp,
    /// The remote API rejected the calling app's origin.
    InvalidAppOrigin,
}

/// A typed purchase failure: a [`PayErrorKind`], a short machine-readable
/// code, a human-readable message, and, whenever the failing stage had
/// enough context, the product the attempt was for.
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct PayError {
    pub kind: PayErrorKind,
    pub code: String,
    pub message: String,
    pub product_info: Option<ProductInfo>,
}

impl PayError {
    fn new(kind: PayErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            product_info: None,
        }
    }

    pub fn configuration(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(PayErrorKind::Configuration, code, message)
    }

    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(PayErrorKind::Api, code, message)
    }

    pub fn purchase_timeout(message: impl Into<String>) -> Self {
        Self::new(
            PayErrorKind::PurchaseTimeout,
            codes::TRANSACTION_TIMEOUT,
            message,
        )
    }

    /// `code` is the platform's own error name when one was reported.
    pub fn pay_platform(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(PayErrorKind::PayPlatform, code, message)
    }

    pub fn pay_platform_unavailable(message: impl Into<String>) -> Self {
        Self::new(
            PayErrorKind::PayPlatformUnavailable,
            codes::PAY_PLATFORM_UNAVAILABLE,
            message,
        )
    }

    pub fn add_receipt(message: impl Into<String>) -> Self {
        Self::new(PayErrorKind::AddReceipt, codes::ADD_RECEIPT_ERROR, message)
    }

    pub fn invalid_app(message: impl Into<String>) -> Self {
        Self::new(PayErrorKind::InvalidApp, codes::INVALID_APP, message)
    }

    pub fn invalid_app_origin(message: impl Into<String>) -> Self {
        Self::new(
            PayErrorKind::InvalidAppOrigin,
            codes::INVALID_APP_ORIGIN,
            message,
        )
    }

    /// Attaches the product this failure relates to, unless an earlier stage
    /// already attached one.
    pub fn with_product(mut self, product: ProductInfo) -> Self {
        if self.product_info.is_none() {
            self.product_info = Some(product);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_code_and_message() {
        let err = PayError::purchase_timeout("transaction did not settle");
        assert_eq!(
            err.to_string(),
            "TRANSACTION_TIMEOUT: transaction did not settle"
        );
    }

    #[test]
    fn with_product_does_not_overwrite() {
        let first = ProductInfo::from_id("product-one");
        let second = ProductInfo::from_id("product-two");
        let err = PayError::add_receipt("store rejected receipt")
            .with_product(first)
            .with_product(second);
        assert_eq!(
            err.product_info.as_ref().map(|p| p.product_id.as_str()),
            Some("product-one")
        );
    }

    #[test]
    fn platform_code_is_kept_verbatim() {
        let err = PayError::pay_platform("DIALOG_CLOSED_BY_USER", "user closed the dialog");
        assert_eq!(err.kind, PayErrorKind::PayPlatform);
        assert_eq!(err.code, "DIALOG_CLOSED_BY_USER");
    }
}
