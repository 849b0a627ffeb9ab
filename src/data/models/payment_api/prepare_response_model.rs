use serde::Deserialize;

/// Data structure returned by the payment API when preparing an in-app
/// payment (`POST .../webpay/inapp/prepare/`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PrepareResponseModel {
    /// Signed, single-use token authorizing this purchase. Handed to the
    /// platform payment dialog and never persisted past the attempt.
    #[serde(rename = "webpayJWT")]
    pub(crate) webpay_jwt: String,
    /// Path of the transaction-status resource for this purchase, relative
    /// to the configured API base URL. A prepare response without it is
    /// rejected at the boundary, since settlement could never be observed.
    pub(crate) transaction_status_url: String,
}
