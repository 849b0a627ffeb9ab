use serde::Deserialize;

/// Error envelope the payment API attaches to non-success responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponseModel {
    /// Machine-readable rejection code, e.g. `INVALID_APP` or
    /// `INVALID_APP_ORIGIN`.
    pub(crate) error: Option<String>,
}
