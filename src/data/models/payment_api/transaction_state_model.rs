use serde::{Deserialize, Serialize};

/// Data structure returned by the payment API's transaction-status endpoint,
/// and by platforms whose payment dialog reports a settled transaction
/// directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TransactionStateModel {
    /// One of `pending`, `incomplete`, `completed`, or `failed`. Any other
    /// value is a contract violation.
    pub(crate) status: String,
    /// Proof-of-purchase blob. Present once the transaction has completed,
    /// for products that issue receipts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) receipt: Option<String>,
    /// Price point the purchase was charged at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) price_point: Option<String>,
    /// Server-supplied reason for a `failed` status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) reason: Option<String>,
    /// Fields outside the documented contract, preserved for the record's
    /// raw body.
    #[serde(flatten)]
    pub(crate) extra: serde_json::Map<String, serde_json::Value>,
}

impl TransactionStateModel {
    /// Full response body, including undocumented fields.
    pub(crate) fn to_raw(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
