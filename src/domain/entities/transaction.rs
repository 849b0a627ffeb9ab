use crate::domain::entities::receipt::Receipt;

/// Transaction status as reported by the remote API or the platform.
///
/// Any wire value outside the documented set parses to `Unrecognized`, which
/// is a client/server contract bug and fails the attempt immediately rather
/// than being retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Incomplete,
    Completed,
    Failed,
    Unrecognized(String),
}

impl TransactionStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "pending" => Self::Pending,
            "incomplete" => Self::Incomplete,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            other => Self::Unrecognized(other.to_owned()),
        }
    }

    /// Terminal statuses end polling: `completed` or `failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Snapshot of a transaction's state, superseded on each status query and
/// discarded once terminal. `raw` preserves the originating response body.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub product_id: String,
    pub status: TransactionStatus,
    pub receipt: Option<Receipt>,
    pub price_point: Option<String>,
    pub reason: Option<String>,
    pub raw: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_documented_statuses() {
        assert_eq!(TransactionStatus::parse("pending"), TransactionStatus::Pending);
        assert_eq!(
            TransactionStatus::parse("incomplete"),
            TransactionStatus::Incomplete
        );
        assert_eq!(
            TransactionStatus::parse("completed"),
            TransactionStatus::Completed
        );
        assert_eq!(TransactionStatus::parse("failed"), TransactionStatus::Failed);
    }

    #[test]
    fn unknown_status_is_unrecognized() {
        let status = TransactionStatus::parse("settling");
        assert_eq!(status, TransactionStatus::Unrecognized("settling".into()));
        assert!(!status.is_terminal());
    }

    #[test]
    fn only_completed_and_failed_are_terminal() {
        assert!(TransactionStatus::Completed.is_terminal());
        assert!(TransactionStatus::Failed.is_terminal());
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(!TransactionStatus::Incomplete.is_terminal());
    }
}
