use serde::{Deserialize, Serialize};

/// Opaque proof-of-purchase blob. Never mutated after storage; the fallback
/// store deduplicates by exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt(pub String);

impl Receipt {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
