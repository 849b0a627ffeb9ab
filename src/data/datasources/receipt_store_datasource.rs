use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::domain::entities::receipt::Receipt;
use crate::errors::PayError;

/// Fixed key under which the fallback store keeps its receipt list, as a
/// JSON-encoded array of receipt strings in append order.
pub(crate) const RECEIPTS_STORAGE_KEY: &str = "webpay.receipts";

/// Error reported by a device-native receipt store, carrying the platform's
/// own error name.
#[derive(Debug, Clone)]
pub struct ReceiptStoreError {
    pub name: String,
}

impl ReceiptStoreError {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Device-native receipt store, implemented by the host on platforms that
/// have one.
#[async_trait]
pub trait DeviceReceiptStore: Send + Sync {
    async fn add_receipt(&self, receipt: &Receipt) -> Result<(), ReceiptStoreError>;
}

/// Persistent key-value store used as the receipt fallback on platforms
/// without a device-native store.
#[async_trait]
pub trait LocalStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> Option<String>;
    async fn set_item(&self, key: &str, value: String);
}

/// Storage backend resolved for an attempt. Probed from which collaborators
/// were injected, never from runtime type inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReceiptBackend {
    Device,
    Fallback,
    None,
}

/// Persists proofs-of-purchase through whichever backend the platform
/// supports.
pub(crate) struct ReceiptStoreImpl {
    device_store: Option<Arc<dyn DeviceReceiptStore>>,
    local_storage: Option<Arc<dyn LocalStorage>>,
    // Serializes the fallback's read-then-write so check-then-append is
    // atomic within an attempt.
    append_lock: Mutex<()>,
}

impl ReceiptStoreImpl {
    pub(crate) fn new(
        device_store: Option<Arc<dyn DeviceReceiptStore>>,
        local_storage: Option<Arc<dyn LocalStorage>>,
    ) -> Self {
        Self {
            device_store,
            local_storage,
            append_lock: Mutex::new(()),
        }
    }

    pub(crate) fn backend(&self) -> ReceiptBackend {
        if self.device_store.is_some() {
            ReceiptBackend::Device
        } else if self.local_storage.is_some() {
            ReceiptBackend::Fallback
        } else {
            ReceiptBackend::None
        }
    }

    /// Stores a receipt through the resolved backend.
    ///
    /// The fallback path is idempotent: storing a receipt that already
    /// appears in the persisted list is a no-op, so the list never grows on
    /// duplicate writes. The device path defers entirely to the platform
    /// store.
    pub(crate) async fn store_receipt(&self, receipt: &Receipt) -> Result<(), PayError> {
        debug!(backend = ?self.backend(), "storing receipt");
        if let Some(store) = &self.device_store {
            store.add_receipt(receipt).await.map_err(|e| {
                PayError::add_receipt(format!("device receipt store reported {}", e.name))
            })?;
            debug!("receipt stored in device store");
            Ok(())
        } else if let Some(storage) = &self.local_storage {
            self.append_fallback(storage.as_ref(), receipt).await;
            Ok(())
        } else {
            Err(PayError::pay_platform_unavailable(
                "no receipt storage mechanism is available on this platform",
            ))
        }
    }

    async fn append_fallback(&self, storage: &dyn LocalStorage, receipt: &Receipt) {
        let _guard = self.append_lock.lock().await;
        let mut receipts: Vec<String> = match storage.get_item(RECEIPTS_STORAGE_KEY).await {
            Some(encoded) => serde_json::from_str(&encoded).unwrap_or_else(|e| {
                warn!(error = %e, "stored receipt list was not valid JSON, starting over");
                Vec::new()
            }),
            None => Vec::new(),
        };
        if receipts.iter().any(|stored| stored == receipt.as_str()) {
            debug!("receipt already stored, skipping");
            return;
        }
        receipts.push(receipt.as_str().to_owned());
        match serde_json::to_string(&receipts) {
            Ok(encoded) => {
                storage.set_item(RECEIPTS_STORAGE_KEY, encoded).await;
                debug!(count = receipts.len(), "receipt appended to fallback store");
            }
            Err(e) => warn!(error = %e, "could not encode receipt list"),
        }
    }
}

/// In-memory [`LocalStorage`] for hosts without persistent storage and for
/// tests.
#[derive(Default, Clone)]
pub struct MemoryLocalStorage {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryLocalStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalStorage for MemoryLocalStorage {
    async fn get_item(&self, key: &str) -> Option<String> {
        let items = self.items.read().await;
        items.get(key).cloned()
    }

    async fn set_item(&self, key: &str, value: String) {
        let mut items = self.items.write().await;
        items.insert(key.to_owned(), value);
    }
}
