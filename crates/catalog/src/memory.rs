use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::RwLock;

use crate::store::TransferStore;
use crate::types::Transfer;
use crate::CatalogError;

/// In-memory catalog backend.
///
/// Thread-safe via an `RwLock`; all operations complete synchronously, the
/// futures only exist to satisfy the [`TransferStore`] boundary.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Transfer>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    /// Returns `true` if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TransferStore for MemoryStore {
    fn save(
        &self,
        transfer: Transfer,
    ) -> Pin<Box<dyn Future<Output = Result<(), CatalogError>> + Send + '_>> {
        let result = {
            let mut records = self.records.write().unwrap();
            if records.contains_key(&transfer.id) {
                Err(CatalogError::DuplicateId(transfer.id.clone()))
            } else {
                records.insert(transfer.id.clone(), transfer);
                Ok(())
            }
        };
        Box::pin(async move { result })
    }

    fn list_by_owner(
        &self,
        owner_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Transfer>, CatalogError>> + Send + '_>> {
        let mut owned: Vec<Transfer> = self
            .records
            .read()
            .unwrap()
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        // Most recent first; id as tiebreaker for a stable order.
        owned.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Box::pin(async move { Ok(owned) })
    }

    fn get_by_id(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Transfer>, CatalogError>> + Send + '_>> {
        let found = self.records.read().unwrap().get(id).cloned();
        Box::pin(async move { Ok(found) })
    }

    fn delete_by_id(
        &self,
        id: &str,
        owner_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<bool, CatalogError>> + Send + '_>> {
        let removed = {
            let mut records = self.records.write().unwrap();
            match records.get(id) {
                Some(t) if t.owner_id == owner_id => {
                    records.remove(id);
                    true
                }
                _ => false,
            }
        };
        Box::pin(async move { Ok(removed) })
    }
}
