use std::future::Future;
use std::pin::Pin;

use crate::types::Transfer;
use crate::CatalogError;

/// Abstract transfer catalog backend.
///
/// The boxed-future signatures keep the trait object-safe so services can
/// hold an `Arc<dyn TransferStore>` and tests can substitute mocks.
pub trait TransferStore: Send + Sync {
    /// Persists a completed transfer. Fails with
    /// [`CatalogError::DuplicateId`] if the id is already recorded.
    fn save(
        &self,
        transfer: Transfer,
    ) -> Pin<Box<dyn Future<Output = Result<(), CatalogError>> + Send + '_>>;

    /// Returns all transfers owned by `owner_id`, most recent first.
    fn list_by_owner(
        &self,
        owner_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Transfer>, CatalogError>> + Send + '_>>;

    /// Looks up a transfer by id. `None` when unknown.
    fn get_by_id(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Transfer>, CatalogError>> + Send + '_>>;

    /// Deletes the record with `id` if it is owned by `owner_id`.
    ///
    /// Returns `true` if a record was removed. A non-matching owner is a
    /// no-op returning `false` — ownership enforcement happens above this
    /// layer, the guard here is the last line of defense.
    fn delete_by_id(
        &self,
        id: &str,
        owner_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<bool, CatalogError>> + Send + '_>>;
}
