//! Transfer catalog: the record binding a user, a filename, and an ordered
//! list of chunk blob identifiers to one logical uploaded file.
//!
//! The catalog itself is an external collaborator; this crate specifies the
//! boundary as the [`TransferStore`] trait and ships [`MemoryStore`] as the
//! reference backend used by tests and single-process deployments.

mod memory;
mod store;
mod types;

pub use memory::MemoryStore;
pub use store::TransferStore;
pub use types::Transfer;

/// Errors produced by catalog backends.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A record with this id already exists. Records are immutable once
    /// saved, so a duplicate save is always a caller bug.
    #[error("transfer record already exists: {0}")]
    DuplicateId(String),

    #[error("catalog backend error: {0}")]
    Backend(String),
}
