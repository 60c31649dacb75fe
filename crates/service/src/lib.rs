//! User-facing transfer operations.
//!
//! Ties the transfer orchestrators to the catalog behind a per-request
//! identity: every id-addressed operation is gated on ownership before any
//! blob is touched. Authentication itself is the embedding application's
//! job — this layer assumes the [`UserContext`] it receives has already
//! been verified.

pub mod config;
pub mod identity;
pub mod preview;
pub mod transfers;

pub use config::{ConfigError, ServiceConfig};
pub use identity::UserContext;
pub use preview::{encode_thumbnail, preview_kind, PreviewKind};
pub use transfers::{FileDownload, TransferManager, TransferManifest};

use cloudstore_catalog::CatalogError;
use cloudstore_transfer::TransferError;

/// Errors surfaced to the boundary, one variant per user-visible failure
/// class.
///
/// `RecordStore` is deliberately distinct from blob failures so a caller
/// can tell "bytes are safe in storage but the catalog entry failed" apart
/// from "bytes never made it to storage".
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("access denied")]
    AccessDenied,

    #[error("transfer not found")]
    NotFound,

    #[error("record store error: {0}")]
    RecordStore(String),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl From<CatalogError> for ServiceError {
    fn from(e: CatalogError) -> Self {
        ServiceError::RecordStore(e.to_string())
    }
}
