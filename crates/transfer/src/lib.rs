//! Chunked transfer orchestration: split/upload on write, fetch/reassemble
//! on read, over an opaque [`BlobStore`] backend.
//!
//! The backend enforces a per-call payload ceiling, so payloads above a
//! configured threshold are split into ordered chunks and uploaded as
//! independent blobs. The resulting id sequence preserves split order, and
//! reassembly iterates that sequence regardless of network completion order.

mod blob;
mod downloader;
mod uploader;

pub use blob::{BlobError, BlobStore};
pub use downloader::Downloader;
pub use uploader::{Upload, Uploader};

/// Default threshold above which a payload is chunked: 40 MB.
pub const DEFAULT_SINGLE_BLOB_LIMIT: u64 = 40 * 1024 * 1024;

/// Default chunk size: 19 MB.
///
/// Deliberately below the backend's ~20 MB per-call ceiling to leave
/// protocol-overhead headroom.
pub const DEFAULT_CHUNK_SIZE: usize = 19 * 1024 * 1024;

/// Default bound on concurrent chunk fetches during download.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 4;

/// Size thresholds governing a transfer.
#[derive(Debug, Clone)]
pub struct TransferLimits {
    /// Payloads at or below this size are uploaded as a single blob.
    pub single_blob_limit: u64,
    /// Maximum chunk size for payloads above the threshold.
    pub chunk_size: usize,
    /// Bound on concurrent fetches when downloading.
    pub max_concurrent_fetches: usize,
}

impl Default for TransferLimits {
    fn default() -> Self {
        Self {
            single_blob_limit: DEFAULT_SINGLE_BLOB_LIMIT,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

impl TransferLimits {
    /// Validates internal consistency of the limits.
    pub fn validate(&self) -> Result<(), TransferError> {
        if self.chunk_size == 0 {
            return Err(TransferError::InvalidLimits(
                "chunk size must be at least 1 byte".into(),
            ));
        }
        if self.chunk_size as u64 > self.single_blob_limit {
            return Err(TransferError::InvalidLimits(format!(
                "chunk size {} exceeds single-blob limit {}",
                self.chunk_size, self.single_blob_limit
            )));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(TransferError::InvalidLimits(
                "fetch concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Errors produced by transfer orchestration.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("file is empty")]
    EmptyFile,

    #[error("missing or empty filename")]
    InvalidName,

    #[error("invalid transfer limits: {0}")]
    InvalidLimits(String),

    #[error("blob store unavailable: {0}")]
    BlobStoreUnavailable(String),

    #[error("chunk not found: {0}")]
    ChunkNotFound(String),

    #[error("reassembled payload does not match recorded checksum")]
    ChecksumMismatch,

    #[error(transparent)]
    Chunk(#[from] cloudstore_chunk::ChunkError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
