use std::future::Future;
use std::pin::Pin;

/// Errors from a blob store backend.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("payload of {size} bytes exceeds backend ceiling of {limit}")]
    TooLarge { size: u64, limit: u64 },

    #[error("remote error: {0}")]
    Remote(String),
}

/// Abstract object-upload/download backend.
///
/// Accepts a named binary payload and returns an opaque identifier; fetches
/// a previously uploaded payload given that identifier. Implementations
/// enforce their own per-call payload ceiling. The boxed-future signatures
/// keep the trait object-safe so orchestrators hold an `Arc<dyn BlobStore>`
/// and tests substitute in-memory mocks.
pub trait BlobStore: Send + Sync {
    /// Uploads `data` under `name`, returning the backend's blob id.
    ///
    /// A successful put is an irreversible remote write; there is no
    /// rollback.
    fn put(
        &self,
        name: &str,
        data: &[u8],
    ) -> Pin<Box<dyn Future<Output = Result<String, BlobError>> + Send + '_>>;

    /// Fetches the payload previously stored under `blob_id`.
    fn get(
        &self,
        blob_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, BlobError>> + Send + '_>>;
}
