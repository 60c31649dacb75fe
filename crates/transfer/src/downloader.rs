use std::sync::Arc;

use cloudstore_chunk::{checksum_bytes, join};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use tracing::info;

use crate::blob::{BlobError, BlobStore};
use crate::{TransferError, TransferLimits};

/// Drives the read half of the transfer protocol.
///
/// Chunks are fetched with bounded concurrency for throughput, but
/// reassembly follows the stored id sequence, never arrival order: the
/// fetch stream is indexed by position, so the output is identical no
/// matter which network calls finish first.
pub struct Downloader {
    blob: Arc<dyn BlobStore>,
    max_concurrent: usize,
}

impl Downloader {
    /// Creates a downloader over the given backend.
    pub fn new(blob: Arc<dyn BlobStore>, limits: &TransferLimits) -> Self {
        Self {
            blob,
            max_concurrent: limits.max_concurrent_fetches.max(1),
        }
    }

    /// Fetches every blob in `chunk_ids` and concatenates them in sequence
    /// order.
    ///
    /// All-or-nothing: if any fetch fails the whole download fails and no
    /// partial result is returned.
    pub async fn download(&self, chunk_ids: &[String]) -> Result<Vec<u8>, TransferError> {
        // `buffered` polls up to `max_concurrent` fetches at once but
        // yields results in stream order.
        let buffers: Vec<Vec<u8>> = stream::iter(chunk_ids.iter().map(|id| self.fetch(id)))
            .buffered(self.max_concurrent)
            .try_collect()
            .await?;

        let bytes = join(buffers);
        info!(chunks = chunk_ids.len(), bytes = bytes.len(), "download reassembled");
        Ok(bytes)
    }

    /// Downloads and verifies the payload against a recorded SHA-256 digest.
    ///
    /// An empty `expected_checksum` skips verification (records written
    /// before digests were recorded).
    pub async fn download_verified(
        &self,
        chunk_ids: &[String],
        expected_checksum: &str,
    ) -> Result<Vec<u8>, TransferError> {
        let bytes = self.download(chunk_ids).await?;
        if !expected_checksum.is_empty() && checksum_bytes(&bytes) != expected_checksum {
            return Err(TransferError::ChecksumMismatch);
        }
        Ok(bytes)
    }

    async fn fetch(&self, blob_id: &str) -> Result<Vec<u8>, TransferError> {
        self.blob.get(blob_id).await.map_err(|e| match e {
            BlobError::NotFound(id) => TransferError::ChunkNotFound(id),
            other => TransferError::BlobStoreUnavailable(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Mock blob store with per-blob artificial latency and a completion log.
    struct DelayedBlob {
        blobs: HashMap<String, Vec<u8>>,
        delays: HashMap<String, u64>,
        completions: Mutex<Vec<String>>,
    }

    impl DelayedBlob {
        fn new(entries: &[(&str, &[u8], u64)]) -> Self {
            let mut blobs = HashMap::new();
            let mut delays = HashMap::new();
            for (id, data, delay_ms) in entries {
                blobs.insert(id.to_string(), data.to_vec());
                delays.insert(id.to_string(), *delay_ms);
            }
            Self {
                blobs,
                delays,
                completions: Mutex::new(Vec::new()),
            }
        }
    }

    impl BlobStore for DelayedBlob {
        fn put(
            &self,
            _name: &str,
            _data: &[u8],
        ) -> Pin<Box<dyn Future<Output = Result<String, BlobError>> + Send + '_>> {
            Box::pin(async { Err(BlobError::Remote("read-only mock".into())) })
        }

        fn get(
            &self,
            blob_id: &str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, BlobError>> + Send + '_>> {
            let id = blob_id.to_string();
            Box::pin(async move {
                if let Some(&delay) = self.delays.get(&id) {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                let result = self
                    .blobs
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| BlobError::NotFound(id.clone()));
                self.completions.lock().unwrap().push(id);
                result
            })
        }
    }

    fn limits(concurrency: usize) -> TransferLimits {
        TransferLimits {
            max_concurrent_fetches: concurrency,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn reassembles_in_sequence_order() {
        let blob = Arc::new(DelayedBlob::new(&[
            ("b1", b"AAAA", 0),
            ("b2", b"BBBB", 0),
            ("b3", b"CC", 0),
        ]));
        let dl = Downloader::new(blob, &limits(4));

        let ids = vec!["b1".to_string(), "b2".into(), "b3".into()];
        let bytes = dl.download(&ids).await.unwrap();
        assert_eq!(bytes, b"AAAABBBBCC");
    }

    #[tokio::test]
    async fn order_independent_of_completion_order() {
        // First chunk is the slowest, so fetches complete in reverse.
        let blob = Arc::new(DelayedBlob::new(&[
            ("b1", b"first", 60),
            ("b2", b"second", 30),
            ("b3", b"third", 5),
        ]));
        let dl = Downloader::new(blob.clone(), &limits(3));

        let ids = vec!["b1".to_string(), "b2".into(), "b3".into()];
        let bytes = dl.download(&ids).await.unwrap();
        assert_eq!(bytes, b"firstsecondthird");

        let completions = blob.completions.lock().unwrap();
        assert_eq!(*completions, vec!["b3", "b2", "b1"]);
    }

    #[tokio::test]
    async fn missing_chunk_fails_whole_download() {
        let blob = Arc::new(DelayedBlob::new(&[("b1", b"data", 0)]));
        let dl = Downloader::new(blob, &limits(2));

        let ids = vec!["b1".to_string(), "gone".into()];
        let err = dl.download(&ids).await.unwrap_err();
        assert!(matches!(err, TransferError::ChunkNotFound(id) if id == "gone"));
    }

    #[tokio::test]
    async fn empty_id_sequence_yields_empty_bytes() {
        let blob = Arc::new(DelayedBlob::new(&[]));
        let dl = Downloader::new(blob, &limits(2));
        assert!(dl.download(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn verified_download_accepts_matching_digest() {
        let blob = Arc::new(DelayedBlob::new(&[("b1", b"payload", 0)]));
        let dl = Downloader::new(blob, &limits(1));

        let ids = vec!["b1".to_string()];
        let digest = checksum_bytes(b"payload");
        let bytes = dl.download_verified(&ids, &digest).await.unwrap();
        assert_eq!(bytes, b"payload");
    }

    #[tokio::test]
    async fn verified_download_rejects_mismatch() {
        let blob = Arc::new(DelayedBlob::new(&[("b1", b"payload", 0)]));
        let dl = Downloader::new(blob, &limits(1));

        let ids = vec!["b1".to_string()];
        let err = dl
            .download_verified(&ids, &checksum_bytes(b"different"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::ChecksumMismatch));
    }

    #[tokio::test]
    async fn verified_download_skips_empty_digest() {
        let blob = Arc::new(DelayedBlob::new(&[("b1", b"payload", 0)]));
        let dl = Downloader::new(blob, &limits(1));

        let ids = vec!["b1".to_string()];
        let bytes = dl.download_verified(&ids, "").await.unwrap();
        assert_eq!(bytes, b"payload");
    }
}
