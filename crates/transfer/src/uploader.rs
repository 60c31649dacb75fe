use std::path::Path;
use std::sync::Arc;

use cloudstore_chunk::{checksum_bytes, checksum_file, split, ChunkReader};
use tracing::{debug, info};

use crate::blob::{BlobError, BlobStore};
use crate::{TransferError, TransferLimits};

/// Result of a completed upload: the ordered blob ids plus the metadata the
/// catalog needs to reconstruct the payload later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Blob ids in split order. Reassembly iterates this sequence as-is.
    pub chunk_ids: Vec<String>,
    /// Original payload size in bytes.
    pub total_size: u64,
    /// SHA-256 hex digest of the original payload.
    pub checksum: String,
}

/// Drives the write half of the transfer protocol.
///
/// Payloads at or below the single-blob threshold go up as one blob;
/// larger payloads are split and uploaded chunk by chunk. The operation is
/// all-or-nothing from the caller's perspective: any chunk failure fails
/// the whole upload and already-stored chunks remain as orphaned garbage —
/// there is no rollback and no partial retry.
pub struct Uploader {
    blob: Arc<dyn BlobStore>,
    limits: TransferLimits,
}

impl Uploader {
    /// Creates an uploader over the given backend.
    pub fn new(blob: Arc<dyn BlobStore>, limits: TransferLimits) -> Result<Self, TransferError> {
        limits.validate()?;
        Ok(Self { blob, limits })
    }

    /// Uploads an in-memory payload.
    ///
    /// Input validation happens before any remote call: empty payloads and
    /// empty filenames are rejected immediately.
    pub async fn upload(&self, bytes: &[u8], original_name: &str) -> Result<Upload, TransferError> {
        if original_name.trim().is_empty() {
            return Err(TransferError::InvalidName);
        }
        if bytes.is_empty() {
            return Err(TransferError::EmptyFile);
        }

        let total_size = bytes.len() as u64;
        let checksum = checksum_bytes(bytes);

        if total_size <= self.limits.single_blob_limit {
            let id = self.put(original_name, bytes).await?;
            info!(name = %original_name, bytes = total_size, "uploaded as single blob");
            return Ok(Upload {
                chunk_ids: vec![id],
                total_size,
                checksum,
            });
        }

        let chunks = split(bytes, self.limits.chunk_size)?;
        let total_chunks = chunks.len();
        let mut chunk_ids = Vec::with_capacity(total_chunks);
        for chunk in &chunks {
            let name = chunk_blob_name(original_name, chunk.index, total_chunks);
            let id = self.put(&name, &chunk.data).await?;
            debug!(name = %name, blob_id = %id, "chunk uploaded");
            chunk_ids.push(id);
        }

        info!(
            name = %original_name,
            chunks = total_chunks,
            bytes = total_size,
            "chunked upload complete"
        );
        Ok(Upload {
            chunk_ids,
            total_size,
            checksum,
        })
    }

    /// Uploads a file from disk, streaming chunk-size reads so memory stays
    /// bounded regardless of file size.
    pub async fn upload_file(
        &self,
        path: &Path,
        original_name: &str,
    ) -> Result<Upload, TransferError> {
        if original_name.trim().is_empty() {
            return Err(TransferError::InvalidName);
        }

        let checksum = {
            let p = path.to_path_buf();
            tokio::task::spawn_blocking(move || checksum_file(&p))
                .await
                .map_err(join_io)??
        };

        let mut reader = {
            let p = path.to_path_buf();
            let chunk_size = self.limits.chunk_size;
            tokio::task::spawn_blocking(move || ChunkReader::new(&p, chunk_size))
                .await
                .map_err(join_io)??
        };

        let total_size = reader.file_size();
        if total_size == 0 {
            return Err(TransferError::EmptyFile);
        }

        if total_size <= self.limits.single_blob_limit {
            let data = {
                let p = path.to_path_buf();
                tokio::task::spawn_blocking(move || std::fs::read(&p))
                    .await
                    .map_err(join_io)??
            };
            let id = self.put(original_name, &data).await?;
            info!(name = %original_name, bytes = total_size, "uploaded as single blob");
            return Ok(Upload {
                chunk_ids: vec![id],
                total_size,
                checksum,
            });
        }

        let total_chunks = reader.chunk_count();
        let mut chunk_ids = Vec::with_capacity(total_chunks);
        loop {
            let (returned, next) = tokio::task::spawn_blocking(move || {
                let chunk = reader.next_chunk();
                (reader, chunk)
            })
            .await
            .map_err(join_io)?;
            reader = returned;

            let Some(chunk) = next? else {
                break;
            };

            let name = chunk_blob_name(original_name, chunk.index, total_chunks);
            let id = self.put(&name, &chunk.data).await?;
            debug!(name = %name, blob_id = %id, "chunk uploaded");
            chunk_ids.push(id);
        }

        info!(
            name = %original_name,
            chunks = total_chunks,
            bytes = total_size,
            "chunked upload complete"
        );
        Ok(Upload {
            chunk_ids,
            total_size,
            checksum,
        })
    }

    async fn put(&self, name: &str, data: &[u8]) -> Result<String, TransferError> {
        self.blob
            .put(name, data)
            .await
            .map_err(|e| TransferError::BlobStoreUnavailable(e.to_string()))
    }
}

/// Blob name for chunk `index` of `total`, e.g. `report.pdf.part2of3`.
fn chunk_blob_name(original_name: &str, index: usize, total: usize) -> String {
    format!("{original_name}.part{}of{total}", index + 1)
}

fn join_io(e: tokio::task::JoinError) -> std::io::Error {
    std::io::Error::other(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock blob store that records puts and can fail the Nth one.
    struct MockBlob {
        puts: Mutex<Vec<(String, Vec<u8>)>>,
        fail_at: Option<usize>,
    }

    impl MockBlob {
        fn new() -> Self {
            Self {
                puts: Mutex::new(Vec::new()),
                fail_at: None,
            }
        }

        fn failing_at(index: usize) -> Self {
            Self {
                puts: Mutex::new(Vec::new()),
                fail_at: Some(index),
            }
        }

        fn put_count(&self) -> usize {
            self.puts.lock().unwrap().len()
        }
    }

    impl BlobStore for MockBlob {
        fn put(
            &self,
            name: &str,
            data: &[u8],
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<String, BlobError>> + Send + '_>,
        > {
            let result = {
                let mut puts = self.puts.lock().unwrap();
                if self.fail_at == Some(puts.len()) {
                    Err(BlobError::Remote("simulated outage".into()))
                } else {
                    puts.push((name.to_string(), data.to_vec()));
                    Ok(format!("blob-{}", puts.len() - 1))
                }
            };
            Box::pin(async move { result })
        }

        fn get(
            &self,
            blob_id: &str,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<Vec<u8>, BlobError>> + Send + '_>,
        > {
            let id = blob_id.to_string();
            Box::pin(async move { Err(BlobError::NotFound(id)) })
        }
    }

    fn limits(threshold: u64, chunk: usize) -> TransferLimits {
        TransferLimits {
            single_blob_limit: threshold,
            chunk_size: chunk,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn small_payload_single_blob() {
        let blob = Arc::new(MockBlob::new());
        let uploader = Uploader::new(blob.clone(), limits(100, 10)).unwrap();

        let result = uploader.upload(b"tiny payload", "tiny.txt").await.unwrap();
        assert_eq!(result.chunk_ids, vec!["blob-0"]);
        assert_eq!(result.total_size, 12);
        assert_eq!(result.checksum, checksum_bytes(b"tiny payload"));

        let puts = blob.puts.lock().unwrap();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].0, "tiny.txt");
    }

    #[tokio::test]
    async fn large_payload_chunked_in_order() {
        let blob = Arc::new(MockBlob::new());
        let uploader = Uploader::new(blob.clone(), limits(40, 19)).unwrap();

        let payload = vec![7u8; 45];
        let result = uploader.upload(&payload, "big.bin").await.unwrap();
        assert_eq!(result.chunk_ids, vec!["blob-0", "blob-1", "blob-2"]);
        assert_eq!(result.total_size, 45);

        let puts = blob.puts.lock().unwrap();
        assert_eq!(puts.len(), 3);
        assert_eq!(puts[0].0, "big.bin.part1of3");
        assert_eq!(puts[1].0, "big.bin.part2of3");
        assert_eq!(puts[2].0, "big.bin.part3of3");
        assert_eq!(puts[0].1.len(), 19);
        assert_eq!(puts[1].1.len(), 19);
        assert_eq!(puts[2].1.len(), 7);
    }

    #[tokio::test]
    async fn payload_at_threshold_stays_whole() {
        let blob = Arc::new(MockBlob::new());
        let uploader = Uploader::new(blob.clone(), limits(40, 19)).unwrap();

        let result = uploader.upload(&vec![1u8; 40], "edge.bin").await.unwrap();
        assert_eq!(result.chunk_ids.len(), 1);
        assert_eq!(blob.put_count(), 1);
    }

    #[tokio::test]
    async fn empty_payload_rejected_before_any_put() {
        let blob = Arc::new(MockBlob::new());
        let uploader = Uploader::new(blob.clone(), limits(40, 19)).unwrap();

        let err = uploader.upload(b"", "empty.bin").await.unwrap_err();
        assert!(matches!(err, TransferError::EmptyFile));
        assert_eq!(blob.put_count(), 0);
    }

    #[tokio::test]
    async fn blank_filename_rejected_before_any_put() {
        let blob = Arc::new(MockBlob::new());
        let uploader = Uploader::new(blob.clone(), limits(40, 19)).unwrap();

        let err = uploader.upload(b"data", "   ").await.unwrap_err();
        assert!(matches!(err, TransferError::InvalidName));
        assert_eq!(blob.put_count(), 0);
    }

    #[tokio::test]
    async fn chunk_failure_fails_whole_upload() {
        // Third of three chunk puts fails.
        let blob = Arc::new(MockBlob::failing_at(2));
        let uploader = Uploader::new(blob.clone(), limits(40, 19)).unwrap();

        let err = uploader.upload(&vec![0u8; 45], "big.bin").await.unwrap_err();
        assert!(matches!(err, TransferError::BlobStoreUnavailable(_)));
        // The first two chunks landed and stay behind as orphans.
        assert_eq!(blob.put_count(), 2);
    }

    #[tokio::test]
    async fn invalid_limits_rejected_at_construction() {
        let blob = Arc::new(MockBlob::new());
        let bad = TransferLimits {
            single_blob_limit: 10,
            chunk_size: 20,
            ..Default::default()
        };
        assert!(Uploader::new(blob, bad).is_err());
    }

    #[tokio::test]
    async fn upload_file_streams_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        let payload: Vec<u8> = (0..45u8).collect();
        std::fs::write(&path, &payload).unwrap();

        let blob = Arc::new(MockBlob::new());
        let uploader = Uploader::new(blob.clone(), limits(40, 19)).unwrap();

        let result = uploader.upload_file(&path, "big.bin").await.unwrap();
        assert_eq!(result.chunk_ids.len(), 3);
        assert_eq!(result.total_size, 45);
        assert_eq!(result.checksum, checksum_bytes(&payload));

        // Chunk contents match an in-memory split of the same file.
        let puts = blob.puts.lock().unwrap();
        assert_eq!(puts[0].1, payload[..19]);
        assert_eq!(puts[1].1, payload[19..38]);
        assert_eq!(puts[2].1, payload[38..]);
    }

    #[tokio::test]
    async fn upload_file_small_goes_whole() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.bin");
        std::fs::write(&path, b"abc").unwrap();

        let blob = Arc::new(MockBlob::new());
        let uploader = Uploader::new(blob.clone(), limits(40, 19)).unwrap();

        let result = uploader.upload_file(&path, "small.bin").await.unwrap();
        assert_eq!(result.chunk_ids, vec!["blob-0"]);
        let puts = blob.puts.lock().unwrap();
        assert_eq!(puts[0].0, "small.bin");
        assert_eq!(puts[0].1, b"abc");
    }

    #[tokio::test]
    async fn upload_file_empty_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.bin");
        std::fs::write(&path, b"").unwrap();

        let blob = Arc::new(MockBlob::new());
        let uploader = Uploader::new(blob.clone(), limits(40, 19)).unwrap();

        let err = uploader.upload_file(&path, "empty.bin").await.unwrap_err();
        assert!(matches!(err, TransferError::EmptyFile));
        assert_eq!(blob.put_count(), 0);
    }
}
