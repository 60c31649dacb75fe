//! Transfer operations over the blob store and the catalog.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use cloudstore_catalog::{Transfer, TransferStore};
use cloudstore_transfer::{
    BlobError, BlobStore, Downloader, TransferError, TransferLimits, Uploader,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::identity::UserContext;
use crate::preview::{preview_kind, PreviewKind};
use crate::ServiceError;

/// What a client needs to fetch and reassemble a transfer itself: the
/// ordered blob ids plus display metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferManifest {
    pub id: String,
    pub original_name: String,
    pub chunk_ids: Vec<String>,
    pub total_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<PreviewKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// A server-side reassembled download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDownload {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

/// User-facing transfer operations.
///
/// Every id-addressed operation loads the catalog record and checks
/// ownership before touching any blob; a caller that is not the owner gets
/// a generic denial with no record details.
pub struct TransferManager {
    blob: Arc<dyn BlobStore>,
    store: Arc<dyn TransferStore>,
    uploader: Uploader,
    downloader: Downloader,
}

impl TransferManager {
    /// Creates a manager over the given backends.
    pub fn new(
        blob: Arc<dyn BlobStore>,
        store: Arc<dyn TransferStore>,
        limits: TransferLimits,
    ) -> Result<Self, ServiceError> {
        let uploader = Uploader::new(blob.clone(), limits.clone())?;
        let downloader = Downloader::new(blob.clone(), &limits);
        Ok(Self {
            blob,
            store,
            uploader,
            downloader,
        })
    }

    /// Uploads an in-memory payload and records it for `ctx`.
    ///
    /// All-or-nothing: either every chunk lands and exactly one record is
    /// written, or the call fails and no record exists. Chunks already
    /// uploaded by a failed attempt stay behind as orphaned garbage.
    pub async fn upload(
        &self,
        ctx: &UserContext,
        original_name: &str,
        bytes: &[u8],
        thumbnail: Option<String>,
    ) -> Result<Transfer, ServiceError> {
        let upload = self
            .uploader
            .upload(bytes, original_name)
            .await
            .map_err(map_input_errors)?;
        self.record(ctx, original_name, upload, thumbnail).await
    }

    /// Uploads a file from disk with bounded memory.
    pub async fn upload_file(
        &self,
        ctx: &UserContext,
        path: &Path,
        original_name: &str,
        thumbnail: Option<String>,
    ) -> Result<Transfer, ServiceError> {
        let upload = self
            .uploader
            .upload_file(path, original_name)
            .await
            .map_err(map_input_errors)?;
        self.record(ctx, original_name, upload, thumbnail).await
    }

    /// Uploads a spool file (e.g. a multipart temp file) and removes it
    /// afterwards. Removal is best-effort: a leftover spool file does not
    /// affect the already-confirmed result.
    pub async fn upload_spooled(
        &self,
        ctx: &UserContext,
        path: &Path,
        original_name: &str,
        thumbnail: Option<String>,
    ) -> Result<Transfer, ServiceError> {
        let result = self.upload_file(ctx, path, original_name, thumbnail).await;
        if result.is_ok() {
            if let Err(e) = std::fs::remove_file(path) {
                warn!(path = %path.display(), error = %e, "failed to remove spool file");
            }
        }
        result
    }

    /// Lists the caller's transfers, most recent first.
    pub async fn list(&self, ctx: &UserContext) -> Result<Vec<Transfer>, ServiceError> {
        Ok(self.store.list_by_owner(&ctx.user_id).await?)
    }

    /// Returns the manifest a client needs for client-side reassembly.
    pub async fn manifest(
        &self,
        ctx: &UserContext,
        id: &str,
    ) -> Result<TransferManifest, ServiceError> {
        let t = self.authorize(ctx, id).await?;
        Ok(TransferManifest {
            preview: preview_kind(&t.original_name),
            id: t.id,
            original_name: t.original_name,
            chunk_ids: t.chunk_ids,
            total_size: t.total_size,
            thumbnail: t.thumbnail,
        })
    }

    /// Fetches one blob of an owned transfer.
    ///
    /// The blob id must appear in the transfer's recorded chunk list;
    /// ownership of the transfer alone does not grant access to arbitrary
    /// blobs.
    pub async fn fetch_chunk(
        &self,
        ctx: &UserContext,
        id: &str,
        blob_id: &str,
    ) -> Result<Vec<u8>, ServiceError> {
        let t = self.authorize(ctx, id).await?;
        if !t.chunk_ids.iter().any(|c| c == blob_id) {
            debug!(user = %ctx.user_id, transfer = %id, blob = %blob_id, "blob not in transfer");
            return Err(ServiceError::AccessDenied);
        }
        let bytes = self.blob.get(blob_id).await.map_err(|e| match e {
            BlobError::NotFound(b) => ServiceError::Transfer(TransferError::ChunkNotFound(b)),
            other => ServiceError::Transfer(TransferError::BlobStoreUnavailable(other.to_string())),
        })?;
        Ok(bytes)
    }

    /// Reassembles an owned transfer server-side and verifies its digest.
    pub async fn download(&self, ctx: &UserContext, id: &str) -> Result<FileDownload, ServiceError> {
        let t = self.authorize(ctx, id).await?;
        let bytes = self
            .downloader
            .download_verified(&t.chunk_ids, &t.checksum)
            .await?;
        info!(
            user = %ctx.user_id,
            transfer = %id,
            name = %t.original_name,
            bytes = bytes.len(),
            "transfer downloaded"
        );
        Ok(FileDownload {
            original_name: t.original_name,
            bytes,
        })
    }

    /// Deletes an owned transfer's catalog record.
    ///
    /// Chunk blobs are not retracted from the backend; the record removal
    /// alone makes the transfer unreachable.
    pub async fn delete(&self, ctx: &UserContext, id: &str) -> Result<(), ServiceError> {
        self.authorize(ctx, id).await?;
        let removed = self.store.delete_by_id(id, &ctx.user_id).await?;
        if !removed {
            // Raced with another delete of the same record.
            return Err(ServiceError::NotFound);
        }
        info!(user = %ctx.user_id, transfer = %id, "transfer deleted");
        Ok(())
    }

    async fn record(
        &self,
        ctx: &UserContext,
        original_name: &str,
        upload: cloudstore_transfer::Upload,
        thumbnail: Option<String>,
    ) -> Result<Transfer, ServiceError> {
        let transfer = Transfer {
            id: Uuid::new_v4().to_string(),
            owner_id: ctx.user_id.clone(),
            original_name: original_name.to_string(),
            chunk_ids: upload.chunk_ids,
            total_size: upload.total_size,
            checksum: upload.checksum,
            created_at: Utc::now(),
            thumbnail,
        };
        self.store.save(transfer.clone()).await?;
        info!(
            user = %ctx.user_id,
            transfer = %transfer.id,
            name = %original_name,
            chunks = transfer.chunk_ids.len(),
            bytes = transfer.total_size,
            "transfer recorded"
        );
        Ok(transfer)
    }

    async fn authorize(&self, ctx: &UserContext, id: &str) -> Result<Transfer, ServiceError> {
        match self.store.get_by_id(id).await? {
            None => Err(ServiceError::NotFound),
            Some(t) if t.owner_id != ctx.user_id => {
                debug!(user = %ctx.user_id, transfer = %id, "ownership check failed");
                Err(ServiceError::AccessDenied)
            }
            Some(t) => Ok(t),
        }
    }
}

/// Input-validation failures surface as `InvalidInput`, rejected before
/// any remote call.
fn map_input_errors(e: TransferError) -> ServiceError {
    match e {
        TransferError::EmptyFile => ServiceError::InvalidInput("file is empty".into()),
        TransferError::InvalidName => ServiceError::InvalidInput("missing filename".into()),
        other => ServiceError::Transfer(other),
    }
}
