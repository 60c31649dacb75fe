//! Async Bot API client over `reqwest`.
//!
//! Uploads go through `sendDocument`; downloads are the two-step
//! `getFile` + file-endpoint fetch the Bot API requires.

use std::future::Future;
use std::pin::Pin;

use cloudstore_transfer::{BlobError, BlobStore};
use reqwest::multipart;
use tracing::debug;

use crate::types::{ApiResult, FileInfo, SentMessage};

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Practical per-call document ceiling for bot uploads (~20 MB).
///
/// Enforced locally so a caller error surfaces before the network round
/// trip. Chunk sizes are configured below this to leave headroom.
pub const MAX_DOCUMENT_BYTES: u64 = 20 * 1024 * 1024;

/// Errors from the Bot API client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {description}")]
    Api { status: u16, description: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("document of {size} bytes exceeds the {limit} byte ceiling")]
    TooLarge { size: u64, limit: u64 },

    #[error("unexpected response: {0}")]
    Unexpected(&'static str),
}

/// Telegram Bot API client bound to one bot token and one storage chat.
pub struct BotClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
    chat_id: String,
}

impl BotClient {
    /// Creates a new client for the given bot token and chat id.
    pub fn new(token: &str, chat_id: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            api_base: DEFAULT_API_BASE.to_string(),
            token: token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }

    /// Sets a custom API base URL (for testing).
    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, url: String) -> Self {
        self.api_base = url;
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// Sends `data` as a document message and returns its `file_id`.
    pub async fn send_document(&self, name: &str, data: &[u8]) -> Result<String, ClientError> {
        let size = data.len() as u64;
        if size > MAX_DOCUMENT_BYTES {
            return Err(ClientError::TooLarge {
                size,
                limit: MAX_DOCUMENT_BYTES,
            });
        }

        let part = multipart::Part::bytes(data.to_vec()).file_name(name.to_string());
        let form = multipart::Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", format!("Uploaded: {name}"))
            .part("document", part);

        let resp = self
            .http
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                description: error_description(&body),
            });
        }

        let parsed: ApiResult<SentMessage> = serde_json::from_slice(&body)?;
        if !parsed.ok {
            return Err(ClientError::Api {
                status: status.as_u16(),
                description: parsed.description.unwrap_or_default(),
            });
        }

        let file_id = parsed
            .result
            .and_then(|m| m.document)
            .map(|d| d.file_id)
            .ok_or(ClientError::Unexpected("sendDocument returned no document"))?;
        debug!(name = %name, bytes = size, file_id = %file_id, "document sent");
        Ok(file_id)
    }

    /// Resolves a `file_id` to its download coordinates.
    ///
    /// The Bot API answers 400 for unknown or expired file ids; that maps
    /// to [`ClientError::NotFound`].
    pub async fn get_file(&self, file_id: &str) -> Result<FileInfo, ClientError> {
        let resp = self
            .http
            .get(self.method_url("getFile"))
            .query(&[("file_id", file_id)])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        if status.as_u16() == 400 || status.as_u16() == 404 {
            return Err(ClientError::NotFound(file_id.to_string()));
        }
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                description: error_description(&body),
            });
        }

        let parsed: ApiResult<FileInfo> = serde_json::from_slice(&body)?;
        if !parsed.ok {
            return Err(ClientError::Api {
                status: status.as_u16(),
                description: parsed.description.unwrap_or_default(),
            });
        }
        parsed
            .result
            .ok_or(ClientError::Unexpected("getFile returned no result"))
    }

    /// Downloads the raw bytes of a previously sent document.
    pub async fn fetch_document(&self, file_id: &str) -> Result<Vec<u8>, ClientError> {
        let info = self.get_file(file_id).await?;
        let path = info
            .file_path
            .ok_or(ClientError::Unexpected("getFile returned no file_path"))?;

        let url = format!("{}/file/bot{}/{}", self.api_base, self.token, path);
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();

        if status.as_u16() == 404 {
            return Err(ClientError::NotFound(file_id.to_string()));
        }
        if !status.is_success() {
            let body = resp.bytes().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                description: error_description(&body),
            });
        }

        let bytes = resp.bytes().await?.to_vec();
        debug!(file_id = %file_id, bytes = bytes.len(), "document fetched");
        Ok(bytes)
    }
}

/// Pulls the `description` out of a Bot API error body, falling back to the
/// raw text for non-JSON responses (proxies, gateways).
fn error_description(body: &[u8]) -> String {
    serde_json::from_slice::<ApiResult<serde_json::Value>>(body)
        .ok()
        .and_then(|r| r.description)
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned())
}

impl BlobStore for BotClient {
    fn put(
        &self,
        name: &str,
        data: &[u8],
    ) -> Pin<Box<dyn Future<Output = Result<String, BlobError>> + Send + '_>> {
        let name = name.to_string();
        let data = data.to_vec();
        Box::pin(async move {
            self.send_document(&name, &data).await.map_err(|e| match e {
                ClientError::TooLarge { size, limit } => BlobError::TooLarge { size, limit },
                other => BlobError::Remote(other.to_string()),
            })
        })
    }

    fn get(
        &self,
        blob_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, BlobError>> + Send + '_>> {
        let id = blob_id.to_string();
        Box::pin(async move {
            self.fetch_document(&id).await.map_err(|e| match e {
                ClientError::NotFound(id) => BlobError::NotFound(id),
                other => BlobError::Remote(other.to_string()),
            })
        })
    }
}
