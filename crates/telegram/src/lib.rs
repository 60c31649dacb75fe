//! Telegram Bot API client used as an opaque blob store.
//!
//! Each blob is sent as a document message to a fixed chat; the document's
//! `file_id` is the blob identifier. The Bot API caps document uploads at
//! roughly 20 MB per call, which is why callers chunk larger payloads.

pub mod client;
pub mod types;

pub use client::{BotClient, ClientError, MAX_DOCUMENT_BYTES};
