//! Chunk codec: ordered splitting of byte payloads and byte-exact reassembly.
//!
//! The codec is pure — no I/O, no randomness, no padding. [`ChunkReader`]
//! adds a streaming path for splitting files without loading them into
//! memory at once.

mod checksum;
mod codec;
mod reader;

pub use checksum::{checksum_bytes, checksum_file};
pub use codec::{Chunk, join, split};
pub use reader::ChunkReader;

/// Errors produced by the chunk crate.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    #[error("chunk size must be at least 1 byte")]
    ZeroChunkSize,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
