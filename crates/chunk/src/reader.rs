use std::io::Read;
use std::path::Path;

use crate::codec::Chunk;
use crate::ChunkError;

/// Reads a file in fixed-size chunks without loading it into memory.
///
/// Produces the same chunk sequence as [`crate::split`] over the file's
/// contents: each chunk except possibly the last is exactly `chunk_size`
/// bytes, indexed in read order.
pub struct ChunkReader {
    file: std::fs::File,
    chunk_size: usize,
    next_index: usize,
    offset: u64,
    file_size: u64,
}

impl ChunkReader {
    /// Opens `path` for chunked reading.
    pub fn new(path: &Path, chunk_size: usize) -> Result<Self, ChunkError> {
        if chunk_size == 0 {
            return Err(ChunkError::ZeroChunkSize);
        }
        let file = std::fs::File::open(path)?;
        let file_size = file.metadata()?.len();
        Ok(Self {
            file,
            chunk_size,
            next_index: 0,
            offset: 0,
            file_size,
        })
    }

    /// Reads the next chunk. Returns `None` at EOF.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>, ChunkError> {
        if self.offset >= self.file_size {
            return Ok(None);
        }

        let remaining = (self.file_size - self.offset) as usize;
        let read_size = remaining.min(self.chunk_size);
        let mut buf = vec![0u8; read_size];
        self.file.read_exact(&mut buf)?;

        let chunk = Chunk {
            index: self.next_index,
            data: buf,
        };
        self.next_index += 1;
        self.offset += read_size as u64;
        Ok(Some(chunk))
    }

    /// Total file size in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Number of chunks the whole file will produce.
    pub fn chunk_count(&self) -> usize {
        (self.file_size as usize).div_ceil(self.chunk_size)
    }

    /// Bytes remaining to read.
    pub fn remaining(&self) -> u64 {
        self.file_size - self.offset
    }
}
