use crate::ChunkError;

/// One contiguous slice of an original payload.
///
/// The index is explicit so callers reassemble by position, never by the
/// order in which chunks happen to arrive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based position within the split sequence.
    pub index: usize,
    /// Raw chunk data.
    pub data: Vec<u8>,
}

impl AsRef<[u8]> for Chunk {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Splits `bytes` into ordered chunks of at most `max_chunk_size` bytes.
///
/// Every chunk except possibly the last has length exactly
/// `max_chunk_size`; the last has length in `[1, max_chunk_size]`. Empty
/// input yields no chunks. Deterministic: identical input always produces
/// identical output.
pub fn split(bytes: &[u8], max_chunk_size: usize) -> Result<Vec<Chunk>, ChunkError> {
    if max_chunk_size == 0 {
        return Err(ChunkError::ZeroChunkSize);
    }

    let chunks = bytes
        .chunks(max_chunk_size)
        .enumerate()
        .map(|(index, data)| Chunk {
            index,
            data: data.to_vec(),
        })
        .collect();
    Ok(chunks)
}

/// Concatenates byte buffers in the given order.
///
/// No framing, delimiters, or padding is added: `join(split(b, n)) == b`
/// for all `b` and all `n >= 1`. An empty sequence yields an empty buffer.
pub fn join<I, B>(parts: I) -> Vec<u8>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut out = Vec::new();
    for part in parts {
        out.extend_from_slice(part.as_ref());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_exact_multiple() {
        let chunks = split(b"AABBCCDD", 2).unwrap();
        assert_eq!(chunks.len(), 4);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.index, i);
            assert_eq!(c.data.len(), 2);
        }
    }

    #[test]
    fn split_short_tail() {
        let chunks = split(b"AABBCCD", 2).unwrap();
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[3].data, b"D");
        // All but the last are full-size.
        for c in &chunks[..3] {
            assert_eq!(c.data.len(), 2);
        }
    }

    #[test]
    fn split_single_chunk_when_input_fits() {
        let chunks = split(b"abc", 10).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].data, b"abc");
    }

    #[test]
    fn split_empty_input_yields_no_chunks() {
        let chunks = split(b"", 4).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn split_zero_chunk_size_rejected() {
        let err = split(b"data", 0).unwrap_err();
        assert!(matches!(err, ChunkError::ZeroChunkSize));
    }

    #[test]
    fn split_is_deterministic() {
        let a = split(b"deterministic payload", 5).unwrap();
        let b = split(b"deterministic payload", 5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn join_empty_sequence() {
        let parts: Vec<Vec<u8>> = Vec::new();
        assert!(join(parts).is_empty());
    }

    #[test]
    fn join_concatenates_in_order() {
        let joined = join([b"one".as_slice(), b"two", b"three"]);
        assert_eq!(joined, b"onetwothree");
    }

    #[test]
    fn join_split_roundtrip() {
        let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        for n in [1usize, 7, 251, 4096, 10_000, 20_000] {
            let chunks = split(&payload, n).unwrap();
            assert_eq!(join(&chunks), payload, "chunk size {n}");
        }
    }

    #[test]
    fn chunk_count_matches_ceiling_division() {
        let payload = vec![0u8; 45];
        let chunks = split(&payload, 19).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].data.len(), 19);
        assert_eq!(chunks[1].data.len(), 19);
        assert_eq!(chunks[2].data.len(), 7);
    }
}
