//! # Token Shard Binary Format
//!
//! A shard data artifact is little-endian:
//! ```terminaloutput
//! magic    b"WBTS"
//! u32      version
//! u64      n                 (sequence count)
//! u64[n+1] offsets           (offsets[0] = 0, non-decreasing)
//! u32[offsets[n]] tokens
//! ```
//!
//! Sequence `i` is ``tokens[offsets[i]..offsets[i+1]]``.

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use crate::{
    errors::{WBResult, WordbaleError},
    types::{TokenId, TokenSequence},
};

/// The leading magic bytes of a shard data artifact.
pub const SHARD_MAGIC: [u8; 4] = *b"WBTS";

/// The current shard format version.
pub const SHARD_VERSION: u32 = 1;

const HEADER_LEN: usize = 4 + 4 + 8;

/// Write sequences in the shard format.
///
/// ## Arguments
/// * `writer` - the target writer.
/// * `sequences` - the sequences, in shard order.
pub fn write_token_shard<W: Write, S: AsRef<[TokenId]>>(
    writer: &mut W,
    sequences: &[S],
) -> io::Result<()> {
    writer.write_all(&SHARD_MAGIC)?;
    writer.write_all(&SHARD_VERSION.to_le_bytes())?;
    writer.write_all(&(sequences.len() as u64).to_le_bytes())?;

    let mut offset: u64 = 0;
    writer.write_all(&offset.to_le_bytes())?;
    for seq in sequences {
        offset += seq.as_ref().len() as u64;
        writer.write_all(&offset.to_le_bytes())?;
    }

    for seq in sequences {
        for &token in seq.as_ref() {
            writer.write_all(&token.to_le_bytes())?;
        }
    }
    Ok(())
}

/// Decode a shard from its bytes.
///
/// ## Arguments
/// * `bytes` - the full artifact contents.
/// * `source` - the path reported in errors.
pub fn decode_token_shard(
    bytes: &[u8],
    source: &Path,
) -> WBResult<Vec<TokenSequence>> {
    let bad = |reason: String| WordbaleError::format(source, reason);

    if bytes.len() < HEADER_LEN {
        return Err(bad(format!("truncated header: {} bytes", bytes.len())));
    }
    let (header, body) = bytes.split_at(HEADER_LEN);
    if header[0..4] != SHARD_MAGIC {
        return Err(bad(format!("bad magic {:?}", &header[0..4])));
    }
    let version = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    if version != SHARD_VERSION {
        return Err(bad(format!("unsupported shard version {version}")));
    }
    let n = read_u64(&header[8..16]);

    let offsets_len = usize::try_from(n)
        .ok()
        .and_then(|n| n.checked_add(1))
        .and_then(|n| n.checked_mul(8))
        .filter(|&len| len <= body.len())
        .ok_or_else(|| bad(format!("offset table for {n} sequences exceeds the file")))?;
    let (offset_bytes, token_bytes) = body.split_at(offsets_len);

    let offsets: Vec<u64> = offset_bytes.chunks_exact(8).map(read_u64).collect();
    if offsets[0] != 0 {
        return Err(bad(format!("first offset is {}, expected 0", offsets[0])));
    }
    if offsets.windows(2).any(|w| w[0] > w[1]) {
        return Err(bad("offsets are not non-decreasing".to_string()));
    }

    let total = offsets[offsets.len() - 1];
    if total.checked_mul(4) != Some(token_bytes.len() as u64) {
        return Err(bad(format!(
            "expected {total} tokens, found {} token bytes",
            token_bytes.len()
        )));
    }

    let tokens: Vec<TokenId> = token_bytes
        .chunks_exact(4)
        .map(|c| TokenId::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    Ok(offsets
        .windows(2)
        .map(|w| tokens[w[0] as usize..w[1] as usize].to_vec())
        .collect())
}

/// Read a shard data artifact.
///
/// ## Errors
/// * [`WordbaleError::Storage`] if the file cannot be read.
/// * [`WordbaleError::Format`] if the contents are malformed.
pub fn read_token_shard<P: AsRef<Path>>(path: P) -> WBResult<Vec<TokenSequence>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| WordbaleError::storage(path, e))?;
    decode_token_shard(&bytes, path)
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(sequences: &[TokenSequence]) -> Vec<u8> {
        let mut buf = Vec::new();
        write_token_shard(&mut buf, sequences).unwrap();
        buf
    }

    #[test]
    fn test_layout() {
        let bytes = encode(&[vec![2, 70000, 3], vec![]]);

        assert_eq!(&bytes[0..4], b"WBTS");
        assert_eq!(&bytes[4..8], &1u32.to_le_bytes());
        assert_eq!(&bytes[8..16], &2u64.to_le_bytes());
        assert_eq!(&bytes[16..24], &0u64.to_le_bytes());
        assert_eq!(&bytes[24..32], &3u64.to_le_bytes());
        assert_eq!(&bytes[32..40], &3u64.to_le_bytes());
        assert_eq!(&bytes[44..48], &70000u32.to_le_bytes());
        assert_eq!(bytes.len(), 40 + 3 * 4);
    }

    #[test]
    fn test_decode_preserves_lengths() {
        let sequences = vec![vec![2, 10, 3], vec![], vec![7], vec![u32::MAX, 0]];
        let decoded = decode_token_shard(&encode(&sequences), Path::new("x.bin")).unwrap();
        assert_eq!(decoded, sequences);

        let empty: Vec<TokenSequence> = vec![];
        assert!(decode_token_shard(&encode(&empty), Path::new("x.bin")).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_corruption() {
        let path = Path::new("bad.bin");
        let good = encode(&[vec![1, 2, 3]]);

        let mut bad_magic = good.clone();
        bad_magic[0] = b'X';
        assert!(decode_token_shard(&bad_magic, path).is_err());

        let mut bad_version = good.clone();
        bad_version[4] = 9;
        assert!(decode_token_shard(&bad_version, path).is_err());

        let truncated = &good[..good.len() - 1];
        let err = decode_token_shard(truncated, path).unwrap_err();
        assert!(err.to_string().contains("bad.bin"));

        let mut trailing = good.clone();
        trailing.extend_from_slice(&[0, 0, 0, 0]);
        assert!(decode_token_shard(&trailing, path).is_err());

        let mut huge_n = good.clone();
        huge_n[8..16].copy_from_slice(&u64::MAX.to_le_bytes());
        assert!(decode_token_shard(&huge_n, path).is_err());

        let mut overrun = good;
        overrun[24..32].copy_from_slice(&9u64.to_le_bytes());
        assert!(decode_token_shard(&overrun, path).is_err());

        assert!(decode_token_shard(b"WBTS", path).is_err());
    }
}
