//! # Shard Directory Reader

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{
    errors::{WBResult, WordbaleError},
    shards::{
        DATA_EXTENSION,
        SIDECAR_EXTENSION,
        ShardWriterOptions,
        read_shard_metadata,
        read_token_shard,
    },
};

/// Counts over a verified shard directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShardSetSummary {
    /// The number of shards.
    pub shards: usize,

    /// The non-final shard size; the size of the only shard if there is one.
    pub shard_size: usize,

    /// The number of sequences across all shards.
    pub sequences: usize,

    /// The number of tokens across all shards.
    pub tokens: usize,

    /// The number of shards with a sidecar.
    pub sidecars: usize,
}

fn list_with_extension(
    dir: &Path,
    options: &ShardWriterOptions,
    extension: &str,
) -> WBResult<Vec<(usize, PathBuf)>> {
    let entries = fs::read_dir(dir).map_err(|e| WordbaleError::storage(dir, e))?;

    let mut shards = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| WordbaleError::storage(dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(index) = options.parse_file_name(name, extension) {
            shards.push((index, entry.path()));
        }
    }
    shards.sort();
    Ok(shards)
}

/// List the shard data artifacts in `dir`.
///
/// Hidden temp files and unrelated files are ignored.
///
/// ## Returns
/// ``(index, path)`` pairs, sorted by index.
pub fn list_token_shards<P: AsRef<Path>>(
    dir: P,
    options: &ShardWriterOptions,
) -> WBResult<Vec<(usize, PathBuf)>> {
    list_with_extension(dir.as_ref(), options, DATA_EXTENSION)
}

/// Verify the invariants of a shard directory.
///
/// Every data artifact is decoded. The checks are:
/// * indices are contiguous from 0;
/// * every shard but the last holds the same number of sequences;
/// * the last shard holds no more than that, and at least one;
/// * every sidecar `count` equals the sequences in its shard;
/// * no sidecar exists without a data artifact.
///
/// An empty directory verifies as an empty summary.
///
/// ## Errors
/// * [`WordbaleError::Integrity`] if an invariant fails.
/// * [`WordbaleError::Format`] or [`WordbaleError::Storage`] if an artifact
///   cannot be read.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(dir, options)))]
pub fn verify_shard_dir<P: AsRef<Path>>(
    dir: P,
    options: &ShardWriterOptions,
) -> WBResult<ShardSetSummary> {
    let dir = dir.as_ref();
    let shards = list_with_extension(dir, options, DATA_EXTENSION)?;
    let sidecars = list_with_extension(dir, options, SIDECAR_EXTENSION)?;

    for (expected, (index, path)) in shards.iter().enumerate() {
        if *index != expected {
            return Err(WordbaleError::Integrity(format!(
                "expected shard index {expected}, found {path:?}"
            )));
        }
    }
    if let Some((index, path)) = sidecars.iter().find(|(i, _)| *i >= shards.len()) {
        return Err(WordbaleError::Integrity(format!(
            "sidecar {path:?} has no data artifact for index {index}"
        )));
    }

    let mut summary = ShardSetSummary {
        shards: shards.len(),
        ..Default::default()
    };
    let mut sidecars = sidecars.into_iter().peekable();

    for (index, path) in &shards {
        let sequences = read_token_shard(path)?;
        let count = sequences.len();
        let is_last = index + 1 == shards.len();

        if *index == 0 {
            summary.shard_size = count;
        }
        if count == 0 {
            return Err(WordbaleError::Integrity(format!("shard {path:?} is empty")));
        }
        if (!is_last && count != summary.shard_size) || count > summary.shard_size {
            return Err(WordbaleError::Integrity(format!(
                "shard {path:?} holds {count} sequences, expected {}",
                summary.shard_size
            )));
        }

        if let Some((_, sidecar)) = sidecars.next_if(|(i, _)| i == index) {
            let meta = read_shard_metadata(&sidecar)?;
            if meta.count != count {
                return Err(WordbaleError::Integrity(format!(
                    "sidecar {sidecar:?} reports count {}, data holds {count}",
                    meta.count
                )));
            }
            summary.sidecars += 1;
        }

        summary.sequences += count;
        summary.tokens += sequences.iter().map(Vec::len).sum::<usize>();
        log::debug!("verified shard {index}: {count} sequences");
    }

    log::info!(
        "Verified {} shards ({} sequences, {} tokens) in {:?}",
        summary.shards,
        summary.sequences,
        summary.tokens,
        dir
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::shards::{MetadataFields, save_token_shards};

    fn metadata() -> MetadataFields {
        let mut fields = MetadataFields::new();
        fields.insert("source".to_string(), json!("unit-test"));
        fields
    }

    fn write_set(
        dir: &Path,
        n: usize,
        shard_size: usize,
    ) {
        let sequences: Vec<Vec<u32>> = (0..n).map(|i| vec![2, i as u32 + 4, 3]).collect();
        save_token_shards(sequences, dir, shard_size, Some(&metadata())).unwrap();
    }

    #[test]
    fn test_list_token_shards() {
        let dir = tempdir::TempDir::new("wordbale_reader").unwrap();
        write_set(dir.path(), 5, 2);
        fs::write(dir.path().join("README.txt"), "ignored").unwrap();
        fs::write(dir.path().join(".tokens_0003.bin.tmp"), "ignored").unwrap();

        let options = ShardWriterOptions::default();
        let shards = list_token_shards(dir.path(), &options).unwrap();
        let indices: Vec<usize> = shards.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(shards[2].1, dir.path().join("tokens_0002.bin"));
    }

    #[test]
    fn test_verify_ok() {
        let dir = tempdir::TempDir::new("wordbale_reader").unwrap();
        write_set(dir.path(), 5, 2);

        let summary = verify_shard_dir(dir.path(), &ShardWriterOptions::default()).unwrap();
        assert_eq!(
            summary,
            ShardSetSummary {
                shards: 3,
                shard_size: 2,
                sequences: 5,
                tokens: 15,
                sidecars: 3,
            }
        );

        let empty = tempdir::TempDir::new("wordbale_reader").unwrap();
        assert_eq!(
            verify_shard_dir(empty.path(), &ShardWriterOptions::default()).unwrap(),
            ShardSetSummary::default()
        );
    }

    #[test]
    fn test_verify_gap() {
        let dir = tempdir::TempDir::new("wordbale_reader").unwrap();
        write_set(dir.path(), 3, 1);
        fs::remove_file(dir.path().join("tokens_0001.bin")).unwrap();
        fs::remove_file(dir.path().join("tokens_0001.json")).unwrap();

        let err = verify_shard_dir(dir.path(), &ShardWriterOptions::default()).unwrap_err();
        assert!(matches!(err, WordbaleError::Integrity(_)));
        assert!(err.to_string().contains("tokens_0002.bin"));
    }

    #[test]
    fn test_verify_count_mismatch() {
        let dir = tempdir::TempDir::new("wordbale_reader").unwrap();
        write_set(dir.path(), 2, 2);
        fs::write(
            dir.path().join("tokens_0000.json"),
            r#"{"count": 7, "source": "unit-test"}"#,
        )
        .unwrap();

        let err = verify_shard_dir(dir.path(), &ShardWriterOptions::default()).unwrap_err();
        assert!(matches!(err, WordbaleError::Integrity(_)));
        assert!(err.to_string().contains("count 7"));
    }

    #[test]
    fn test_verify_uneven_shards() {
        let dir = tempdir::TempDir::new("wordbale_reader").unwrap();
        save_token_shards(vec![vec![1u32]], dir.path(), 1, None).unwrap();
        let options = ShardWriterOptions::new(2);
        crate::shards::commit_shard(dir.path(), &options, 1, &[vec![1], vec![2]], None).unwrap();

        assert!(matches!(
            verify_shard_dir(dir.path(), &options),
            Err(WordbaleError::Integrity(_))
        ));
    }

    #[test]
    fn test_verify_orphan_sidecar() {
        let dir = tempdir::TempDir::new("wordbale_reader").unwrap();
        write_set(dir.path(), 1, 1);
        fs::write(dir.path().join("tokens_0001.json"), r#"{"count": 1}"#).unwrap();

        assert!(matches!(
            verify_shard_dir(dir.path(), &ShardWriterOptions::default()),
            Err(WordbaleError::Integrity(_))
        ));
    }
}
