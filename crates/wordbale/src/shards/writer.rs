//! # Shard Writer

use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use crate::{
    errors::{WBResult, WordbaleError},
    shards::{
        MetadataFields,
        ShardMetadata,
        ShardWriterOptions,
        format::write_token_shard,
    },
    types::TokenSequence,
};

/// The hidden temp path used while writing `path`.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// Write a temp file through `write`, then flush and sync it.
///
/// The temp file is removed if any step fails.
fn write_temp<F>(
    tmp: &Path,
    write: F,
) -> WBResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> WBResult<()>,
{
    let result = (|| {
        let file = File::create(tmp).map_err(|e| WordbaleError::storage(tmp, e))?;
        let mut writer = BufWriter::new(file);
        write(&mut writer).map_err(|e| match e {
            WordbaleError::Io(e) => WordbaleError::storage(tmp, e),
            other => other,
        })?;
        let file = writer
            .into_inner()
            .map_err(|e| WordbaleError::storage(tmp, e.into_error()))?;
        file.sync_all().map_err(|e| WordbaleError::storage(tmp, e))
    })();

    if result.is_err() {
        let _ = fs::remove_file(tmp);
    }
    result
}

fn rename(
    from: &Path,
    to: &Path,
) -> WBResult<()> {
    fs::rename(from, to).map_err(|e| WordbaleError::storage(to, e))
}

/// Persist one shard and its optional sidecar as a single step.
///
/// Both artifacts are written to hidden temp files first. Then any stale
/// sidecar is removed, the data file is renamed into place, and the sidecar
/// is renamed last; a visible sidecar always matches the visible data.
///
/// ## Arguments
/// * `output_dir` - the shard directory; must exist.
/// * `options` - the shard naming options.
/// * `index` - the shard index.
/// * `sequences` - the shard contents.
/// * `metadata` - the sidecar fields; `None` writes no sidecar.
///
/// ## Returns
/// The data artifact path.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(options, sequences, metadata)))]
pub fn commit_shard(
    output_dir: &Path,
    options: &ShardWriterOptions,
    index: usize,
    sequences: &[TokenSequence],
    metadata: Option<&MetadataFields>,
) -> WBResult<PathBuf> {
    let data_path = output_dir.join(options.data_file_name(index));
    let sidecar_path = output_dir.join(options.sidecar_file_name(index));

    let data_tmp = temp_path(&data_path);
    write_temp(&data_tmp, |w| Ok(write_token_shard(w, sequences)?))?;

    let sidecar_tmp = match metadata {
        Some(fields) => {
            let tmp = temp_path(&sidecar_path);
            let record = ShardMetadata::new(sequences.len(), fields);
            if let Err(e) = write_temp(&tmp, |w| record.write_to(w)) {
                let _ = fs::remove_file(&data_tmp);
                return Err(e);
            }
            Some(tmp)
        }
        None => None,
    };

    let commit = || -> WBResult<()> {
        match fs::remove_file(&sidecar_path) {
            Ok(()) => {
                log::debug!("removed stale sidecar {:?}", sidecar_path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (),
            Err(e) => return Err(WordbaleError::storage(&sidecar_path, e)),
        }
        rename(&data_tmp, &data_path)?;
        if let Some(tmp) = &sidecar_tmp {
            rename(tmp, &sidecar_path)?;
        }
        Ok(())
    };
    if let Err(e) = commit() {
        let _ = fs::remove_file(&data_tmp);
        if let Some(tmp) = &sidecar_tmp {
            let _ = fs::remove_file(tmp);
        }
        return Err(e);
    }

    log::debug!(
        "committed shard {} ({} sequences): {:?}",
        index,
        sequences.len(),
        data_path
    );
    Ok(data_path)
}

/// Streams token sequences into fixed-size shards.
///
/// Sequences accumulate until `shard_size` are pending, then the shard is
/// committed with [`commit_shard`]. [`ShardWriter::finish`] commits the
/// non-empty remainder. Indices run ``0, 1, 2, ...`` in commit order.
#[derive(Debug)]
pub struct ShardWriter {
    output_dir: PathBuf,
    options: ShardWriterOptions,
    metadata: Option<MetadataFields>,
    pending: Vec<TokenSequence>,
    written: Vec<PathBuf>,
    sequences_written: usize,
}

impl ShardWriter {
    /// Create a writer, creating `output_dir` and its parents.
    ///
    /// ## Arguments
    /// * `output_dir` - the shard directory.
    /// * `options` - the shard size and naming.
    /// * `metadata` - sidecar fields; `None` or an empty map writes no sidecars.
    ///
    /// ## Errors
    /// * [`WordbaleError::InvalidConfiguration`] if the options are invalid.
    /// * [`WordbaleError::Storage`] if the directory cannot be created.
    pub fn new<P: AsRef<Path>>(
        output_dir: P,
        options: ShardWriterOptions,
        metadata: Option<MetadataFields>,
    ) -> WBResult<Self> {
        options.validate()?;

        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir).map_err(|e| WordbaleError::storage(&output_dir, e))?;

        Ok(Self {
            output_dir,
            metadata: metadata.filter(|m| !m.is_empty()),
            pending: Vec::with_capacity(options.shard_size.min(1 << 16)),
            options,
            written: Vec::new(),
            sequences_written: 0,
        })
    }

    /// The shard directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The data artifact paths committed so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// The number of sequences committed so far.
    pub fn sequences_written(&self) -> usize {
        self.sequences_written
    }

    /// Add one sequence, committing a shard when it fills.
    pub fn push<S: Into<TokenSequence>>(
        &mut self,
        sequence: S,
    ) -> WBResult<()> {
        self.pending.push(sequence.into());
        if self.pending.len() >= self.options.shard_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Add every sequence of `sequences`.
    pub fn extend<I>(
        &mut self,
        sequences: I,
    ) -> WBResult<()>
    where
        I: IntoIterator,
        I::Item: Into<TokenSequence>,
    {
        for sequence in sequences {
            self.push(sequence)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> WBResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let index = self.written.len();
        let path = commit_shard(
            &self.output_dir,
            &self.options,
            index,
            &self.pending,
            self.metadata.as_ref(),
        )?;
        self.sequences_written += self.pending.len();
        self.pending.clear();
        self.written.push(path);
        Ok(())
    }

    /// Commit any remaining sequences.
    ///
    /// ## Returns
    /// The data artifact paths, in index order.
    pub fn finish(mut self) -> WBResult<Vec<PathBuf>> {
        self.flush()?;
        log::info!(
            "Wrote {} sequences in {} shards to {:?}",
            self.sequences_written,
            self.written.len(),
            self.output_dir
        );
        Ok(self.written)
    }
}

/// Group sequences into shards of `shard_size` and persist them.
///
/// ## Arguments
/// * `sequences` - the sequences, in output order.
/// * `output_dir` - the shard directory; created with its parents.
/// * `shard_size` - sequences per shard; must be ``>= 1``.
/// * `metadata` - sidecar fields; `None` or an empty map writes no sidecars.
///
/// ## Returns
/// The data artifact paths, in index order; empty for empty input.
///
/// ## Errors
/// * [`WordbaleError::InvalidConfiguration`] if `shard_size` is zero.
/// * [`WordbaleError::Storage`] if the directory or an artifact cannot be
///   written; shards committed before the failure remain on disk.
pub fn save_token_shards<I, P>(
    sequences: I,
    output_dir: P,
    shard_size: usize,
    metadata: Option<&MetadataFields>,
) -> WBResult<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: Into<TokenSequence>,
    P: AsRef<Path>,
{
    let options = ShardWriterOptions::new(shard_size);
    let mut writer = ShardWriter::new(output_dir, options, metadata.cloned())?;
    writer.extend(sequences)?;
    writer.finish()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::shards::{read_shard_metadata, read_token_shard};

    fn unit_test_metadata() -> MetadataFields {
        let mut fields = MetadataFields::new();
        fields.insert("source".to_string(), json!("unit-test"));
        fields
    }

    #[test]
    fn test_fixed_window_grouping() {
        let dir = tempdir::TempDir::new("wordbale_shards").unwrap();
        let sequences: Vec<TokenSequence> = vec![vec![1], vec![2, 2], vec![3, 3, 3]];

        let paths = save_token_shards(
            sequences.clone(),
            dir.path(),
            2,
            Some(&unit_test_metadata()),
        )
        .unwrap();

        assert_eq!(
            paths,
            vec![
                dir.path().join("tokens_0000.bin"),
                dir.path().join("tokens_0001.bin")
            ]
        );
        assert_eq!(read_token_shard(&paths[0]).unwrap(), sequences[..2].to_vec());
        assert_eq!(read_token_shard(&paths[1]).unwrap(), sequences[2..].to_vec());

        let meta = read_shard_metadata(dir.path().join("tokens_0000.json")).unwrap();
        assert_eq!(meta.count, 2);
        assert_eq!(meta.fields, unit_test_metadata());
        let meta = read_shard_metadata(dir.path().join("tokens_0001.json")).unwrap();
        assert_eq!(meta.count, 1);
    }

    #[test]
    fn test_empty_input() {
        let dir = tempdir::TempDir::new("wordbale_shards").unwrap();
        let out = dir.path().join("nested").join("out");

        let empty: Vec<TokenSequence> = vec![];
        let paths = save_token_shards(empty, &out, 4, Some(&unit_test_metadata())).unwrap();

        assert!(paths.is_empty());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_zero_shard_size() {
        let dir = tempdir::TempDir::new("wordbale_shards").unwrap();
        let result = save_token_shards(vec![vec![1u32]], dir.path(), 0, None);
        assert!(matches!(result, Err(WordbaleError::InvalidConfiguration(_))));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_no_sidecar_without_metadata() {
        let dir = tempdir::TempDir::new("wordbale_shards").unwrap();

        save_token_shards(vec![vec![1u32]], dir.path(), 1, None).unwrap();
        save_token_shards(vec![vec![1u32]], dir.path().join("b"), 1, Some(&MetadataFields::new()))
            .unwrap();

        assert!(dir.path().join("tokens_0000.bin").exists());
        assert!(!dir.path().join("tokens_0000.json").exists());
        assert!(!dir.path().join("b").join("tokens_0000.json").exists());
    }

    #[test]
    fn test_rewrite_removes_stale_sidecar() {
        let dir = tempdir::TempDir::new("wordbale_shards").unwrap();

        save_token_shards(vec![vec![1u32], vec![2]], dir.path(), 2, Some(&unit_test_metadata()))
            .unwrap();
        assert!(dir.path().join("tokens_0000.json").exists());

        save_token_shards(vec![vec![7u32]], dir.path(), 2, None).unwrap();
        assert_eq!(
            read_token_shard(dir.path().join("tokens_0000.bin")).unwrap(),
            vec![vec![7]]
        );
        assert!(!dir.path().join("tokens_0000.json").exists());

        // No temp files are left behind.
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().all(|n| !n.starts_with('.')));
    }

    #[test]
    fn test_streaming_writer() {
        let dir = tempdir::TempDir::new("wordbale_shards").unwrap();
        let mut writer =
            ShardWriter::new(dir.path(), ShardWriterOptions::new(3).with_file_prefix("s-"), None)
                .unwrap();

        for i in 0..7u32 {
            writer.push(vec![i; i as usize]).unwrap();
        }
        assert_eq!(writer.written().len(), 2);
        assert_eq!(writer.sequences_written(), 6);

        let paths = writer.finish().unwrap();
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[2], dir.path().join("s-0002.bin"));
        assert_eq!(read_token_shard(&paths[2]).unwrap(), vec![vec![6; 6]]);
    }

    #[cfg(unix)]
    #[test]
    fn test_storage_error_names_path() {
        let dir = tempdir::TempDir::new("wordbale_shards").unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let err = save_token_shards(vec![vec![1u32]], blocker.join("out"), 1, None).unwrap_err();
        assert!(matches!(err, WordbaleError::Storage { .. }));
        assert!(err.to_string().contains("blocker"));
    }

    proptest::proptest! {
        #![proptest_config(proptest::prelude::ProptestConfig::with_cases(32))]

        #[test]
        fn shard_count_and_order(
            lens in proptest::collection::vec(0usize..5, 0..20),
            shard_size in 1usize..6,
        ) {
            let dir = tempdir::TempDir::new("wordbale_shards").unwrap();
            let sequences: Vec<TokenSequence> = lens
                .iter()
                .enumerate()
                .map(|(i, &len)| vec![i as u32; len])
                .collect();

            let paths = save_token_shards(
                sequences.clone(),
                dir.path(),
                shard_size,
                Some(&unit_test_metadata()),
            )
            .unwrap();
            proptest::prop_assert_eq!(paths.len(), sequences.len().div_ceil(shard_size));

            let mut restored = Vec::new();
            for (i, path) in paths.iter().enumerate() {
                let shard = read_token_shard(path).unwrap();
                let meta = read_shard_metadata(path.with_extension("json")).unwrap();
                proptest::prop_assert_eq!(meta.count, shard.len());
                if i + 1 < paths.len() {
                    proptest::prop_assert_eq!(shard.len(), shard_size);
                }
                restored.extend(shard);
            }
            proptest::prop_assert_eq!(restored, sequences);
        }
    }
}
