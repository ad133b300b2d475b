//! # Corpus to Tokenizer Artifacts

use std::{
    fs::{self, File},
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    sync::Arc,
};

use compact_str::CompactString;

use crate::{
    errors::{WBResult, WordbaleError},
    training::{BinaryPairVocabTrainer, TrainerOptions},
    types::TokenId,
    vocab::{
        SpecialVocab,
        TokenizerModel,
        io::{save_model_path, save_vocab_listing_path},
    },
};

/// Lines handed to the trainer per batch.
const SAMPLE_BATCH_SIZE: usize = 4096;

/// The files written by [`train_tokenizer`].
#[derive(Debug, Clone)]
pub struct TokenizerArtifacts {
    /// ``{prefix}.model``.
    pub model_path: PathBuf,

    /// ``{prefix}.vocab``.
    pub vocab_path: PathBuf,

    /// The trained model.
    pub model: Arc<TokenizerModel<TokenId>>,
}

/// Append `ext` to a path prefix, keeping any dots in its file name.
fn with_suffix(
    prefix: &Path,
    ext: &str,
) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Train a tokenizer over a corpus file and save it.
///
/// Each corpus line is one training sample.
///
/// ## Arguments
/// * `corpus_path` - the normalized corpus.
/// * `model_prefix` - output path prefix; parent directories are created.
/// * `options` - the trainer options.
///
/// ## Returns
/// The written artifact paths and the trained model.
///
/// ## Errors
/// * [`WordbaleError::CorpusNotFound`] if the corpus cannot be opened.
/// * [`WordbaleError::CorpusEmpty`] if the corpus has no text.
/// * [`WordbaleError::InvalidConfiguration`] for bad options.
/// * [`WordbaleError::Storage`] if the artifacts cannot be written.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
pub fn train_tokenizer<P, Q>(
    corpus_path: P,
    model_prefix: Q,
    options: &TrainerOptions,
) -> WBResult<TokenizerArtifacts>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let corpus_path = corpus_path.as_ref();
    let model_prefix = model_prefix.as_ref();

    let mut trainer: BinaryPairVocabTrainer<CompactString, u64> = options.clone().init()?;

    let file = File::open(corpus_path).map_err(|_| WordbaleError::CorpusNotFound {
        path: corpus_path.to_path_buf(),
    })?;
    log::info!(
        "Training tokenizer on {:?}: vocab_size={}, character_coverage={}",
        corpus_path,
        options.vocab_size,
        options.character_coverage
    );

    let mut lines = 0usize;
    let mut batch: Vec<String> = Vec::with_capacity(SAMPLE_BATCH_SIZE);
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| WordbaleError::storage(corpus_path, e))?;
        if line.is_empty() {
            continue;
        }
        batch.push(line);
        if batch.len() == SAMPLE_BATCH_SIZE {
            lines += batch.len();
            trainer.update_from_samples(batch.drain(..));
        }
    }
    lines += batch.len();
    trainer.update_from_samples(batch);

    if trainer.is_empty() {
        return Err(WordbaleError::CorpusEmpty {
            path: corpus_path.to_path_buf(),
        });
    }
    log::info!("Counted spans over {lines} corpus lines");

    let model: Arc<TokenizerModel<TokenId>> = trainer.train(SpecialVocab::default())?.into();

    if let Some(parent) = model_prefix.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| WordbaleError::storage(parent, e))?;
    }

    let model_path = with_suffix(model_prefix, "model");
    let vocab_path = with_suffix(model_prefix, "vocab");
    save_model_path(&*model, &model_path)?;
    save_vocab_listing_path(&*model, &vocab_path)?;

    log::info!(
        "Saved tokenizer with {} tokens: {:?}, {:?}",
        model.len(),
        model_path,
        vocab_path
    );

    Ok(TokenizerArtifacts {
        model_path,
        vocab_path,
        model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::io::load_model_path;

    #[test]
    fn test_train_tokenizer_files() {
        let dir = tempdir::TempDir::new("wordbale_train").unwrap();
        let corpus = dir.path().join("corpus.txt");
        fs::write(&corpus, "hello world\nthis is a test\nhello again\n").unwrap();

        let prefix = dir.path().join("tokenizer").join("spm");
        let options = TrainerOptions::new(64).with_character_coverage(1.0);
        let artifacts = train_tokenizer(&corpus, &prefix, &options).unwrap();

        assert_eq!(artifacts.model_path, dir.path().join("tokenizer/spm.model"));
        assert_eq!(artifacts.vocab_path, dir.path().join("tokenizer/spm.vocab"));
        assert!(artifacts.vocab_path.exists());

        let vocab_lines = fs::read_to_string(&artifacts.vocab_path).unwrap().lines().count();
        assert_eq!(vocab_lines, artifacts.model.len());

        let loaded: TokenizerModel<TokenId> = load_model_path(&artifacts.model_path).unwrap();
        assert_eq!(
            loaded.pieces().collect::<Vec<_>>(),
            artifacts.model.pieces().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_train_tokenizer_missing_corpus() {
        let dir = tempdir::TempDir::new("wordbale_train").unwrap();
        let result = train_tokenizer(
            dir.path().join("missing.txt"),
            dir.path().join("spm"),
            &TrainerOptions::new(64),
        );
        assert!(matches!(result, Err(WordbaleError::CorpusNotFound { .. })));
    }

    #[test]
    fn test_train_tokenizer_empty_corpus() {
        let dir = tempdir::TempDir::new("wordbale_train").unwrap();
        let corpus = dir.path().join("corpus.txt");
        fs::write(&corpus, "\n\n").unwrap();

        let result = train_tokenizer(&corpus, dir.path().join("spm"), &TrainerOptions::new(64));
        assert!(matches!(result, Err(WordbaleError::CorpusEmpty { .. })));
    }
}
