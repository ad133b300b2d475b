use std::path::PathBuf;

use anyhow::Context;
use wordbale::{
    regex::DEFAULT_SPLIT_PATTERN,
    training::{DEFAULT_CHARACTER_COVERAGE, DEFAULT_VOCAB_SIZE, TrainerOptions, train_tokenizer},
};

use crate::logging::LogArgs;

/// The artifact prefix written under `--output-dir`.
const MODEL_PREFIX: &str = "spm";

/// Args for the train command.
#[derive(clap::Args, Debug)]
pub struct TrainArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    /// Cleaned corpus path.
    #[arg(long, default_value = "data_clean/corpus.txt")]
    corpus: PathBuf,

    /// Directory to store tokenizer artifacts.
    #[arg(long, default_value = "tokenizer")]
    output_dir: PathBuf,

    /// Vocabulary size, including the special tokens.
    #[arg(long, default_value_t = DEFAULT_VOCAB_SIZE)]
    vocab_size: usize,

    /// Fraction of corpus characters the alphabet must cover.
    #[arg(long, default_value_t = DEFAULT_CHARACTER_COVERAGE)]
    character_coverage: f64,

    /// Span split regex.
    #[arg(long, default_value_t = DEFAULT_SPLIT_PATTERN.to_string())]
    regex: String,
}

impl TrainArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        self.logging.setup_logging(3)?;

        let options = TrainerOptions::new(self.vocab_size)
            .with_character_coverage(self.character_coverage)
            .with_pattern(self.regex.clone());

        let artifacts = train_tokenizer(&self.corpus, self.output_dir.join(MODEL_PREFIX), &options)
            .with_context(|| format!("training tokenizer on {:?}", self.corpus))?;

        println!(
            "Trained tokenizer with {} tokens: {}, {}",
            artifacts.model.len(),
            artifacts.model_path.display(),
            artifacts.vocab_path.display()
        );
        Ok(())
    }
}
