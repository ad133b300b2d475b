//! # Vocabulary Training
//!
//! Support for training char-level BPE tokenizer models.
//!
//! Training proceeds in three steps:
//! * span counting - sample text is split by the model's regex pattern,
//!   and each distinct span is counted;
//! * alphabet selection - chars are ranked by frequency, and the
//!   shortest prefix reaching [`TrainerOptions::character_coverage`] becomes
//!   the alphabet; other chars encode as ``<unk>``;
//! * merge learning - the most frequent adjacent pair is merged into a new
//!   token until [`TrainerOptions::vocab_size`] is reached, or the corpus
//!   has no pairs left.
//!
//! [`train_tokenizer`] runs this over a corpus file and writes the
//! ``{prefix}.model`` / ``{prefix}.vocab`` pair.
//!
//! ```rust,no_run
//! use wordbale::training::{TrainerOptions, train_tokenizer};
//!
//! fn example() -> wordbale::WBResult<()> {
//!     let options = TrainerOptions::new(32_000).with_character_coverage(0.9995);
//!     let artifacts = train_tokenizer("data_clean/corpus.txt", "tokenizer/spm", &options)?;
//!     println!("- model: {:?}", artifacts.model_path);
//!     Ok(())
//! }
//! ```

pub mod utility;

mod bpe_trainer;
mod tokenizer_trainer;
mod training_types;

#[doc(inline)]
pub use bpe_trainer::{
    BinaryPairVocabTrainer,
    DEFAULT_CHARACTER_COVERAGE,
    DEFAULT_VOCAB_SIZE,
    MergeJob,
    TrainerOptions,
};
#[doc(inline)]
pub use tokenizer_trainer::{TokenizerArtifacts, train_tokenizer};
#[doc(inline)]
pub use training_types::{CountType, StringChunkType};
