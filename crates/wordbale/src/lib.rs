//! # `wordbale` Token-Shard Production
//!
//! `wordbale` turns raw text into fixed-size shards of token sequences
//! for language-model pretraining.
//!
//! The pipeline is:
//! ```terminaloutput
//! raw *.txt -> corpus -> tokenizer model -> token sequences -> shards
//! ```
//!
//! See:
//! * [`corpus`] to clean raw text files into one corpus.
//! * [`training`] to train a character-level BPE [`vocab::TokenizerModel`].
//! * [`encoders`] to encode batches of text with a [`BatchEncoder`].
//! * [`shards`] to write, read, and verify token shards.
//! * [`decoders`] to decode tokens back into text.
//!
//! ## Crate Features
//!
#![doc = document_features::document_features!()]
//!
//! ## Example
//!
//! ```rust,no_run
//! use wordbale::{
//!     BatchEncoder,
//!     save_token_shards,
//!     shards::MetadataFields,
//!     training::{TrainerOptions, train_tokenizer},
//! };
//!
//! fn example() -> wordbale::WBResult<()> {
//!     wordbale::corpus::ingest_corpus("data_raw", "data_clean/corpus.txt", false)?;
//!
//!     let options = TrainerOptions::default().with_vocab_size(8000);
//!     let artifacts = train_tokenizer("data_clean/corpus.txt", "tokenizer/spm", &options)?;
//!
//!     let encoder = BatchEncoder::open(&artifacts.model_path)?;
//!     let sequences = encoder.encode_batch(&["hello world", "test line"]);
//!
//!     let mut meta = MetadataFields::new();
//!     meta.insert("source".to_string(), "unit-test".into());
//!     let paths = save_token_shards(sequences, "shards", 1, Some(&meta))?;
//!     assert_eq!(paths.len(), 2);
//!     Ok(())
//! }
//! ```
#![warn(missing_docs, unused)]

pub mod corpus;
pub mod decoders;
pub mod encoders;
pub mod errors;
pub mod regex;
pub mod shards;
pub mod training;
pub mod types;
pub mod vocab;

#[doc(inline)]
pub use decoders::TokenDecoder;
#[doc(inline)]
pub use encoders::{BatchEncoder, BoundaryMarkers};
#[doc(inline)]
pub use errors::{WBResult, WordbaleError};
#[doc(inline)]
pub use shards::{ShardWriter, ShardWriterOptions, save_token_shards};
#[doc(inline)]
pub use types::{TokenId, TokenSequence};
