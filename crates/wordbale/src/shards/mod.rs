//! # Token Shards
//!
//! Fixed-size, metadata-tagged shards of [`crate::types::TokenSequence`]s.
//!
//! A run of [`save_token_shards`] (or a [`ShardWriter`]) groups its input into
//! windows of `shard_size` sequences. Shard `i` is written as
//! ``tokens_{i:04}.bin`` (see [`format`]) plus, when metadata is supplied,
//! a ``tokens_{i:04}.json`` sidecar holding ``{count} ∪ metadata``.
//!
//! ## Example
//!
//! ```rust,no_run
//! use wordbale::shards::{MetadataFields, save_token_shards, verify_shard_dir};
//!
//! fn example() -> wordbale::WBResult<()> {
//!     let mut meta = MetadataFields::new();
//!     meta.insert("source".to_string(), "unit-test".into());
//!
//!     let sequences = vec![vec![2, 10, 3], vec![2, 11, 12, 3], vec![2, 3]];
//!     let paths = save_token_shards(sequences, "shards", 2, Some(&meta))?;
//!     assert_eq!(paths.len(), 2);
//!
//!     let summary = verify_shard_dir("shards", &Default::default())?;
//!     assert_eq!(summary.sequences, 3);
//!     Ok(())
//! }
//! ```

pub mod format;
mod metadata;
mod reader;
mod shard_options;
mod writer;

#[doc(inline)]
pub use format::{read_token_shard, write_token_shard};
#[doc(inline)]
pub use metadata::*;
#[doc(inline)]
pub use reader::*;
#[doc(inline)]
pub use shard_options::*;
#[doc(inline)]
pub use writer::*;
