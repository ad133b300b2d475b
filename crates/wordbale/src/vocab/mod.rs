//! # Vocabulary
//!
//! This module provides the tokenizer model and related io mechanisms.
//!
//! A [`TokenizerModel`] is built from:
//! * [`SpecialVocab`] - the reserved ``pad/unk/bos/eos`` tokens,
//! * [`CharMapVocab`] - the ``{ char <-> T }`` alphabet,
//! * [`PairMapVocab`] - the ``{ (T, T) -> T }`` learned merges.
//!
//! See [`io`] for the `.model` and `.vocab` file formats.

pub mod char_vocab;
pub mod io;
pub mod model;
pub mod pair_vocab;
pub mod special_vocab;

#[cfg(test)]
pub(crate) mod testing;

#[doc(inline)]
pub use char_vocab::CharMapVocab;
#[doc(inline)]
pub use model::TokenizerModel;
#[doc(inline)]
pub use pair_vocab::{PairMapVocab, PairTokenMap};
#[doc(inline)]
pub use special_vocab::{SpecialToken, SpecialVocab};
