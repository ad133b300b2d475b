//! # Token Decoders
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use wordbale::{decoders::TokenDecoder, vocab::TokenizerModel};
//!
//! fn example(
//!     model: Arc<TokenizerModel<u32>>,
//!     batch: &[Vec<u32>],
//! ) -> wordbale::WBResult<Vec<String>> {
//!     TokenDecoder::new(model).decode_batch(batch)
//! }
//! ```

mod token_decoder;

#[doc(inline)]
pub use token_decoder::{TokenDecoder, UNK_SURFACE};
