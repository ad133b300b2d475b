//! # Token Encoders
//!
//! ## Example
//!
//! ```rust,no_run
//! use wordbale::encoders::{BatchEncoder, BoundaryMarkers};
//!
//! fn example(batch: &[&str]) -> wordbale::WBResult<Vec<Vec<u32>>> {
//!     let encoder = BatchEncoder::open("tokenizer/spm.model")?;
//!     Ok(encoder.encode_batch_with(batch, BoundaryMarkers::BOTH))
//! }
//! ```

mod batch_encoder;
mod merge_scan_encoder;
mod token_encoder;

#[doc(inline)]
pub use batch_encoder::{BatchEncoder, BoundaryMarkers};
#[doc(inline)]
pub use merge_scan_encoder::MergeScanEncoder;
#[doc(inline)]
pub use token_encoder::TokenEncoder;
