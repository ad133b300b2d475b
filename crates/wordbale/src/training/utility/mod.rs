//! # Trainer Implementation Utilities

mod char_coverage;
#[doc(inline)]
pub use char_coverage::{select_alphabet, validate_character_coverage};

mod pair_span_index;
#[doc(inline)]
pub use pair_span_index::{PairCountMap, PairIndexMap, PairSpanIndex};

mod text_span_counter;
#[doc(inline)]
pub use text_span_counter::{TextSpanCounter, TextSpanCounterOptions};

mod token_span_buffer;
#[doc(inline)]
pub use token_span_buffer::TokenSpanBuf;
