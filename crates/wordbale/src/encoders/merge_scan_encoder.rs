//! # Merge Scan Encoder
//!
//! Incrementally re-scans for the best available merge,
//! iterates until no more merges remain.

use std::sync::Arc;

use crate::{encoders::TokenEncoder, types::TokenType, vocab::TokenizerModel};

/// A [`TokenEncoder`] which incrementally scans for merges.
///
/// Each span is mapped onto alphabet tokens (``<unk>`` outside the alphabet),
/// then the lowest ranked merge is applied until none applies.
#[derive(Debug, Clone)]
pub struct MergeScanEncoder<T: TokenType> {
    model: Arc<TokenizerModel<T>>,
}

impl<T: TokenType> MergeScanEncoder<T> {
    /// Create a new encoder bound to `model`.
    pub fn new(model: Arc<TokenizerModel<T>>) -> Self {
        Self { model }
    }
}

impl<T: TokenType> TokenEncoder<T> for MergeScanEncoder<T> {
    fn model(&self) -> &Arc<TokenizerModel<T>> {
        &self.model
    }

    fn encode_append_span(
        &self,
        span: &str,
        tokens: &mut Vec<T>,
    ) {
        let model = &self.model;

        // Reuse the output buffer as our working memory.
        let start = tokens.len();
        model
            .char_vocab()
            .append_tokens(span, model.specials().unk(), tokens);

        let stop = start + 2;
        while tokens.len() >= stop {
            // Find the lowest ranked merge available.
            if let Some((token, idx)) = tokens[start..]
                .windows(2)
                .enumerate()
                .filter_map(|(idx, w)| model.lookup_pair(&(w[0], w[1])).map(|token| (token, idx)))
                .min()
            {
                let idx = start + idx;

                // buf[idx..=idx+1] (a, b) -> buf[idx] t
                tokens[idx] = token;
                tokens.remove(idx + 1);
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::testing::toy_model;

    fn static_is_send_sync_check<E: Send + Sync>(_: &E) {}

    #[test]
    fn test_encode() {
        let encoder = MergeScanEncoder::new(toy_model().into());
        static_is_send_sync_check(&encoder);

        assert_eq!(encoder.encode("hello"), vec![15]);
        assert_eq!(encoder.encode("hello world"), vec![15, 8, 9, 5, 10, 4, 11]);
        assert_eq!(encoder.encode("lol"), vec![12, 4]);
        assert!(encoder.encode("").is_empty());
    }

    #[test]
    fn test_encode_unknown_chars() {
        let encoder = MergeScanEncoder::new(toy_model().into());

        // 'i' and '!' are outside the alphabet.
        assert_eq!(encoder.encode("hi!"), vec![6, 1, 1]);
        assert_eq!(encoder.encode("hexlo"), vec![13, 1, 12]);
    }
}
