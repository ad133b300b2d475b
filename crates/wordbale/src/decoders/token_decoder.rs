//! # Piece Table Token Decoder

use std::sync::Arc;

use crate::{
    errors::{WBResult, WordbaleError},
    types::TokenType,
    vocab::{SpecialToken, TokenizerModel},
};

/// The text rendered for each ``<unk>`` token.
pub const UNK_SURFACE: &str = " \u{2047} ";

/// Decodes token sequences back into text through the model's piece table.
///
/// * ``<pad>``, ``<s>`` and ``</s>`` decode to nothing;
/// * ``<unk>`` decodes to [`UNK_SURFACE`];
/// * every other token decodes to its piece.
#[derive(Debug, Clone)]
pub struct TokenDecoder<T: TokenType> {
    model: Arc<TokenizerModel<T>>,
}

impl<T: TokenType> TokenDecoder<T> {
    /// Create a decoder for `model`.
    pub fn new(model: Arc<TokenizerModel<T>>) -> Self {
        Self { model }
    }

    /// The bound model.
    pub fn model(&self) -> &Arc<TokenizerModel<T>> {
        &self.model
    }

    /// Decode tokens, appending to a target buffer.
    ///
    /// ## Arguments
    /// * `tokens` - the tokens to decode.
    /// * `buf` - the target text buffer.
    ///
    /// ## Errors
    /// [`WordbaleError::TokenOutOfRange`] for a token outside the model.
    pub fn decode_append(
        &self,
        tokens: &[T],
        buf: &mut String,
    ) -> WBResult<()> {
        let specials = self.model.specials();
        for &t in tokens {
            match specials.lookup(t) {
                Some(SpecialToken::Pad | SpecialToken::Bos | SpecialToken::Eos) => (),
                Some(SpecialToken::Unk) => buf.push_str(UNK_SURFACE),
                None => {
                    let piece = self
                        .model
                        .piece(t)
                        .ok_or_else(|| WordbaleError::TokenOutOfRange(t.to_u64().unwrap_or(u64::MAX)))?;
                    buf.push_str(piece);
                }
            }
        }
        Ok(())
    }

    /// Decode tokens into a string.
    pub fn decode(
        &self,
        tokens: &[T],
    ) -> WBResult<String> {
        let mut buf = String::with_capacity(tokens.len() * 4);
        self.decode_append(tokens, &mut buf)?;
        Ok(buf)
    }

    /// Decode a batch of token sequences.
    pub fn decode_batch<V: AsRef<[T]>>(
        &self,
        batch: &[V],
    ) -> WBResult<Vec<String>> {
        batch.iter().map(|tokens| self.decode(tokens.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        encoders::{BatchEncoder, BoundaryMarkers},
        vocab::testing::toy_model,
    };

    #[test]
    fn test_decode() {
        let decoder = TokenDecoder::new(toy_model().into());

        assert_eq!(decoder.decode(&[15, 8, 9, 5, 10, 4, 11]).unwrap(), "hello world");
        assert_eq!(decoder.decode(&[0, 2, 15, 3, 0]).unwrap(), "hello");
        assert_eq!(decoder.decode(&[6, 1]).unwrap(), "h \u{2047} ");
        assert_eq!(decoder.decode(&[]).unwrap(), "");
    }

    #[test]
    fn test_decode_out_of_range() {
        let decoder = TokenDecoder::new(toy_model().into());
        assert!(matches!(
            decoder.decode(&[15, 16]),
            Err(WordbaleError::TokenOutOfRange(16))
        ));
    }

    #[test]
    fn test_decode_batch_roundtrip() {
        let model: Arc<TokenizerModel<u32>> = toy_model().into();
        let encoder = BatchEncoder::new(model.clone());
        let decoder = TokenDecoder::new(model);

        let texts = ["hello world", "", "hold the door"];
        let batch = encoder.encode_batch_with(&texts, BoundaryMarkers::BOTH);
        let decoded = decoder.decode_batch(&batch).unwrap();

        assert_eq!(decoded[0], "hello world");
        assert_eq!(decoded[1], "");
        // 't' is outside the alphabet.
        assert_eq!(decoded[2], "hold  \u{2047} he door");
    }
}
