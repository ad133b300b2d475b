//! # Token Encoder Trait

use std::sync::Arc;

use crate::{types::TokenType, vocab::TokenizerModel};

/// A trait for token encoders.
pub trait TokenEncoder<T: TokenType>: Send + Sync {
    /// Return the attached model.
    fn model(&self) -> &Arc<TokenizerModel<T>>;

    /// Encode a span appending to a target buffer.
    ///
    /// ## Arguments
    /// * `span` - The text span to encode.
    /// * `tokens` - The target token buffer to append to.
    fn encode_append_span(
        &self,
        span: &str,
        tokens: &mut Vec<T>,
    );

    /// Encode text appending to a target buffer.
    ///
    /// ## Arguments
    /// * `text` - The string slice to encode.
    /// * `tokens` - The target token buffer to append to.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, text, tokens)))]
    fn encode_append(
        &self,
        text: &str,
        tokens: &mut Vec<T>,
    ) {
        for span in self.model().regex().find_spans(text) {
            self.encode_append_span(span, tokens);
        }
    }

    /// Encode text into tokens.
    ///
    /// ## Arguments
    /// * `text` - The text to encode.
    ///
    /// ## Returns
    /// A vector of tokens.
    fn encode<S: AsRef<str>>(
        &self,
        text: S,
    ) -> Vec<T>
    where
        Self: Sized,
    {
        let text = text.as_ref();
        let mut tokens = Vec::with_capacity(text.len() / 2);
        self.encode_append(text, &mut tokens);
        tokens
    }
}
