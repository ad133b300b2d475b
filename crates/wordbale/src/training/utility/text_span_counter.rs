//! # Span Counter

use crate::{
    regex::RegexWrapper,
    training::{CountType, StringChunkType, utility::TokenSpanBuf},
    types::{TokenType, WBHashMap, hash_map_with_capacity},
    vocab::CharMapVocab,
};

/// Options for [`TextSpanCounter`].
#[derive(Debug, Clone)]
pub struct TextSpanCounterOptions {
    /// Initial capacity of the span count table.
    pub initial_capacity: usize,
}

impl Default for TextSpanCounterOptions {
    fn default() -> Self {
        Self {
            initial_capacity: 100_000,
        }
    }
}

impl TextSpanCounterOptions {
    /// Set the initial capacity of the span count table.
    pub fn with_initial_capacity(
        self,
        initial_capacity: usize,
    ) -> Self {
        Self { initial_capacity }
    }
}

/// Counts the regex spans of sample text.
pub struct TextSpanCounter<K, C>
where
    K: StringChunkType,
    C: CountType,
{
    /// The config options.
    pub options: TextSpanCounterOptions,

    /// The compiled regex pattern.
    pub regex: RegexWrapper,

    /// The span counts.
    pub span_counts: WBHashMap<K, C>,
}

impl<K, C> TextSpanCounter<K, C>
where
    K: StringChunkType,
    C: CountType,
{
    /// Create a new span counter.
    pub fn new(
        regex: RegexWrapper,
        options: TextSpanCounterOptions,
    ) -> Self {
        let span_counts = hash_map_with_capacity(options.initial_capacity);
        Self {
            options,
            regex,
            span_counts,
        }
    }

    /// Release the span counts and return them.
    pub fn release(self) -> WBHashMap<K, C> {
        self.span_counts
    }

    /// Update span counts inplace from text.
    pub fn update_from_text<S: AsRef<str>>(
        &mut self,
        text: S,
    ) {
        let span_counts = &mut self.span_counts;
        for span in self.regex.find_spans(text.as_ref()) {
            let k: K = span.into();
            *span_counts.entry(k).or_default() += C::one();
        }
    }

    /// Update span counts inplace from a sample iterator.
    pub fn update_from_samples<I>(
        &mut self,
        samples: I,
    ) where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for sample in samples {
            self.update_from_text(sample);
        }
    }

    /// The total occurrence count of every char in the counted spans.
    pub fn char_counts(&self) -> WBHashMap<char, C> {
        let mut counts: WBHashMap<char, C> = hash_map_with_capacity(256);
        for (span, &count) in &self.span_counts {
            for c in span.as_ref().chars() {
                *counts.entry(c).or_default() += count;
            }
        }
        counts
    }

    /// Convert the span counts to a [`TokenSpanBuf<T>`] count table.
    ///
    /// Each span is cut at chars outside `char_vocab`;
    /// equal runs from different spans share one entry.
    ///
    /// ## Arguments
    /// * `char_vocab` - the alphabet to use for char translation.
    pub fn to_text_span_counts<T: TokenType>(
        &self,
        char_vocab: &CharMapVocab<T>,
    ) -> WBHashMap<TokenSpanBuf<T>, C> {
        let mut table: WBHashMap<TokenSpanBuf<T>, C> =
            hash_map_with_capacity(self.span_counts.len());
        for (span, &count) in &self.span_counts {
            for run in TokenSpanBuf::covered_runs(span, char_vocab) {
                *table.entry(run).or_default() += count;
            }
        }
        table
    }
}
