//! # Vocab Trainer

use core::cmp::{Ordering, Reverse};

use compact_str::CompactString;
use dary_heap::OctonaryHeap;

use crate::{
    errors::{WBResult, WordbaleError},
    regex::RegexPattern,
    training::{
        CountType,
        StringChunkType,
        utility::{
            PairIndexMap,
            PairSpanIndex,
            TextSpanCounter,
            TextSpanCounterOptions,
            TokenSpanBuf,
            select_alphabet,
            validate_character_coverage,
        },
    },
    types::{Pair, TokenType, WBHashSet, hash_map_with_capacity},
    vocab::{CharMapVocab, PairMapVocab, PairTokenMap, SpecialVocab, TokenizerModel},
};

/// The default target vocabulary size.
pub const DEFAULT_VOCAB_SIZE: usize = 32_000;

/// The default fraction of corpus characters the alphabet must cover.
pub const DEFAULT_CHARACTER_COVERAGE: f64 = 0.9995;

/// Options for [`BinaryPairVocabTrainer`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerOptions {
    /// The regex pattern used for text splitting.
    pub pattern: RegexPattern,

    /// The target vocab size, including the reserved tokens.
    ///
    /// This is an upper bound; training stops early when the corpus
    /// has no pairs left to merge.
    pub vocab_size: usize,

    /// The fraction of corpus char occurrences the alphabet must cover.
    pub character_coverage: f64,
}

impl Default for TrainerOptions {
    fn default() -> Self {
        Self::new(DEFAULT_VOCAB_SIZE)
    }
}

impl TrainerOptions {
    /// Create new options with the default pattern and coverage.
    ///
    /// ## Arguments
    /// * `vocab_size` - The target vocabulary size.
    pub fn new(vocab_size: usize) -> Self {
        Self {
            pattern: RegexPattern::default(),
            vocab_size,
            character_coverage: DEFAULT_CHARACTER_COVERAGE,
        }
    }

    /// Sets the vocab size.
    pub fn with_vocab_size(
        self,
        vocab_size: usize,
    ) -> Self {
        Self { vocab_size, ..self }
    }

    /// Sets the character coverage.
    ///
    /// ## Arguments
    /// * `character_coverage` - The covered fraction; checked by [`Self::validate`].
    pub fn with_character_coverage(
        self,
        character_coverage: f64,
    ) -> Self {
        Self {
            character_coverage,
            ..self
        }
    }

    /// Sets the regex pattern used for text splitting.
    ///
    /// ## Arguments
    /// * `pattern` - The new span split pattern; checked by [`Self::validate`].
    pub fn with_pattern<P: Into<RegexPattern>>(
        self,
        pattern: P,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            ..self
        }
    }

    /// Check the options.
    ///
    /// ## Errors
    /// [`WordbaleError::InvalidConfiguration`] if the coverage is outside ``(0, 1]``,
    /// the vocab size is zero, or the pattern does not compile.
    pub fn validate(&self) -> WBResult<()> {
        validate_character_coverage(self.character_coverage)?;
        if self.vocab_size == 0 {
            return Err(WordbaleError::InvalidConfiguration(
                "vocab_size must be >= 1".to_string(),
            ));
        }
        self.pattern.compile().map_err(|e| {
            WordbaleError::InvalidConfiguration(format!(
                "split pattern {:?}: {e}",
                self.pattern.as_str()
            ))
        })?;
        Ok(())
    }

    /// Initializes a [`BinaryPairVocabTrainer`] from these options.
    pub fn init<K, C>(self) -> WBResult<BinaryPairVocabTrainer<K, C>>
    where
        K: StringChunkType,
        C: CountType,
    {
        BinaryPairVocabTrainer::new(self)
    }
}

/// Info about a [`Pair`] that could be merged.
#[derive(Debug, Eq)]
pub struct MergeJob<T: TokenType, C: CountType> {
    /// The number of instances of this pair in the corpus.
    pub count: C,

    /// The pair to merge.
    pub pair: Pair<T>,

    /// Span indices that may contain this pair.
    pub span_indices: WBHashSet<usize>,
}

impl<T: TokenType, C: CountType> MergeJob<T, C> {
    /// The job key.
    ///
    /// Max-heap by count; ties pop the smallest pair first.
    pub fn heap_key(&self) -> (C, Reverse<Pair<T>>) {
        (self.count, Reverse(self.pair))
    }
}

impl<T: TokenType, C: CountType> PartialEq for MergeJob<T, C> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.heap_key() == other.heap_key()
    }
}

impl<T: TokenType, C: CountType> PartialOrd for MergeJob<T, C> {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: TokenType, C: CountType> Ord for MergeJob<T, C> {
    fn cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        self.heap_key().cmp(&other.heap_key())
    }
}

/// Trainer for learning binary pair encodings over a char alphabet.
///
/// # Parameters
/// * `K` - the type used to store strings in the span counts.
/// * `C` - the type used to store counts.
pub struct BinaryPairVocabTrainer<K = CompactString, C = u64>
where
    K: StringChunkType,
    C: CountType,
{
    /// Trainer options.
    pub options: TrainerOptions,

    /// The text span counter.
    pub span_counter: TextSpanCounter<K, C>,
}

impl<K, C> BinaryPairVocabTrainer<K, C>
where
    K: StringChunkType,
    C: CountType,
{
    /// Initializes a [`BinaryPairVocabTrainer`].
    ///
    /// ## Errors
    /// If the options fail [`TrainerOptions::validate`].
    pub fn new(options: TrainerOptions) -> WBResult<Self> {
        options.validate()?;

        let regex = options.pattern.compile().map_err(|e| {
            WordbaleError::InvalidConfiguration(format!("split pattern: {e}"))
        })?;
        let span_counter = TextSpanCounter::<K, C>::new(regex, TextSpanCounterOptions::default());

        Ok(BinaryPairVocabTrainer {
            options,
            span_counter,
        })
    }

    /// Have no samples been counted yet?
    pub fn is_empty(&self) -> bool {
        self.span_counter.span_counts.is_empty()
    }

    /// Update span counts inplace from a sample iterator.
    ///
    /// ## Arguments
    /// * `samples` - An iterator over string-like samples.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, samples)))]
    pub fn update_from_samples<I>(
        &mut self,
        samples: I,
    ) where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.span_counter.update_from_samples(samples);
    }

    /// Trains a [`TokenizerModel<T>`].
    ///
    /// The resulting model will contain:
    /// * the trainer's span split pattern,
    /// * the `specials`, which must occupy ``0..specials.len()``,
    /// * the alphabet selected by character coverage, most frequent first,
    /// * the learned merges, in merge order.
    ///
    /// ## Arguments
    /// * `specials` - the reserved token assignments.
    ///
    /// ## Errors
    /// [`WordbaleError::InvalidConfiguration`] if the samples have no chars,
    /// or `vocab_size` cannot hold the specials plus the alphabet.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, specials)))]
    pub fn train<T>(
        self,
        specials: SpecialVocab<T>,
    ) -> WBResult<TokenizerModel<T>>
    where
        T: TokenType,
    {
        let char_counts = self.span_counter.char_counts();
        let alphabet = select_alphabet(&char_counts, self.options.character_coverage)?;
        if alphabet.is_empty() {
            return Err(WordbaleError::InvalidConfiguration(
                "training samples contain no characters".to_string(),
            ));
        }

        let required = specials.len() + alphabet.len();
        if self.options.vocab_size < required {
            return Err(WordbaleError::InvalidConfiguration(format!(
                "vocab_size {} is smaller than the {} reserved tokens plus the {} alphabet chars",
                self.options.vocab_size,
                specials.len(),
                alphabet.len()
            )));
        }
        log::info!(
            "Selected alphabet of {} chars (of {} seen) at coverage {}",
            alphabet.len(),
            char_counts.len(),
            self.options.character_coverage
        );

        let first_char_token =
            T::from_usize(specials.len()).ok_or(WordbaleError::TokenOutOfRange(specials.len() as u64))?;
        let char_vocab: CharMapVocab<T> = CharMapVocab::from_ordered_chars(&alphabet, first_char_token)?;

        let num_merges = self.options.vocab_size - required;
        log::info!("Starting BPE training: {} merges to compute", num_merges);

        let pairs = self.learn_merges(&char_vocab, T::from_usize(required), num_merges)?;

        let pair_vocab = PairMapVocab::init(char_vocab, pairs)?;
        TokenizerModel::init(self.options.pattern, specials, pair_vocab)
    }

    fn learn_merges<T: TokenType>(
        &self,
        char_vocab: &CharMapVocab<T>,
        first_token: Option<T>,
        num_merges: usize,
    ) -> WBResult<PairTokenMap<T>> {
        let mut pairs: PairTokenMap<T> = hash_map_with_capacity(num_merges.min(1 << 16));
        if num_merges == 0 {
            return Ok(pairs);
        }
        let mut next_token =
            first_token.ok_or_else(|| WordbaleError::TokenOutOfRange(u64::MAX))?;

        let (mut spans, span_counts): (Vec<TokenSpanBuf<T>>, Vec<C>) = self
            .span_counter
            .to_text_span_counts(char_vocab)
            .into_iter()
            .unzip();

        log::info!("Building pair index over {} spans...", spans.len());

        let PairSpanIndex {
            mut pair_counts,
            pair_index,
        } = PairSpanIndex::from_span_count_table(&spans, &span_counts);

        let zero = C::zero();

        // ---- Build heap ----
        log::info!("Building heap with {} unique pairs", pair_counts.len());
        let mut heap = OctonaryHeap::with_capacity(pair_counts.len());
        for (pair, span_indices) in pair_index.into_iter() {
            let count = *pair_counts.get(&pair).unwrap_or(&zero);
            if count > zero {
                heap.push(MergeJob {
                    pair,
                    count,
                    span_indices,
                });
            }
        }

        // ---- Merge loop ----
        let mut merges_done = 0;
        let mut last_log_percent = 0;

        while merges_done < num_merges {
            let Some(mut job) = heap.pop() else {
                break;
            };

            {
                // Lazy refresh the job count.
                let current = *pair_counts.get(&job.pair).unwrap_or(&zero);
                if job.count != current {
                    job.count = current;
                    if job.count > zero {
                        heap.push(job);
                    }
                    continue;
                }
            }

            if job.count == zero {
                break;
            }

            let new_token = next_token;
            pairs.insert(job.pair, new_token);

            let mut new_token_pair_map: PairIndexMap<T> = hash_map_with_capacity(16);

            for &span_idx in &job.span_indices {
                let weight = span_counts[span_idx];
                spans[span_idx].merge_pair_cb(job.pair, new_token, &mut |pair, delta| {
                    if delta < 0 {
                        *pair_counts.entry(pair).or_default() -= weight;
                    }
                    if delta > 0 {
                        // Every added pair contains `new_token`.
                        *pair_counts.entry(pair).or_default() += weight;
                        new_token_pair_map.entry(pair).or_default().insert(span_idx);
                    }
                });
            }

            for (pair, span_indices) in new_token_pair_map {
                let count = *pair_counts.get(&pair).unwrap_or(&zero);
                if count > zero {
                    heap.push(MergeJob {
                        pair,
                        count,
                        span_indices,
                    });
                }
            }

            merges_done += 1;

            let current_percent = (merges_done * 100) / num_merges;
            if current_percent > last_log_percent {
                log::info!(
                    "Progress: {}% ({}/{} merges) - Last merge: {:?} -> {:?} (frequency: {})",
                    current_percent,
                    merges_done,
                    num_merges,
                    job.pair,
                    new_token,
                    job.count
                );
                last_log_percent = current_percent;
            }

            if merges_done < num_merges {
                next_token = next_token
                    .checked_add(&T::one())
                    .ok_or_else(|| WordbaleError::TokenOutOfRange(u64::MAX))?;
            }
        }

        if merges_done < num_merges {
            log::info!(
                "Corpus has no pairs left to merge; stopping at {merges_done} of {num_merges} merges"
            );
        } else {
            log::info!("Finished training: {} merges completed", merges_done);
        }

        pairs.shrink_to_fit();
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoders::{MergeScanEncoder, TokenEncoder};

    fn train_on(
        samples: &[&str],
        options: TrainerOptions,
    ) -> WBResult<TokenizerModel<u32>> {
        let mut trainer = options.init::<CompactString, u64>()?;
        trainer.update_from_samples(samples);
        trainer.train(SpecialVocab::default())
    }

    #[test]
    fn test_trainer_options() {
        let options = TrainerOptions::default();
        assert_eq!(options.vocab_size, DEFAULT_VOCAB_SIZE);
        assert_eq!(options.character_coverage, DEFAULT_CHARACTER_COVERAGE);
        assert_eq!(options.pattern, RegexPattern::default());

        let options = options
            .with_vocab_size(2000)
            .with_character_coverage(1.0)
            .with_pattern(r"\S+");
        assert_eq!(options.vocab_size, 2000);
        assert_eq!(options.character_coverage, 1.0);
        assert_eq!(options.pattern, r"\S+".into());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_trainer_options_rejected() {
        let bad = [
            TrainerOptions::new(100).with_pattern("("),
            TrainerOptions::new(100).with_character_coverage(0.0),
            TrainerOptions::new(100).with_character_coverage(1.01),
            TrainerOptions::new(0),
        ];
        for options in bad {
            assert!(matches!(
                options.init::<String, u32>(),
                Err(WordbaleError::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn test_train_tokenizer() {
        let samples = [
            "hello world",
            "hello san francisco",
            "it's not the heat, it's the salt",
        ];
        let options = TrainerOptions::new(64).with_character_coverage(1.0);
        let model = train_on(&samples, options.clone()).unwrap();

        assert!(model.len() <= 64);
        assert_eq!(model.piece(0), Some("<pad>"));
        assert_eq!(model.piece(3), Some("</s>"));

        // Most frequent char first.
        assert_eq!(model.piece(4), Some(" "));

        let encoder = MergeScanEncoder::new(model.clone().into());
        for sample in samples {
            let tokens = encoder.encode(sample);
            assert!(tokens.len() < sample.chars().count());
            let text: String = tokens.iter().map(|&t| model.piece(t).unwrap()).collect();
            assert_eq!(text, sample);
        }

        // Deterministic.
        let again = train_on(&samples, options).unwrap();
        assert_eq!(again.pieces().collect::<Vec<_>>(), model.pieces().collect::<Vec<_>>());
    }

    #[test]
    fn test_train_stops_early() {
        let model = train_on(&["ab"], TrainerOptions::new(1000).with_character_coverage(1.0)).unwrap();
        assert_eq!(model.len(), 4 + 2 + 1);
        assert_eq!(model.piece(6), Some("ab"));
    }

    #[test]
    fn test_train_vocab_too_small() {
        let result = train_on(&["abcdef"], TrainerOptions::new(8).with_character_coverage(1.0));
        assert!(matches!(result, Err(WordbaleError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_train_no_merges_across_unk() {
        // 'z' is below the coverage threshold; "az" and "za" must not merge.
        let samples = ["aaaa aaaa aaaa bbbb z"];
        let options = TrainerOptions::new(100)
            .with_character_coverage(0.9)
            .with_pattern(r"\S+|\s+");
        let model = train_on(&samples, options).unwrap();

        assert!(model.char_vocab().get_token('z').is_none());
        for (_, piece) in model.pieces() {
            assert!(!piece.contains('z'));
        }
    }

    #[test]
    fn test_merge_job_heap_key() {
        type T = u32;
        type C = u32;

        let job1: MergeJob<T, C> = MergeJob {
            pair: (1, 2),
            count: 2,
            span_indices: Default::default(),
        };
        let job2: MergeJob<T, C> = MergeJob {
            pair: (2, 1),
            count: 1,
            span_indices: Default::default(),
        };
        let job3: MergeJob<T, C> = MergeJob {
            pair: (2, 2),
            count: 1,
            span_indices: Default::default(),
        };

        assert_eq!(&job1, &job1);
        assert_ne!(&job1, &job2);

        assert_eq!(job1.heap_key(), (2, Reverse((1, 2))));
        assert_eq!(job1.cmp(&job2), Ordering::Greater);

        // Equal counts: the smaller pair pops first.
        assert_eq!(job2.cmp(&job3), Ordering::Greater);

        let mut heap = OctonaryHeap::from(vec![job3, job1, job2]);
        assert_eq!(heap.pop().map(|j| j.pair), Some((1, 2)));
        assert_eq!(heap.pop().map(|j| j.pair), Some((2, 1)));
        assert_eq!(heap.pop().map(|j| j.pair), Some((2, 2)));
    }
}
