//! # `PairIndex` Builder

use crate::{
    training::{CountType, utility::TokenSpanBuf},
    types::{Pair, TokenType, WBHashMap, WBHashSet},
};

/// A map from [`Pair`] to its occurrence count.
pub type PairCountMap<T, C> = WBHashMap<Pair<T>, C>;

/// A map from [`Pair`] to indices over ``spans``.
pub type PairIndexMap<T> = WBHashMap<Pair<T>, WBHashSet<usize>>;

/// An index of ``(T, T)`` pair information relative to a ``&[TokenSpanBuf<T>]``.
#[derive(Debug, Clone)]
pub struct PairSpanIndex<T: TokenType, C: CountType> {
    /// A map from [`Pair`] to its occurrence count.
    ///
    /// ``sum(spans[i].pair_count(pair) * counts[i]) for all i``
    pub pair_counts: PairCountMap<T, C>,

    /// A map from [`Pair`] to span indices.
    pub pair_index: PairIndexMap<T>,
}

impl<T: TokenType, C: CountType> PairSpanIndex<T, C> {
    /// Build a [`PairSpanIndex`] from a slice of [`TokenSpanBuf`]s, using a count table.
    ///
    /// ## Arguments
    /// * `spans` - a sequence of text spans; assumed to be unique.
    /// * `counts` - `counts[i]` is the count of `spans[i]`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(spans, counts)))]
    pub fn from_span_count_table(
        spans: &[TokenSpanBuf<T>],
        counts: &[C],
    ) -> Self {
        let size_hint = spans.len() / 16;

        let mut index = PairSpanIndex {
            pair_counts: PairCountMap::with_capacity(size_hint),
            pair_index: PairIndexMap::with_capacity(size_hint),
        };

        let zero = C::zero();

        for (idx, (span, &count)) in spans.iter().zip(counts).enumerate() {
            if count != zero && span.len() >= 2 {
                for p in span.pairs() {
                    *index.pair_counts.entry(p).or_default() += count;
                    index.pair_index.entry(p).or_default().insert(idx);
                }
            }
        }

        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::CharMapVocab;

    #[test]
    fn test_pair_index_token_u32_count_u64() {
        test_pair_index::<u32, u64>();
    }

    #[test]
    fn test_pair_index_token_u16_count_u32() {
        test_pair_index::<u16, u32>();
    }

    fn test_pair_index<T: TokenType, C: CountType>() {
        let alphabet = ['h', 'e', 'l', 'o', 'w', 'r', 'd', 'p'];
        let char_vocab: CharMapVocab<T> =
            CharMapVocab::from_ordered_chars(&alphabet, T::from_u8(4).unwrap()).unwrap();
        let unk = T::one();
        let tok = |c: char| char_vocab.get_token(c).unwrap();

        let spans: Vec<TokenSpanBuf<T>> = vec![
            TokenSpanBuf::from_string("hello", &char_vocab, unk),
            TokenSpanBuf::from_string("world", &char_vocab, unk),
            TokenSpanBuf::from_string("help", &char_vocab, unk),
            TokenSpanBuf::from_string("h", &char_vocab, unk),
        ];

        let counts: Vec<C> = [1, 2, 3, 4]
            .into_iter()
            .map(|c| C::from_u32(c).unwrap())
            .collect();

        let PairSpanIndex {
            pair_counts,
            pair_index,
        } = PairSpanIndex::<T, C>::from_span_count_table(&spans, &counts);

        assert_eq!(
            pair_counts,
            [
                (('e', 'l'), 4), // 1 h[el]lo, 3 h[el]p
                (('h', 'e'), 4), // 1 [he]llo, 3 [he]lp
                (('l', 'p'), 3), // 3 he[lp]
                (('l', 'd'), 2), // 2 wor[ld]
                (('o', 'r'), 2), // 2 w[or]ld
                (('r', 'l'), 2), // 2 wo[rl]d
                (('w', 'o'), 2), // 2 [wo]rld
                (('l', 'l'), 1), // 1 he[ll]o
                (('l', 'o'), 1), // 1 hel[lo]
            ]
            .into_iter()
            .map(|((a, b), c)| ((tok(a), tok(b)), C::from_u32(c).unwrap()))
            .collect::<PairCountMap<T, C>>()
        );

        assert_eq!(
            pair_index,
            [
                (('e', 'l'), vec![0, 2]),
                (('h', 'e'), vec![0, 2]),
                (('l', 'd'), vec![1]),
                (('l', 'l'), vec![0]),
                (('l', 'o'), vec![0]),
                (('l', 'p'), vec![2]),
                (('o', 'r'), vec![1]),
                (('r', 'l'), vec![1]),
                (('w', 'o'), vec![1]),
            ]
            .into_iter()
            .map(|((a, b), s)| ((tok(a), tok(b)), WBHashSet::from_iter(s)))
            .collect::<PairIndexMap<T>>()
        );
    }
}
