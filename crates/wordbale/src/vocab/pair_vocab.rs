//! # Pair Map ``{ (T, T) -> T }`` Token Vocabulary

use std::sync::Arc;

use crate::{
    errors::{WBResult, WordbaleError},
    types::{Pair, TokenType, WBHashMap, WBHashSet},
    vocab::CharMapVocab,
};

/// Map of ``{ (T, T) -> T }`` merges.
pub type PairTokenMap<T> = WBHashMap<Pair<T>, T>;

/// Validate that a [`CharMapVocab`] and [`PairTokenMap`] are compatible.
///
/// - for every ``(a, b) -> t`` entry:
///   - the parents ``(a, b)``:
///     - are either in the `char_vocab`, or are targets in the map, not both;
///     - are smaller than `t` (merges are ranked by target token).
///   - the target ``t`` is not in the `char_vocab`.
///
/// ## Arguments
/// * `char_vocab` - The alphabet to validate against.
/// * `pairs` - The pair token map to validate.
pub fn try_validate_pair_map<T: TokenType>(
    char_vocab: &CharMapVocab<T>,
    pairs: &PairTokenMap<T>,
) -> WBResult<()> {
    let pair_targets: WBHashSet<T> = pairs.values().copied().collect();
    if pair_targets.len() != pairs.len() {
        return Err(WordbaleError::InvalidConfiguration(
            "pair map reuses a target token".to_string(),
        ));
    }

    for t in &pair_targets {
        if let Some(c) = char_vocab.get_char(*t) {
            return Err(WordbaleError::InvalidConfiguration(format!(
                "target token in pair map {t:?} also mapped to char {c:?}"
            )));
        }
    }

    for (&pair, &t) in pairs.iter() {
        for pt in [pair.0, pair.1] {
            let is_pair_target = pair_targets.contains(&pt);
            let char_target = char_vocab.get_char(pt);

            if is_pair_target && let Some(c) = char_target {
                return Err(WordbaleError::InvalidConfiguration(format!(
                    "pair {pair:?} -> {t:?} parent {pt:?} is a pair target and char target: {c:?}"
                )));
            }
            if !is_pair_target && char_target.is_none() {
                return Err(WordbaleError::InvalidConfiguration(format!(
                    "pair {pair:?} -> {t:?} parent {pt:?} is not defined"
                )));
            }
            if pt >= t {
                return Err(WordbaleError::InvalidConfiguration(format!(
                    "pair {pair:?} -> {t:?} parent {pt:?} does not precede its target"
                )));
            }
        }
    }

    Ok(())
}

/// Pair ``(T, T) -> T`` Vocabulary.
///
/// - Grounded in a [`CharMapVocab<T>`] for the base alphabet.
/// - Collection of ``(T, T) -> T`` merges; a smaller target merges first.
#[derive(Default, Debug, Clone)]
pub struct PairMapVocab<T: TokenType> {
    /// Char/token alphabet.
    char_vocab: Arc<CharMapVocab<T>>,

    /// Map of ``{ (T, T) -> T }``.
    pairs: PairTokenMap<T>,
}

impl<T: TokenType> PairMapVocab<T> {
    /// Initialize a [`PairMapVocab`].
    ///
    /// ## Arguments
    /// * `char_vocab` - The alphabet.
    /// * `pairs` - The pair token map.
    pub fn init<C>(
        char_vocab: C,
        pairs: PairTokenMap<T>,
    ) -> WBResult<Self>
    where
        C: Into<Arc<CharMapVocab<T>>>,
    {
        let char_vocab = char_vocab.into();
        try_validate_pair_map(&char_vocab, &pairs)?;
        Ok(Self { char_vocab, pairs })
    }

    /// Get the alphabet.
    pub fn char_vocab(&self) -> &Arc<CharMapVocab<T>> {
        &self.char_vocab
    }

    /// Get the map of pairs.
    pub fn pairs(&self) -> &PairTokenMap<T> {
        &self.pairs
    }

    /// The merges in ascending target order.
    pub fn sorted_merges(&self) -> Vec<(T, Pair<T>)> {
        let mut merges: Vec<(T, Pair<T>)> = self.pairs.iter().map(|(&p, &t)| (t, p)).collect();
        merges.sort();
        merges
    }

    /// Get the number of tokens in the vocabulary (alphabet + merges).
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.char_vocab.len() + self.pairs.len()
    }

    /// Looks up a pair.
    #[inline(always)]
    pub fn lookup_pair(
        &self,
        pair: &Pair<T>,
    ) -> Option<T> {
        self.pairs.get(pair).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alphabet() -> CharMapVocab<u32> {
        CharMapVocab::from_ordered_chars(&['a', 'b', 'c'], 4).unwrap()
    }

    #[test]
    fn test_valid_pairs() {
        let mut pairs: PairTokenMap<u32> = Default::default();
        pairs.insert((4, 5), 7);
        pairs.insert((7, 6), 8);

        let vocab = PairMapVocab::init(alphabet(), pairs).unwrap();
        assert_eq!(vocab.len(), 5);
        assert_eq!(vocab.lookup_pair(&(4, 5)), Some(7));
        assert_eq!(vocab.lookup_pair(&(5, 4)), None);
        assert_eq!(vocab.sorted_merges(), vec![(7, (4, 5)), (8, (7, 6))]);
    }

    #[test]
    fn test_undefined_parent() {
        let mut pairs: PairTokenMap<u32> = Default::default();
        pairs.insert((4, 9), 10);
        assert!(PairMapVocab::init(alphabet(), pairs).is_err());
    }

    #[test]
    fn test_target_collides_with_alphabet() {
        let mut pairs: PairTokenMap<u32> = Default::default();
        pairs.insert((4, 5), 6);
        assert!(PairMapVocab::init(alphabet(), pairs).is_err());
    }

    #[test]
    fn test_parent_after_target() {
        let mut pairs: PairTokenMap<u32> = Default::default();
        pairs.insert((4, 8), 7);
        pairs.insert((4, 5), 8);
        assert!(PairMapVocab::init(alphabet(), pairs).is_err());
    }
}
