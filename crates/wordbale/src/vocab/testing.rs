//! # Vocabulary Test Fixtures

use crate::{
    regex::RegexPattern,
    vocab::{CharMapVocab, PairMapVocab, PairTokenMap, SpecialVocab, TokenizerModel},
};

/// A small hand-built model over ``"helo wrd"`` with merges up to ``"hello"``.
///
/// | token | piece |
/// |---|---|
/// | 0..=3 | specials |
/// | 4..=11 | `l o h e ␠ w r d` |
/// | 12 | `lo` |
/// | 13 | `he` |
/// | 14 | `hel` |
/// | 15 | `hello` |
pub fn toy_model() -> TokenizerModel<u32> {
    let chars =
        CharMapVocab::from_ordered_chars(&['l', 'o', 'h', 'e', ' ', 'w', 'r', 'd'], 4).unwrap();

    let mut pairs: PairTokenMap<u32> = Default::default();
    pairs.insert((4, 5), 12);
    pairs.insert((6, 7), 13);
    pairs.insert((13, 4), 14);
    pairs.insert((14, 12), 15);

    TokenizerModel::init(
        RegexPattern::default(),
        SpecialVocab::default(),
        PairMapVocab::init(chars, pairs).unwrap(),
    )
    .unwrap()
}
