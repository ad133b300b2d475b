//! # Tokenizer Model

use std::sync::Arc;

use crate::{
    errors::{WBResult, WordbaleError},
    regex::{RegexPattern, RegexWrapper},
    types::{Pair, TokenType, WBHashMap},
    vocab::{CharMapVocab, PairMapVocab, SpecialVocab},
};

/// A trained subword tokenizer.
///
/// Combines:
///  * the span split pattern,
///  * the reserved [`SpecialVocab`],
///  * the [`CharMapVocab`] alphabet, and
///  * the [`PairMapVocab`] merges.
///
/// The token space is dense: every id in ``0..len()`` is exactly one of a
/// special, an alphabet char, or a merge target.
///
/// Models are read-only once built; share them with [`Arc`].
#[derive(Debug, Clone)]
pub struct TokenizerModel<T: TokenType> {
    pattern: RegexPattern,
    regex: RegexWrapper,
    specials: SpecialVocab<T>,
    pair_vocab: PairMapVocab<T>,

    /// ``pieces[t]`` is the text of token `t`.
    pieces: Vec<String>,
}

impl<T: TokenType> TokenizerModel<T> {
    /// Build a model, validating the token layout.
    ///
    /// ## Arguments
    /// * `pattern` - The span split pattern.
    /// * `specials` - The reserved token assignments.
    /// * `pair_vocab` - The alphabet and merges.
    pub fn init(
        pattern: RegexPattern,
        specials: SpecialVocab<T>,
        pair_vocab: PairMapVocab<T>,
    ) -> WBResult<Self> {
        let regex = pattern.compile().map_err(|e| {
            WordbaleError::InvalidConfiguration(format!("split pattern {:?}: {e}", pattern.as_str()))
        })?;

        let pieces = build_pieces(&specials, &pair_vocab)?;

        Ok(Self {
            pattern,
            regex,
            specials,
            pair_vocab,
            pieces,
        })
    }

    /// The span split pattern.
    pub fn pattern(&self) -> &RegexPattern {
        &self.pattern
    }

    /// The compiled span split regex.
    pub fn regex(&self) -> &RegexWrapper {
        &self.regex
    }

    /// The reserved tokens.
    pub fn specials(&self) -> &SpecialVocab<T> {
        &self.specials
    }

    /// The alphabet.
    pub fn char_vocab(&self) -> &Arc<CharMapVocab<T>> {
        self.pair_vocab.char_vocab()
    }

    /// The merges.
    pub fn pair_vocab(&self) -> &PairMapVocab<T> {
        &self.pair_vocab
    }

    /// Total number of tokens.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Looks up a merge.
    #[inline(always)]
    pub fn lookup_pair(
        &self,
        pair: &Pair<T>,
    ) -> Option<T> {
        self.pair_vocab.lookup_pair(pair)
    }

    /// The text of a token, if it is in the model.
    pub fn piece(
        &self,
        token: T,
    ) -> Option<&str> {
        token
            .to_usize()
            .and_then(|idx| self.pieces.get(idx))
            .map(String::as_str)
    }

    /// Iterate ``(token, piece)`` in ascending token order.
    pub fn pieces(&self) -> impl Iterator<Item = (T, &str)> {
        self.pieces
            .iter()
            .enumerate()
            .filter_map(|(idx, piece)| T::from_usize(idx).map(|t| (t, piece.as_str())))
    }
}

/// Build the dense piece table, checking that the token space is ``0..n``.
fn build_pieces<T: TokenType>(
    specials: &SpecialVocab<T>,
    pair_vocab: &PairMapVocab<T>,
) -> WBResult<Vec<String>> {
    let char_vocab = pair_vocab.char_vocab();
    let size = specials.len() + pair_vocab.len();

    let merges: WBHashMap<T, Pair<T>> = pair_vocab
        .pairs()
        .iter()
        .map(|(&pair, &t)| (t, pair))
        .collect();

    let mut pieces: Vec<String> = Vec::with_capacity(size);
    for idx in 0..size {
        let token = T::from_usize(idx).ok_or(WordbaleError::TokenOutOfRange(idx as u64))?;

        let piece = if let Some(special) = specials.lookup(token) {
            special.piece().to_string()
        } else if let Some(c) = char_vocab.get_char(token) {
            c.to_string()
        } else if let Some(&(a, b)) = merges.get(&token) {
            // Parents precede targets; see `try_validate_pair_map`.
            let (a, b) = (a.to_usize().unwrap_or(usize::MAX), b.to_usize().unwrap_or(usize::MAX));
            match (pieces.get(a), pieces.get(b)) {
                (Some(pa), Some(pb)) => format!("{pa}{pb}"),
                _ => {
                    return Err(WordbaleError::InvalidConfiguration(format!(
                        "merge target {token} has an undefined parent"
                    )));
                }
            }
        } else {
            return Err(WordbaleError::InvalidConfiguration(format!(
                "token space has a gap at {token} (expected {size} dense tokens)"
            )));
        };

        pieces.push(piece);
    }

    // Anything left over sits outside ``0..size`` or collides with another kind.
    let max_used = [
        Some(specials.max_token()),
        char_vocab.max_token(),
        merges.keys().copied().max(),
    ]
    .into_iter()
    .flatten()
    .max()
    .and_then(|t| t.to_usize())
    .unwrap_or(0);
    let specials_in_alphabet = specials.iter().any(|(_, t)| char_vocab.get_char(t).is_some());
    let specials_as_targets = specials.iter().any(|(_, t)| merges.contains_key(&t));
    if max_used >= size || specials_in_alphabet || specials_as_targets {
        return Err(WordbaleError::InvalidConfiguration(format!(
            "token space is not a dense 0..{size} layout"
        )));
    }

    Ok(pieces)
}
