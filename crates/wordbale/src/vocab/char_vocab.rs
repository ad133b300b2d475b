//! # Char/Token Alphabet Table

use core::fmt::Debug;

use crate::{
    errors::{WBResult, WordbaleError},
    types::{TokenType, WBHashMap},
};

/// Alphabet ``char <-> T`` Bijection Table.
///
/// The base symbols of a model. Characters outside the table are not
/// representable and encode as the unknown token.
#[derive(Clone, PartialEq, Default)]
pub struct CharMapVocab<T: TokenType> {
    /// Map from char to token.
    char_tokens: WBHashMap<char, T>,

    /// Map from token to char.
    token_chars: WBHashMap<T, char>,
}

impl<T: TokenType> Debug for CharMapVocab<T> {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("CharMapVocab")
            .field("len", &self.len())
            .field("max_token", &self.max_token())
            .finish()
    }
}

impl<T: TokenType> CharMapVocab<T> {
    /// Build a table assigning consecutive tokens to `chars`, starting at `first_token`.
    ///
    /// ## Arguments
    /// * `chars` - The alphabet, in token order; must be distinct.
    /// * `first_token` - The token of ``chars[0]``.
    pub fn from_ordered_chars(
        chars: &[char],
        first_token: T,
    ) -> WBResult<Self> {
        let base = first_token.to_usize().unwrap_or(usize::MAX);
        let mut entries = Vec::with_capacity(chars.len());
        for (idx, &c) in chars.iter().enumerate() {
            let token = base
                .checked_add(idx)
                .and_then(T::from_usize)
                .ok_or(WordbaleError::TokenOutOfRange(base.saturating_add(idx) as u64))?;
            entries.push((c, token));
        }
        Self::from_entries(entries)
    }

    /// Build a table from ``(char, token)`` entries.
    ///
    /// ## Errors
    /// If the entries are not a 1:1 bijection.
    pub fn from_entries<I>(entries: I) -> WBResult<Self>
    where
        I: IntoIterator<Item = (char, T)>,
    {
        let mut vocab = Self::default();
        for (c, token) in entries {
            if vocab.char_tokens.insert(c, token).is_some() {
                return Err(WordbaleError::InvalidConfiguration(format!(
                    "alphabet char {c:?} is mapped twice"
                )));
            }
            if vocab.token_chars.insert(token, c).is_some() {
                return Err(WordbaleError::InvalidConfiguration(format!(
                    "alphabet token {token} is mapped twice"
                )));
            }
        }
        vocab.char_tokens.shrink_to_fit();
        vocab.token_chars.shrink_to_fit();
        Ok(vocab)
    }

    /// Number of alphabet entries.
    pub fn len(&self) -> usize {
        self.char_tokens.len()
    }

    /// Is the alphabet empty?
    pub fn is_empty(&self) -> bool {
        self.char_tokens.is_empty()
    }

    /// The largest alphabet token, if any.
    pub fn max_token(&self) -> Option<T> {
        self.token_chars.keys().copied().max()
    }

    /// Get the token for a char, if it is in the alphabet.
    #[inline(always)]
    pub fn get_token(
        &self,
        c: char,
    ) -> Option<T> {
        self.char_tokens.get(&c).copied()
    }

    /// Get the char for a token, if it is an alphabet token.
    #[inline(always)]
    pub fn get_char(
        &self,
        token: T,
    ) -> Option<char> {
        self.token_chars.get(&token).copied()
    }

    /// Append the alphabet tokens of `text` to a target buffer.
    ///
    /// ## Arguments
    /// * `text` - The text to translate.
    /// * `unk` - The token used for chars outside the alphabet.
    /// * `tokens` - The target token buffer.
    #[inline(always)]
    pub fn append_tokens(
        &self,
        text: &str,
        unk: T,
        tokens: &mut Vec<T>,
    ) {
        tokens.extend(text.chars().map(|c| self.get_token(c).unwrap_or(unk)));
    }

    /// The ``(token, char)`` entries in ascending token order.
    pub fn sorted_entries(&self) -> Vec<(T, char)> {
        let mut entries: Vec<(T, char)> = self.token_chars.iter().map(|(&t, &c)| (t, c)).collect();
        entries.sort();
        entries
    }
}
