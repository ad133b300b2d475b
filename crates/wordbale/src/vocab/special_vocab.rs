//! # Reserved Token Vocabulary

use crate::{
    errors::{WBResult, WordbaleError},
    types::TokenType,
};

/// The reserved tokens every trained model carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialToken {
    /// Padding.
    Pad,

    /// Characters outside the model alphabet.
    Unk,

    /// Beginning-of-sequence marker.
    Bos,

    /// End-of-sequence marker.
    Eos,
}

impl SpecialToken {
    /// All reserved tokens, in default id order.
    pub const ALL: [SpecialToken; 4] = [Self::Pad, Self::Unk, Self::Bos, Self::Eos];

    /// The piece text used in vocab listings.
    pub fn piece(self) -> &'static str {
        match self {
            Self::Pad => "<pad>",
            Self::Unk => "<unk>",
            Self::Bos => "<s>",
            Self::Eos => "</s>",
        }
    }

    /// The model file label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pad => "pad",
            Self::Unk => "unk",
            Self::Bos => "bos",
            Self::Eos => "eos",
        }
    }

    /// Parse a model file label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

/// Token assignments for the [`SpecialToken`] set.
///
/// The default layout is ``pad=0, unk=1, bos=2, eos=3``.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialVocab<T: TokenType> {
    tokens: [T; 4],
}

impl<T: TokenType> Default for SpecialVocab<T> {
    fn default() -> Self {
        let two = T::one() + T::one();
        Self {
            tokens: [T::zero(), T::one(), two, two + T::one()],
        }
    }
}

impl<T: TokenType> SpecialVocab<T> {
    /// Build from explicit assignments; the tokens must be distinct.
    pub fn try_new(
        pad: T,
        unk: T,
        bos: T,
        eos: T,
    ) -> WBResult<Self> {
        let tokens = [pad, unk, bos, eos];
        for i in 0..tokens.len() {
            if tokens[i + 1..].contains(&tokens[i]) {
                return Err(WordbaleError::InvalidConfiguration(format!(
                    "special token {} reuses id {}",
                    SpecialToken::ALL[i].label(),
                    tokens[i]
                )));
            }
        }
        Ok(Self { tokens })
    }

    /// Number of reserved tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false; kept for the `len` convention.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Get the token for a special.
    pub fn token(
        &self,
        special: SpecialToken,
    ) -> T {
        self.tokens[special as usize]
    }

    /// The padding token.
    pub fn pad(&self) -> T {
        self.token(SpecialToken::Pad)
    }

    /// The unknown-character token.
    pub fn unk(&self) -> T {
        self.token(SpecialToken::Unk)
    }

    /// The beginning-of-sequence token.
    pub fn bos(&self) -> T {
        self.token(SpecialToken::Bos)
    }

    /// The end-of-sequence token.
    pub fn eos(&self) -> T {
        self.token(SpecialToken::Eos)
    }

    /// Which special, if any, owns `token`.
    pub fn lookup(
        &self,
        token: T,
    ) -> Option<SpecialToken> {
        self.tokens
            .iter()
            .position(|&t| t == token)
            .map(|idx| SpecialToken::ALL[idx])
    }

    /// Iterate ``(special, token)`` assignments.
    pub fn iter(&self) -> impl Iterator<Item = (SpecialToken, T)> + '_ {
        SpecialToken::ALL.into_iter().zip(self.tokens.iter().copied())
    }

    /// The largest reserved token.
    pub fn max_token(&self) -> T {
        self.tokens.iter().copied().max().unwrap_or_else(T::zero)
    }
}
