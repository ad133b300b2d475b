//! # Regex Wrapper
//! This module provides mechanisms to mix `regex` and `fancy_regex` types.

use core::fmt::Debug;

/// The default span-splitting pattern.
///
/// GPT-2 style: contractions, optionally space-prefixed letter, number, and
/// symbol runs, and whitespace runs. Every character of the input lands in
/// exactly one span.
pub const DEFAULT_SPLIT_PATTERN: &str = concat!(
    r"'(?:[sdmt]|ll|ve|re)",
    "|",
    r" ?\p{L}+",
    "|",
    r" ?\p{N}+",
    "|",
    r" ?[^\s\p{L}\p{N}]+",
    "|",
    r"\s+(?!\S)",
    "|",
    r"\s+",
);

/// Error wrapper for regex patterns.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub enum ErrorWrapper {
    /// Error from `regex`.
    Basic(Box<regex::Error>),

    /// Error from `fancy_regex`.
    Fancy(Box<fancy_regex::Error>),
}

impl From<regex::Error> for ErrorWrapper {
    fn from(err: regex::Error) -> Self {
        Self::Basic(err.into())
    }
}

impl From<fancy_regex::Error> for ErrorWrapper {
    fn from(err: fancy_regex::Error) -> Self {
        Self::Fancy(err.into())
    }
}

impl core::fmt::Display for ErrorWrapper {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        match self {
            Self::Basic(err) => core::fmt::Display::fmt(err, f),
            Self::Fancy(err) => core::fmt::Display::fmt(err, f),
        }
    }
}

impl core::error::Error for ErrorWrapper {}

/// Labeled wrapper for regex patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegexPattern {
    /// This is a basic regex pattern, without extensions.
    Basic(String),

    /// This is a regex pattern that requires regex extensions.
    Fancy(String),

    /// The requirements of this pattern are unknown; try basic first.
    Adaptive(String),
}

impl<S: AsRef<str>> From<S> for RegexPattern {
    fn from(pattern: S) -> Self {
        Self::Adaptive(pattern.as_ref().to_string())
    }
}

impl Default for RegexPattern {
    fn default() -> Self {
        DEFAULT_SPLIT_PATTERN.into()
    }
}

impl RegexPattern {
    /// Get the underlying regex pattern.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Basic(pattern) => pattern,
            Self::Fancy(pattern) => pattern,
            Self::Adaptive(pattern) => pattern,
        }
    }

    /// Compile the regex pattern into a `RegexWrapper`.
    pub fn compile(&self) -> Result<RegexWrapper, ErrorWrapper> {
        match self {
            Self::Basic(pattern) => regex::Regex::new(pattern)
                .map(RegexWrapper::from)
                .map_err(ErrorWrapper::from),
            Self::Fancy(pattern) => fancy_regex::Regex::new(pattern)
                .map(RegexWrapper::from)
                .map_err(ErrorWrapper::from),
            Self::Adaptive(pattern) => regex::Regex::new(pattern)
                .map(RegexWrapper::from)
                .or_else(|_| {
                    fancy_regex::Regex::new(pattern)
                        .map(RegexWrapper::from)
                        .map_err(ErrorWrapper::from)
                }),
        }
    }
}

/// Wrapper for compiled regex patterns.
#[derive(Debug, Clone)]
pub enum RegexWrapper {
    /// Wrapper for `regex::Regex`.
    Basic(regex::Regex),

    /// Wrapper for `fancy_regex::Regex`.
    Fancy(fancy_regex::Regex),
}

impl PartialEq for RegexWrapper {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        match (self, other) {
            (Self::Basic(a), Self::Basic(b)) => a.as_str() == b.as_str(),
            (Self::Fancy(a), Self::Fancy(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl From<regex::Regex> for RegexWrapper {
    fn from(regex: regex::Regex) -> Self {
        Self::Basic(regex)
    }
}

impl From<fancy_regex::Regex> for RegexWrapper {
    fn from(regex: fancy_regex::Regex) -> Self {
        Self::Fancy(regex)
    }
}

impl RegexWrapper {
    /// Is this `Fancy`?
    pub fn is_fancy(&self) -> bool {
        matches!(self, Self::Fancy(_))
    }

    /// Get the underlying regex pattern.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Basic(regex) => regex.as_str(),
            Self::Fancy(regex) => regex.as_str(),
        }
    }

    /// Iterate over the matched spans of `haystack`.
    ///
    /// ## Arguments
    /// * `haystack` - The string to search in.
    pub fn find_spans<'r, 'h>(
        &'r self,
        haystack: &'h str,
    ) -> SpansWrapper<'r, 'h> {
        match self {
            Self::Basic(regex) => SpansWrapper::Regex(regex.find_iter(haystack)),
            Self::Fancy(regex) => SpansWrapper::FancyRegex {
                haystack,
                matches: regex.find_iter(haystack),
                last_end: 0,
                done: false,
            },
        }
    }
}

/// Iterator over matched spans.
pub enum SpansWrapper<'r, 'h> {
    /// Wrapper for `regex::Matches`.
    Regex(regex::Matches<'r, 'h>),

    /// Wrapper for `fancy_regex::Matches`.
    FancyRegex {
        /// The searched text.
        haystack: &'h str,

        /// The underlying matches.
        matches: fancy_regex::Matches<'r, 'h>,

        /// The end of the last yielded span.
        last_end: usize,

        /// Set once the matcher has failed.
        done: bool,
    },
}

impl<'h> Iterator for SpansWrapper<'_, 'h> {
    type Item = &'h str;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Regex(matches) => matches.next().map(|m| m.as_str()),
            Self::FancyRegex {
                haystack,
                matches,
                last_end,
                done,
            } => {
                if *done {
                    return None;
                }
                match matches.next() {
                    Some(Ok(m)) => {
                        *last_end = m.end();
                        Some(m.as_str())
                    }
                    Some(Err(err)) => {
                        // Backtrack limits; keep the rest of the text as one span.
                        log::warn!("span regex failed at byte {}: {err}", *last_end);
                        *done = true;
                        let rest = &haystack[*last_end..];
                        if rest.is_empty() { None } else { Some(rest) }
                    }
                    None => None,
                }
            }
        }
    }
}
