//! # Shard Naming and Options

use crate::errors::{WBResult, WordbaleError};

/// The data artifact file extension.
pub const DATA_EXTENSION: &str = "bin";

/// The sidecar descriptor file extension.
pub const SIDECAR_EXTENSION: &str = "json";

/// Options for [`crate::shards::ShardWriter`] and the shard readers.
///
/// Shard `i` is stored as ``{file_prefix}{i:0index_width}.bin``,
/// with an optional ``{file_prefix}{i:0index_width}.json`` sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardWriterOptions {
    /// Sequences per shard; the final shard may hold fewer.
    pub shard_size: usize,

    /// The 0-pad width of the shard index.
    pub index_width: usize,

    /// The file name prefix.
    pub file_prefix: String,
}

impl Default for ShardWriterOptions {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ShardWriterOptions {
    /// Create options with the default naming.
    ///
    /// ## Arguments
    /// * `shard_size` - Sequences per shard; checked by [`Self::validate`].
    pub fn new(shard_size: usize) -> Self {
        Self {
            shard_size,
            index_width: 4,
            file_prefix: "tokens_".to_string(),
        }
    }

    /// Sets the shard size.
    pub fn with_shard_size(
        self,
        shard_size: usize,
    ) -> Self {
        Self { shard_size, ..self }
    }

    /// Sets the 0-pad width of the shard index.
    pub fn with_index_width(
        self,
        index_width: usize,
    ) -> Self {
        Self {
            index_width,
            ..self
        }
    }

    /// Sets the file name prefix.
    pub fn with_file_prefix<S: Into<String>>(
        self,
        file_prefix: S,
    ) -> Self {
        Self {
            file_prefix: file_prefix.into(),
            ..self
        }
    }

    /// Check the options.
    ///
    /// ## Errors
    /// [`WordbaleError::InvalidConfiguration`] if `shard_size` is zero,
    /// or the prefix is empty or contains a path separator.
    pub fn validate(&self) -> WBResult<()> {
        if self.shard_size == 0 {
            return Err(WordbaleError::InvalidConfiguration(format!(
                "shard_size must be >= 1, got {}",
                self.shard_size
            )));
        }
        if self.file_prefix.is_empty()
            || self.file_prefix.starts_with('.')
            || self.file_prefix.contains(['/', '\\'])
        {
            return Err(WordbaleError::InvalidConfiguration(format!(
                "file_prefix must be a plain, non-hidden file name prefix: {:?}",
                self.file_prefix
            )));
        }
        Ok(())
    }

    /// Format a shard index with 0-padding.
    pub fn format_index(
        &self,
        index: usize,
    ) -> String {
        format!("{index:0width$}", width = self.index_width)
    }

    /// The data artifact file name for a shard.
    pub fn data_file_name(
        &self,
        index: usize,
    ) -> String {
        format!(
            "{}{}.{DATA_EXTENSION}",
            self.file_prefix,
            self.format_index(index)
        )
    }

    /// The sidecar descriptor file name for a shard.
    pub fn sidecar_file_name(
        &self,
        index: usize,
    ) -> String {
        format!(
            "{}{}.{SIDECAR_EXTENSION}",
            self.file_prefix,
            self.format_index(index)
        )
    }

    /// Parse the shard index out of a file name with the given extension.
    ///
    /// ## Returns
    /// `None` unless `name` is ``{file_prefix}{digits}.{extension}``.
    pub fn parse_file_name(
        &self,
        name: &str,
        extension: &str,
    ) -> Option<usize> {
        let digits = name
            .strip_prefix(self.file_prefix.as_str())?
            .strip_suffix(extension)?
            .strip_suffix('.')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naming() {
        let options = ShardWriterOptions::new(8);
        assert_eq!(options.format_index(0), "0000");
        assert_eq!(options.format_index(312), "0312");
        assert_eq!(options.format_index(12345), "12345");
        assert_eq!(options.data_file_name(7), "tokens_0007.bin");
        assert_eq!(options.sidecar_file_name(7), "tokens_0007.json");

        let options = options.with_index_width(6).with_file_prefix("train-");
        assert_eq!(options.data_file_name(42), "train-000042.bin");
    }

    #[test]
    fn test_parse_file_name() {
        let options = ShardWriterOptions::new(8);
        assert_eq!(options.parse_file_name("tokens_0007.bin", DATA_EXTENSION), Some(7));
        assert_eq!(options.parse_file_name("tokens_10000.bin", DATA_EXTENSION), Some(10000));
        assert_eq!(options.parse_file_name("tokens_0007.json", SIDECAR_EXTENSION), Some(7));
        assert_eq!(options.parse_file_name("tokens_0007.json", DATA_EXTENSION), None);
        assert_eq!(options.parse_file_name("tokens_.bin", DATA_EXTENSION), None);
        assert_eq!(options.parse_file_name("tokens_00x7.bin", DATA_EXTENSION), None);
        assert_eq!(options.parse_file_name(".tokens_0007.bin.tmp", DATA_EXTENSION), None);
        assert_eq!(options.parse_file_name("other_0007.bin", DATA_EXTENSION), None);
    }

    #[test]
    fn test_validate() {
        assert!(ShardWriterOptions::new(1).validate().is_ok());
        assert!(matches!(
            ShardWriterOptions::new(0).validate(),
            Err(WordbaleError::InvalidConfiguration(_))
        ));
        assert!(ShardWriterOptions::new(1).with_file_prefix("").validate().is_err());
        assert!(ShardWriterOptions::new(1).with_file_prefix("a/b").validate().is_err());
        assert!(ShardWriterOptions::new(1).with_file_prefix(".hidden").validate().is_err());
    }
}
