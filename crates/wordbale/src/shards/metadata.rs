//! # Shard Sidecar Descriptors

use std::{fs, io::Write, path::Path};

use serde::{Deserialize, Serialize};

use crate::errors::{WBResult, WordbaleError};

/// Caller-supplied sidecar fields.
pub type MetadataFields = serde_json::Map<String, serde_json::Value>;

/// The reserved sidecar key holding the shard's sequence count.
pub const COUNT_KEY: &str = "count";

/// The sidecar record of one shard: ``{count} ∪ fields``.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardMetadata {
    /// The number of sequences stored in the shard.
    pub count: usize,

    /// Caller-supplied fields; never contains [`COUNT_KEY`].
    #[serde(flatten)]
    pub fields: MetadataFields,
}

impl ShardMetadata {
    /// Build the record for a shard of `count` sequences.
    ///
    /// A caller field named [`COUNT_KEY`] is dropped; the stored count wins.
    pub fn new(
        count: usize,
        fields: &MetadataFields,
    ) -> Self {
        let mut fields = fields.clone();
        if let Some(value) = fields.remove(COUNT_KEY) {
            log::warn!("ignoring caller metadata {COUNT_KEY}={value}; the shard count is authoritative");
        }
        Self { count, fields }
    }

    /// Write the record as pretty JSON.
    pub fn write_to<W: Write>(
        &self,
        writer: &mut W,
    ) -> WBResult<()> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Read a shard sidecar descriptor.
///
/// ## Errors
/// * [`WordbaleError::Storage`] if the file cannot be read.
/// * [`WordbaleError::Format`] if the contents are not a sidecar record.
pub fn read_shard_metadata<P: AsRef<Path>>(path: P) -> WBResult<ShardMetadata> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| WordbaleError::storage(path, e))?;
    serde_json::from_str(&text).map_err(|e| WordbaleError::format(path, e.to_string()))
}
