use std::{io::BufRead, path::PathBuf};

use anyhow::{Context, bail};
use wordbale::{
    BatchEncoder,
    BoundaryMarkers,
    ShardWriter,
    ShardWriterOptions,
    shards::MetadataFields,
};

use crate::{input_output::InputArgs, logging::LogArgs};

/// Parse a ``key=value`` metadata flag.
///
/// The value is read as JSON when it parses, and as a string otherwise.
fn parse_meta(arg: &str) -> anyhow::Result<(String, serde_json::Value)> {
    let Some((key, value)) = arg.split_once('=') else {
        bail!("expected key=value, got {arg:?}");
    };
    if key.is_empty() {
        bail!("empty metadata key in {arg:?}");
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Args for the encode command.
#[derive(clap::Args, Debug)]
pub struct EncodeArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    /// Tokenizer model path.
    #[arg(long, default_value = "tokenizer/spm.model")]
    model: PathBuf,

    #[command(flatten)]
    input: InputArgs,

    /// Shard output directory.
    #[arg(long, default_value = "shards")]
    output_dir: PathBuf,

    /// Sequences per shard.
    #[arg(long, default_value_t = 1024)]
    shard_size: usize,

    /// Lines encoded per batch.
    #[arg(long, default_value_t = 4096)]
    batch_size: usize,

    /// Do not prepend ``<s>``.
    #[arg(long)]
    no_bos: bool,

    /// Do not append ``</s>``.
    #[arg(long)]
    no_eos: bool,

    /// Sidecar metadata, as ``key=value``; may be repeated.
    #[arg(long = "meta", value_parser = parse_meta)]
    meta: Vec<(String, serde_json::Value)>,
}

impl EncodeArgs {
    fn metadata(&self) -> MetadataFields {
        self.meta.iter().cloned().collect()
    }

    fn markers(&self) -> BoundaryMarkers {
        BoundaryMarkers::default()
            .with_bos(!self.no_bos)
            .with_eos(!self.no_eos)
    }

    pub fn run(&self) -> anyhow::Result<()> {
        self.logging.setup_logging(3)?;
        if self.batch_size == 0 {
            bail!("--batch-size must be >= 1");
        }

        let encoder = BatchEncoder::open(&self.model)?;
        let markers = self.markers();

        let mut writer = ShardWriter::new(
            &self.output_dir,
            ShardWriterOptions::new(self.shard_size),
            Some(self.metadata()),
        )?;

        let mut skipped = 0usize;
        let mut batch: Vec<String> = Vec::with_capacity(self.batch_size);
        let mut flush = |batch: &mut Vec<String>| -> anyhow::Result<()> {
            writer.extend(encoder.par_encode_batch(batch.as_slice(), markers))?;
            batch.clear();
            Ok(())
        };

        for line in self.input.open_reader()?.lines() {
            let line = line.with_context(|| format!("reading {:?}", self.input.input))?;
            if line.trim().is_empty() {
                skipped += 1;
                continue;
            }
            batch.push(line);
            if batch.len() == self.batch_size {
                flush(&mut batch)?;
            }
        }
        flush(&mut batch)?;

        if skipped > 0 {
            log::warn!("skipped {skipped} blank input lines");
        }
        let paths = writer
            .finish()
            .with_context(|| format!("writing shards to {:?}", self.output_dir))?;

        println!("Wrote {} shards to {}", paths.len(), self.output_dir.display());
        Ok(())
    }
}
