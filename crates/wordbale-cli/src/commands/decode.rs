use std::{
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::Context;
use wordbale::{BatchEncoder, TokenDecoder, shards::read_token_shard};

use crate::logging::LogArgs;

/// Args for the decode command.
#[derive(clap::Args, Debug)]
pub struct DecodeArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    /// Tokenizer model path.
    #[arg(long, default_value = "tokenizer/spm.model")]
    model: PathBuf,

    /// Shard data artifact to decode.
    #[arg(long)]
    shard: PathBuf,
}

impl DecodeArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        self.logging.setup_logging(2)?;

        let encoder = BatchEncoder::open(&self.model)?;
        let decoder = TokenDecoder::new(encoder.model().clone());

        let sequences = read_token_shard(&self.shard)?;
        let mut out = BufWriter::new(std::io::stdout().lock());
        for (i, tokens) in sequences.iter().enumerate() {
            let text = decoder
                .decode(tokens)
                .with_context(|| format!("decoding sequence {i} of {:?}", self.shard))?;
            writeln!(out, "{text}")?;
        }
        out.flush()?;
        Ok(())
    }
}
