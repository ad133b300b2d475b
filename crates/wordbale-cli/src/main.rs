mod commands;
mod input_output;
mod logging;

use clap::Parser;
use commands::Commands;

/// wordbale: corpus, tokenizer, and token-shard pipeline.
#[derive(clap::Parser, Debug)]
#[command(name = "wordbale", version)]
pub struct Args {
    /// Subcommand to run.
    #[clap(subcommand)]
    pub command: Commands,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    args.command.run()
}
