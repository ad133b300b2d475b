mod decode;
mod encode;
mod ingest;
mod train;
mod verify;

/// Subcommands for wordbale.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Clean raw ``*.txt`` files into one corpus.
    Ingest(ingest::IngestArgs),

    /// Train a tokenizer over a corpus.
    Train(train::TrainArgs),

    /// Encode a text file into token shards.
    Encode(encode::EncodeArgs),

    /// Check a shard directory and print its summary.
    Verify(verify::VerifyArgs),

    /// Decode a shard back into text.
    Decode(decode::DecodeArgs),
}

impl Commands {
    /// Run the subcommand.
    pub fn run(&self) -> anyhow::Result<()> {
        match self {
            Commands::Ingest(cmd) => cmd.run(),
            Commands::Train(cmd) => cmd.run(),
            Commands::Encode(cmd) => cmd.run(),
            Commands::Verify(cmd) => cmd.run(),
            Commands::Decode(cmd) => cmd.run(),
        }
    }
}
