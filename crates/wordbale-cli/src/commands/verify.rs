use std::path::PathBuf;

use anyhow::Context;
use wordbale::{ShardWriterOptions, shards::verify_shard_dir};

use crate::logging::LogArgs;

/// Args for the verify command.
#[derive(clap::Args, Debug)]
pub struct VerifyArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    /// Shard directory.
    #[arg(long)]
    dir: PathBuf,

    /// Shard file name prefix.
    #[arg(long, default_value = "tokens_")]
    prefix: String,
}

impl VerifyArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        self.logging.setup_logging(2)?;

        let options = ShardWriterOptions::default().with_file_prefix(self.prefix.as_str());
        let summary = verify_shard_dir(&self.dir, &options)
            .with_context(|| format!("verifying {:?}", self.dir))?;

        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }
}
