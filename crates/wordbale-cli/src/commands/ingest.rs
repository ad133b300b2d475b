use std::path::PathBuf;

use anyhow::Context;
use wordbale::corpus::ingest_corpus;

use crate::logging::LogArgs;

/// Args for the ingest command.
#[derive(clap::Args, Debug)]
pub struct IngestArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    /// Directory containing raw ``*.txt`` files.
    #[arg(long, default_value = "data_raw")]
    input_dir: PathBuf,

    /// Destination for the cleaned corpus.
    #[arg(long, default_value = "data_clean/corpus.txt")]
    output_file: PathBuf,

    /// Lowercase text before writing the corpus.
    #[arg(long)]
    lowercase: bool,
}

impl IngestArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        self.logging.setup_logging(3)?;

        let total = ingest_corpus(&self.input_dir, &self.output_file, self.lowercase)
            .with_context(|| format!("ingesting {:?}", self.input_dir))?;

        println!(
            "Wrote {total} lines to {} (lowercase={})",
            self.output_file.display(),
            self.lowercase
        );
        Ok(())
    }
}
