use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use anyhow::Context;

/// Input argument group.
#[derive(clap::Args, Debug)]
pub struct InputArgs {
    /// Input text file, one sample per line; "-" reads stdin.
    #[arg(long, default_value = "data_clean/corpus.txt")]
    pub input: PathBuf,
}

impl InputArgs {
    /// Open a reader for the input.
    pub fn open_reader(&self) -> anyhow::Result<Box<dyn BufRead>> {
        Ok(if self.input.as_os_str() == "-" {
            Box::new(BufReader::new(std::io::stdin().lock()))
        } else {
            let file =
                File::open(&self.input).with_context(|| format!("opening {:?}", self.input))?;
            Box::new(BufReader::new(file))
        })
    }
}
