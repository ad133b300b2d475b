//! # Corpus Normalizer
//!
//! Cleans a tree of raw ``*.txt`` files into one line-per-sample corpus.

use std::{
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::errors::{WBResult, WordbaleError};

/// The extension of raw corpus source files.
pub const TEXT_EXTENSION: &str = "txt";

fn collect_text_files(
    dir: &Path,
    files: &mut Vec<PathBuf>,
) -> WBResult<()> {
    for entry in fs::read_dir(dir).map_err(|e| WordbaleError::storage(dir, e))? {
        let entry = entry.map_err(|e| WordbaleError::storage(dir, e))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| WordbaleError::storage(&path, e))?;

        if file_type.is_dir() {
            collect_text_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == TEXT_EXTENSION) && path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

/// List every ``*.txt`` file under `input_dir`, recursively.
///
/// ## Returns
/// The file paths, sorted.
///
/// ## Errors
/// [`WordbaleError::CorpusNotFound`] if `input_dir` does not exist,
/// or holds no ``*.txt`` files.
pub fn list_text_files<P: AsRef<Path>>(input_dir: P) -> WBResult<Vec<PathBuf>> {
    let input_dir = input_dir.as_ref();
    if !input_dir.is_dir() {
        return Err(WordbaleError::CorpusNotFound {
            path: input_dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    collect_text_files(input_dir, &mut files)?;
    if files.is_empty() {
        return Err(WordbaleError::CorpusNotFound {
            path: input_dir.to_path_buf(),
        });
    }
    files.sort();
    Ok(files)
}

/// Clean the lines of a text blob.
///
/// Each line is stripped and its whitespace runs collapsed to one space;
/// blank lines are dropped.
///
/// ## Arguments
/// * `text` - the raw text.
/// * `lowercase` - lowercase every line.
pub fn normalize_lines(
    text: &str,
    lowercase: bool,
) -> impl Iterator<Item = String> + '_ {
    text.lines().filter_map(move |line| {
        let mut words = line.split_whitespace();
        let first = words.next()?;

        let mut normalized = String::with_capacity(line.len());
        normalized.push_str(first);
        for word in words {
            normalized.push(' ');
            normalized.push_str(word);
        }
        if lowercase {
            normalized = normalized.to_lowercase();
        }
        Some(normalized)
    })
}

/// Clean every ``*.txt`` file under `input_dir` into `output_file`.
///
/// Files are read in sorted path order; the output holds one cleaned line
/// per row, with a trailing newline. Parent directories are created.
///
/// ## Returns
/// The number of lines written.
///
/// ## Errors
/// * [`WordbaleError::CorpusNotFound`] if there are no source files.
/// * [`WordbaleError::CorpusEmpty`] if no non-blank lines survive.
/// * [`WordbaleError::Storage`] if a file cannot be read or written.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
pub fn ingest_corpus<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    output_file: Q,
    lowercase: bool,
) -> WBResult<usize> {
    let input_dir = input_dir.as_ref();
    let output_file = output_file.as_ref();

    let mut lines = Vec::new();
    for path in list_text_files(input_dir)? {
        let content = fs::read_to_string(&path).map_err(|e| WordbaleError::storage(&path, e))?;
        let before = lines.len();
        lines.extend(normalize_lines(&content, lowercase));
        log::debug!("{:?}: {} lines", path, lines.len() - before);
    }

    if lines.is_empty() {
        return Err(WordbaleError::CorpusEmpty {
            path: input_dir.to_path_buf(),
        });
    }

    if let Some(parent) = output_file.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| WordbaleError::storage(parent, e))?;
    }

    let write = || -> std::io::Result<()> {
        let mut writer = BufWriter::new(fs::File::create(output_file)?);
        for line in &lines {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()
    };
    write().map_err(|e| WordbaleError::storage(output_file, e))?;

    log::info!(
        "Wrote {} lines to {:?} (lowercase={})",
        lines.len(),
        output_file,
        lowercase
    );
    Ok(lines.len())
}
