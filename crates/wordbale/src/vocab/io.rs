//! # Model and Vocab Listing IO
//!
//! ## Model Files
//!
//! A `.model` file is line oriented UTF-8 text:
//! ```terminaloutput
//! wordbale-model 1
//! pattern {BASE64 PATTERN}
//! special {LABEL} {TOKEN}
//! char {TOKEN} {BASE64 CHAR}
//! merge {TOKEN} {LEFT} {RIGHT}
//! ```
//!
//! There is one `special` line for each of ``pad, unk, bos, eos``;
//! `merge` lines are in ascending target order.
//!
//! ## Vocab Listings
//!
//! A `.vocab` file lists every piece of a model, one per token:
//! ```terminaloutput
//! {BASE64 PIECE} {TOKEN}
//! ```

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use base64::{Engine, prelude::BASE64_STANDARD};

use crate::{
    errors::{WBResult, WordbaleError},
    regex::RegexPattern,
    types::TokenType,
    vocab::{
        CharMapVocab,
        PairMapVocab,
        PairTokenMap,
        SpecialToken,
        SpecialVocab,
        TokenizerModel,
    },
};

/// The header line of a model file.
pub const MODEL_HEADER: &str = "wordbale-model 1";

/// Save a [`TokenizerModel`] to a model file.
///
/// ## Arguments
/// * `model` - the model to save.
/// * `path` - the target path; the parent directory must exist.
pub fn save_model_path<T: TokenType, P: AsRef<Path>>(
    model: &TokenizerModel<T>,
    path: P,
) -> WBResult<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| WordbaleError::storage(path, e))?;
    let mut writer = BufWriter::new(file);
    write_model(model, &mut writer)?;
    writer.flush().map_err(|e| WordbaleError::storage(path, e))
}

/// Write a [`TokenizerModel`] to a [`Write`] writer.
pub fn write_model<T, W>(
    model: &TokenizerModel<T>,
    writer: &mut W,
) -> WBResult<()>
where
    T: TokenType,
    W: Write,
{
    writeln!(writer, "{MODEL_HEADER}")?;
    writeln!(
        writer,
        "pattern {}",
        BASE64_STANDARD.encode(model.pattern().as_str())
    )?;

    for (special, token) in model.specials().iter() {
        writeln!(writer, "special {} {}", special.label(), token)?;
    }

    let mut buf = [0u8; 4];
    for (token, c) in model.char_vocab().sorted_entries() {
        writeln!(
            writer,
            "char {} {}",
            token,
            BASE64_STANDARD.encode(c.encode_utf8(&mut buf).as_bytes())
        )?;
    }

    for (token, (a, b)) in model.pair_vocab().sorted_merges() {
        writeln!(writer, "merge {token} {a} {b}")?;
    }

    Ok(())
}

/// Load a [`TokenizerModel`] from a model file.
///
/// ## Errors
/// * [`WordbaleError::ModelNotFound`] if the file cannot be opened.
/// * [`WordbaleError::Format`] if the contents are malformed.
pub fn load_model_path<T, P>(path: P) -> WBResult<TokenizerModel<T>>
where
    T: TokenType,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| WordbaleError::ModelNotFound {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    read_model(BufReader::new(file), path)
}

/// Read a [`TokenizerModel`] from a model line reader.
///
/// ## Arguments
/// * `reader` - the line reader.
/// * `source` - the path reported in errors.
pub fn read_model<T, R>(
    reader: R,
    source: &Path,
) -> WBResult<TokenizerModel<T>>
where
    T: TokenType,
    R: BufRead,
{
    let bad = |lineno: usize, reason: String| WordbaleError::format(source, format!("line {lineno}: {reason}"));

    let mut lines = reader.lines().enumerate().map(|(idx, line)| (idx + 1, line));

    let header = lines.next().map(|(_, line)| line).transpose()?;
    if header.as_deref().map(str::trim_end) != Some(MODEL_HEADER) {
        return Err(bad(1, format!("expected header {MODEL_HEADER:?}")));
    }

    let mut pattern: Option<RegexPattern> = None;
    let mut specials: [Option<T>; 4] = [None; 4];
    let mut chars: Vec<(char, T)> = Vec::new();
    let mut pairs: PairTokenMap<T> = Default::default();

    for (lineno, line) in lines {
        let line = line?;
        let parts: Vec<&str> = line.split(' ').collect();
        match parts.as_slice() {
            [] | [""] => continue,
            ["pattern", encoded] => {
                let text = decode_text(encoded).map_err(|e| bad(lineno, e))?;
                pattern = Some(text.into());
            }
            ["special", label, token] => {
                let special = SpecialToken::from_label(label)
                    .ok_or_else(|| bad(lineno, format!("unknown special {label:?}")))?;
                specials[special as usize] = Some(parse_token(token).map_err(|e| bad(lineno, e))?);
            }
            ["char", token, encoded] => {
                let token = parse_token(token).map_err(|e| bad(lineno, e))?;
                let text = decode_text(encoded).map_err(|e| bad(lineno, e))?;
                let mut it = text.chars();
                match (it.next(), it.next()) {
                    (Some(c), None) => chars.push((c, token)),
                    _ => return Err(bad(lineno, format!("not a single char: {text:?}"))),
                }
            }
            ["merge", token, a, b] => {
                let token = parse_token(token).map_err(|e| bad(lineno, e))?;
                let a = parse_token(a).map_err(|e| bad(lineno, e))?;
                let b = parse_token(b).map_err(|e| bad(lineno, e))?;
                if pairs.insert((a, b), token).is_some() {
                    return Err(bad(lineno, format!("duplicate merge ({a}, {b})")));
                }
            }
            _ => return Err(bad(lineno, format!("unrecognized record {line:?}"))),
        }
    }

    let pattern = pattern.ok_or_else(|| WordbaleError::format(source, "missing pattern"))?;
    let [Some(pad), Some(unk), Some(bos), Some(eos)] = specials else {
        return Err(WordbaleError::format(source, "missing special token assignments"));
    };

    let invalid = |e: WordbaleError| WordbaleError::format(source, e.to_string());
    let specials = SpecialVocab::try_new(pad, unk, bos, eos).map_err(invalid)?;
    let char_vocab = CharMapVocab::from_entries(chars).map_err(invalid)?;
    let pair_vocab = PairMapVocab::init(char_vocab, pairs).map_err(invalid)?;

    TokenizerModel::init(pattern, specials, pair_vocab).map_err(invalid)
}

/// Save the vocab listing of a model.
///
/// ## Arguments
/// * `model` - the model to list.
/// * `path` - the target path; the parent directory must exist.
pub fn save_vocab_listing_path<T: TokenType, P: AsRef<Path>>(
    model: &TokenizerModel<T>,
    path: P,
) -> WBResult<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| WordbaleError::storage(path, e))?;
    let mut writer = BufWriter::new(file);
    write_vocab_listing(model, &mut writer)?;
    writer.flush().map_err(|e| WordbaleError::storage(path, e))
}

/// Write the vocab listing of a model to a [`Write`] writer.
///
/// Lines are:
/// ```terminaloutput
/// {BASE64 PIECE} {TOKEN}
/// ```
pub fn write_vocab_listing<T, W>(
    model: &TokenizerModel<T>,
    writer: &mut W,
) -> WBResult<()>
where
    T: TokenType,
    W: Write,
{
    for (token, piece) in model.pieces() {
        writeln!(writer, "{} {}", BASE64_STANDARD.encode(piece), token)?;
    }
    Ok(())
}

/// Read a vocab listing into ``(token, piece)`` entries, in file order.
pub fn read_vocab_listing<T, R>(reader: R) -> WBResult<Vec<(T, String)>>
where
    T: TokenType,
    R: BufRead,
{
    let mut entries = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let bad = |reason: String| WordbaleError::format("<vocab>", format!("line {}: {reason}", idx + 1));

        let (encoded, token) = line
            .split_once(' ')
            .ok_or_else(|| bad(format!("expected '{{piece}} {{token}}': {line:?}")))?;
        let piece = decode_text(encoded).map_err(bad)?;
        let token = parse_token(token).map_err(bad)?;
        entries.push((token, piece));
    }
    Ok(entries)
}

fn parse_token<T: TokenType>(text: &str) -> Result<T, String> {
    let id: u64 = text
        .parse()
        .map_err(|e: core::num::ParseIntError| format!("bad token {text:?}: {e}"))?;
    T::from_u64(id).ok_or_else(|| format!("token {id} out of range"))
}

fn decode_text(encoded: &str) -> Result<String, String> {
    let bytes = BASE64_STANDARD
        .decode(encoded)
        .map_err(|e| format!("bad base64 {encoded:?}: {e}"))?;
    String::from_utf8(bytes).map_err(|e| format!("bad utf-8: {e}"))
}
