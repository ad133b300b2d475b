//! # Character Coverage

use crate::{
    errors::{WBResult, WordbaleError},
    training::CountType,
    types::WBHashMap,
};

/// Check that a coverage fraction lies in ``(0, 1]``.
pub fn validate_character_coverage(character_coverage: f64) -> WBResult<()> {
    if character_coverage > 0.0 && character_coverage <= 1.0 {
        Ok(())
    } else {
        Err(WordbaleError::InvalidConfiguration(format!(
            "character_coverage must be in (0, 1], got {character_coverage}"
        )))
    }
}

/// Select the model alphabet from corpus char counts.
///
/// Chars are ranked by descending count, ties broken by ascending code point.
/// The result is the shortest rank prefix whose cumulative count reaches
/// ``character_coverage`` of the total.
///
/// ## Arguments
/// * `char_counts` - occurrence counts per char.
/// * `character_coverage` - the fraction of char occurrences to cover; in ``(0, 1]``.
///
/// ## Returns
/// The selected chars, most frequent first.
pub fn select_alphabet<C: CountType>(
    char_counts: &WBHashMap<char, C>,
    character_coverage: f64,
) -> WBResult<Vec<char>> {
    validate_character_coverage(character_coverage)?;

    let mut ranked: Vec<(char, C)> = char_counts
        .iter()
        .filter(|&(_, &n)| n > C::zero())
        .map(|(&c, &n)| (c, n))
        .collect();
    ranked.sort_by(|(ca, na), (cb, nb)| nb.cmp(na).then(ca.cmp(cb)));

    let total: f64 = ranked
        .iter()
        .map(|(_, n)| n.to_f64().unwrap_or(0.0))
        .sum();

    let mut covered = 0.0;
    let mut alphabet = Vec::with_capacity(ranked.len());
    for (c, n) in ranked {
        if covered / total >= character_coverage {
            break;
        }
        covered += n.to_f64().unwrap_or(0.0);
        alphabet.push(c);
    }

    log::debug!(
        "alphabet: {} chars cover {covered}/{total} occurrences",
        alphabet.len()
    );

    Ok(alphabet)
}
