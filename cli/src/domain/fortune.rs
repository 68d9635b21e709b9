//! Fortune selection for the `fortune` action.

use rand::Rng;
use rand::seq::SliceRandom;

/// Split a fortune file into entries. Blank lines and `#` comments are skipped.
#[must_use]
pub fn parse_fortunes(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect()
}

/// Pick one entry using `rng`. `None` when there is nothing to pick.
pub fn pick<'a, R: Rng + ?Sized>(fortunes: &[&'a str], rng: &mut R) -> Option<&'a str> {
    fortunes.choose(rng).copied()
}
