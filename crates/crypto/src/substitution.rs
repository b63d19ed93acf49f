//! Circular-shift substitution over the cipher alphabet.

use crate::alphabet;
use crate::error::{CryptoError, CryptoResult};
use crate::keying::SchemeIndex;

fn shift_of(scheme: SchemeIndex) -> usize {
    scheme.get() as usize % alphabet::LEN
}

fn lookup(ch: char, position: usize) -> CryptoResult<usize> {
    alphabet::index_of(ch).ok_or(CryptoError::InvalidCharacter { ch, position })
}

/// `ALPHABET[(j + i) mod 30]` where `j` is the index of `ch`.
pub fn substitute(ch: char, scheme: SchemeIndex) -> CryptoResult<char> {
    let j = lookup(ch, 0)?;
    Ok(alphabet::symbol_at(j + shift_of(scheme)))
}

/// Inverse of [`substitute`]; the index never goes negative.
pub fn reverse_substitute(ch: char, scheme: SchemeIndex) -> CryptoResult<char> {
    let j = lookup(ch, 0)?;
    Ok(alphabet::symbol_at(j + alphabet::LEN - shift_of(scheme)))
}

/// Substitute every character, failing on the first one outside the alphabet.
pub fn substitute_text(text: &str, scheme: SchemeIndex) -> CryptoResult<String> {
    let shift = shift_of(scheme);
    text.chars()
        .enumerate()
        .map(|(pos, ch)| Ok(alphabet::symbol_at(lookup(ch, pos)? + shift)))
        .collect()
}

pub fn reverse_substitute_text(text: &str, scheme: SchemeIndex) -> CryptoResult<String> {
    let back = alphabet::LEN - shift_of(scheme);
    text.chars()
        .enumerate()
        .map(|(pos, ch)| Ok(alphabet::symbol_at(lookup(ch, pos)? + back)))
        .collect()
}
