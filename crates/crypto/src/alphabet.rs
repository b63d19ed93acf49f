//! The fixed 30-symbol alphabet shared by both endpoints.

/// Uppercase letters, then comma, period, question mark and space.
pub const SYMBOLS: [char; 30] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', ',', '.', '?', ' ',
];

pub const LEN: usize = SYMBOLS.len();

/// Symbol appended when padding a message to the block size.
pub const PAD: char = ' ';

/// Zero-based position of `ch` in the alphabet.
pub fn index_of(ch: char) -> Option<usize> {
    SYMBOLS.iter().position(|&s| s == ch)
}

/// Symbol at `index`, wrapping around the alphabet.
pub fn symbol_at(index: usize) -> char {
    SYMBOLS[index % LEN]
}

pub fn contains(ch: char) -> bool {
    index_of(ch).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        assert_eq!(LEN, 30);
        assert_eq!(index_of('A'), Some(0));
        assert_eq!(index_of('Z'), Some(25));
        assert_eq!(index_of(','), Some(26));
        assert_eq!(index_of('.'), Some(27));
        assert_eq!(index_of('?'), Some(28));
        assert_eq!(index_of(' '), Some(29));
        assert!(contains(PAD));
    }

    #[test]
    fn test_rejects_outsiders() {
        for ch in ['a', 'z', '#', '!', '0', '\n', 'É'] {
            assert!(!contains(ch), "{ch:?} should not be in the alphabet");
        }
    }

    #[test]
    fn test_symbol_at_wraps() {
        assert_eq!(symbol_at(30), 'A');
        assert_eq!(symbol_at(59), ' ');
    }
}
