//! 4x4 block transposition and the padding rule that feeds it.
//!
//! Each 16-character block is laid into a 4x4 grid row by row and read back
//! column by column. The reverse pass applies the inverse permutation.

use crate::alphabet;
use crate::error::{CryptoError, CryptoResult};

const GRID: usize = 4;
pub const BLOCK_SIZE: usize = GRID * GRID;

/// Output position `k` of a block takes input position `FORWARD[k]`.
const FORWARD: [usize; BLOCK_SIZE] = forward_permutation();
const INVERSE: [usize; BLOCK_SIZE] = invert(&FORWARD);

const fn forward_permutation() -> [usize; BLOCK_SIZE] {
    let mut perm = [0usize; BLOCK_SIZE];
    let mut col = 0;
    while col < GRID {
        let mut row = 0;
        while row < GRID {
            perm[GRID * col + row] = GRID * row + col;
            row += 1;
        }
        col += 1;
    }
    perm
}

const fn invert(perm: &[usize; BLOCK_SIZE]) -> [usize; BLOCK_SIZE] {
    let mut inv = [0usize; BLOCK_SIZE];
    let mut k = 0;
    while k < BLOCK_SIZE {
        inv[perm[k]] = k;
        k += 1;
    }
    inv
}

/// Right-pad with the alphabet's space until the length is a multiple of 16.
/// Lengths are counted in characters. Already-aligned input is returned as is.
pub fn pad(message: &str) -> String {
    let len = message.chars().count();
    let missing = (BLOCK_SIZE - len % BLOCK_SIZE) % BLOCK_SIZE;
    let mut padded = String::with_capacity(message.len() + missing);
    padded.push_str(message);
    padded.extend(std::iter::repeat(alphabet::PAD).take(missing));
    padded
}

fn permute_blocks(message: &str, table: &[usize; BLOCK_SIZE]) -> CryptoResult<String> {
    let chars: Vec<char> = message.chars().collect();
    if chars.is_empty() || chars.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::LengthError {
            len: chars.len(),
            block: BLOCK_SIZE,
        });
    }

    let mut out = String::with_capacity(message.len());
    for block in chars.chunks_exact(BLOCK_SIZE) {
        out.extend(table.iter().map(|&src| block[src]));
    }
    Ok(out)
}

/// Forward transposition of every block, in block order.
pub fn transpose(message: &str) -> CryptoResult<String> {
    permute_blocks(message, &FORWARD)
}

/// Exact inverse of [`transpose`].
pub fn reverse_transpose(message: &str) -> CryptoResult<String> {
    permute_blocks(message, &INVERSE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_table() {
        assert_eq!(
            FORWARD,
            [0, 4, 8, 12, 1, 5, 9, 13, 2, 6, 10, 14, 3, 7, 11, 15]
        );
        for k in 0..BLOCK_SIZE {
            assert_eq!(INVERSE[FORWARD[k]], k);
        }
    }

    #[test]
    fn test_single_block() {
        let t = transpose("ABCDEFGHIJKLMNOP").unwrap();
        assert_eq!(t, "AEIMBFJNCGKODHLP");
        assert_eq!(reverse_transpose(&t).unwrap(), "ABCDEFGHIJKLMNOP");
    }

    #[test]
    fn test_blocks_are_independent() {
        let msg = "ABCDEFGHIJKLMNOPQRSTUVWXYZ,.? AB";
        let t = transpose(msg).unwrap();
        assert_eq!(&t[..16], "AEIMBFJNCGKODHLP");
        assert_eq!(&t[16..], transpose("QRSTUVWXYZ,.? AB").unwrap());
        assert_eq!(reverse_transpose(&t).unwrap(), msg);
    }

    #[test]
    fn test_spaces_survive() {
        let msg = "  A   B  C    D ";
        assert_eq!(reverse_transpose(&transpose(msg).unwrap()).unwrap(), msg);
    }

    #[test]
    fn test_length_errors() {
        for bad in ["", "ABC", "ABCDEFGHIJKLMNOPQ"] {
            let len = bad.len();
            assert_eq!(
                transpose(bad),
                Err(CryptoError::LengthError { len, block: 16 })
            );
            assert_eq!(
                reverse_transpose(bad),
                Err(CryptoError::LengthError { len, block: 16 })
            );
        }
    }

    #[test]
    fn test_pad_to_block() {
        assert_eq!(pad(""), "");
        assert_eq!(pad("HI"), format!("HI{}", " ".repeat(14)));
        assert_eq!(pad("ABCDEFGHIJKLMNOP"), "ABCDEFGHIJKLMNOP");

        for len in 0..70 {
            let msg = "X".repeat(len);
            let padded = pad(&msg);
            assert_eq!(padded.len() % BLOCK_SIZE, 0);
            assert!(padded.len() >= len && padded.len() < len + BLOCK_SIZE);
            assert!(padded.starts_with(&msg));
            assert!(padded[len..].chars().all(|c| c == ' '));
            assert_eq!(pad(&padded), padded);
        }
    }
}
