//! # Classical two-stage cipher with toy key agreement
//!
//! - `keying`: discrete-log key agreement and scheme index derivation
//! - `substitution`: circular shift over a 30-symbol alphabet
//! - `transposition`: 4x4 block transposition plus the padding rule
//!
//! ```text
//! plaintext -> pad(16) -> substitute(i) -> transpose -> ciphertext
//! ciphertext -> reverse_transpose -> reverse_substitute(i) -> padded plaintext
//! ```
//!
//! None of this is secure. Parameters are tiny and both stages are classical.

pub mod alphabet;
pub mod error;
pub mod keying;
pub mod substitution;
pub mod transposition;

pub use error::{CryptoError, CryptoResult};
pub use keying::{
    check_scheme_count, PrivateExponent, PublicParameters, PublicShare, SchemeIndex,
    SharedSecret, EXPONENT_RANGE, MAX_SCHEME_INDEX, SCHEME_COUNT,
};
pub use substitution::{reverse_substitute, reverse_substitute_text, substitute, substitute_text};
pub use transposition::{pad, reverse_transpose, transpose, BLOCK_SIZE};
