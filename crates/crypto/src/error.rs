use thiserror::Error;

/// Errors raised by the key agreement and the two cipher stages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// A character outside the 30-symbol alphabet reached the substitution stage
    #[error("invalid character {ch:?} at position {position}: not in the cipher alphabet")]
    InvalidCharacter { ch: char, position: usize },

    /// Transposition input is not a positive multiple of the block size
    #[error("message length {len} is not a positive multiple of {block}")]
    LengthError { len: usize, block: usize },

    /// The peer's public share token is not an unsigned integer
    #[error("malformed public share: {0:?}")]
    MalformedShare(String),

    /// The peer's public share does not lie in [0, modulus)
    #[error("public share {share} out of range for modulus {modulus}")]
    ShareOutOfRange { share: u64, modulus: u64 },

    /// A fixed private exponent outside the range exponents are drawn from
    #[error("private exponent {value} outside {min}..={max}")]
    ExponentOutOfRange { value: u64, min: u64, max: u64 },

    /// A scheme index that would not shift the text (0 or a full alphabet turn)
    #[error("scheme index {index} outside 1..={max}")]
    InvalidSchemeIndex { index: u32, max: u32 },

    /// Scheme count large enough to produce an identity shift
    #[error("scheme count {schemes} exceeds {max}")]
    InvalidSchemeCount { schemes: u32, max: u32 },

    /// Generator/modulus pair rejected
    #[error("invalid public parameters: generator={generator}, modulus={modulus} ({reason})")]
    InvalidParameters {
        generator: u64,
        modulus: u64,
        reason: &'static str,
    },
}

pub type CryptoResult<T> = Result<T, CryptoError>;
