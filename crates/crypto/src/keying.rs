//! Discrete-logarithm key agreement over small public parameters.
//!
//! Both endpoints hold the same `(generator, modulus)` pair, draw a private
//! exponent, exchange `generator^x mod modulus`, and raise the peer's share
//! to their own exponent. All values are `u64`; exponentiation is exact
//! square-and-multiply with `u128` intermediates, so no product overflows
//! for any `u64` modulus. No primality or primitive-root check is done.

use std::fmt;
use std::num::NonZeroU32;
use std::ops::RangeInclusive;
use std::str::FromStr;

use rand::rngs::OsRng;
use rand::Rng;

use crate::alphabet;
use crate::error::{CryptoError, CryptoResult};

pub const DEFAULT_GENERATOR: u64 = 3;
pub const DEFAULT_MODULUS: u64 = 15;

/// Number of substitution schemes a shared secret selects from.
pub const SCHEME_COUNT: NonZeroU32 = match NonZeroU32::new(5) {
    Some(n) => n,
    None => panic!("scheme count must be non-zero"),
};

/// Range private exponents are drawn from.
pub const EXPONENT_RANGE: RangeInclusive<u64> = 1..=10;

/// Largest usable scheme index. A shift of a full alphabet turn is the
/// identity, so indices must stay below the alphabet length.
pub const MAX_SCHEME_INDEX: u32 = alphabet::LEN as u32 - 1;

/// Accept a scheme count only if every index it can produce shifts the text.
pub fn check_scheme_count(schemes: NonZeroU32) -> CryptoResult<NonZeroU32> {
    if schemes.get() > MAX_SCHEME_INDEX {
        return Err(CryptoError::InvalidSchemeCount {
            schemes: schemes.get(),
            max: MAX_SCHEME_INDEX,
        });
    }
    Ok(schemes)
}

/// `base^exp mod modulus`, exact for every `u64` input.
pub fn mod_pow(base: u64, exp: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let m = modulus as u128;
    let mut result: u128 = 1;
    let mut base = base as u128 % m;
    let mut exp = exp;

    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base % m;
        }
        base = base * base % m;
        exp >>= 1;
    }

    result as u64
}

/// Generator and modulus agreed out-of-band by both endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicParameters {
    generator: u64,
    modulus: u64,
}

impl PublicParameters {
    pub fn new(generator: u64, modulus: u64) -> CryptoResult<Self> {
        let reject = |reason| {
            Err(CryptoError::InvalidParameters {
                generator,
                modulus,
                reason,
            })
        };
        if modulus < 2 {
            return reject("modulus must be at least 2");
        }
        if generator == 0 {
            return reject("generator must be positive");
        }
        if generator >= modulus {
            return reject("generator must be smaller than modulus");
        }
        Ok(Self { generator, modulus })
    }

    pub fn generator(&self) -> u64 {
        self.generator
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// `generator^exponent mod modulus`
    pub fn public_share(&self, exponent: &PrivateExponent) -> PublicShare {
        PublicShare(mod_pow(self.generator, exponent.0, self.modulus))
    }

    /// `peer^exponent mod modulus`
    pub fn shared_secret(&self, exponent: &PrivateExponent, peer: PublicShare) -> SharedSecret {
        SharedSecret(mod_pow(peer.0, exponent.0, self.modulus))
    }

    /// Reject a received share that could not have come from these parameters.
    pub fn check_share(&self, share: PublicShare) -> CryptoResult<PublicShare> {
        if share.0 >= self.modulus {
            return Err(CryptoError::ShareOutOfRange {
                share: share.0,
                modulus: self.modulus,
            });
        }
        Ok(share)
    }
}

impl Default for PublicParameters {
    fn default() -> Self {
        Self {
            generator: DEFAULT_GENERATOR,
            modulus: DEFAULT_MODULUS,
        }
    }
}

/// Per-session secret exponent. Never leaves the endpoint that drew it.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateExponent(u64);

impl PrivateExponent {
    /// Draw a fresh exponent from [`EXPONENT_RANGE`] using the OS RNG.
    pub fn generate() -> Self {
        Self(OsRng.gen_range(EXPONENT_RANGE))
    }

    /// A fixed exponent, which must lie in [`EXPONENT_RANGE`].
    pub fn from_value(value: u64) -> CryptoResult<Self> {
        if !EXPONENT_RANGE.contains(&value) {
            return Err(CryptoError::ExponentOutOfRange {
                value,
                min: *EXPONENT_RANGE.start(),
                max: *EXPONENT_RANGE.end(),
            });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for PrivateExponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateExponent(..)")
    }
}

/// Value transmitted to the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicShare(u64);

impl PublicShare {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PublicShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PublicShare {
    type Err = CryptoError;

    fn from_str(s: &str) -> CryptoResult<Self> {
        s.parse::<u64>()
            .map(PublicShare)
            .map_err(|_| CryptoError::MalformedShare(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedSecret(u64);

impl SharedSecret {
    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn scheme_index(&self, schemes: NonZeroU32) -> CryptoResult<SchemeIndex> {
        SchemeIndex::from_secret(*self, schemes)
    }
}

impl fmt::Display for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shift amount for the substitution stage, `(secret mod N) + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SchemeIndex(u32);

impl SchemeIndex {
    pub fn from_secret(secret: SharedSecret, schemes: NonZeroU32) -> CryptoResult<Self> {
        let n = u64::from(check_scheme_count(schemes)?.get());
        // secret % n < n <= MAX_SCHEME_INDEX, so the +1 stays in range
        Ok(Self((secret.0 % n) as u32 + 1))
    }

    /// An explicit shift in `1..=MAX_SCHEME_INDEX`, bypassing derivation.
    pub fn new(shift: u32) -> CryptoResult<Self> {
        if !(1..=MAX_SCHEME_INDEX).contains(&shift) {
            return Err(CryptoError::InvalidSchemeIndex {
                index: shift,
                max: MAX_SCHEME_INDEX,
            });
        }
        Ok(Self(shift))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SchemeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
