use std::num::NonZeroU32;
use std::time::Duration;

use crypto::{check_scheme_count, PublicParameters, SCHEME_COUNT};
use transport::{ChannelConfig, DEFAULT_MAX_UNIT_LEN, DEFAULT_READ_TIMEOUT};

use crate::error::SessionResult;

/// Default bound on waiting for the initiator's plaintext to be entered.
pub const DEFAULT_COMPOSE_TIMEOUT: Duration = Duration::from_secs(300);

/// Settings both roles must agree on, plus local transport limits.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub params: PublicParameters,
    /// `N` in `(secret mod N) + 1`; at most [`crypto::MAX_SCHEME_INDEX`]
    pub schemes: NonZeroU32,
    pub read_timeout: Duration,
    /// How long the initiator waits for its plaintext after the exchange
    pub compose_timeout: Duration,
    pub max_unit_len: usize,
}

impl SessionConfig {
    /// Defaults for everything but the agreed values, which are checked.
    pub fn new(params: PublicParameters, schemes: NonZeroU32) -> SessionResult<Self> {
        Ok(Self {
            params,
            schemes: check_scheme_count(schemes)?,
            ..Self::default()
        })
    }

    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            read_timeout: self.read_timeout,
            max_unit_len: self.max_unit_len,
        }
    }

    /// Bound on the responder's wait for the ciphertext: the initiator may
    /// spend up to `compose_timeout` on its plaintext before sending.
    pub fn ciphertext_wait(&self) -> Duration {
        self.compose_timeout.saturating_add(self.read_timeout)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            params: PublicParameters::default(),
            schemes: SCHEME_COUNT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            compose_timeout: DEFAULT_COMPOSE_TIMEOUT,
            max_unit_len: DEFAULT_MAX_UNIT_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;
    use crypto::CryptoError;

    #[test]
    fn test_defaults() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.params.generator(), 3);
        assert_eq!(cfg.params.modulus(), 15);
        assert_eq!(cfg.schemes.get(), 5);
        assert_eq!(cfg.compose_timeout, Duration::from_secs(300));
        assert_eq!(cfg.ciphertext_wait(), Duration::from_secs(330));
        assert_eq!(cfg.channel_config().read_timeout, Duration::from_secs(30));
        assert_eq!(cfg.channel_config().max_unit_len, 64 * 1024);
    }

    #[test]
    fn test_scheme_count_is_checked() {
        let params = PublicParameters::new(5, 23).unwrap();
        let cfg = SessionConfig::new(params, NonZeroU32::new(29).unwrap()).unwrap();
        assert_eq!(cfg.schemes.get(), 29);
        assert_eq!(cfg.params, params);

        for n in [30, 31, 1000] {
            assert!(matches!(
                SessionConfig::new(params, NonZeroU32::new(n).unwrap()),
                Err(SessionError::Crypto(CryptoError::InvalidSchemeCount { max: 29, .. }))
            ));
        }
    }

    #[test]
    fn test_ciphertext_wait_saturates() {
        let cfg = SessionConfig {
            compose_timeout: Duration::MAX,
            ..SessionConfig::default()
        };
        assert_eq!(cfg.ciphertext_wait(), Duration::MAX);
    }
}
