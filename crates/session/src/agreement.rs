use std::num::NonZeroU32;

use crypto::{PrivateExponent, PublicParameters, PublicShare, SchemeIndex, SharedSecret};

use crate::error::SessionResult;

/// Result of the share exchange, identical on both ends of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Agreement {
    pub peer_share: PublicShare,
    pub secret: SharedSecret,
    pub scheme: SchemeIndex,
}

impl Agreement {
    /// Parse and range-check the peer's share token, then derive the secret
    /// and the scheme index from it.
    pub fn derive(
        params: &PublicParameters,
        schemes: NonZeroU32,
        exponent: &PrivateExponent,
        token: &str,
    ) -> SessionResult<Self> {
        let peer_share = params.check_share(token.parse::<PublicShare>()?)?;
        let secret = params.shared_secret(exponent, peer_share);
        let scheme = secret.scheme_index(schemes)?;
        Ok(Self {
            peer_share,
            secret,
            scheme,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;
    use crypto::{CryptoError, SCHEME_COUNT};

    #[test]
    fn test_both_sides_agree() {
        let params = PublicParameters::default();
        let a = PrivateExponent::from_value(2).unwrap();
        let b = PrivateExponent::from_value(4).unwrap();

        let at_a = Agreement::derive(&params, SCHEME_COUNT, &a, "6").unwrap();
        let at_b = Agreement::derive(&params, SCHEME_COUNT, &b, "9").unwrap();
        assert_eq!(at_a.secret, at_b.secret);
        assert_eq!(at_a.scheme, at_b.scheme);
        assert_eq!(at_a.secret.value(), 6);
    }

    #[test]
    fn test_rejects_bad_tokens() {
        let params = PublicParameters::default();
        let a = PrivateExponent::from_value(2).unwrap();

        for token in ["", "-1", "6.0", "0x6"] {
            assert!(matches!(
                Agreement::derive(&params, SCHEME_COUNT, &a, token),
                Err(SessionError::Crypto(CryptoError::MalformedShare(_)))
            ));
        }
        assert!(matches!(
            Agreement::derive(&params, SCHEME_COUNT, &a, "99"),
            Err(SessionError::Crypto(CryptoError::ShareOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_rejects_identity_scheme_count() {
        let params = PublicParameters::default();
        let a = PrivateExponent::from_value(2).unwrap();
        let thirty = NonZeroU32::new(30).unwrap();
        assert!(matches!(
            Agreement::derive(&params, thirty, &a, "6"),
            Err(SessionError::Crypto(CryptoError::InvalidSchemeCount { schemes: 30, max: 29 }))
        ));
    }
}
