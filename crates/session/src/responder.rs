//! Responding role: answers the initiator's share and decrypts its message.

use std::num::NonZeroU32;
use std::time::Duration;

use crypto::{
    reverse_substitute_text, reverse_transpose, PrivateExponent, PublicParameters, PublicShare,
    SchemeIndex, SharedSecret,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};
use transport::Channel;

use crate::agreement::Agreement;
use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::state::{step, ResponderState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opened {
    pub untransposed: String,
    /// Recovered text, still carrying its padding
    pub plaintext: String,
}

/// Sans-IO responder walking
/// `Start -> AwaitPeerShare -> SendPublicShare -> DeriveSecret ->
/// AwaitCipherText -> ReverseTranspose -> ReverseSubstitute -> End`.
#[derive(Debug)]
pub struct Responder {
    params: PublicParameters,
    schemes: NonZeroU32,
    ciphertext_wait: Duration,
    exponent: PrivateExponent,
    own_share: PublicShare,
    agreement: Option<Agreement>,
    state: ResponderState,
}

impl Responder {
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_exponent(config, PrivateExponent::generate())
    }

    pub fn with_exponent(config: &SessionConfig, exponent: PrivateExponent) -> Self {
        let own_share = config.params.public_share(&exponent);
        Self {
            params: config.params,
            schemes: config.schemes,
            ciphertext_wait: config.ciphertext_wait(),
            exponent,
            own_share,
            agreement: None,
            state: ResponderState::Start,
        }
    }

    pub fn state(&self) -> ResponderState {
        self.state
    }

    pub fn exponent(&self) -> &PrivateExponent {
        &self.exponent
    }

    pub fn public_share(&self) -> PublicShare {
        self.own_share
    }

    /// How long to wait for the ciphertext once the shares are exchanged.
    pub fn ciphertext_wait(&self) -> Duration {
        self.ciphertext_wait
    }

    /// Set once the peer's share has been accepted.
    pub fn agreement(&self) -> Option<Agreement> {
        self.agreement
    }

    fn advance(&mut self, to: ResponderState) -> SessionResult<()> {
        step(&mut self.state, to, ResponderState::next)
    }

    /// Accept the initiator's share token; returns our share to send back.
    ///
    /// The token is validated here so a bad share is rejected before we
    /// reveal anything.
    pub fn receive_share(&mut self, token: &str) -> SessionResult<PublicShare> {
        self.advance(ResponderState::AwaitPeerShare)?;
        let agreement = Agreement::derive(&self.params, self.schemes, &self.exponent, token)?;
        self.agreement = Some(agreement);
        self.advance(ResponderState::SendPublicShare)?;
        Ok(self.own_share)
    }

    /// Our share is on the wire; hand out the secret and scheme index.
    pub fn share_sent(&mut self) -> SessionResult<Agreement> {
        self.advance(ResponderState::DeriveSecret)?;
        let agreement = self.agreement.ok_or_else(|| SessionError::InvalidTransition {
            from: ResponderState::AwaitPeerShare.to_string(),
            to: ResponderState::DeriveSecret.to_string(),
        })?;
        self.advance(ResponderState::AwaitCipherText)?;
        Ok(agreement)
    }

    /// Reverse transposition, then reverse substitution.
    pub fn open(&mut self, ciphertext: &str) -> SessionResult<Opened> {
        self.advance(ResponderState::ReverseTranspose)?;
        let scheme = self
            .agreement
            .map(|a| a.scheme)
            .ok_or_else(|| SessionError::InvalidTransition {
                from: ResponderState::AwaitCipherText.to_string(),
                to: ResponderState::ReverseTranspose.to_string(),
            })?;
        let untransposed = reverse_transpose(ciphertext)?;

        self.advance(ResponderState::ReverseSubstitute)?;
        let plaintext = reverse_substitute_text(&untransposed, scheme)?;

        self.advance(ResponderState::End)?;
        Ok(Opened {
            untransposed,
            plaintext,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponderReport {
    pub own_share: PublicShare,
    pub peer_share: PublicShare,
    pub secret: SharedSecret,
    pub scheme: SchemeIndex,
    pub ciphertext: String,
    pub untransposed: String,
    pub plaintext: String,
}

/// Run the responder side of one session over `channel`.
pub async fn run_responder<S>(
    channel: &mut Channel<S>,
    config: &SessionConfig,
) -> SessionResult<ResponderReport>
where
    S: AsyncRead + AsyncWrite,
{
    let mut machine = Responder::new(config);
    run_responder_with(&mut machine, channel).await
}

pub async fn run_responder_with<S>(
    machine: &mut Responder,
    channel: &mut Channel<S>,
) -> SessionResult<ResponderReport>
where
    S: AsyncRead + AsyncWrite,
{
    debug!(exponent = machine.exponent().value(), "private exponent drawn");

    let token = channel.recv_unit().await?;
    let own_share = machine.receive_share(token.trim())?;
    info!(share = %own_share, "sending public share");
    channel.send_unit(&own_share.to_string()).await?;

    let Agreement {
        peer_share,
        secret,
        scheme,
    } = machine.share_sent()?;
    info!(%peer_share, %secret, %scheme, "shared secret derived");

    // the initiator's user is typing; the read timeout alone is too short
    let ciphertext = channel.recv_unit_within(machine.ciphertext_wait()).await?;
    info!(len = ciphertext.len(), "ciphertext received");
    let opened = machine.open(&ciphertext)?;
    debug!(untransposed = %opened.untransposed, "message opened");

    Ok(ResponderReport {
        own_share,
        peer_share,
        secret,
        scheme,
        ciphertext,
        untransposed: opened.untransposed,
        plaintext: opened.plaintext,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crypto::CryptoError;

    fn machine(exp: u64) -> Responder {
        Responder::with_exponent(&SessionConfig::default(), PrivateExponent::from_value(exp).unwrap())
    }

    #[test]
    fn test_steps_in_order() {
        let mut m = machine(4);
        assert_eq!(m.receive_share("9").unwrap().value(), 6);
        assert_eq!(m.state(), ResponderState::SendPublicShare);

        let agreed = m.share_sent().unwrap();
        assert_eq!(agreed.peer_share.value(), 9);
        assert_eq!(agreed.secret.value(), 6);
        assert_eq!(agreed.scheme.get(), 2);
        assert_eq!(m.state(), ResponderState::AwaitCipherText);

        // "HI THERE?" padded, shifted by 2, then transposed
        let ct = crypto::transpose("JKBVJGTGABBBBBBB").unwrap();
        let opened = m.open(&ct).unwrap();
        assert_eq!(opened.untransposed, "JKBVJGTGABBBBBBB");
        assert_eq!(opened.plaintext, "HI THERE?       ");
        assert_eq!(m.state(), ResponderState::End);
    }

    #[test]
    fn test_ciphertext_wait_covers_composing() {
        let cfg = SessionConfig {
            read_timeout: std::time::Duration::from_secs(2),
            compose_timeout: std::time::Duration::from_secs(10),
            ..SessionConfig::default()
        };
        let m = Responder::with_exponent(&cfg, PrivateExponent::from_value(4).unwrap());
        assert_eq!(m.ciphertext_wait(), std::time::Duration::from_secs(12));
    }

    #[test]
    fn test_out_of_order_calls() {
        let mut m = machine(4);
        assert!(matches!(
            m.share_sent(),
            Err(SessionError::InvalidTransition { .. })
        ));
        assert!(matches!(
            m.open("AEIMBFJNCGKODHLP"),
            Err(SessionError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_share_before_replying() {
        let mut m = machine(4);
        assert!(matches!(
            m.receive_share("nine"),
            Err(SessionError::Crypto(CryptoError::MalformedShare(_)))
        ));
        assert_ne!(m.state(), ResponderState::SendPublicShare);
    }

    #[test]
    fn test_open_rejects_bad_ciphertext() {
        let mut m = machine(4);
        m.receive_share("9").unwrap();
        m.share_sent().unwrap();
        assert!(matches!(
            m.open("SHORT"),
            Err(SessionError::Crypto(CryptoError::LengthError { len: 5, block: 16 }))
        ));

        let mut m = machine(4);
        m.receive_share("9").unwrap();
        m.share_sent().unwrap();
        assert!(matches!(
            m.open("abcdefghijklmnop"),
            Err(SessionError::Crypto(CryptoError::InvalidCharacter { .. }))
        ));
    }
}
