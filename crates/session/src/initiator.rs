//! Initiating role: sends its share first, then the ciphertext.

use std::num::NonZeroU32;
use std::time::Duration;

use crypto::{
    pad, substitute_text, transpose, PrivateExponent, PublicParameters, PublicShare,
    SchemeIndex, SharedSecret,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tracing::{debug, info};
use transport::Channel;

use crate::agreement::Agreement;
use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::state::{step, InitiatorState};

/// Output of the three message stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub padded: String,
    pub substituted: String,
    pub ciphertext: String,
}

/// Sans-IO initiator. Each method performs one or more steps of
/// `Start -> SendPublicShare -> AwaitPeerShare -> DeriveSecret ->
/// ComposeMessage -> Pad -> Substitute -> Transpose -> SendCipherText -> End`
/// and fails with [`SessionError::InvalidTransition`] when called out of order.
/// A failed step leaves the machine where it stopped; the session is over.
#[derive(Debug)]
pub struct Initiator {
    params: PublicParameters,
    schemes: NonZeroU32,
    compose_timeout: Duration,
    exponent: PrivateExponent,
    own_share: PublicShare,
    agreement: Option<Agreement>,
    state: InitiatorState,
}

impl Initiator {
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_exponent(config, PrivateExponent::generate())
    }

    pub fn with_exponent(config: &SessionConfig, exponent: PrivateExponent) -> Self {
        let own_share = config.params.public_share(&exponent);
        Self {
            params: config.params,
            schemes: config.schemes,
            compose_timeout: config.compose_timeout,
            exponent,
            own_share,
            agreement: None,
            state: InitiatorState::Start,
        }
    }

    pub fn state(&self) -> InitiatorState {
        self.state
    }

    pub fn exponent(&self) -> &PrivateExponent {
        &self.exponent
    }

    pub fn public_share(&self) -> PublicShare {
        self.own_share
    }

    pub fn agreement(&self) -> Option<Agreement> {
        self.agreement
    }

    pub fn compose_timeout(&self) -> Duration {
        self.compose_timeout
    }

    fn advance(&mut self, to: InitiatorState) -> SessionResult<()> {
        step(&mut self.state, to, InitiatorState::next)
    }

    /// Returns the share to transmit.
    pub fn start(&mut self) -> SessionResult<PublicShare> {
        self.advance(InitiatorState::SendPublicShare)?;
        Ok(self.own_share)
    }

    pub fn share_sent(&mut self) -> SessionResult<()> {
        self.advance(InitiatorState::AwaitPeerShare)
    }

    /// Consume the responder's share token and derive the scheme index.
    pub fn receive_share(&mut self, token: &str) -> SessionResult<Agreement> {
        self.advance(InitiatorState::DeriveSecret)?;
        let agreement = Agreement::derive(&self.params, self.schemes, &self.exponent, token)?;
        self.agreement = Some(agreement);
        self.advance(InitiatorState::ComposeMessage)?;
        Ok(agreement)
    }

    /// Pad, substitute and transpose `plaintext`.
    pub fn seal(&mut self, plaintext: &str) -> SessionResult<Sealed> {
        self.advance(InitiatorState::Pad)?;
        let padded = pad(plaintext);

        self.advance(InitiatorState::Substitute)?;
        let scheme = self
            .agreement
            .map(|a| a.scheme)
            .ok_or_else(|| SessionError::InvalidTransition {
                from: InitiatorState::Pad.to_string(),
                to: InitiatorState::Substitute.to_string(),
            })?;
        let substituted = substitute_text(&padded, scheme)?;

        self.advance(InitiatorState::Transpose)?;
        let ciphertext = transpose(&substituted)?;

        self.advance(InitiatorState::SendCipherText)?;
        Ok(Sealed {
            padded,
            substituted,
            ciphertext,
        })
    }

    pub fn ciphertext_sent(&mut self) -> SessionResult<()> {
        self.advance(InitiatorState::End)
    }
}

/// Everything the initiator computed during one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiatorReport {
    pub own_share: PublicShare,
    pub peer_share: PublicShare,
    pub secret: SharedSecret,
    pub scheme: SchemeIndex,
    pub plaintext: String,
    pub padded: String,
    pub substituted: String,
    pub ciphertext: String,
}

/// Read one line from `source` without its terminator.
async fn read_plaintext<R>(source: &mut R) -> SessionResult<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    source
        .read_line(&mut line)
        .await
        .map_err(SessionError::Input)?;
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(line)
}

/// Run the initiator side of one session over `channel`, taking the
/// plaintext from the first line of `plaintext`.
///
/// `plaintext` is first read after the shares are exchanged and must
/// yield its line within the compose timeout. Before the ciphertext goes
/// out the channel is checked, so a responder that already hung up is an
/// error rather than a silently lost message.
pub async fn run_initiator<S, R>(
    channel: &mut Channel<S>,
    mut plaintext: R,
    config: &SessionConfig,
) -> SessionResult<InitiatorReport>
where
    S: AsyncRead + AsyncWrite,
    R: AsyncBufRead + Unpin,
{
    let mut machine = Initiator::new(config);
    run_initiator_with(&mut machine, channel, &mut plaintext).await
}

/// Same as [`run_initiator`] with a caller-built machine.
pub async fn run_initiator_with<S, R>(
    machine: &mut Initiator,
    channel: &mut Channel<S>,
    plaintext: &mut R,
) -> SessionResult<InitiatorReport>
where
    S: AsyncRead + AsyncWrite,
    R: AsyncBufRead + Unpin,
{
    let own_share = machine.start()?;
    debug!(exponent = machine.exponent().value(), "private exponent drawn");
    info!(share = %own_share, "sending public share");
    channel.send_unit(&own_share.to_string()).await?;
    machine.share_sent()?;

    let token = channel.recv_unit().await?;
    let Agreement {
        peer_share,
        secret,
        scheme,
    } = machine.receive_share(token.trim())?;
    info!(%peer_share, %secret, %scheme, "shared secret derived");

    let limit = machine.compose_timeout();
    let text = timeout(limit, read_plaintext(plaintext))
        .await
        .map_err(|_| SessionError::ComposeTimeout(limit))??;
    let sealed = machine.seal(&text)?;
    debug!(padded = %sealed.padded, substituted = %sealed.substituted, "message sealed");

    channel.check_open().await?;
    channel.send_unit(&sealed.ciphertext).await?;
    machine.ciphertext_sent()?;
    info!(len = sealed.ciphertext.len(), "ciphertext sent");

    Ok(InitiatorReport {
        own_share,
        peer_share,
        secret,
        scheme,
        plaintext: text,
        padded: sealed.padded,
        substituted: sealed.substituted,
        ciphertext: sealed.ciphertext,
    })
}
