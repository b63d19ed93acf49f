use crypto::CryptoError;
use thiserror::Error;
use transport::TransportError;

/// Anything that aborts one session.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Key agreement or cipher failure
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Connection could not be established, dropped, or timed out
    #[error("connection failure: {0}")]
    ConnectionFailure(#[from] TransportError),

    /// The plaintext source could not be read
    #[error("failed to read plaintext: {0}")]
    Input(#[source] std::io::Error),

    /// No plaintext line arrived in time
    #[error("no message entered within {0:?}")]
    ComposeTimeout(std::time::Duration),

    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

pub type SessionResult<T> = Result<T, SessionError>;
