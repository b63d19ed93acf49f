use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    /// Could not reach the peer
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Stream ended before the end-of-message marker
    #[error("connection closed before end-of-message marker")]
    ConnectionClosed,

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Peer kept sending without a marker
    #[error("framed unit exceeds {max} bytes")]
    FrameTooLarge { max: usize },

    #[error("payload cannot be framed: {0}")]
    InvalidPayload(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TransportResult<T> = Result<T, TransportError>;
