//! # TCP transport for marker-framed text units
//!
//! Every message on the wire is one unit: the payload, a single separator
//! space, the `\EOF` token, and a newline. Receivers accept payloads split
//! over arbitrary reads and tolerate CRLF line endings.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, info};

pub mod channel;
pub mod error;
pub mod framing;

pub use channel::{Channel, ChannelConfig, DEFAULT_MAX_UNIT_LEN, DEFAULT_READ_TIMEOUT};
pub use error::{TransportError, TransportResult};
pub use framing::{encode_unit, strip_marker, EOF_TOKEN};

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub type TcpChannel = Channel<TcpStream>;

/// Open a channel to `host:port`.
pub async fn connect(host: &str, port: u16, config: ChannelConfig) -> TransportResult<TcpChannel> {
    let addr = format!("{host}:{port}");
    debug!(%addr, "connecting");

    let stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(addr.as_str()))
        .await
        .map_err(|_| TransportError::Timeout(CONNECT_TIMEOUT))?
        .map_err(|source| TransportError::Connect {
            addr: addr.clone(),
            source,
        })?;
    stream.set_nodelay(true)?;

    info!(%addr, "connected");
    Ok(Channel::new(stream, config))
}

pub struct TransportListener {
    inner: TcpListener,
    config: ChannelConfig,
}

impl TransportListener {
    pub async fn bind(addr: &str, config: ChannelConfig) -> TransportResult<Self> {
        let inner = TcpListener::bind(addr).await?;
        info!(addr = %inner.local_addr()?, "listening");
        Ok(Self { inner, config })
    }

    pub fn local_addr(&self) -> TransportResult<SocketAddr> {
        Ok(self.inner.local_addr()?)
    }

    /// Wait for the next peer.
    pub async fn accept(&self) -> TransportResult<(TcpChannel, SocketAddr)> {
        let (stream, peer) = self.inner.accept().await?;
        stream.set_nodelay(true)?;
        debug!(%peer, "accepted connection");
        Ok((Channel::new(stream, self.config), peer))
    }
}
