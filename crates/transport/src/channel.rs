//! Bidirectional unit channel over any async byte stream.

use std::time::Duration;

use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf,
    WriteHalf,
};
use tokio::time::timeout;
use tracing::trace;

use crate::error::{TransportError, TransportResult};
use crate::framing::{chomp, encode_unit, strip_marker};

/// Default bound on waiting for a peer's unit
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Write timeout
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default maximum size of one received unit (64 KiB)
pub const DEFAULT_MAX_UNIT_LEN: usize = 64 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct ChannelConfig {
    pub read_timeout: Duration,
    pub max_unit_len: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            max_unit_len: DEFAULT_MAX_UNIT_LEN,
        }
    }
}

pub struct Channel<S> {
    reader: BufReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
    config: ChannelConfig,
    bytes_sent: u64,
    bytes_received: u64,
}

impl<S: AsyncRead + AsyncWrite> Channel<S> {
    pub fn new(stream: S, config: ChannelConfig) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            config,
            bytes_sent: 0,
            bytes_received: 0,
        }
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    /// Send one unit and flush immediately.
    pub async fn send_unit(&mut self, payload: &str) -> TransportResult<()> {
        let wire = encode_unit(payload)?;

        timeout(WRITE_TIMEOUT, async {
            self.writer.write_all(wire.as_bytes()).await?;
            self.writer.flush().await
        })
        .await
        .map_err(|_| TransportError::Timeout(WRITE_TIMEOUT))??;

        self.bytes_sent += wire.len() as u64;
        trace!(bytes = wire.len(), "unit sent");
        Ok(())
    }

    /// Receive one unit, bounded by the read timeout.
    pub async fn recv_unit(&mut self) -> TransportResult<String> {
        self.recv_unit_within(self.config.read_timeout).await
    }

    /// Receive one unit, bounded by `limit` instead of the read timeout.
    pub async fn recv_unit_within(&mut self, limit: Duration) -> TransportResult<String> {
        match timeout(limit, self.read_unit()).await {
            Ok(unit) => unit,
            Err(_) => Err(TransportError::Timeout(limit)),
        }
    }

    /// Fail if the peer has already closed its side. Never waits; bytes
    /// that have arrived stay buffered for the next read.
    pub async fn check_open(&mut self) -> TransportResult<()> {
        match timeout(Duration::ZERO, self.reader.fill_buf()).await {
            Ok(Ok(buf)) if buf.is_empty() => Err(TransportError::ConnectionClosed),
            Ok(Ok(_)) | Err(_) => Ok(()),
            Ok(Err(e)) => Err(e.into()),
        }
    }

    async fn read_unit(&mut self) -> TransportResult<String> {
        let max = self.config.max_unit_len;
        let mut lines: Vec<String> = Vec::new();
        let mut consumed = 0usize;

        loop {
            // one extra byte so a maximal line can still carry its newline
            let allowance = (max - consumed.min(max)) as u64 + 1;
            let mut line = String::new();
            let n = (&mut self.reader)
                .take(allowance)
                .read_line(&mut line)
                .await?;
            if n == 0 {
                return Err(TransportError::ConnectionClosed);
            }
            self.bytes_received += n as u64;
            consumed += n;

            if !line.ends_with('\n') && n as u64 == allowance {
                return Err(TransportError::FrameTooLarge { max });
            }

            let body = chomp(&line);
            if let Some(payload) = strip_marker(body) {
                if !payload.is_empty() || lines.is_empty() {
                    lines.push(payload.to_string());
                }
                trace!(bytes = consumed, "unit received");
                return Ok(lines.join("\n"));
            }
            lines.push(body.to_string());
        }
    }

    pub async fn shutdown(&mut self) -> TransportResult<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}
