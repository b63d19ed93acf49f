//! Command-line plumbing shared by the `initiator` and `responder` binaries.

use std::io::{self, Write};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use crypto::PublicParameters;
use metrics::{SessionRecorder, SessionTimer};
use session::{InitiatorReport, ResponderReport, SessionConfig};
use tokio::io::{AsyncBufRead, AsyncRead, AsyncWrite, ReadBuf};
use tracing::{warn, Level};
use transport::Channel;

/// Options both roles accept. Both ends must use the same generator,
/// modulus and scheme count.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Public generator g
    #[arg(long, default_value = "3")]
    pub generator: u64,

    /// Public modulus q
    #[arg(long, default_value = "15")]
    pub modulus: u64,

    /// Number of substitution schemes N (at most 29); scheme index is (secret mod N) + 1
    #[arg(long, default_value = "5")]
    pub schemes: NonZeroU32,

    /// Seconds to wait for each message from the peer
    #[arg(long, default_value = "30")]
    pub read_timeout_secs: u64,

    /// Seconds the initiator's user has to enter the message
    #[arg(long, default_value = "300")]
    pub compose_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: Level,

    /// Append one CSV row per session to this file
    #[arg(long)]
    pub metrics_csv: Option<PathBuf>,

    /// Print config and exit
    #[arg(long)]
    pub print_config: bool,
}

impl CommonArgs {
    pub fn session_config(&self) -> Result<SessionConfig> {
        let params = PublicParameters::new(self.generator, self.modulus)
            .context("invalid --generator/--modulus")?;
        let base = SessionConfig::new(params, self.schemes).context("invalid --schemes")?;
        Ok(SessionConfig {
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            compose_timeout: Duration::from_secs(self.compose_timeout_secs),
            ..base
        })
    }

    pub fn recorder(&self) -> Result<Option<SessionRecorder>> {
        self.metrics_csv
            .as_ref()
            .map(SessionRecorder::new)
            .transpose()
    }

    pub fn print(&self) {
        println!("Generator: {}", self.generator);
        println!("Modulus: {}", self.modulus);
        println!("Schemes: {}", self.schemes);
        println!("Read timeout: {}s", self.read_timeout_secs);
        println!("Compose timeout: {}s", self.compose_timeout_secs);
        println!("Log level: {}", self.log_level);
        match &self.metrics_csv {
            Some(path) => println!("Metrics CSV: {}", path.display()),
            None => println!("Metrics CSV: (disabled)"),
        }
    }
}

/// Line source that shows `prompt` the first time it is read from, so the
/// user is asked for the message only once the key exchange is done.
pub struct PromptedInput<R, W = io::Stdout> {
    inner: R,
    out: W,
    prompt: Option<String>,
}

impl<R> PromptedInput<R> {
    pub fn stdout(inner: R, prompt: impl Into<String>) -> Self {
        Self::new(inner, io::stdout(), prompt)
    }
}

impl<R, W: Write> PromptedInput<R, W> {
    pub fn new(inner: R, out: W, prompt: impl Into<String>) -> Self {
        Self {
            inner,
            out,
            prompt: Some(prompt.into()),
        }
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    fn show_prompt(&mut self) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        if let Err(e) = writeln!(self.out, "{prompt}").and_then(|()| self.out.flush()) {
            warn!(error = %e, "could not show prompt");
        }
    }
}

impl<R: AsyncRead + Unpin, W: Write + Unpin> AsyncRead for PromptedInput<R, W> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut TaskContext<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        this.show_prompt();
        Pin::new(&mut this.inner).poll_read(cx, buf)
    }
}

impl<R: AsyncBufRead + Unpin, W: Write + Unpin> AsyncBufRead for PromptedInput<R, W> {
    fn poll_fill_buf(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<io::Result<&[u8]>> {
        let this = self.get_mut();
        this.show_prompt();
        Pin::new(&mut this.inner).poll_fill_buf(cx)
    }

    fn consume(self: Pin<&mut Self>, amt: usize) {
        Pin::new(&mut self.get_mut().inner).consume(amt)
    }
}

/// Logs go to stderr so stdout carries only session output.
pub fn init_logging(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Close our side of `channel`; a failure is logged, not returned, since
/// the session result is already decided.
pub async fn close_channel<S>(channel: &mut Channel<S>, peer: &str)
where
    S: AsyncRead + AsyncWrite,
{
    if let Err(e) = channel.shutdown().await {
        warn!(%peer, error = %e, "shutdown failed");
    }
}

/// Write `timer`'s session to `recorder`; a failed write is only logged.
pub fn record_session(
    recorder: Option<&SessionRecorder>,
    timer: SessionTimer,
    bytes: (u64, u64),
    scheme_index: Option<u32>,
    message_len: usize,
    success: bool,
) {
    let Some(recorder) = recorder else {
        return;
    };
    let row = timer.finish(bytes.0, bytes.1, scheme_index, message_len, success);
    if let Err(e) = recorder.record(&row) {
        warn!(path = %recorder.path().display(), error = %e, "could not write session metrics");
    }
}

pub fn print_initiator_report(report: &InitiatorReport) {
    println!("Our public share: {}", report.own_share);
    println!("Peer public share: {}", report.peer_share);
    println!("Shared secret: {}", report.secret);
    println!("Substitution scheme: {}", report.scheme);
    println!("Padded message: [{}]", report.padded);
    println!("Substituted message: [{}]", report.substituted);
    println!("Transposed (encrypted) message: [{}]", report.ciphertext);
}

pub fn print_responder_report(report: &ResponderReport) {
    println!("Our public share: {}", report.own_share);
    println!("Peer public share: {}", report.peer_share);
    println!("Shared secret: {}", report.secret);
    println!("Substitution scheme: {}", report.scheme);
    println!("Received message: [{}]", report.ciphertext);
    println!("Reverse transposed message: [{}]", report.untransposed);
    println!("Decrypted message: [{}]", report.plaintext);
}
