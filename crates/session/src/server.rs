//! Sequential responder accept loop.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use tracing::{error, info, info_span, warn, Instrument};
use transport::TransportListener;

use crate::config::SessionConfig;
use crate::error::SessionResult;
use crate::responder::{run_responder, ResponderReport};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// What one served session produced.
#[derive(Debug)]
pub struct SessionOutcome {
    pub peer: SocketAddr,
    pub result: SessionResult<ResponderReport>,
    pub bytes_tx: u64,
    pub bytes_rx: u64,
    pub elapsed: Duration,
}

/// Serve responder sessions one at a time until `max_sessions` have run
/// (forever if `None`). A failed session is logged and handed to
/// `on_session` like a successful one; the loop then accepts the next peer.
///
/// Returns the number of sessions served.
pub async fn serve<F>(
    listener: &TransportListener,
    config: &SessionConfig,
    max_sessions: Option<usize>,
    mut on_session: F,
) -> usize
where
    F: FnMut(SessionOutcome),
{
    let mut served = 0usize;

    while max_sessions.map_or(true, |max| served < max) {
        let (mut channel, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!(error = %e, "accept failed");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };

        let started = Instant::now();
        let result = run_responder(&mut channel, config)
            .instrument(info_span!("session", %peer))
            .await;

        match &result {
            Ok(report) => info!(%peer, plaintext = %report.plaintext, "session complete"),
            Err(e) => warn!(%peer, error = %e, "session failed"),
        }
        if let Err(e) = channel.shutdown().await {
            warn!(%peer, error = %e, "shutdown failed");
        }

        served += 1;
        on_session(SessionOutcome {
            peer,
            result,
            bytes_tx: channel.bytes_sent(),
            bytes_rx: channel.bytes_received(),
            elapsed: started.elapsed(),
        });
    }

    served
}
