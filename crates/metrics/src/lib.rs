//! Per-session CSV log.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Initiator,
    Responder,
}

fn rfc3339_millis<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// One row of the session log.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRecord {
    #[serde(serialize_with = "rfc3339_millis")]
    pub ts_start: DateTime<Utc>,
    #[serde(serialize_with = "rfc3339_millis")]
    pub ts_end: DateTime<Utc>,
    pub role: Role,
    pub peer: String,
    pub duration_ms: f64,
    pub bytes_tx: u64,
    pub bytes_rx: u64,
    /// Empty for failed sessions
    pub scheme_index: Option<u32>,
    pub message_len: usize,
    pub success: bool,
}

/// Wall and monotonic start of a session; turned into a record when it ends.
#[derive(Debug, Clone)]
pub struct SessionTimer {
    role: Role,
    peer: String,
    ts_start: DateTime<Utc>,
    started: Instant,
}

impl SessionTimer {
    pub fn start(role: Role, peer: impl Into<String>) -> Self {
        Self {
            role,
            peer: peer.into(),
            ts_start: Utc::now(),
            started: Instant::now(),
        }
    }

    /// A timer for a session that began `elapsed` ago.
    pub fn from_elapsed(role: Role, peer: impl Into<String>, elapsed: Duration) -> Self {
        let now = Instant::now();
        let back = chrono::Duration::from_std(elapsed).unwrap_or_else(|_| chrono::Duration::zero());
        Self {
            role,
            peer: peer.into(),
            ts_start: Utc::now() - back,
            started: now.checked_sub(elapsed).unwrap_or(now),
        }
    }

    pub fn finish(
        self,
        bytes_tx: u64,
        bytes_rx: u64,
        scheme_index: Option<u32>,
        message_len: usize,
        success: bool,
    ) -> SessionRecord {
        SessionRecord {
            ts_start: self.ts_start,
            ts_end: Utc::now(),
            role: self.role,
            peer: self.peer,
            duration_ms: self.started.elapsed().as_secs_f64() * 1000.0,
            bytes_tx,
            bytes_rx,
            scheme_index,
            message_len,
            success,
        }
    }
}

/// Appends [`SessionRecord`]s to a CSV file, writing the header only when
/// the file is new or empty.
pub struct SessionRecorder {
    path: PathBuf,
}

impl SessionRecorder {
    pub fn new(csv_path: impl AsRef<Path>) -> Result<Self> {
        let path = csv_path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, row: &SessionRecord) -> Result<()> {
        let needs_header = fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        wtr.serialize(row)?;
        wtr.flush()?;

        debug!(path = %self.path.display(), success = row.success, "session recorded");
        Ok(())
    }
}
