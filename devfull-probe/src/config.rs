//! Probe configuration.
//!
//! Built once at startup and handed to the probe by reference; nothing
//! mutates it afterwards.

use chrono::{DateTime, Local};
use std::borrow::Cow;
use std::path::PathBuf;

pub const DEFAULT_TARGET: &str = "/dev/full";
pub const DEFAULT_READ_LIMIT: usize = 100;
pub const MAX_READ_LIMIT: usize = 64 * 1024;
/// Overrides the default target path (useful for tests and odd hosts).
pub const TARGET_ENV: &str = "DEVFULL_PROBE_TARGET";

const PAYLOAD_PREFIX: &str = "Test entry: ";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub target_path: PathBuf,
    pub payload: Vec<u8>,
    pub read_limit: usize,
    pub generated_at: DateTime<Local>,
    /// Count any write failure as the expected outcome, not only ENOSPC.
    pub lenient_write: bool,
    /// Treat a read that returns no bytes as success.
    pub allow_empty_read: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        let generated_at = Local::now();
        Self {
            target_path: default_target(),
            payload: default_payload(&generated_at).into_bytes(),
            read_limit: DEFAULT_READ_LIMIT,
            generated_at,
            lenient_write: false,
            allow_empty_read: true,
        }
    }
}

impl ProbeConfig {
    pub fn timestamp(&self) -> String {
        self.generated_at.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn payload_text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }

    /// Bytes the write probe sends. An empty payload never reaches the
    /// device, so it is replaced by the default timestamped entry.
    pub fn write_payload(&self) -> Cow<'_, [u8]> {
        if self.payload.is_empty() {
            Cow::Owned(default_payload(&self.generated_at).into_bytes())
        } else {
            Cow::Borrowed(&self.payload)
        }
    }
}

pub fn default_target() -> PathBuf {
    std::env::var_os(TARGET_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TARGET))
}

pub fn default_payload(at: &DateTime<Local>) -> String {
    format!("{PAYLOAD_PREFIX}{}", at.format(TIMESTAMP_FORMAT))
}
