//! CLI argument parsing for devfull-probe.
//!
//! Runs unconditionally with no arguments; every flag only adjusts the
//! configuration or the output format.

use crate::config::{self, ProbeConfig, MAX_READ_LIMIT};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "devfull-probe")]
#[command(version)]
#[command(about = "Check that a /dev/full style device fails writes with ENOSPC and reads as null bytes")]
#[command(long_about = "Check that a /dev/full style device fails writes with ENOSPC and reads as null bytes.\n\n\
    Exit codes: 0 = device behaves as expected, 1 = unexpected behavior,\n\
    2 = target missing or failed validation.")]
pub struct Cli {
    /// Device to probe (default: $DEVFULL_PROBE_TARGET or /dev/full)
    #[arg(long)]
    pub target: Option<PathBuf>,

    /// Payload to write (default: "Test entry: <timestamp>")
    #[arg(long, value_parser = parse_payload)]
    pub payload: Option<String>,

    /// Maximum number of bytes to read back
    #[arg(long, default_value_t = config::DEFAULT_READ_LIMIT, value_parser = parse_read_limit)]
    pub read_limit: usize,

    /// Count any write failure as expected, not only "no space left on device"
    #[arg(long)]
    pub lenient_write: bool,

    /// Treat a read that returns no data as unexpected
    #[arg(long)]
    pub strict_empty_read: bool,

    /// Print the result as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Also write the JSON result to this file
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_read_limit(value: &str) -> Result<usize, String> {
    let limit: usize = value
        .parse()
        .map_err(|_| format!("`{value}` is not a byte count"))?;
    if limit == 0 || limit > MAX_READ_LIMIT {
        return Err(format!("read limit must be between 1 and {MAX_READ_LIMIT}"));
    }
    Ok(limit)
}

fn parse_payload(value: &str) -> Result<String, String> {
    if value.is_empty() {
        return Err("payload must not be empty".to_string());
    }
    Ok(value.to_string())
}

impl Cli {
    /// Build the immutable probe configuration from the parsed flags.
    pub fn to_config(&self) -> ProbeConfig {
        let mut cfg = ProbeConfig::default();
        if let Some(target) = &self.target {
            cfg.target_path = target.clone();
        }
        if let Some(payload) = &self.payload {
            cfg.payload = payload.clone().into_bytes();
        }
        cfg.read_limit = self.read_limit;
        cfg.lenient_write = self.lenient_write;
        cfg.allow_empty_read = !self.strict_empty_read;
        cfg
    }
}
