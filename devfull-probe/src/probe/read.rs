//! Read probe: a full device should hand out null bytes.

use super::outcome::{hex_excerpt, OperationOutcome, StepReport};
use crate::config::ProbeConfig;
use devfull_hal::DeviceOps;

pub fn probe_read(hal: &dyn DeviceOps, cfg: &ProbeConfig) -> StepReport {
    log::debug!(
        "Testing read behavior from {} (up to {} bytes)",
        cfg.target_path.display(),
        cfg.read_limit
    );

    let mut reader = match hal.open_read(&cfg.target_path) {
        Ok(reader) => reader,
        Err(err) => {
            return StepReport::new(OperationOutcome::UnexpectedFailure {
                reason: format!("open: {err}"),
            })
        }
    };

    let mut buf = vec![0u8; cfg.read_limit];
    let mut filled = 0;
    let mut failure = None;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }
    buf.truncate(filled);
    log::debug!("read {} bytes", filled);

    let mut notes = Vec::new();
    if let Err(err) = reader.close() {
        log::debug!("closing reader failed: {err}");
        notes.push(format!("close: {err}"));
    }

    let outcome = match failure {
        Some(err) => OperationOutcome::UnexpectedFailure {
            reason: format!("read: {err}"),
        },
        None => classify_read(&buf, cfg.allow_empty_read),
    };

    StepReport { outcome, notes }
}

/// Classify the bytes a read probe collected.
pub fn classify_read(data: &[u8], allow_empty: bool) -> OperationOutcome {
    if data.is_empty() {
        if allow_empty {
            return OperationOutcome::Success { bytes: 0 };
        }
        return OperationOutcome::UnexpectedFailure {
            reason: "read: device returned no data".to_string(),
        };
    }

    if data.iter().all(|byte| *byte == 0) {
        OperationOutcome::Success { bytes: data.len() }
    } else {
        OperationOutcome::UnexpectedSuccess {
            bytes: data.len(),
            sample_hex: Some(hex_excerpt(data)),
        }
    }
}
