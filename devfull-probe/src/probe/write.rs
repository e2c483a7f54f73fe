//! Write probe.
//!
//! Buffered I/O can defer a disk-full error from `write` to `flush` or even
//! `close`, so all three are issued independently and every failure is kept
//! for classification.

use super::outcome::{OperationOutcome, StepReport};
use crate::config::ProbeConfig;
use devfull_hal::{DeviceOps, HalError};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    Open,
    Write,
    Flush,
    Close,
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriteStage::Open => "open",
            WriteStage::Write => "write",
            WriteStage::Flush => "flush",
            WriteStage::Close => "close",
        };
        f.write_str(name)
    }
}

/// A failure reported at one stage of the write probe.
#[derive(Debug)]
pub struct WriteFault {
    pub stage: WriteStage,
    pub error: HalError,
}

impl WriteFault {
    pub fn new(stage: WriteStage, error: HalError) -> Self {
        Self { stage, error }
    }

    fn describe(&self) -> String {
        format!("{}: {}", self.stage, self.error)
    }
}

pub fn probe_write(hal: &dyn DeviceOps, cfg: &ProbeConfig) -> StepReport {
    log::debug!("Attempting to write to {}", cfg.target_path.display());

    let mut writer = match hal.open_write(&cfg.target_path) {
        Ok(writer) => writer,
        Err(err) => {
            let faults = [WriteFault::new(WriteStage::Open, err)];
            return StepReport::new(classify_write(&faults, 0, cfg.lenient_write));
        }
    };

    let mut notes = Vec::new();
    if cfg.payload.is_empty() {
        log::debug!("payload is empty, writing the default entry instead");
        notes.push("payload was empty; wrote the default test entry".to_string());
    }
    let payload = cfg.write_payload();

    let mut faults = Vec::new();
    let mut written = 0;
    while written < payload.len() {
        match writer.write(&payload[written..]) {
            Ok(0) => {
                faults.push(WriteFault::new(
                    WriteStage::Write,
                    HalError::Other("device accepted zero bytes".to_string()),
                ));
                break;
            }
            Ok(n) => written += n,
            Err(err) => {
                faults.push(WriteFault::new(WriteStage::Write, err));
                break;
            }
        }
    }
    log::debug!("write stage accepted {} of {} bytes", written, payload.len());

    if let Err(err) = writer.flush() {
        faults.push(WriteFault::new(WriteStage::Flush, err));
    }
    if let Err(err) = writer.close() {
        faults.push(WriteFault::new(WriteStage::Close, err));
    }

    for fault in &faults {
        log::debug!("write probe fault at {}", fault.describe());
    }

    StepReport {
        outcome: classify_write(&faults, written, cfg.lenient_write),
        notes,
    }
}

/// Classify the write probe from every fault it collected, in stage order.
pub fn classify_write(faults: &[WriteFault], written: usize, lenient: bool) -> OperationOutcome {
    if let Some(fault) = faults.iter().find(|f| f.error.is_out_of_space()) {
        return OperationOutcome::ExpectedFailure {
            reason: fault.describe(),
        };
    }

    match faults.first() {
        Some(fault) if lenient => OperationOutcome::ExpectedFailure {
            reason: fault.describe(),
        },
        Some(fault) => OperationOutcome::UnexpectedFailure {
            reason: fault.describe(),
        },
        None => OperationOutcome::UnexpectedSuccess {
            bytes: written,
            sample_hex: None,
        },
    }
}
