//! Linear probe run: validate, write, read, combine.

use crate::config::ProbeConfig;
use crate::preflight::{self, TargetValidation};
use crate::probe::{self, OperationOutcome, StepReport};
use devfull_hal::{DeviceOps, LinuxHal};
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Both probes saw full-device behavior.
    Passed,
    /// At least one probe saw something a full device would not do.
    Mismatch,
    /// The target failed validation; nothing was probed.
    PreconditionFailed,
}

impl Verdict {
    pub fn exit_code(self) -> i32 {
        match self {
            Verdict::Passed => 0,
            Verdict::Mismatch => 1,
            Verdict::PreconditionFailed => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub target: PathBuf,
    pub payload: String,
    pub generated_at: String,
    pub validation: TargetValidation,
    /// Absent when validation failed and the probe never ran.
    pub write: Option<StepReport>,
    pub read: Option<StepReport>,
    pub verdict: Verdict,
    pub exit_code: i32,
}

impl ProbeResult {
    fn new(
        cfg: &ProbeConfig,
        validation: TargetValidation,
        steps: Option<(StepReport, StepReport)>,
    ) -> Self {
        let verdict = match &steps {
            None => Verdict::PreconditionFailed,
            Some((write, read)) => combine(&write.outcome, &read.outcome),
        };
        let (write, read) = steps.unzip();
        Self {
            target: cfg.target_path.clone(),
            payload: cfg.payload_text(),
            generated_at: cfg.timestamp(),
            validation,
            write,
            read,
            verdict,
            exit_code: verdict.exit_code(),
        }
    }
}

/// Combine the two probe outcomes into a verdict.
pub fn combine(write: &OperationOutcome, read: &OperationOutcome) -> Verdict {
    let write_ok = matches!(write, OperationOutcome::ExpectedFailure { .. });
    let read_ok = matches!(read, OperationOutcome::Success { .. });
    if write_ok && read_ok {
        Verdict::Passed
    } else {
        Verdict::Mismatch
    }
}

/// Probe the configured target on the real host.
pub fn run(cfg: &ProbeConfig) -> ProbeResult {
    run_with(&LinuxHal::new(), cfg)
}

pub fn run_with(hal: &dyn DeviceOps, cfg: &ProbeConfig) -> ProbeResult {
    log::info!("🧪 Probing {}", cfg.target_path.display());

    let validation = preflight::validate(hal, &cfg.target_path);
    if !validation.is_valid() {
        for failure in &validation.failures {
            log::error!("{failure}");
        }
        return ProbeResult::new(cfg, validation, None);
    }

    // Write before read: reads are not expected to reset device state.
    let write = guarded("write", || probe::probe_write(hal, cfg));
    let read = guarded("read", || probe::probe_read(hal, cfg));
    log::debug!(
        "write: {}, read: {}",
        write.outcome.label(),
        read.outcome.label()
    );

    let result = ProbeResult::new(cfg, validation, Some((write, read)));
    match result.verdict {
        Verdict::Passed => log::info!("✅ Probe passed"),
        other => log::info!("Probe finished: {:?} (exit {})", other, result.exit_code),
    }
    result
}

/// Run one probe, turning a panic in the device layer into a reportable
/// failure instead of taking the process down.
fn guarded(step: &str, probe: impl FnOnce() -> StepReport) -> StepReport {
    match panic::catch_unwind(AssertUnwindSafe(probe)) {
        Ok(report) => report,
        Err(payload) => {
            let reason = format!("{step} probe panicked: {}", panic_message(payload.as_ref()));
            log::error!("{reason}");
            StepReport::new(OperationOutcome::UnexpectedFailure { reason })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
