//! devfull-probe: verify that a host simulates disk-full conditions.
//!
//! The probe validates a target node, writes a payload and expects the
//! platform to report "no space left on device", then reads back and expects
//! null bytes. The combined verdict maps onto the process exit code
//! (0 pass, 1 mismatch, 2 precondition failure).

pub mod cli;
pub mod config;
pub mod logging;
pub mod preflight;
pub mod probe;
pub mod report;
pub mod runner;

pub use config::ProbeConfig;
pub use probe::{OperationOutcome, StepReport};
pub use runner::{run, run_with, ProbeResult, Verdict};
