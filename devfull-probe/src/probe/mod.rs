//! Write and read probes against the target device.

pub mod outcome;
pub mod read;
pub mod write;

pub use outcome::{hex_excerpt, OperationOutcome, StepReport, HEX_EXCERPT_LEN};
pub use read::probe_read;
pub use write::probe_write;
