use serde::Serialize;
use std::fmt::Write as _;

/// Bytes of unexpected data kept for the report.
pub const HEX_EXCERPT_LEN: usize = 50;

/// Classified result of one probe step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OperationOutcome {
    /// The device behaved as a full device should.
    Success { bytes: usize },
    /// The operation failed the way it is supposed to.
    ExpectedFailure { reason: String },
    /// The operation failed for a reason that points at a broken environment.
    UnexpectedFailure { reason: String },
    /// The operation went through when it should not have.
    UnexpectedSuccess {
        bytes: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        sample_hex: Option<String>,
    },
}

impl OperationOutcome {
    pub fn is_unexpected(&self) -> bool {
        matches!(
            self,
            OperationOutcome::UnexpectedFailure { .. } | OperationOutcome::UnexpectedSuccess { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            OperationOutcome::Success { .. } => "success",
            OperationOutcome::ExpectedFailure { .. } => "expected failure",
            OperationOutcome::UnexpectedFailure { .. } => "unexpected failure",
            OperationOutcome::UnexpectedSuccess { .. } => "unexpected success",
        }
    }
}

/// Outcome of a probe plus anything worth reporting that did not change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub outcome: OperationOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl StepReport {
    pub fn new(outcome: OperationOutcome) -> Self {
        Self {
            outcome,
            notes: Vec::new(),
        }
    }
}

/// Lowercase hex of the first [`HEX_EXCERPT_LEN`] bytes of `data`.
pub fn hex_excerpt(data: &[u8]) -> String {
    let mut out = String::with_capacity(HEX_EXCERPT_LEN * 2);
    for byte in data.iter().take(HEX_EXCERPT_LEN) {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
