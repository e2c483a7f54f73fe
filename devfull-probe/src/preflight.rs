//! Target validation run before any probe touches the device.

use devfull_hal::{Access, DeviceOps, NodeKind};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetValidation {
    /// Node kind found at the path, if anything exists there.
    pub kind: Option<NodeKind>,
    /// Hard failures; any entry blocks the probe.
    pub failures: Vec<String>,
    /// Non-fatal observations.
    pub warnings: Vec<String>,
}

impl TargetValidation {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Check that `target` exists, is readable and writable, and warn when it is
/// not a character device.
pub fn validate(hal: &dyn DeviceOps, target: &Path) -> TargetValidation {
    log::debug!("🧪 Validating target {}", target.display());

    let mut validation = TargetValidation {
        kind: None,
        failures: Vec::new(),
        warnings: Vec::new(),
    };

    match hal.node_kind(target) {
        Ok(Some(kind)) => validation.kind = Some(kind),
        Ok(None) => {
            validation
                .failures
                .push(format!("Target device {} does not exist", target.display()));
            return validation;
        }
        Err(err) => {
            validation
                .failures
                .push(format!("Unable to inspect {}: {}", target.display(), err));
            return validation;
        }
    }

    for access in [Access::Read, Access::Write] {
        match hal.can_access(target, access) {
            Ok(true) => {}
            Ok(false) => validation
                .failures
                .push(format!("Target {} is not {}", target.display(), access)),
            Err(err) => validation.failures.push(format!(
                "Unable to check whether {} is {}: {}",
                target.display(),
                access,
                err
            )),
        }
    }

    if let Some(kind) = validation.kind {
        if kind != NodeKind::CharDevice {
            let warning = format!(
                "Target {} is a {}, not a character device",
                target.display(),
                kind
            );
            log::warn!("{warning}");
            validation.warnings.push(warning);
        }
    }

    validation
}
