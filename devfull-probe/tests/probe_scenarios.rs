use devfull_hal::{FakeDevice, FakeHal, FakeRead, LinuxHal, Operation, OUT_OF_SPACE_MESSAGE};
use devfull_probe::{run_with, OperationOutcome, ProbeConfig, ProbeResult, Verdict};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

const TARGET: &str = "/dev/full";

fn config() -> ProbeConfig {
    ProbeConfig {
        target_path: PathBuf::from(TARGET),
        ..ProbeConfig::default()
    }
}

fn fifty_nulls() -> FakeRead {
    FakeRead::Bytes(vec![0; 50])
}

#[test]
fn disk_full_write_and_null_read_pass() {
    let device = FakeDevice {
        read: fifty_nulls(),
        ..FakeDevice::dev_full()
    };
    let hal = FakeHal::new().with_device(TARGET, device);
    let result = run_with(&hal, &config());

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.verdict, Verdict::Passed);
    assert_eq!(
        result.read.unwrap().outcome,
        OperationOutcome::Success { bytes: 50 }
    );
    match result.write.unwrap().outcome {
        OperationOutcome::ExpectedFailure { reason } => {
            assert!(reason.contains(OUT_OF_SPACE_MESSAGE))
        }
        other => panic!("unexpected write outcome {other:?}"),
    }
}

#[test]
fn silent_write_is_a_mismatch() {
    let hal = FakeHal::new().with_device(TARGET, FakeDevice::sink(vec![0; 50]));
    let result = run_with(&hal, &config());

    assert_eq!(result.exit_code, 1);
    assert!(matches!(
        result.write.unwrap().outcome,
        OperationOutcome::UnexpectedSuccess { .. }
    ));
    assert_eq!(
        result.read.unwrap().outcome,
        OperationOutcome::Success { bytes: 50 }
    );
}

#[test]
fn non_null_read_is_a_mismatch() {
    let device = FakeDevice {
        read: FakeRead::Bytes(b"hello".to_vec()),
        ..FakeDevice::dev_full()
    };
    let hal = FakeHal::new().with_device(TARGET, device);
    let result = run_with(&hal, &config());

    assert_eq!(result.exit_code, 1);
    assert!(matches!(
        result.write.unwrap().outcome,
        OperationOutcome::ExpectedFailure { .. }
    ));
    assert!(matches!(
        result.read.unwrap().outcome,
        OperationOutcome::UnexpectedSuccess { bytes: 5, .. }
    ));
}

#[test]
fn missing_target_is_a_precondition_failure() {
    let hal = FakeHal::new();
    let result = run_with(&hal, &config());

    assert_eq!(result.exit_code, 2);
    assert_eq!(result.verdict, Verdict::PreconditionFailed);
    assert_eq!(
        hal.operations(),
        vec![Operation::Inspect {
            path: PathBuf::from(TARGET)
        }]
    );
}

#[test]
fn repeated_runs_are_identical() {
    let cfg = config();
    let hal = FakeHal::new().with_device(TARGET, FakeDevice::dev_full());

    let first = run_with(&hal, &cfg);
    let second = run_with(&hal, &cfg);

    assert_eq!(first, second);
}

#[test]
fn regular_file_on_host_is_probed_and_flagged() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("not-a-device");
    fs::write(&path, b"").unwrap();

    let cfg = ProbeConfig {
        target_path: path.clone(),
        ..ProbeConfig::default()
    };
    let result = run_with(&LinuxHal::new(), &cfg);

    assert_eq!(result.validation.warnings.len(), 1);
    assert_eq!(result.exit_code, 1);
    assert!(matches!(
        result.write.unwrap().outcome,
        OperationOutcome::UnexpectedSuccess { .. }
    ));
    // the payload landed in the file and came back as non-null data
    assert_eq!(fs::read(&path).unwrap(), cfg.payload);
    assert!(matches!(
        result.read.unwrap().outcome,
        OperationOutcome::UnexpectedSuccess { .. }
    ));
}

#[test]
fn missing_path_on_host_is_a_precondition_failure() {
    let tmp = tempdir().unwrap();
    let cfg = ProbeConfig {
        target_path: tmp.path().join("absent"),
        ..ProbeConfig::default()
    };
    let result = run_with(&LinuxHal::new(), &cfg);

    assert_eq!(result.exit_code, 2);
    assert!(!tmp.path().join("absent").exists());
}

#[test]
fn host_dev_full_passes_when_present() {
    let path = Path::new(TARGET);
    if !path.exists() {
        return;
    }
    let result = run_with(&LinuxHal::new(), &config());
    if !result.validation.is_valid() {
        // e.g. a sandbox that exposes the node without write access
        return;
    }

    assert_eq!(result.exit_code, 0, "{result:?}");
}

/// Probe the real /dev/full with a custom payload, or `None` when the host
/// has no usable node.
fn host_dev_full_with(payload: Vec<u8>) -> Option<ProbeResult> {
    if !Path::new(TARGET).exists() {
        return None;
    }
    let cfg = ProbeConfig {
        payload,
        ..config()
    };
    let result = run_with(&LinuxHal::new(), &cfg);
    result.validation.is_valid().then_some(result)
}

fn write_reason(result: &ProbeResult) -> String {
    match result.write.as_ref().map(|step| &step.outcome) {
        Some(OperationOutcome::ExpectedFailure { reason }) => reason.clone(),
        other => panic!("unexpected write outcome {other:?}"),
    }
}

#[test]
fn host_dev_full_short_payload_fails_at_flush() {
    let Some(result) = host_dev_full_with(b"x".to_vec()) else {
        return;
    };
    assert_eq!(result.exit_code, 0, "{result:?}");
    assert!(write_reason(&result).starts_with("flush:"));
}

#[test]
fn host_dev_full_oversized_payload_fails_at_write() {
    let Some(result) = host_dev_full_with(vec![b'x'; 20_000]) else {
        return;
    };
    assert_eq!(result.exit_code, 0, "{result:?}");
    assert!(write_reason(&result).starts_with("write:"));
}

#[test]
fn host_dev_full_empty_payload_still_passes() {
    let Some(result) = host_dev_full_with(Vec::new()) else {
        return;
    };
    assert_eq!(result.exit_code, 0, "{result:?}");
    assert_eq!(result.write.map(|step| step.notes.len()), Some(1));
}

#[test]
fn empty_payload_on_fake_device_passes() {
    let hal = FakeHal::new().with_device(TARGET, FakeDevice::dev_full());
    let cfg = ProbeConfig {
        payload: Vec::new(),
        ..config()
    };
    let result = run_with(&hal, &cfg);

    assert_eq!(result.exit_code, 0);
    assert!(hal.has_operation(|op| matches!(op, Operation::Write { len } if *len > 0)));
}

#[test]
fn binary_rejects_empty_payload() {
    let output = Command::new(env!("CARGO_BIN_EXE_devfull-probe"))
        .arg("--payload")
        .arg("")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("payload must not be empty"));
}

#[test]
fn binary_exit_code_reflects_missing_target() {
    let tmp = tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_devfull-probe"))
        .arg("--target")
        .arg(tmp.path().join("absent"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("failed validation"));
    assert!(stdout.contains("Test complete. Exit code: 2"));
}

#[test]
fn binary_json_output_parses() {
    let tmp = tempdir().unwrap();
    let target = tmp.path().join("plain");
    fs::write(&target, b"").unwrap();
    let report = tmp.path().join("out/report.json");

    let output = Command::new(env!("CARGO_BIN_EXE_devfull-probe"))
        .arg("--target")
        .arg(&target)
        .arg("--payload")
        .arg("probe")
        .arg("--json")
        .arg("--report")
        .arg(&report)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["payload"], "probe");
    assert_eq!(value["verdict"], "mismatch");
    assert_eq!(value["read"]["outcome"]["sample_hex"], "70726f6265");

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(saved, value);
}
