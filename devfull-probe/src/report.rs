//! Human-readable and JSON rendering of a [`ProbeResult`].
//!
//! Rendering is best effort: a broken stdout or an unwritable report file is
//! logged and otherwise ignored, because the exit code is the real signal.

use crate::probe::{OperationOutcome, StepReport, HEX_EXCERPT_LEN};
use crate::runner::ProbeResult;
use anyhow::Context;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

const DIVIDER_WIDTH: usize = 50;

fn divider() -> String {
    "=".repeat(DIVIDER_WIDTH)
}

/// Render the text report. Never fails.
pub fn render_text(result: &ProbeResult, out: &mut dyn Write) {
    if let Err(err) = write_text(result, out) {
        log::debug!("text report incomplete: {err}");
    }
}

/// Render the result as pretty JSON. Never fails.
pub fn render_json(result: &ProbeResult, out: &mut dyn Write) {
    let rendered = serde_json::to_writer_pretty(&mut *out, result)
        .map_err(io::Error::from)
        .and_then(|()| writeln!(out));
    if let Err(err) = rendered {
        log::debug!("JSON report incomplete: {err}");
    }
}

/// Write the JSON result to `path`, creating parent directories.
pub fn write_report_file(result: &ProbeResult, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Unable to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(result).context("Unable to serialize probe result")?;
    fs::write(path, json + "\n")
        .with_context(|| format!("Unable to write report to {}", path.display()))?;
    Ok(())
}

fn write_text(result: &ProbeResult, out: &mut dyn Write) -> io::Result<()> {
    let target = result.target.display();

    writeln!(out, "{}", divider())?;
    writeln!(out, "Start of {target} probe")?;
    writeln!(out, "Timestamp: {}", result.generated_at)?;
    writeln!(out, "Target file: {target}")?;
    writeln!(out, "Test data: {}", result.payload)?;
    writeln!(out, "{}", divider())?;

    for warning in &result.validation.warnings {
        writeln!(out, "! Warning: {warning}")?;
    }

    if !result.validation.is_valid() {
        writeln!(out, "Error: target device {target} failed validation.")?;
        for failure in &result.validation.failures {
            writeln!(out, "  - {failure}")?;
        }
        writeln!(
            out,
            "This probe requires a Unix-like system with a /dev/full style device."
        )?;
    }

    if let Some(write) = &result.write {
        writeln!(out, "Attempting to write to {target}...")?;
        write_step(out, write, StepKind::Write)?;
    }
    if let Some(read) = &result.read {
        writeln!(out)?;
        writeln!(out, "Testing read behavior from {target}...")?;
        write_step(out, read, StepKind::Read)?;
    }

    writeln!(out, "{}", divider())?;
    writeln!(out, "Test complete. Exit code: {}", result.exit_code)?;
    writeln!(out, "{}", divider())?;
    out.flush()
}

#[derive(Clone, Copy)]
enum StepKind {
    Write,
    Read,
}

fn write_step(out: &mut dyn Write, step: &StepReport, kind: StepKind) -> io::Result<()> {
    match (&step.outcome, kind) {
        (OperationOutcome::ExpectedFailure { reason }, _) => {
            writeln!(out, "✓ Expected failure: disk full simulation successful.")?;
            writeln!(out, "  Error: {reason}")?;
        }
        (OperationOutcome::Success { bytes: 0 }, _) => {
            writeln!(
                out,
                "? Read returned empty data (accepted, may be system-dependent)."
            )?;
        }
        (OperationOutcome::Success { bytes }, _) => {
            writeln!(out, "✓ Expected behavior: read returned null bytes.")?;
            writeln!(out, "  Bytes read: {bytes}")?;
        }
        (OperationOutcome::UnexpectedFailure { reason }, StepKind::Write) => {
            writeln!(out, "✗ Write failed with an unexpected error.")?;
            writeln!(out, "  Error: {reason}")?;
        }
        (OperationOutcome::UnexpectedFailure { reason }, StepKind::Read) => {
            writeln!(out, "✗ Read operation failed unexpectedly.")?;
            writeln!(out, "  Error: {reason}")?;
        }
        (OperationOutcome::UnexpectedSuccess { bytes, .. }, StepKind::Write) => {
            writeln!(
                out,
                "✗ Unexpected result: write succeeded ({bytes} bytes written)."
            )?;
            writeln!(
                out,
                "  A full device should never accept a write. Investigate the host."
            )?;
        }
        (OperationOutcome::UnexpectedSuccess { bytes, sample_hex }, StepKind::Read) => {
            writeln!(
                out,
                "✗ Unexpected behavior: read returned non-null data ({bytes} bytes)."
            )?;
            if let Some(hex) = sample_hex {
                writeln!(out, "  First {HEX_EXCERPT_LEN} bytes (hex): {hex}")?;
            }
        }
    }
    for note in &step.notes {
        writeln!(out, "  Note: {note}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbeConfig;
    use crate::runner::run_with;
    use devfull_hal::{FakeDevice, FakeHal, FakeRead};
    use std::path::PathBuf;
    use tempfile::tempdir;

    const TARGET: &str = "/dev/full";

    fn config() -> ProbeConfig {
        ProbeConfig {
            target_path: PathBuf::from(TARGET),
            ..ProbeConfig::default()
        }
    }

    fn text_for(hal: &FakeHal, cfg: &ProbeConfig) -> String {
        let result = run_with(hal, cfg);
        let mut buf = Vec::new();
        render_text(&result, &mut buf);
        String::from_utf8(buf).unwrap()
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn passing_run_has_header_steps_and_footer() {
        let cfg = config();
        let hal = FakeHal::new().with_device(TARGET, FakeDevice::dev_full());
        let text = text_for(&hal, &cfg);

        assert!(text.starts_with(&"=".repeat(50)));
        assert!(text.contains("Target file: /dev/full"));
        assert!(text.contains(&format!("Timestamp: {}", cfg.timestamp())));
        assert!(text.contains(&format!("Test data: {}", cfg.payload_text())));
        assert!(text.contains("✓ Expected failure"));
        assert!(text.contains("Bytes read: 100"));
        assert!(text.contains("Test complete. Exit code: 0"));
    }

    #[test]
    fn unexpected_read_shows_hex_excerpt() {
        let device = FakeDevice {
            read: FakeRead::Bytes(b"hello".to_vec()),
            ..FakeDevice::dev_full()
        };
        let hal = FakeHal::new().with_device(TARGET, device);
        let text = text_for(&hal, &config());

        assert!(text.contains("First 50 bytes (hex): 68656c6c6f"));
        assert!(text.contains("Exit code: 1"));
    }

    #[test]
    fn precondition_failure_lists_reasons() {
        let text = text_for(&FakeHal::new(), &config());

        assert!(text.contains("failed validation"));
        assert!(text.contains("does not exist"));
        assert!(!text.contains("Attempting to write"));
        assert!(text.contains("Exit code: 2"));
    }

    #[test]
    fn broken_output_is_swallowed() {
        let hal = FakeHal::new().with_device(TARGET, FakeDevice::dev_full());
        let result = run_with(&hal, &config());

        render_text(&result, &mut BrokenPipe);
        render_json(&result, &mut BrokenPipe);
    }

    #[test]
    fn json_report_contains_verdict() {
        let hal = FakeHal::new().with_device(TARGET, FakeDevice::sink(vec![0; 50]));
        let result = run_with(&hal, &config());

        let mut buf = Vec::new();
        render_json(&result, &mut buf);
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["exit_code"], 1);
        assert_eq!(value["verdict"], "mismatch");
        assert_eq!(value["write"]["outcome"]["status"], "unexpected_success");
        assert_eq!(value["read"]["outcome"]["bytes"], 50);
    }

    #[test]
    fn report_file_creates_parent_dirs() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("reports/nested/probe.json");
        let hal = FakeHal::new().with_device(TARGET, FakeDevice::dev_full());
        let result = run_with(&hal, &config());

        write_report_file(&result, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["exit_code"], 0);
        assert_eq!(value["target"], TARGET);
    }
}
