//! Fake HAL implementation for testing.
//!
//! Devices are scripted per path with [`FakeDevice`], and every call is
//! recorded as an [`Operation`] so tests can assert what the probe touched
//! without needing a real `/dev/full` on the host.

use super::{Access, DeviceOps, DeviceReader, DeviceWriter, NodeKind};
use crate::{HalError, HalResult, OUT_OF_SPACE_MESSAGE};
use nix::errno::Errno;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Operation records for testing and verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Inspect { path: PathBuf },
    CheckAccess { path: PathBuf, access: Access },
    OpenWrite { path: PathBuf },
    Write { len: usize },
    Flush,
    CloseWriter,
    OpenRead { path: PathBuf },
    Read { len: usize },
    CloseReader,
}

/// A failure the fake raises at a given step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeFault {
    /// ENOSPC with errno attached.
    OutOfSpace,
    Errno(Errno),
    /// An error that only carries text, no errno.
    Message(String),
    /// Panic inside the device layer.
    Panic(String),
}

impl FakeFault {
    fn raise(&self) -> HalError {
        match self {
            FakeFault::OutOfSpace => HalError::Nix(Errno::ENOSPC),
            FakeFault::Errno(errno) => HalError::Nix(*errno),
            FakeFault::Message(msg) => HalError::Io(io::Error::other(msg.clone())),
            FakeFault::Panic(msg) => panic!("{msg}"),
        }
    }
}

/// What reads from a fake device return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeRead {
    /// Fill every buffer with this byte, forever.
    Endless(u8),
    /// Return these bytes once per open, then end of stream.
    Bytes(Vec<u8>),
    Fault(FakeFault),
}

/// Scripted behavior for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeDevice {
    pub kind: NodeKind,
    pub readable: bool,
    pub writable: bool,
    pub inspect: Option<FakeFault>,
    pub open_write: Option<FakeFault>,
    pub write: Option<FakeFault>,
    pub flush: Option<FakeFault>,
    pub close_writer: Option<FakeFault>,
    pub open_read: Option<FakeFault>,
    pub read: FakeRead,
    pub close_reader: Option<FakeFault>,
}

impl FakeDevice {
    /// A well-behaved full device: writes fail with the canonical disk-full
    /// message, reads yield endless null bytes.
    pub fn dev_full() -> Self {
        Self {
            kind: NodeKind::CharDevice,
            readable: true,
            writable: true,
            inspect: None,
            open_write: None,
            write: Some(FakeFault::Message(OUT_OF_SPACE_MESSAGE.to_string())),
            flush: None,
            close_writer: None,
            open_read: None,
            read: FakeRead::Endless(0),
            close_reader: None,
        }
    }

    /// A character device that swallows writes and reads back `data`.
    pub fn sink(data: Vec<u8>) -> Self {
        Self {
            write: None,
            read: FakeRead::Bytes(data),
            ..Self::dev_full()
        }
    }
}

/// Shared state for FakeHal operations.
#[derive(Debug, Default)]
struct FakeHalState {
    /// All operations that were recorded
    operations: Vec<Operation>,
    devices: HashMap<PathBuf, FakeDevice>,
}

fn lock_state(state: &Mutex<FakeHalState>) -> MutexGuard<'_, FakeHalState> {
    // A scripted panic can poison the lock mid-operation; the recorded
    // operations are still valid, so keep going.
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn record(state: &Mutex<FakeHalState>, op: Operation) {
    lock_state(state).operations.push(op);
}

fn fail_if(fault: &Option<FakeFault>) -> HalResult<()> {
    match fault {
        Some(fault) => Err(fault.raise()),
        None => Ok(()),
    }
}

/// Fake HAL implementation that records operations without touching the host.
#[derive(Debug, Clone, Default)]
pub struct FakeHal {
    state: Arc<Mutex<FakeHalState>>,
}

impl FakeHal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register scripted behavior for `path`.
    pub fn with_device(self, path: impl Into<PathBuf>, device: FakeDevice) -> Self {
        lock_state(&self.state)
            .devices
            .insert(path.into(), device);
        self
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<Operation> {
        lock_state(&self.state).operations.clone()
    }

    /// Get the number of operations recorded.
    pub fn operation_count(&self) -> usize {
        lock_state(&self.state).operations.len()
    }

    /// Check if a specific operation was recorded.
    pub fn has_operation(&self, check: impl Fn(&Operation) -> bool) -> bool {
        lock_state(&self.state).operations.iter().any(check)
    }

    /// Clear recorded operations; scripted devices stay registered.
    pub fn clear(&self) {
        lock_state(&self.state).operations.clear();
    }

    fn device(&self, path: &Path) -> Option<FakeDevice> {
        lock_state(&self.state).devices.get(path).cloned()
    }

    fn record_operation(&self, op: Operation) {
        record(&self.state, op);
    }
}

fn not_found() -> HalError {
    HalError::Io(io::Error::from(io::ErrorKind::NotFound))
}

impl DeviceOps for FakeHal {
    fn node_kind(&self, path: &Path) -> HalResult<Option<NodeKind>> {
        self.record_operation(Operation::Inspect {
            path: path.to_path_buf(),
        });
        let Some(device) = self.device(path) else {
            return Ok(None);
        };
        fail_if(&device.inspect)?;
        Ok(Some(device.kind))
    }

    fn can_access(&self, path: &Path, access: Access) -> HalResult<bool> {
        self.record_operation(Operation::CheckAccess {
            path: path.to_path_buf(),
            access,
        });
        Ok(match (self.device(path), access) {
            (None, _) => false,
            (Some(device), Access::Read) => device.readable,
            (Some(device), Access::Write) => device.writable,
        })
    }

    fn open_write(&self, path: &Path) -> HalResult<Box<dyn DeviceWriter>> {
        self.record_operation(Operation::OpenWrite {
            path: path.to_path_buf(),
        });
        let device = self.device(path).ok_or_else(not_found)?;
        if !device.writable {
            return Err(HalError::Nix(Errno::EACCES));
        }
        fail_if(&device.open_write)?;
        Ok(Box::new(FakeWriter {
            state: Arc::clone(&self.state),
            device,
        }))
    }

    fn open_read(&self, path: &Path) -> HalResult<Box<dyn DeviceReader>> {
        self.record_operation(Operation::OpenRead {
            path: path.to_path_buf(),
        });
        let device = self.device(path).ok_or_else(not_found)?;
        if !device.readable {
            return Err(HalError::Nix(Errno::EACCES));
        }
        fail_if(&device.open_read)?;
        Ok(Box::new(FakeReader {
            state: Arc::clone(&self.state),
            source: device.read,
            position: 0,
            close_fault: device.close_reader,
        }))
    }
}

struct FakeWriter {
    state: Arc<Mutex<FakeHalState>>,
    device: FakeDevice,
}

impl DeviceWriter for FakeWriter {
    fn write(&mut self, buf: &[u8]) -> HalResult<usize> {
        record(&self.state, Operation::Write { len: buf.len() });
        fail_if(&self.device.write)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> HalResult<()> {
        record(&self.state, Operation::Flush);
        fail_if(&self.device.flush)
    }

    fn close(self: Box<Self>) -> HalResult<()> {
        record(&self.state, Operation::CloseWriter);
        fail_if(&self.device.close_writer)
    }
}

struct FakeReader {
    state: Arc<Mutex<FakeHalState>>,
    source: FakeRead,
    position: usize,
    close_fault: Option<FakeFault>,
}

impl DeviceReader for FakeReader {
    fn read(&mut self, buf: &mut [u8]) -> HalResult<usize> {
        record(&self.state, Operation::Read { len: buf.len() });
        match &self.source {
            FakeRead::Endless(byte) => {
                buf.fill(*byte);
                Ok(buf.len())
            }
            FakeRead::Bytes(data) => {
                let remaining = &data[self.position.min(data.len())..];
                let n = remaining.len().min(buf.len());
                buf[..n].copy_from_slice(&remaining[..n]);
                self.position += n;
                Ok(n)
            }
            FakeRead::Fault(fault) => Err(fault.raise()),
        }
    }

    fn close(self: Box<Self>) -> HalResult<()> {
        record(&self.state, Operation::CloseReader);
        fail_if(&self.close_fault)
    }
}
