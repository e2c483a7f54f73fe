//! Linux HAL implementation using real system calls.

use super::{Access, DeviceOps, DeviceReader, DeviceWriter, NodeKind};
use crate::{HalError, HalResult};
use nix::errno::Errno;
use nix::unistd::{self, AccessFlags};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::os::unix::io::IntoRawFd;
use std::path::Path;

/// Real HAL implementation for Linux systems.
#[derive(Debug, Clone, Default)]
pub struct LinuxHal;

impl LinuxHal {
    pub fn new() -> Self {
        Self
    }
}

/// Close a file through `close(2)` so errors reported at close time surface
/// instead of being dropped by `File`'s destructor.
fn close_file(file: File) -> HalResult<()> {
    unistd::close(file.into_raw_fd()).map_err(HalError::from)
}

impl DeviceOps for LinuxHal {
    fn node_kind(&self, path: &Path) -> HalResult<Option<NodeKind>> {
        match fs::metadata(path) {
            Ok(meta) => Ok(Some(NodeKind::from_file_type(meta.file_type()))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(HalError::Io(err)),
        }
    }

    fn can_access(&self, path: &Path, access: Access) -> HalResult<bool> {
        let flags = match access {
            Access::Read => AccessFlags::R_OK,
            Access::Write => AccessFlags::W_OK,
        };
        match unistd::access(path, flags) {
            Ok(()) => Ok(true),
            Err(Errno::EACCES | Errno::EPERM | Errno::EROFS) => Ok(false),
            Err(other) => Err(HalError::Nix(other)),
        }
    }

    fn open_write(&self, path: &Path) -> HalResult<Box<dyn DeviceWriter>> {
        let file = OpenOptions::new().write(true).open(path)?;
        log::debug!("opened {} for writing", path.display());
        Ok(Box::new(LinuxWriter {
            inner: BufWriter::new(file),
        }))
    }

    fn open_read(&self, path: &Path) -> HalResult<Box<dyn DeviceReader>> {
        let file = File::open(path)?;
        log::debug!("opened {} for reading", path.display());
        Ok(Box::new(LinuxReader { file }))
    }
}

/// Buffered writer, so a short payload only reaches the device on flush,
/// the way a stdio-style stream behaves.
struct LinuxWriter {
    inner: BufWriter<File>,
}

impl DeviceWriter for LinuxWriter {
    fn write(&mut self, buf: &[u8]) -> HalResult<usize> {
        Ok(self.inner.write(buf)?)
    }

    fn flush(&mut self) -> HalResult<()> {
        Ok(self.inner.flush()?)
    }

    fn close(self: Box<Self>) -> HalResult<()> {
        let this = *self;
        // Whatever is still buffered already failed to flush; drop it rather
        // than retrying the write a second time inside close.
        let (file, _unflushed) = this.inner.into_parts();
        close_file(file)
    }
}

struct LinuxReader {
    file: File,
}

impl DeviceReader for LinuxReader {
    fn read(&mut self, buf: &mut [u8]) -> HalResult<usize> {
        Ok(self.file.read(buf)?)
    }

    fn close(self: Box<Self>) -> HalResult<()> {
        let this = *self;
        close_file(this.file)
    }
}
