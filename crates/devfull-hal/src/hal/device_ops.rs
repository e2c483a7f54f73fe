//! Device node inspection and I/O operations.

use crate::HalResult;
use serde::Serialize;
use std::fmt;
use std::fs::FileType;
use std::os::unix::fs::FileTypeExt;
use std::path::Path;

/// Kind of filesystem node found at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    CharDevice,
    BlockDevice,
    Regular,
    Directory,
    Fifo,
    Socket,
    Other,
}

impl NodeKind {
    pub fn from_file_type(ft: FileType) -> Self {
        if ft.is_char_device() {
            NodeKind::CharDevice
        } else if ft.is_block_device() {
            NodeKind::BlockDevice
        } else if ft.is_file() {
            NodeKind::Regular
        } else if ft.is_dir() {
            NodeKind::Directory
        } else if ft.is_fifo() {
            NodeKind::Fifo
        } else if ft.is_socket() {
            NodeKind::Socket
        } else {
            NodeKind::Other
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::CharDevice => "character device",
            NodeKind::BlockDevice => "block device",
            NodeKind::Regular => "regular file",
            NodeKind::Directory => "directory",
            NodeKind::Fifo => "fifo",
            NodeKind::Socket => "socket",
            NodeKind::Other => "unknown node",
        };
        f.write_str(name)
    }
}

/// Access mode checked against the calling process' credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => f.write_str("readable"),
            Access::Write => f.write_str("writable"),
        }
    }
}

/// Write half of an opened device. Dropping it releases the handle.
pub trait DeviceWriter {
    /// Hand bytes to the device, returning how many were accepted.
    fn write(&mut self, buf: &[u8]) -> HalResult<usize>;

    /// Push any buffered bytes down to the device.
    fn flush(&mut self) -> HalResult<()>;

    /// Release the handle, reporting errors the platform defers to close time.
    fn close(self: Box<Self>) -> HalResult<()>;
}

/// Read half of an opened device. Dropping it releases the handle.
pub trait DeviceReader {
    /// Read into `buf`; `Ok(0)` means end of stream.
    fn read(&mut self, buf: &mut [u8]) -> HalResult<usize>;

    fn close(self: Box<Self>) -> HalResult<()>;
}

/// Operations the probe performs against a target node.
pub trait DeviceOps {
    /// Inspect the node at `path`. `Ok(None)` means nothing exists there.
    fn node_kind(&self, path: &Path) -> HalResult<Option<NodeKind>>;

    /// Whether the current process may open `path` with the given access.
    fn can_access(&self, path: &Path, access: Access) -> HalResult<bool>;

    /// Open an existing node for writing. Never creates files.
    fn open_write(&self, path: &Path) -> HalResult<Box<dyn DeviceWriter>>;

    fn open_read(&self, path: &Path) -> HalResult<Box<dyn DeviceReader>>;
}
