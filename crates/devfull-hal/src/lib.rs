//! Device access layer for devfull-probe.
//!
//! Everything the probe does to the target node goes through [`DeviceOps`],
//! so the same probe logic runs against the real host ([`LinuxHal`]) or a
//! scripted double ([`FakeHal`]) in tests.

mod error;
pub mod hal;

pub use error::{HalError, HalResult, OUT_OF_SPACE_MESSAGE};
pub use hal::*;
pub use nix::errno::Errno;
