//! HAL trait definitions and implementations.
//!
//! This module defines the device operation traits and provides both a real
//! (LinuxHal) and a fake (FakeHal) implementation.

pub mod device_ops;
pub mod fake_hal;
pub mod linux_hal;

pub use device_ops::{Access, DeviceOps, DeviceReader, DeviceWriter, NodeKind};
pub use fake_hal::{FakeDevice, FakeFault, FakeHal, FakeRead, Operation};
pub use linux_hal::LinuxHal;
