//! # Hardware Abstraction Layer for the Transceiver
//!
//! This module defines the HAL trait the driver calls into for register access,
//! ARM memory access, GPIO inspection and delays. The SPI transport itself lives
//! outside the crate; [`crate::sim::SimulatedDevice`] is the in-tree implementation.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during HAL operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HalError {
    #[error("SPI communication error")]
    Spi,

    #[error("GPIO operation error")]
    Gpio,

    #[error("Register access error at 0x{0:04X}")]
    Register(u16),

    #[error("ARM memory access error at 0x{0:08X}")]
    Memory(u32),
}

/// GPIO signals whose pin assignment the driver inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpioSignal {
    Rx1ExtFrontendControl,
    Rx2ExtFrontendControl,
    Tx1ExtFrontendControl,
    Tx2ExtFrontendControl,
}

/// Pin a GPIO signal is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpioPin {
    #[default]
    Unassigned,
    /// Digital GPIO 0..=15
    Digital(u8),
    /// Analog GPIO 0..=11
    Analog(u8),
}

impl GpioPin {
    pub fn is_assigned(&self) -> bool {
        !matches!(self, GpioPin::Unassigned)
    }
}

/// Hardware Abstraction Layer trait for ADRV9001 control
pub trait Hal {
    /// Read one byte from a device register
    fn read_register(&mut self, addr: u16) -> Result<u8, HalError>;

    /// Write one byte to a device register
    fn write_register(&mut self, addr: u16, value: u8) -> Result<(), HalError>;

    /// Write a block into ARM memory
    fn write_memory(&mut self, addr: u32, data: &[u8]) -> Result<(), HalError>;

    /// Read a block from ARM memory, optionally using auto-increment addressing
    fn read_memory(&mut self, addr: u32, buf: &mut [u8], auto_increment: bool)
        -> Result<(), HalError>;

    /// Look up which pin a GPIO signal is assigned to
    fn gpio_inspect(&mut self, signal: GpioSignal) -> Result<GpioPin, HalError>;

    /// Block the caller between status polls
    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
