//! # Radio Error Handling
//!
//! This module defines the RadioError enum, which represents the different error
//! types that can occur in the adrv9001-radio crate. Range and state violations
//! are reported before any device I/O is issued; transport errors carry the
//! command that failed.

use crate::radio::hal::HalError;
use crate::radio::types::{ChannelEnableMode, ChannelId, ChannelState};
use std::time::Duration;
use thiserror::Error;

/// Represents the different error types that can occur in the radio crate.
#[derive(Debug, Error)]
pub enum RadioError {
    /// A parameter lies outside its documented bounds.
    #[error("{parameter} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        parameter: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    /// The request itself is malformed (unsupported port, empty or duplicate batch).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A channel is not in a state that allows the requested operation.
    #[error("Invalid state for {channel}: {actual:?}, expected {expected}")]
    InvalidState {
        channel: ChannelId,
        actual: ChannelState,
        expected: &'static str,
    },

    /// RF enable/disable was requested for a channel not under SPI control.
    #[error("Channel {channel} enable mode is {mode:?}, SPI mode required")]
    EnableModeMismatch {
        channel: ChannelId,
        mode: ChannelEnableMode,
    },

    /// The co-processor never reported completion within the polling window.
    #[error("Timeout after {waited:?} waiting for opcode 0x{opcode:02X} (object 0x{object_id:02X})")]
    Timeout {
        opcode: u8,
        object_id: u8,
        waited: Duration,
    },

    /// The co-processor completed the command with a non-zero error code.
    #[error("Opcode 0x{opcode:02X} (object 0x{object_id:02X}) failed with code {code}")]
    CommandFailed { opcode: u8, object_id: u8, code: u8 },

    /// A bounded disable-and-verify loop gave up; the module needs a reset.
    #[error("Channel {channel} did not return to PRIMED after {tries} status reads, reset module")]
    RetriesExhausted { channel: ChannelId, tries: u8 },

    /// The device returned a value that does not decode.
    #[error("Invalid {field} in device response: {value}")]
    InvalidResponse { field: &'static str, value: u64 },

    /// Register or memory access failed underneath the driver.
    #[error("HAL error: {0}")]
    Hal(#[from] HalError),
}

pub type Result<T> = std::result::Result<T, RadioError>;

/// Reject `value` unless it lies in `[min, max]`
pub(crate) fn check_range(parameter: &'static str, value: u64, min: u64, max: u64) -> Result<()> {
    if value < min || value > max {
        return Err(RadioError::OutOfRange {
            parameter,
            value,
            min,
            max,
        });
    }
    Ok(())
}
