//! ADRV9001 ARM Mailbox Constants
//!
//! This module defines the opcodes, object identifiers, mailbox addresses and
//! command timing windows used when talking to the embedded ARM co-processor.

// ----------------------------------------------------------------------------
// Mailbox opcodes
// ----------------------------------------------------------------------------

/// Move the channels in the mask from CALIBRATED to PRIMED
pub const ARM_RADIOON_OPCODE: u8 = 0x04;

/// Move the channels in the mask from PRIMED back to CALIBRATED
pub const ARM_RADIOOFF_OPCODE: u8 = 0x06;

/// Write an object from the SET mailbox into the firmware
pub const ARM_SET_OPCODE: u8 = 0x0A;

/// Copy an object from the firmware into the GET mailbox
pub const ARM_GET_OPCODE: u8 = 0x0C;

/// Power up the channels in the mask
pub const ARM_POWERUP_OPCODE: u8 = 0x12;

/// Power down the channels in the mask
pub const ARM_POWERDOWN_OPCODE: u8 = 0x14;

// ----------------------------------------------------------------------------
// Object identifiers (SET/GET)
// ----------------------------------------------------------------------------

/// Carrier frequency, LO and PLL options of one channel
pub const ARM_OBJECTID_CHANNEL_CARRIER_FREQUENCY: u8 = 0x0F;

/// PLL loop filter of one synthesizer
pub const ARM_OBJECTID_PLL_LOOPFILTER: u8 = 0x11;

/// TDD enablement timing of one channel
pub const ARM_OBJECTID_TDD_TIMING_PARAMS: u8 = 0x1A;

// ----------------------------------------------------------------------------
// Mailbox memory
// ----------------------------------------------------------------------------

/// ARM memory the host fills before a SET command
pub const ADDR_ARM_MAILBOX_SET: u32 = 0x2000_0000;

/// ARM memory the firmware fills when a GET command completes
pub const ADDR_ARM_MAILBOX_GET: u32 = 0x2000_0100;

pub const CARRIER_PAYLOAD_LEN: usize = 16;
pub const LOOP_FILTER_SET_PAYLOAD_LEN: usize = 4;
pub const LOOP_FILTER_GET_PAYLOAD_LEN: usize = 6;
pub const ENABLEMENT_DELAYS_PAYLOAD_LEN: usize = 20;

// ----------------------------------------------------------------------------
// Command timing (microseconds)
// ----------------------------------------------------------------------------

pub const DEFAULT_TIMEOUT_US: u64 = 1_000_000;
pub const DEFAULT_INTERVAL_US: u64 = 1_000;

pub const SETCARRIER_FREQUENCY_TIMEOUT_US: u64 = 4_000_000;
pub const SETCARRIER_FREQUENCY_INTERVAL_US: u64 = 1_000;

pub const GETCARRIER_FREQUENCY_TIMEOUT_US: u64 = 2_000_000;
pub const GETCARRIER_FREQUENCY_INTERVAL_US: u64 = 1_000;

pub const SETLOOPFILTER_TIMEOUT_US: u64 = 2_000_000;
pub const SETLOOPFILTER_INTERVAL_US: u64 = 1_000;

pub const GETLOOPFILTER_TIMEOUT_US: u64 = 1_500_000;
pub const GETLOOPFILTER_INTERVAL_US: u64 = 1_000;

pub const RADIOONOFF_TIMEOUT_US: u64 = 3_000_000;
pub const RADIOONOFF_INTERVAL_US: u64 = 500;

// ----------------------------------------------------------------------------
// Parameter ranges
// ----------------------------------------------------------------------------

pub const CARRIER_FREQUENCY_MIN_HZ: u64 = 30_000_000;
pub const CARRIER_FREQUENCY_MAX_HZ: u64 = 6_000_000_000;

pub const INTERMEDIATE_FREQUENCY_MIN_HZ: u32 = 200_000;
pub const INTERMEDIATE_FREQUENCY_MAX_HZ: u32 = 20_000_000;

pub const LOOP_FILTER_PHASE_MARGIN_MIN_DEGREES: u8 = 40;
pub const LOOP_FILTER_PHASE_MARGIN_MAX_DEGREES: u8 = 85;
pub const LOOP_FILTER_BANDWIDTH_MIN_KHZ: u16 = 50;
pub const LOOP_FILTER_BANDWIDTH_MAX_KHZ: u16 = 1500;
pub const LOOP_FILTER_POWER_SCALE_MAX: u8 = 10;

/// Enablement delays are 24-bit counts
pub const ENABLEMENT_DELAY_MAX: u32 = 0x00FF_FFFF;

// ----------------------------------------------------------------------------
// State machine retry budgets
// ----------------------------------------------------------------------------

/// Status reads allowed after clearing an enable bit on the way to PRIMED
pub const DISABLE_RF_TRIES_TO_PRIMED: u8 = 5;

/// Status reads allowed after clearing an enable bit on the way to CALIBRATED
pub const DISABLE_RF_TRIES_TO_CALIBRATED: u8 = 10;
