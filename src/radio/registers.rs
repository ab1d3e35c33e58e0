//! # ADRV9001 Register Map and Bit Fields
//!
//! Register addresses used by the radio control path, and named [`BitField`]
//! descriptors for every packed field the driver decodes. Call sites go through
//! these descriptors instead of shifting raw register values themselves.
//!
//! ## Status registers
//!
//! ```text
//! ARM_CMD_STATUS_8   [1:0] system state   [3:2] monitor mode state   [7:4] boot state
//! ARM_CMD_STATUS_9   [1:0] Rx1  [3:2] Rx2  [5:4] Tx1  [7:6] Tx2   (channel states)
//! ```
//!
//! ## Command status nibbles
//!
//! Every (even) opcode owns one nibble in ARM_CMD_STATUS_0..7. Register index is
//! `opcode >> 2`, the nibble is selected by bit 1 of the opcode. Within a nibble,
//! bit 0 is the pending flag and bits [3:1] carry the firmware error code.

use crate::radio::hal::{Hal, HalError};
use crate::radio::types::{ChannelNumber, Pll, Port};

// =============================================================================
// Register Addresses
// =============================================================================

/// Opcode register; writing it hands the command to the ARM
pub const REG_ARM_COMMAND: u16 = 0x00C3;

/// First extended command byte (channel mask or zero)
pub const REG_ARM_EXT_CMD_BYTE_1: u16 = 0x00C4;

/// Command status nibbles for opcodes 0x00..0x1E
pub const REG_ARM_CMD_STATUS_0: u16 = 0x00D0;

/// System, monitor mode and boot state
pub const REG_ARM_CMD_STATUS_8: u16 = 0x00D8;

/// Packed channel states
pub const REG_ARM_CMD_STATUS_9: u16 = 0x00D9;

/// Per-channel enable mode (0 = SPI, 1 = pin)
pub const REG_BBIC_PIN_MODE: u16 = 0x02A0;

/// Per-channel RF enable bits for SPI mode
pub const REG_BBIC_ENABLE: u16 = 0x02A1;

/// Synthesizer lock status, one register per PLL instance
pub const REG_RF1_PLL_SYN_LOCK: u16 = 0x0740;
pub const REG_RF2_PLL_SYN_LOCK: u16 = 0x0840;
pub const REG_AUX_PLL_SYN_LOCK: u16 = 0x0940;
pub const REG_CLK_PLL_SYN_LOCK: u16 = 0x0A40;
pub const REG_CLK_PLL_LP_SYN_LOCK: u16 = 0x0B40;

/// Number of extended command bytes following the opcode
pub const ARM_EXT_CMD_BYTES: usize = 3;

// =============================================================================
// Bit Field Descriptor
// =============================================================================

/// A `width`-bit field starting at bit `shift` of the register at `addr`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    pub addr: u16,
    pub shift: u8,
    pub width: u8,
}

impl BitField {
    pub const fn new(addr: u16, shift: u8, width: u8) -> Self {
        Self { addr, shift, width }
    }

    pub const fn mask(&self) -> u8 {
        ((((1u16 << self.width) - 1) as u8) << self.shift) as u8
    }

    /// Pull this field out of a raw register value
    pub const fn extract(&self, reg: u8) -> u8 {
        (reg & self.mask()) >> self.shift
    }

    /// Replace this field inside a raw register value
    pub const fn insert(&self, reg: u8, value: u8) -> u8 {
        (reg & !self.mask()) | ((value << self.shift) & self.mask())
    }

    pub fn read<H: Hal>(&self, hal: &mut H) -> Result<u8, HalError> {
        Ok(self.extract(hal.read_register(self.addr)?))
    }

    /// Read-modify-write of this field only
    pub fn write<H: Hal>(&self, hal: &mut H, value: u8) -> Result<(), HalError> {
        let current = hal.read_register(self.addr)?;
        hal.write_register(self.addr, self.insert(current, value))
    }
}

// =============================================================================
// Named Fields
// =============================================================================

pub const SYSTEM_STATE: BitField = BitField::new(REG_ARM_CMD_STATUS_8, 0, 2);
pub const MONITOR_MODE_STATE: BitField = BitField::new(REG_ARM_CMD_STATUS_8, 2, 2);
pub const BOOT_STATE: BitField = BitField::new(REG_ARM_CMD_STATUS_8, 4, 4);

pub const RX1_CHANNEL_STATE: BitField = BitField::new(REG_ARM_CMD_STATUS_9, 0, 2);
pub const RX2_CHANNEL_STATE: BitField = BitField::new(REG_ARM_CMD_STATUS_9, 2, 2);
pub const TX1_CHANNEL_STATE: BitField = BitField::new(REG_ARM_CMD_STATUS_9, 4, 2);
pub const TX2_CHANNEL_STATE: BitField = BitField::new(REG_ARM_CMD_STATUS_9, 6, 2);

pub const RX1_PIN_MODE: BitField = BitField::new(REG_BBIC_PIN_MODE, 0, 1);
pub const RX2_PIN_MODE: BitField = BitField::new(REG_BBIC_PIN_MODE, 1, 1);
pub const TX1_PIN_MODE: BitField = BitField::new(REG_BBIC_PIN_MODE, 2, 1);
pub const TX2_PIN_MODE: BitField = BitField::new(REG_BBIC_PIN_MODE, 3, 1);

pub const RX1_ENABLE: BitField = BitField::new(REG_BBIC_ENABLE, 0, 1);
pub const RX2_ENABLE: BitField = BitField::new(REG_BBIC_ENABLE, 1, 1);
pub const TX1_ENABLE: BitField = BitField::new(REG_BBIC_ENABLE, 2, 1);
pub const TX2_ENABLE: BitField = BitField::new(REG_BBIC_ENABLE, 3, 1);
pub const ORX1_ENABLE: BitField = BitField::new(REG_BBIC_ENABLE, 4, 1);
pub const ORX2_ENABLE: BitField = BitField::new(REG_BBIC_ENABLE, 5, 1);

/// Pending flag inside a command status nibble
pub const CMD_STATUS_PENDING: u8 = 0x01;

/// State field for a channel; ORX states are not reported
pub fn channel_state_field(port: Port, channel: ChannelNumber) -> Option<BitField> {
    match (port, channel) {
        (Port::Rx, ChannelNumber::Channel1) => Some(RX1_CHANNEL_STATE),
        (Port::Rx, ChannelNumber::Channel2) => Some(RX2_CHANNEL_STATE),
        (Port::Tx, ChannelNumber::Channel1) => Some(TX1_CHANNEL_STATE),
        (Port::Tx, ChannelNumber::Channel2) => Some(TX2_CHANNEL_STATE),
        (Port::ORx, _) => None,
    }
}

/// Enable mode field for a channel; ORX has no pin mode
pub fn pin_mode_field(port: Port, channel: ChannelNumber) -> Option<BitField> {
    match (port, channel) {
        (Port::Rx, ChannelNumber::Channel1) => Some(RX1_PIN_MODE),
        (Port::Rx, ChannelNumber::Channel2) => Some(RX2_PIN_MODE),
        (Port::Tx, ChannelNumber::Channel1) => Some(TX1_PIN_MODE),
        (Port::Tx, ChannelNumber::Channel2) => Some(TX2_PIN_MODE),
        (Port::ORx, _) => None,
    }
}

pub fn enable_field(port: Port, channel: ChannelNumber) -> BitField {
    match (port, channel) {
        (Port::Rx, ChannelNumber::Channel1) => RX1_ENABLE,
        (Port::Rx, ChannelNumber::Channel2) => RX2_ENABLE,
        (Port::Tx, ChannelNumber::Channel1) => TX1_ENABLE,
        (Port::Tx, ChannelNumber::Channel2) => TX2_ENABLE,
        (Port::ORx, ChannelNumber::Channel1) => ORX1_ENABLE,
        (Port::ORx, ChannelNumber::Channel2) => ORX2_ENABLE,
    }
}

/// Lock indicator (bit 0) of the synthesizer behind `pll`
pub fn pll_lock_field(pll: Pll) -> BitField {
    let addr = match pll {
        Pll::Lo1 => REG_RF1_PLL_SYN_LOCK,
        Pll::Lo2 => REG_RF2_PLL_SYN_LOCK,
        Pll::Aux => REG_AUX_PLL_SYN_LOCK,
        Pll::Clk => REG_CLK_PLL_SYN_LOCK,
        Pll::ClkLowPower => REG_CLK_PLL_LP_SYN_LOCK,
    };
    BitField::new(addr, 0, 1)
}

/// Status nibble owned by `opcode`
pub const fn cmd_status_field(opcode: u8) -> BitField {
    BitField::new(
        REG_ARM_CMD_STATUS_0 + (opcode >> 2) as u16,
        ((opcode >> 1) & 0x01) * 4,
        4,
    )
}

/// Firmware error code carried in bits [3:1] of a status nibble
pub const fn cmd_status_error(nibble: u8) -> u8 {
    (nibble >> 1) & 0x07
}
