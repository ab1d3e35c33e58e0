//! # ARM Mailbox Transport
//!
//! Every configuration and state change rides on the same request/response
//! exchange with the embedded ARM:
//!
//! 1. **SET only**: write the operand block into the SET mailbox in ARM memory
//! 2. Write the extended command bytes (channel mask, object id, selector)
//! 3. Write the opcode, which hands the command to the firmware
//! 4. Poll the opcode's status nibble every `interval` until the pending flag
//!    clears or `timeout` has elapsed
//! 5. **GET only**: read the response block back from the GET mailbox
//!
//! A timeout is reported as [`RadioError::Timeout`] and a completed command with
//! a non-zero firmware code as [`RadioError::CommandFailed`]. HAL failures
//! propagate immediately. Nothing is retried at this layer; the polling window
//! is the only allowance for a slow co-processor.
//!
//! The mailbox is a single shared resource, so only one command may be
//! outstanding per device. The driver's `&mut self` API enforces that.
//!
//! ## Command descriptor
//!
//! ```text
//! SET / GET               opcode | channel mask | object id | [selector]
//! RADIO_ON / RADIO_OFF    opcode | channel mask
//! POWER_UP / POWER_DOWN   opcode | channel mask
//! ```

use crate::config::PollConfig;
use crate::constants::*;
use crate::error::{RadioError, Result};
use crate::logging::{log_payload, PayloadDirection};
use crate::radio::hal::Hal;
use crate::radio::mask::ChannelMask;
use crate::radio::registers::{
    cmd_status_error, cmd_status_field, CMD_STATUS_PENDING, REG_ARM_COMMAND,
    REG_ARM_EXT_CMD_BYTE_1,
};

/// Mailbox opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    RadioOn,
    RadioOff,
    Set,
    Get,
    PowerUp,
    PowerDown,
}

impl Opcode {
    pub fn code(&self) -> u8 {
        match self {
            Opcode::RadioOn => ARM_RADIOON_OPCODE,
            Opcode::RadioOff => ARM_RADIOOFF_OPCODE,
            Opcode::Set => ARM_SET_OPCODE,
            Opcode::Get => ARM_GET_OPCODE,
            Opcode::PowerUp => ARM_POWERUP_OPCODE,
            Opcode::PowerDown => ARM_POWERDOWN_OPCODE,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            ARM_RADIOON_OPCODE => Some(Opcode::RadioOn),
            ARM_RADIOOFF_OPCODE => Some(Opcode::RadioOff),
            ARM_SET_OPCODE => Some(Opcode::Set),
            ARM_GET_OPCODE => Some(Opcode::Get),
            ARM_POWERUP_OPCODE => Some(Opcode::PowerUp),
            ARM_POWERDOWN_OPCODE => Some(Opcode::PowerDown),
            _ => None,
        }
    }
}

/// Parameter families addressed by SET/GET
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectId {
    ChannelCarrierFrequency,
    PllLoopFilter,
    TddTimingParams,
}

impl ObjectId {
    pub fn code(&self) -> u8 {
        match self {
            ObjectId::ChannelCarrierFrequency => ARM_OBJECTID_CHANNEL_CARRIER_FREQUENCY,
            ObjectId::PllLoopFilter => ARM_OBJECTID_PLL_LOOPFILTER,
            ObjectId::TddTimingParams => ARM_OBJECTID_TDD_TIMING_PARAMS,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            ARM_OBJECTID_CHANNEL_CARRIER_FREQUENCY => Some(ObjectId::ChannelCarrierFrequency),
            ARM_OBJECTID_PLL_LOOPFILTER => Some(ObjectId::PllLoopFilter),
            ARM_OBJECTID_TDD_TIMING_PARAMS => Some(ObjectId::TddTimingParams),
            _ => None,
        }
    }
}

/// One unit of work for the co-processor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MailboxCommand {
    pub opcode: Opcode,
    pub object_id: Option<ObjectId>,
    pub channel_mask: ChannelMask,
    pub selector: Option<u8>,
}

impl MailboxCommand {
    pub fn set(object_id: ObjectId, channel_mask: ChannelMask) -> Self {
        Self::object(Opcode::Set, object_id, channel_mask)
    }

    pub fn get(object_id: ObjectId, channel_mask: ChannelMask) -> Self {
        Self::object(Opcode::Get, object_id, channel_mask)
    }

    pub fn radio_on(channel_mask: ChannelMask) -> Self {
        Self::channels(Opcode::RadioOn, channel_mask)
    }

    pub fn radio_off(channel_mask: ChannelMask) -> Self {
        Self::channels(Opcode::RadioOff, channel_mask)
    }

    pub fn power_up(channel_mask: ChannelMask) -> Self {
        Self::channels(Opcode::PowerUp, channel_mask)
    }

    pub fn power_down(channel_mask: ChannelMask) -> Self {
        Self::channels(Opcode::PowerDown, channel_mask)
    }

    /// Append a third descriptor byte (PLL selector for loop filter commands)
    pub fn with_selector(mut self, selector: u8) -> Self {
        self.selector = Some(selector);
        self
    }

    fn object(opcode: Opcode, object_id: ObjectId, channel_mask: ChannelMask) -> Self {
        Self {
            opcode,
            object_id: Some(object_id),
            channel_mask,
            selector: None,
        }
    }

    fn channels(opcode: Opcode, channel_mask: ChannelMask) -> Self {
        Self {
            opcode,
            object_id: None,
            channel_mask,
            selector: None,
        }
    }

    /// Object id byte as reported in errors, zero for channel commands
    pub fn object_code(&self) -> u8 {
        self.object_id.map(|o| o.code()).unwrap_or(0)
    }

    /// Bytes written after the opcode
    pub fn ext_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![self.channel_mask.bits()];
        if let Some(object_id) = self.object_id {
            bytes.push(object_id.code());
            if let Some(selector) = self.selector {
                bytes.push(selector);
            }
        }
        bytes
    }
}

/// Write the command descriptor; the opcode goes last
pub fn write_command(hal: &mut impl Hal, cmd: &MailboxCommand) -> Result<()> {
    for (i, byte) in cmd.ext_bytes().iter().enumerate() {
        hal.write_register(REG_ARM_EXT_CMD_BYTE_1 + i as u16, *byte)?;
    }
    hal.write_register(REG_ARM_COMMAND, cmd.opcode.code())?;
    log::debug!(
        "mailbox command {:?} object 0x{:02X} mask {:#04x}",
        cmd.opcode,
        cmd.object_code(),
        cmd.channel_mask.bits()
    );
    Ok(())
}

/// Poll the opcode's status nibble until it clears or the window runs out
///
/// The full window is always consumed before a timeout is reported.
pub fn wait_for_completion(hal: &mut impl Hal, cmd: &MailboxCommand, poll: PollConfig) -> Result<()> {
    let opcode = cmd.opcode.code();
    let field = cmd_status_field(opcode);
    let attempts = poll.attempts();

    for attempt in 1..=attempts {
        let nibble = field.read(hal)?;
        if nibble & CMD_STATUS_PENDING == 0 {
            let code = cmd_status_error(nibble);
            if code != 0 {
                log::error!(
                    "Opcode 0x{opcode:02X} object 0x{:02X} failed with code {code}",
                    cmd.object_code()
                );
                return Err(RadioError::CommandFailed {
                    opcode,
                    object_id: cmd.object_code(),
                    code,
                });
            }
            log::debug!("Opcode 0x{opcode:02X} completed after {attempt} poll(s)");
            return Ok(());
        }
        hal.delay(poll.interval());
    }

    log::error!(
        "Opcode 0x{opcode:02X} object 0x{:02X} still pending after {:?}",
        cmd.object_code(),
        poll.timeout()
    );
    Err(RadioError::Timeout {
        opcode,
        object_id: cmd.object_code(),
        waited: poll.timeout(),
    })
}

/// Issue a command that carries no operands and wait for it
pub fn exec(hal: &mut impl Hal, cmd: &MailboxCommand, poll: PollConfig) -> Result<()> {
    write_command(hal, cmd)?;
    wait_for_completion(hal, cmd, poll)
}

/// SET: stage `payload` in the SET mailbox, then issue and wait
pub fn set(hal: &mut impl Hal, cmd: &MailboxCommand, payload: &[u8], poll: PollConfig) -> Result<()> {
    log_payload(PayloadDirection::Set, cmd.object_code(), payload);
    hal.write_memory(ADDR_ARM_MAILBOX_SET, payload)?;
    exec(hal, cmd, poll)
}

/// GET: issue and wait, then read an `N`-byte response from the GET mailbox
pub fn get<const N: usize>(hal: &mut impl Hal, cmd: &MailboxCommand, poll: PollConfig) -> Result<[u8; N]> {
    exec(hal, cmd, poll)?;
    let mut response = [0u8; N];
    hal.read_memory(ADDR_ARM_MAILBOX_GET, &mut response, true)?;
    log_payload(PayloadDirection::Get, cmd.object_code(), &response);
    Ok(response)
}
