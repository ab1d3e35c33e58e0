//! # Radio Control Types
//!
//! Ports, channels, lifecycle states and the parameter structures carried by the
//! mailbox. Parameter structures are transient command payloads; the device is
//! the system of record for all of them.

use crate::error::RadioError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical signal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Port {
    Rx,
    Tx,
    /// Observation receiver
    ORx,
}

impl Port {
    /// Row of this port in [`RadioState::channel_states`]; ORX has none
    pub fn state_index(&self) -> Option<usize> {
        match self {
            Port::Rx => Some(0),
            Port::Tx => Some(1),
            Port::ORx => None,
        }
    }
}

/// One of the two parallel paths of a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelNumber {
    Channel1,
    Channel2,
}

impl ChannelNumber {
    pub fn index(&self) -> usize {
        match self {
            ChannelNumber::Channel1 => 0,
            ChannelNumber::Channel2 => 1,
        }
    }
}

/// A (port, channel) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId {
    pub port: Port,
    pub channel: ChannelNumber,
}

impl ChannelId {
    pub const RX1: ChannelId = ChannelId::new(Port::Rx, ChannelNumber::Channel1);
    pub const RX2: ChannelId = ChannelId::new(Port::Rx, ChannelNumber::Channel2);
    pub const TX1: ChannelId = ChannelId::new(Port::Tx, ChannelNumber::Channel1);
    pub const TX2: ChannelId = ChannelId::new(Port::Tx, ChannelNumber::Channel2);
    pub const ORX1: ChannelId = ChannelId::new(Port::ORx, ChannelNumber::Channel1);
    pub const ORX2: ChannelId = ChannelId::new(Port::ORx, ChannelNumber::Channel2);

    pub const fn new(port: Port, channel: ChannelNumber) -> Self {
        Self { port, channel }
    }

    /// The receive channel sharing this channel's number
    pub fn paired_rx(&self) -> ChannelId {
        ChannelId::new(Port::Rx, self.channel)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let port = match self.port {
            Port::Rx => "RX",
            Port::Tx => "TX",
            Port::ORx => "ORX",
        };
        write!(f, "{port}{}", self.channel.index() + 1)
    }
}

/// Lifecycle stage of one channel, ordered
///
/// Legal adjacent moves are STANDBY↔CALIBRATED (init calibrations, not handled
/// here), CALIBRATED↔PRIMED and PRIMED↔RF_ENABLED.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum ChannelState {
    #[default]
    Standby = 0,
    Calibrated = 1,
    Primed = 2,
    RfEnabled = 3,
}

impl ChannelState {
    /// Decode a 2-bit state field; every value is defined
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => ChannelState::Standby,
            1 => ChannelState::Calibrated,
            2 => ChannelState::Primed,
            _ => ChannelState::RfEnabled,
        }
    }

    pub fn bits(&self) -> u8 {
        *self as u8
    }
}

/// Snapshot of both ARM status registers
///
/// Computed fresh on every query; never cached by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioState {
    pub system_state: u8,
    pub monitor_mode_state: u8,
    pub boot_state: u8,
    /// `[port][channel]`, port 0 = RX, port 1 = TX
    pub channel_states: [[ChannelState; 2]; 2],
}

impl RadioState {
    /// State of one channel, `None` for ORX
    pub fn channel(&self, id: ChannelId) -> Option<ChannelState> {
        id.port
            .state_index()
            .map(|p| self.channel_states[p][id.channel.index()])
    }
}

/// Who drives a channel's enable: SPI register writes or the enable pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelEnableMode {
    Spi = 0,
    Pin = 1,
}

impl From<u8> for ChannelEnableMode {
    fn from(bit: u8) -> Self {
        if bit & 0x01 == 0 {
            ChannelEnableMode::Spi
        } else {
            ChannelEnableMode::Pin
        }
    }
}

/// Synthesizers whose lock status can be queried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pll {
    Lo1 = 0,
    Lo2 = 1,
    Aux = 2,
    Clk = 3,
    ClkLowPower = 4,
}

impl Pll {
    /// Only the RF and auxiliary synthesizers have a configurable loop filter
    pub fn has_loop_filter(&self) -> bool {
        matches!(self, Pll::Lo1 | Pll::Lo2 | Pll::Aux)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PllCalibration {
    #[default]
    Normal = 0,
    Fast = 1,
    Reserved = 2,
}

impl TryFrom<u8> for PllCalibration {
    type Error = RadioError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PllCalibration::Normal),
            1 => Ok(PllCalibration::Fast),
            2 => Ok(PllCalibration::Reserved),
            _ => Err(RadioError::InvalidResponse {
                field: "pll_calibration",
                value: value as u64,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoGenOptimization {
    #[default]
    PhaseNoise = 0,
    PowerConsumption = 1,
}

impl TryFrom<u8> for LoGenOptimization {
    type Error = RadioError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LoGenOptimization::PhaseNoise),
            1 => Ok(LoGenOptimization::PowerConsumption),
            _ => Err(RadioError::InvalidResponse {
                field: "lo_gen_optimization",
                value: value as u64,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PllPower {
    Low = 0,
    #[default]
    Medium = 1,
    High = 2,
}

impl TryFrom<u8> for PllPower {
    type Error = RadioError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PllPower::Low),
            1 => Ok(PllPower::Medium),
            2 => Ok(PllPower::High),
            _ => Err(RadioError::InvalidResponse {
                field: "pll_power",
                value: value as u64,
            }),
        }
    }
}

/// Carrier configuration of one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Carrier {
    /// 30 MHz to 6 GHz
    pub carrier_frequency_hz: u64,
    /// 0 (disabled) or 200 kHz to 20 MHz; RX only
    pub intermediate_frequency_hz: u32,
    pub pll_calibration: PllCalibration,
    pub lo_gen_optimization: LoGenOptimization,
    pub pll_power: PllPower,
}

/// PLL loop filter settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PllLoopFilterConfig {
    /// 40 to 85 degrees
    pub phase_margin_degrees: u8,
    /// 50 to 1500 kHz
    pub loop_bandwidth_khz: u16,
    /// 0 to 10
    pub power_scale: u8,
    /// Reported by the device on read, ignored on write
    pub effective_loop_bandwidth_khz: u16,
}

/// TDD enablement timing of one channel, all 24-bit counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelEnablementDelays {
    pub rise_to_on_delay: u32,
    pub rise_to_analog_on_delay: u32,
    pub fall_to_off_delay: u32,
    pub guard_delay: u32,
    pub hold_delay: u32,
}
