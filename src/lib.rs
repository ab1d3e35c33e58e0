//! # adrv9001-radio - Radio Control for the ADRV9001 Transceiver
//!
//! The adrv9001-radio crate drives the radio front-end of an ADRV9001-class RF
//! transceiver. It moves RX and TX channels through their power/RF lifecycle and
//! configures carrier, PLL loop filter and TDD enablement timing by exchanging
//! fixed-layout payloads with the transceiver's embedded ARM over its mailbox.
//!
//! ## Features
//!
//! - Channel state machine (STANDBY, CALIBRATED, PRIMED, RF_ENABLED) with strict
//!   precondition checks and all-or-nothing batch transitions
//! - Bounded-polling mailbox transport with per-command timeouts
//! - Carrier, PLL loop filter, enablement delay, PLL lock and enable mode services
//! - Isolated workaround for the RX capture firmware defect
//! - Hardware abstraction through the [`Hal`] trait, plus a register-level
//!   [`sim::SimulatedDevice`] for tests and tooling
//! - JSON-loadable timing configuration and `log`-based diagnostics
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! adrv9001-radio = "1.0.0"
//! ```
//!
//! ```rust
//! use adrv9001_radio::{Adrv9001Driver, Carrier, ChannelId, ChannelState};
//! use adrv9001_radio::sim::SimulatedDevice;
//!
//! let mut driver = Adrv9001Driver::new(SimulatedDevice::calibrated());
//!
//! let carrier = Carrier {
//!     carrier_frequency_hz: 2_450_000_000,
//!     ..Default::default()
//! };
//! driver.carrier_configure(ChannelId::TX1, &carrier)?;
//! driver.channel_to_state(ChannelId::TX1, ChannelState::RfEnabled)?;
//!
//! assert_eq!(driver.carrier_inspect(ChannelId::TX1)?, carrier);
//! # Ok::<(), adrv9001_radio::RadioError>(())
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod radio;
pub mod sim;
pub mod util;

pub use crate::config::{CommandTimeouts, ConfigError, ErrataConfig, PollConfig, RadioConfig};
pub use crate::error::{RadioError, Result};
pub use crate::logging::init_logger;

pub use radio::{
    Adrv9001Driver, Carrier, ChannelEnableMode, ChannelEnablementDelays, ChannelId, ChannelMask,
    ChannelNumber, ChannelState, GpioPin, GpioSignal, Hal, HalError, LoGenOptimization, Pll,
    PllCalibration, PllLoopFilterConfig, PllPower, Port, RadioState,
};
