//! # ADRV9001 Channel State Machine
//!
//! [`Adrv9001Driver`] is the session handle for one transceiver. It owns the
//! [`Hal`] and the [`RadioConfig`], and every operation takes `&mut self`, so
//! the borrow checker enforces the one-outstanding-command rule of the ARM
//! mailbox. Hosts that share a device between threads wrap the driver in a
//! `Mutex`.
//!
//! ## Channel lifecycle
//!
//! ```text
//!            init cals            prime              enable RF
//! STANDBY  ───────────►  CALIBRATED ───────►  PRIMED  ─────────►  RF_ENABLED
//!          ◄───────────             ◄───────          ◄─────────
//!            (external)            un-prime            disable RF
//! ```
//!
//! Only adjacent moves are legal. The driver never caches channel state: every
//! decision is made on a fresh read of the ARM status registers.
//!
//! - Prime/un-prime and power up/down go through the mailbox as a single
//!   command covering the whole batch.
//! - RF enable/disable is a direct register write per channel and never
//!   touches the mailbox.
//! - Batches are validated completely before any device write. One offending
//!   channel fails the whole batch.
//!
//! ## Usage Example
//!
//! ```rust
//! use adrv9001_radio::radio::driver::Adrv9001Driver;
//! use adrv9001_radio::radio::types::{ChannelId, ChannelState};
//! use adrv9001_radio::sim::SimulatedDevice;
//!
//! let mut device = SimulatedDevice::new();
//! device.set_channel_state(ChannelId::RX1, ChannelState::Calibrated);
//!
//! let mut driver = Adrv9001Driver::new(device);
//! driver.channel_to_state(ChannelId::RX1, ChannelState::RfEnabled)?;
//! assert_eq!(driver.channel_state_get(ChannelId::RX1)?, ChannelState::RfEnabled);
//! # Ok::<(), adrv9001_radio::RadioError>(())
//! ```

use crate::config::RadioConfig;
use crate::error::{RadioError, Result};
use crate::radio::errata;
use crate::radio::hal::Hal;
use crate::radio::mailbox::{self, MailboxCommand};
use crate::radio::mask::ChannelMask;
use crate::radio::registers::{
    channel_state_field, enable_field, BOOT_STATE, MONITOR_MODE_STATE, REG_ARM_CMD_STATUS_8,
    REG_ARM_CMD_STATUS_9, RX1_CHANNEL_STATE, RX2_CHANNEL_STATE, SYSTEM_STATE, TX1_CHANNEL_STATE,
    TX2_CHANNEL_STATE,
};
use crate::radio::types::{ChannelEnableMode, ChannelId, ChannelState, Port, RadioState};

/// Driver for one ADRV9001 transceiver
pub struct Adrv9001Driver<H: Hal> {
    pub(crate) hal: H,
    pub(crate) config: RadioConfig,
}

impl<H: Hal> Adrv9001Driver<H> {
    /// Create a driver with the default polling windows and retry budgets
    pub fn new(hal: H) -> Self {
        Self::with_config(hal, RadioConfig::default())
    }

    pub fn with_config(hal: H, config: RadioConfig) -> Self {
        Self { hal, config }
    }

    pub fn config(&self) -> &RadioConfig {
        &self.config
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    // ============================== STATE QUERIES ==============================

    /// Read both status registers
    ///
    /// Two register reads: system/monitor/boot first, then the packed
    /// channel states.
    pub fn radio_state_get(&mut self) -> Result<RadioState> {
        let status_8 = self.hal.read_register(REG_ARM_CMD_STATUS_8)?;
        let status_9 = self.hal.read_register(REG_ARM_CMD_STATUS_9)?;

        let state = RadioState {
            system_state: SYSTEM_STATE.extract(status_8),
            monitor_mode_state: MONITOR_MODE_STATE.extract(status_8),
            boot_state: BOOT_STATE.extract(status_8),
            channel_states: [
                [
                    ChannelState::from_bits(RX1_CHANNEL_STATE.extract(status_9)),
                    ChannelState::from_bits(RX2_CHANNEL_STATE.extract(status_9)),
                ],
                [
                    ChannelState::from_bits(TX1_CHANNEL_STATE.extract(status_9)),
                    ChannelState::from_bits(TX2_CHANNEL_STATE.extract(status_9)),
                ],
            ],
        };
        log::debug!("Radio state: {:?}", state.channel_states);
        Ok(state)
    }

    /// Current state of one RX or TX channel
    pub fn channel_state_get(&mut self, channel: ChannelId) -> Result<ChannelState> {
        let field = channel_state_field(channel.port, channel.channel).ok_or_else(|| {
            RadioError::InvalidParameter(format!("{channel} does not report a channel state"))
        })?;
        Ok(ChannelState::from_bits(field.read(&mut self.hal)?))
    }

    // ============================ BATCH TRANSITIONS ============================

    /// Prime (CALIBRATED → PRIMED) or un-prime (PRIMED → CALIBRATED) a batch
    ///
    /// Every channel must be in the exact starting state; channels that are
    /// already at the target are rejected like any other. One RADIO_ON or
    /// RADIO_OFF command covers the whole batch.
    pub fn channels_prime(&mut self, channels: &[ChannelId], prime: bool) -> Result<()> {
        validate_batch(channels)?;

        let (required, expected) = if prime {
            (ChannelState::Calibrated, "CALIBRATED to prime")
        } else {
            (ChannelState::Primed, "PRIMED to un-prime")
        };
        let state = self.radio_state_get()?;
        require_state(&state, channels, &[required], expected)?;

        let mask = ChannelMask::from_channels(channels);
        let cmd = if prime {
            MailboxCommand::radio_on(mask)
        } else {
            MailboxCommand::radio_off(mask)
        };
        mailbox::exec(&mut self.hal, &cmd, self.config.timeouts.radio_on_off)?;

        log::info!(
            "{} {}",
            if prime { "Primed" } else { "Un-primed" },
            display_batch(channels)
        );

        if prime && self.config.errata.rx_recapture_after_prime {
            errata::recapture_rx_after_prime(self, channels)?;
        }
        Ok(())
    }

    /// Enable (PRIMED → RF_ENABLED) or disable (RF_ENABLED → PRIMED) RF
    ///
    /// Every channel must be under SPI control and in the required state
    /// before the first enable bit is written.
    pub fn channels_enable_rf(&mut self, channels: &[ChannelId], enable: bool) -> Result<()> {
        validate_batch(channels)?;

        let (required, expected) = if enable {
            (ChannelState::Primed, "PRIMED to enable RF")
        } else {
            (ChannelState::RfEnabled, "RF_ENABLED to disable RF")
        };
        let state = self.radio_state_get()?;
        for &channel in channels {
            let mode = self.channel_enable_mode_get(channel)?;
            if mode != ChannelEnableMode::Spi {
                return Err(RadioError::EnableModeMismatch { channel, mode });
            }
            require_state(&state, &[channel], &[required], expected)?;
        }

        for channel in channels {
            enable_field(channel.port, channel.channel).write(&mut self.hal, enable as u8)?;
        }

        log::info!(
            "RF {} on {}",
            if enable { "enabled" } else { "disabled" },
            display_batch(channels)
        );
        Ok(())
    }

    /// Power down a batch of CALIBRATED channels
    pub fn channels_power_down(&mut self, channels: &[ChannelId]) -> Result<()> {
        validate_batch(channels)?;
        let state = self.radio_state_get()?;
        require_state(
            &state,
            channels,
            &[ChannelState::Calibrated],
            "CALIBRATED to power down",
        )?;

        let cmd = MailboxCommand::power_down(ChannelMask::from_channels(channels));
        mailbox::exec(&mut self.hal, &cmd, self.config.timeouts.radio_on_off)?;
        log::info!("Powered down {}", display_batch(channels));
        Ok(())
    }

    pub fn channels_power_up(&mut self, channels: &[ChannelId]) -> Result<()> {
        validate_batch(channels)?;

        let cmd = MailboxCommand::power_up(ChannelMask::from_channels(channels));
        mailbox::exec(&mut self.hal, &cmd, self.config.timeouts.radio_on_off)?;
        log::info!("Powered up {}", display_batch(channels));
        Ok(())
    }

    pub fn channel_prime(&mut self, channel: ChannelId, prime: bool) -> Result<()> {
        self.channels_prime(&[channel], prime)
    }

    pub fn channel_enable_rf(&mut self, channel: ChannelId, enable: bool) -> Result<()> {
        self.channels_enable_rf(&[channel], enable)
    }

    pub fn channel_power_down(&mut self, channel: ChannelId) -> Result<()> {
        self.channels_power_down(&[channel])
    }

    pub fn channel_power_up(&mut self, channel: ChannelId) -> Result<()> {
        self.channels_power_up(&[channel])
    }

    /// Clear RF enable, then watch the status register until the channel
    /// reports PRIMED
    ///
    /// Reads the radio state at most `tries` times, one default poll interval
    /// apart. Running out of tries means the ARM lost track of the channel and
    /// the module must be reset.
    pub fn disable_rf_and_wait(&mut self, channel: ChannelId, tries: u8) -> Result<()> {
        self.channels_enable_rf(&[channel], false)?;

        let interval = self.config.timeouts.default.interval();
        for attempt in 1..=tries {
            if self.radio_state_get()?.channel(channel) == Some(ChannelState::Primed) {
                log::debug!("{channel} back in PRIMED after {attempt} read(s)");
                return Ok(());
            }
            if attempt < tries {
                log::warn!("{channel} not yet PRIMED after disabling RF (read {attempt}/{tries})");
                self.hal.delay(interval);
            }
        }

        log::error!("{channel} did not return to PRIMED after {tries} reads, module reset required");
        Err(RadioError::RetriesExhausted { channel, tries })
    }

    // =========================== TARGETED TRANSITIONS ==========================

    /// Walk one channel to `target` with the fewest primitive steps
    ///
    /// A channel already at `target` is left alone. STANDBY is not a valid
    /// target, and a channel in STANDBY must be calibrated before it can move.
    pub fn channel_to_state(&mut self, channel: ChannelId, target: ChannelState) -> Result<()> {
        require_rx_tx(channel)?;
        match target {
            ChannelState::Standby => Err(RadioError::InvalidParameter(format!(
                "{channel} cannot be moved to STANDBY, target must be CALIBRATED or above"
            ))),
            ChannelState::Calibrated => self.channel_to_calibrated(channel),
            ChannelState::Primed => self.channel_to_primed(channel),
            ChannelState::RfEnabled => self.channel_to_rf_enabled(channel),
        }
    }

    pub fn channel_to_calibrated(&mut self, channel: ChannelId) -> Result<()> {
        match self.current_state(channel)? {
            ChannelState::Standby => Err(standby_error(channel)),
            ChannelState::Calibrated => Ok(()),
            ChannelState::Primed => self.channel_prime(channel, false),
            ChannelState::RfEnabled => {
                let tries = self.config.disable_rf_tries_to_calibrated;
                self.disable_rf_and_wait(channel, tries)?;
                self.channel_prime(channel, false)
            }
        }
    }

    pub fn channel_to_primed(&mut self, channel: ChannelId) -> Result<()> {
        match self.current_state(channel)? {
            ChannelState::Standby => Err(standby_error(channel)),
            ChannelState::Calibrated => self.channel_prime(channel, true),
            ChannelState::Primed => Ok(()),
            ChannelState::RfEnabled => {
                let tries = self.config.disable_rf_tries_to_primed;
                self.disable_rf_and_wait(channel, tries)
            }
        }
    }

    pub fn channel_to_rf_enabled(&mut self, channel: ChannelId) -> Result<()> {
        match self.current_state(channel)? {
            ChannelState::Standby => Err(standby_error(channel)),
            ChannelState::Calibrated => {
                self.channel_prime(channel, true)?;
                self.channel_enable_rf(channel, true)
            }
            ChannelState::Primed => self.channel_enable_rf(channel, true),
            ChannelState::RfEnabled => Ok(()),
        }
    }

    fn current_state(&mut self, channel: ChannelId) -> Result<ChannelState> {
        require_rx_tx(channel)?;
        let state = self.radio_state_get()?;
        state.channel(channel).ok_or_else(|| {
            RadioError::InvalidParameter(format!("{channel} does not report a channel state"))
        })
    }
}

/// Non-empty, RX/TX only, no channel listed twice
pub(crate) fn validate_batch(channels: &[ChannelId]) -> Result<()> {
    if channels.is_empty() {
        return Err(RadioError::InvalidParameter(
            "channel batch is empty".to_string(),
        ));
    }
    for (i, channel) in channels.iter().enumerate() {
        require_rx_tx(*channel)?;
        if channels[..i].contains(channel) {
            return Err(RadioError::InvalidParameter(format!(
                "{channel} listed more than once"
            )));
        }
    }
    Ok(())
}

pub(crate) fn require_rx_tx(channel: ChannelId) -> Result<()> {
    match channel.port {
        Port::Rx | Port::Tx => Ok(()),
        Port::ORx => Err(RadioError::InvalidParameter(format!(
            "{channel}: only RX and TX channels are supported"
        ))),
    }
}

/// Fail on the first channel whose state is not in `allowed`
pub(crate) fn require_state(
    state: &RadioState,
    channels: &[ChannelId],
    allowed: &[ChannelState],
    expected: &'static str,
) -> Result<()> {
    for &channel in channels {
        let actual = state.channel(channel).ok_or_else(|| {
            RadioError::InvalidParameter(format!("{channel} does not report a channel state"))
        })?;
        if !allowed.contains(&actual) {
            log::error!("{channel} is {actual:?}, must be {expected}");
            return Err(RadioError::InvalidState {
                channel,
                actual,
                expected,
            });
        }
    }
    Ok(())
}

fn standby_error(channel: ChannelId) -> RadioError {
    RadioError::InvalidState {
        channel,
        actual: ChannelState::Standby,
        expected: "CALIBRATED or above, run init calibrations first",
    }
}

fn display_batch(channels: &[ChannelId]) -> String {
    channels
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_rejects_empty_and_duplicates() {
        assert!(matches!(validate_batch(&[]), Err(RadioError::InvalidParameter(_))));
        assert!(matches!(
            validate_batch(&[ChannelId::TX1, ChannelId::RX1, ChannelId::TX1]),
            Err(RadioError::InvalidParameter(_))
        ));
        assert!(validate_batch(&[ChannelId::TX1, ChannelId::RX1]).is_ok());
    }

    #[test]
    fn test_batch_rejects_orx() {
        assert!(matches!(
            validate_batch(&[ChannelId::RX1, ChannelId::ORX2]),
            Err(RadioError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_require_state_reports_first_offender() {
        let state = RadioState {
            system_state: 0,
            monitor_mode_state: 0,
            boot_state: 0,
            channel_states: [
                [ChannelState::Calibrated, ChannelState::Primed],
                [ChannelState::Standby, ChannelState::Calibrated],
            ],
        };
        let err = require_state(
            &state,
            &[ChannelId::RX1, ChannelId::RX2, ChannelId::TX1],
            &[ChannelState::Calibrated],
            "CALIBRATED",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RadioError::InvalidState {
                channel: ChannelId::RX2,
                actual: ChannelState::Primed,
                ..
            }
        ));
    }
}
