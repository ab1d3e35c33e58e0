//! # Parameter Services
//!
//! Get/set operations for per-channel and per-PLL parameters. Each follows the
//! same shape:
//!
//! 1. Check ranges (no device I/O yet)
//! 2. Check the channel state precondition against a fresh status read
//! 3. Serialize into a fixed-size payload with [`crate::radio::codec`]
//! 4. Run a mailbox SET or GET with the object's own polling window
//!
//! ## Payload layouts (little-endian)
//!
//! ```text
//! Carrier (16)          u64 carrier Hz | u8 cal | u8 0 | u8 LO opt | u8 PLL power | u32 IF Hz
//! Loop filter SET (4)   u8 phase margin | u16 bandwidth kHz | u8 power scale
//! Loop filter GET (6)   SET layout | u16 effective bandwidth kHz
//! TDD timing (20)       u32 rise-to-on | rise-to-analog-on | fall-to-off | guard | hold
//! ```

use crate::constants::*;
use crate::error::{check_range, RadioError, Result};
use crate::radio::codec::{load_u16, load_u32, load_u64, parse_u16, parse_u32, parse_u64};
use crate::radio::driver::{require_rx_tx, Adrv9001Driver};
use crate::radio::hal::{GpioSignal, Hal};
use crate::radio::mailbox::{self, MailboxCommand, ObjectId};
use crate::radio::mask::ChannelMask;
use crate::radio::registers::{pin_mode_field, pll_lock_field};
use crate::radio::types::{
    Carrier, ChannelEnableMode, ChannelEnablementDelays, ChannelId, ChannelNumber, ChannelState,
    LoGenOptimization, Pll, PllCalibration, PllLoopFilterConfig, PllPower, Port,
};

impl<H: Hal> Adrv9001Driver<H> {
    // ================================ CARRIER =================================

    /// Program the carrier of one channel
    ///
    /// The channel must be in STANDBY or CALIBRATED. An intermediate frequency
    /// of zero disables the IF stage.
    pub fn carrier_configure(&mut self, channel: ChannelId, carrier: &Carrier) -> Result<()> {
        require_rx_tx(channel)?;
        check_range(
            "carrier_frequency_hz",
            carrier.carrier_frequency_hz,
            CARRIER_FREQUENCY_MIN_HZ,
            CARRIER_FREQUENCY_MAX_HZ,
        )?;
        if carrier.intermediate_frequency_hz != 0 {
            check_range(
                "intermediate_frequency_hz",
                carrier.intermediate_frequency_hz as u64,
                INTERMEDIATE_FREQUENCY_MIN_HZ as u64,
                INTERMEDIATE_FREQUENCY_MAX_HZ as u64,
            )?;
        }
        self.require_channel_state(
            channel,
            &[ChannelState::Standby, ChannelState::Calibrated],
            "STANDBY or CALIBRATED to configure the carrier",
        )?;

        let payload = encode_carrier(carrier);
        let cmd = MailboxCommand::set(
            ObjectId::ChannelCarrierFrequency,
            ChannelMask::from_channel(channel),
        );
        mailbox::set(&mut self.hal, &cmd, &payload, self.config.timeouts.carrier_set)?;

        log::info!(
            "{channel} carrier set to {} Hz (IF {} Hz)",
            carrier.carrier_frequency_hz,
            carrier.intermediate_frequency_hz
        );
        Ok(())
    }

    /// Read back the carrier of one channel
    ///
    /// Only receivers have an intermediate frequency; it reads as zero on
    /// every other port.
    pub fn carrier_inspect(&mut self, channel: ChannelId) -> Result<Carrier> {
        let cmd = MailboxCommand::get(
            ObjectId::ChannelCarrierFrequency,
            ChannelMask::from_channel(channel),
        );
        let payload: [u8; CARRIER_PAYLOAD_LEN] =
            mailbox::get(&mut self.hal, &cmd, self.config.timeouts.carrier_get)?;
        decode_carrier(&payload, channel.port)
    }

    // ============================== LOOP FILTER ===============================

    pub fn pll_loop_filter_set(&mut self, pll: Pll, config: &PllLoopFilterConfig) -> Result<()> {
        require_loop_filter(pll)?;
        check_range(
            "phase_margin_degrees",
            config.phase_margin_degrees as u64,
            LOOP_FILTER_PHASE_MARGIN_MIN_DEGREES as u64,
            LOOP_FILTER_PHASE_MARGIN_MAX_DEGREES as u64,
        )?;
        check_range(
            "loop_bandwidth_khz",
            config.loop_bandwidth_khz as u64,
            LOOP_FILTER_BANDWIDTH_MIN_KHZ as u64,
            LOOP_FILTER_BANDWIDTH_MAX_KHZ as u64,
        )?;
        check_range(
            "power_scale",
            config.power_scale as u64,
            0,
            LOOP_FILTER_POWER_SCALE_MAX as u64,
        )?;

        let mut payload = [0u8; LOOP_FILTER_SET_PAYLOAD_LEN];
        let mut offset = 0;
        payload[offset] = config.phase_margin_degrees;
        offset += 1;
        load_u16(&mut offset, &mut payload, config.loop_bandwidth_khz);
        payload[offset] = config.power_scale;

        let cmd = MailboxCommand::set(ObjectId::PllLoopFilter, ChannelMask::empty())
            .with_selector(pll as u8);
        mailbox::set(&mut self.hal, &cmd, &payload, self.config.timeouts.loop_filter_set)?;
        log::info!(
            "{pll:?} loop filter set: {} deg, {} kHz, scale {}",
            config.phase_margin_degrees,
            config.loop_bandwidth_khz,
            config.power_scale
        );
        Ok(())
    }

    /// Read a loop filter, including the bandwidth the device actually achieved
    pub fn pll_loop_filter_get(&mut self, pll: Pll) -> Result<PllLoopFilterConfig> {
        require_loop_filter(pll)?;
        let cmd = MailboxCommand::get(ObjectId::PllLoopFilter, ChannelMask::empty())
            .with_selector(pll as u8);
        let payload: [u8; LOOP_FILTER_GET_PAYLOAD_LEN] =
            mailbox::get(&mut self.hal, &cmd, self.config.timeouts.loop_filter_get)?;

        let mut offset = 1;
        let loop_bandwidth_khz = parse_u16(&mut offset, &payload);
        let power_scale = payload[offset];
        offset += 1;
        Ok(PllLoopFilterConfig {
            phase_margin_degrees: payload[0],
            loop_bandwidth_khz,
            power_scale,
            effective_loop_bandwidth_khz: parse_u16(&mut offset, &payload),
        })
    }

    // ========================= ENABLEMENT DELAYS (TDD) ========================

    /// Program the TDD enablement timing of one channel
    ///
    /// TX channels must release no later than they fall to off
    /// (`hold <= fall_to_off`); RX channels the other way round. When the
    /// channel's external front-end control signal is routed to a pin, the
    /// analog path must come up no later than the channel itself.
    pub fn channel_enablement_delays_configure(
        &mut self,
        channel: ChannelId,
        delays: &ChannelEnablementDelays,
    ) -> Result<()> {
        require_rx_tx(channel)?;
        for (name, value) in [
            ("rise_to_on_delay", delays.rise_to_on_delay),
            ("rise_to_analog_on_delay", delays.rise_to_analog_on_delay),
            ("fall_to_off_delay", delays.fall_to_off_delay),
            ("guard_delay", delays.guard_delay),
            ("hold_delay", delays.hold_delay),
        ] {
            check_range(name, value as u64, 0, ENABLEMENT_DELAY_MAX as u64)?;
        }
        match channel.port {
            Port::Tx => check_range(
                "hold_delay",
                delays.hold_delay as u64,
                0,
                delays.fall_to_off_delay as u64,
            )?,
            _ => check_range(
                "fall_to_off_delay",
                delays.fall_to_off_delay as u64,
                0,
                delays.hold_delay as u64,
            )?,
        }

        if let Some(signal) = frontend_control_signal(channel) {
            if self.hal.gpio_inspect(signal)?.is_assigned() {
                check_range(
                    "rise_to_analog_on_delay",
                    delays.rise_to_analog_on_delay as u64,
                    0,
                    delays.rise_to_on_delay as u64,
                )?;
            }
        }
        self.require_channel_state(
            channel,
            &[ChannelState::Standby, ChannelState::Calibrated],
            "STANDBY or CALIBRATED to configure enablement delays",
        )?;

        let mut payload = [0u8; ENABLEMENT_DELAYS_PAYLOAD_LEN];
        let mut offset = 0;
        load_u32(&mut offset, &mut payload, delays.rise_to_on_delay);
        load_u32(&mut offset, &mut payload, delays.rise_to_analog_on_delay);
        load_u32(&mut offset, &mut payload, delays.fall_to_off_delay);
        load_u32(&mut offset, &mut payload, delays.guard_delay);
        load_u32(&mut offset, &mut payload, delays.hold_delay);

        let cmd = MailboxCommand::set(ObjectId::TddTimingParams, ChannelMask::from_channel(channel));
        mailbox::set(&mut self.hal, &cmd, &payload, self.config.timeouts.default)?;
        log::info!("{channel} enablement delays configured");
        Ok(())
    }

    /// Read back the TDD enablement timing; the channel must be PRIMED or RF_ENABLED
    pub fn channel_enablement_delays_inspect(
        &mut self,
        channel: ChannelId,
    ) -> Result<ChannelEnablementDelays> {
        require_rx_tx(channel)?;
        self.require_channel_state(
            channel,
            &[ChannelState::Primed, ChannelState::RfEnabled],
            "PRIMED or RF_ENABLED to inspect enablement delays",
        )?;

        let cmd = MailboxCommand::get(ObjectId::TddTimingParams, ChannelMask::from_channel(channel));
        let payload: [u8; ENABLEMENT_DELAYS_PAYLOAD_LEN] =
            mailbox::get(&mut self.hal, &cmd, self.config.timeouts.default)?;

        let mut offset = 0;
        Ok(ChannelEnablementDelays {
            rise_to_on_delay: parse_u32(&mut offset, &payload),
            rise_to_analog_on_delay: parse_u32(&mut offset, &payload),
            fall_to_off_delay: parse_u32(&mut offset, &payload),
            guard_delay: parse_u32(&mut offset, &payload),
            hold_delay: parse_u32(&mut offset, &payload),
        })
    }

    // ============================ REGISTER-ONLY ===============================

    /// Synthesizer lock indicator; a plain register read
    pub fn pll_status_get(&mut self, pll: Pll) -> Result<bool> {
        let locked = pll_lock_field(pll).read(&mut self.hal)? != 0;
        log::debug!("{pll:?} locked: {locked}");
        Ok(locked)
    }

    pub fn channel_enable_mode_set(&mut self, channel: ChannelId, mode: ChannelEnableMode) -> Result<()> {
        let field = pin_mode_field(channel.port, channel.channel)
            .ok_or_else(|| no_enable_mode(channel))?;
        field.write(&mut self.hal, mode as u8)?;
        log::debug!("{channel} enable mode set to {mode:?}");
        Ok(())
    }

    pub fn channel_enable_mode_get(&mut self, channel: ChannelId) -> Result<ChannelEnableMode> {
        let field = pin_mode_field(channel.port, channel.channel)
            .ok_or_else(|| no_enable_mode(channel))?;
        Ok(ChannelEnableMode::from(field.read(&mut self.hal)?))
    }

    fn require_channel_state(
        &mut self,
        channel: ChannelId,
        allowed: &[ChannelState],
        expected: &'static str,
    ) -> Result<()> {
        let actual = self.channel_state_get(channel)?;
        if !allowed.contains(&actual) {
            log::error!("{channel} is {actual:?}, must be {expected}");
            return Err(RadioError::InvalidState {
                channel,
                actual,
                expected,
            });
        }
        Ok(())
    }
}

pub(crate) fn encode_carrier(carrier: &Carrier) -> [u8; CARRIER_PAYLOAD_LEN] {
    let mut payload = [0u8; CARRIER_PAYLOAD_LEN];
    let mut offset = 0;
    load_u64(&mut offset, &mut payload, carrier.carrier_frequency_hz);
    payload[8] = carrier.pll_calibration as u8;
    payload[9] = 0;
    payload[10] = carrier.lo_gen_optimization as u8;
    payload[11] = carrier.pll_power as u8;
    offset = 12;
    load_u32(&mut offset, &mut payload, carrier.intermediate_frequency_hz);
    payload
}

pub(crate) fn decode_carrier(payload: &[u8; CARRIER_PAYLOAD_LEN], port: Port) -> Result<Carrier> {
    let mut offset = 0;
    let carrier_frequency_hz = parse_u64(&mut offset, payload);
    let mut offset = 12;
    let intermediate_frequency_hz = match port {
        Port::Rx => parse_u32(&mut offset, payload),
        _ => 0,
    };
    Ok(Carrier {
        carrier_frequency_hz,
        intermediate_frequency_hz,
        pll_calibration: PllCalibration::try_from(payload[8])?,
        lo_gen_optimization: LoGenOptimization::try_from(payload[10])?,
        pll_power: PllPower::try_from(payload[11])?,
    })
}

fn require_loop_filter(pll: Pll) -> Result<()> {
    if !pll.has_loop_filter() {
        return Err(RadioError::InvalidParameter(format!(
            "{pll:?} has no configurable loop filter"
        )));
    }
    Ok(())
}

fn no_enable_mode(channel: ChannelId) -> RadioError {
    RadioError::InvalidParameter(format!("{channel} has no enable mode"))
}

/// External front-end control signal of an RX or TX channel
fn frontend_control_signal(channel: ChannelId) -> Option<GpioSignal> {
    match (channel.port, channel.channel) {
        (Port::Rx, ChannelNumber::Channel1) => Some(GpioSignal::Rx1ExtFrontendControl),
        (Port::Rx, ChannelNumber::Channel2) => Some(GpioSignal::Rx2ExtFrontendControl),
        (Port::Tx, ChannelNumber::Channel1) => Some(GpioSignal::Tx1ExtFrontendControl),
        (Port::Tx, ChannelNumber::Channel2) => Some(GpioSignal::Tx2ExtFrontendControl),
        (Port::ORx, _) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carrier_layout() {
        let carrier = Carrier {
            carrier_frequency_hz: 2_400_000_000,
            intermediate_frequency_hz: 490_000,
            pll_calibration: PllCalibration::Fast,
            lo_gen_optimization: LoGenOptimization::PowerConsumption,
            pll_power: PllPower::High,
        };
        let payload = encode_carrier(&carrier);
        assert_eq!(&payload[..8], &2_400_000_000u64.to_le_bytes());
        assert_eq!(&payload[8..12], &[1, 0, 1, 2]);
        assert_eq!(&payload[12..], &490_000u32.to_le_bytes());
    }

    #[test]
    fn test_decode_zeroes_if_for_tx() {
        let carrier = Carrier {
            carrier_frequency_hz: 915_000_000,
            intermediate_frequency_hz: 1_000_000,
            ..Default::default()
        };
        let payload = encode_carrier(&carrier);
        assert_eq!(decode_carrier(&payload, Port::Rx).unwrap(), carrier);
        assert_eq!(
            decode_carrier(&payload, Port::Tx).unwrap().intermediate_frequency_hz,
            0
        );
    }

    #[test]
    fn test_decode_rejects_unknown_pll_power() {
        let mut payload = encode_carrier(&Carrier::default());
        payload[11] = 7;
        assert!(matches!(
            decode_carrier(&payload, Port::Rx),
            Err(RadioError::InvalidResponse { field: "pll_power", value: 7 })
        ));
    }
}
