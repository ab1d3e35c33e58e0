//! Property-based tests for parameter validation, payload encoding and batch handling.

use adrv9001_radio::constants::*;
use adrv9001_radio::radio::codec::{load_u32, load_u64, parse_u32, parse_u64};
use adrv9001_radio::radio::registers::{cmd_status_field, REG_ARM_CMD_STATUS_0, REG_ARM_CMD_STATUS_8};
use adrv9001_radio::sim::SimulatedDevice;
use adrv9001_radio::{
    Adrv9001Driver, Carrier, ChannelEnablementDelays, ChannelId, ChannelMask, ChannelState,
    LoGenOptimization, Pll, PllCalibration, PllLoopFilterConfig, PllPower, RadioError,
};
use proptest::prelude::*;

const RX_TX: [ChannelId; 4] = [ChannelId::RX1, ChannelId::RX2, ChannelId::TX1, ChannelId::TX2];

fn channel() -> impl Strategy<Value = ChannelId> {
    prop::sample::select(RX_TX.to_vec())
}

fn carrier_in_range() -> impl Strategy<Value = Carrier> {
    (
        CARRIER_FREQUENCY_MIN_HZ..=CARRIER_FREQUENCY_MAX_HZ,
        prop_oneof![Just(0u32), INTERMEDIATE_FREQUENCY_MIN_HZ..=INTERMEDIATE_FREQUENCY_MAX_HZ],
        prop::sample::select(vec![PllCalibration::Normal, PllCalibration::Fast, PllCalibration::Reserved]),
        prop::sample::select(vec![LoGenOptimization::PhaseNoise, LoGenOptimization::PowerConsumption]),
        prop::sample::select(vec![PllPower::Low, PllPower::Medium, PllPower::High]),
    )
        .prop_map(|(hz, if_hz, cal, lo, power)| Carrier {
            carrier_frequency_hz: hz,
            intermediate_frequency_hz: if_hz,
            pll_calibration: cal,
            lo_gen_optimization: lo,
            pll_power: power,
        })
}

proptest! {
    /// Any in-range carrier reads back unchanged, except IF on transmitters.
    #[test]
    fn prop_carrier_round_trip(channel in channel(), carrier in carrier_in_range()) {
        let mut driver = Adrv9001Driver::new(SimulatedDevice::calibrated());
        driver.carrier_configure(channel, &carrier).unwrap();
        let read = driver.carrier_inspect(channel).unwrap();

        prop_assert_eq!(read.carrier_frequency_hz, carrier.carrier_frequency_hz);
        prop_assert_eq!(read.pll_calibration, carrier.pll_calibration);
        prop_assert_eq!(read.lo_gen_optimization, carrier.lo_gen_optimization);
        prop_assert_eq!(read.pll_power, carrier.pll_power);
        if channel == ChannelId::RX1 || channel == ChannelId::RX2 {
            prop_assert_eq!(read.intermediate_frequency_hz, carrier.intermediate_frequency_hz);
        } else {
            prop_assert_eq!(read.intermediate_frequency_hz, 0);
        }
    }

    /// Out-of-range carriers are rejected without a single HAL call.
    #[test]
    fn prop_carrier_out_of_range_touches_nothing(
        hz in prop_oneof![0..CARRIER_FREQUENCY_MIN_HZ, (CARRIER_FREQUENCY_MAX_HZ + 1)..u64::MAX],
        channel in channel(),
    ) {
        let mut driver = Adrv9001Driver::new(SimulatedDevice::calibrated());
        let carrier = Carrier { carrier_frequency_hz: hz, ..Default::default() };

        let is_out_of_range = matches!(
            driver.carrier_configure(channel, &carrier),
            Err(RadioError::OutOfRange { .. })
        );
        prop_assert!(is_out_of_range);
        prop_assert_eq!(driver.hal().hal_calls(), 0);
    }

    /// Loop filter settings survive a SET/GET and the effective bandwidth follows the device.
    #[test]
    fn prop_loop_filter_round_trip(
        phase_margin in LOOP_FILTER_PHASE_MARGIN_MIN_DEGREES..=LOOP_FILTER_PHASE_MARGIN_MAX_DEGREES,
        bandwidth in LOOP_FILTER_BANDWIDTH_MIN_KHZ..=LOOP_FILTER_BANDWIDTH_MAX_KHZ,
        scale in 0u8..=LOOP_FILTER_POWER_SCALE_MAX,
        offset in -40i32..=40,
        pll in prop::sample::select(vec![Pll::Lo1, Pll::Lo2, Pll::Aux]),
    ) {
        let mut device = SimulatedDevice::new();
        device.set_effective_bandwidth_offset(offset);
        let mut driver = Adrv9001Driver::new(device);

        let written = PllLoopFilterConfig {
            phase_margin_degrees: phase_margin,
            loop_bandwidth_khz: bandwidth,
            power_scale: scale,
            effective_loop_bandwidth_khz: 0,
        };
        driver.pll_loop_filter_set(pll, &written).unwrap();
        let read = driver.pll_loop_filter_get(pll).unwrap();

        prop_assert_eq!(read.phase_margin_degrees, phase_margin);
        prop_assert_eq!(read.loop_bandwidth_khz, bandwidth);
        prop_assert_eq!(read.power_scale, scale);
        prop_assert_eq!(read.effective_loop_bandwidth_khz as i32, bandwidth as i32 + offset);
    }

    /// TX delays are accepted exactly when hold does not exceed fall-to-off.
    #[test]
    fn prop_tx_hold_ordering(fall in 0u32..=ENABLEMENT_DELAY_MAX, hold in 0u32..=ENABLEMENT_DELAY_MAX) {
        let mut driver = Adrv9001Driver::new(SimulatedDevice::calibrated());
        let delays = ChannelEnablementDelays {
            fall_to_off_delay: fall,
            hold_delay: hold,
            ..Default::default()
        };
        let result = driver.channel_enablement_delays_configure(ChannelId::TX1, &delays);
        prop_assert_eq!(result.is_ok(), hold <= fall);
    }

    /// A prime batch either moves every channel or none of them.
    #[test]
    fn prop_prime_batch_all_or_nothing(
        states in prop::collection::vec(
            prop::sample::select(vec![
                ChannelState::Standby,
                ChannelState::Calibrated,
                ChannelState::Primed,
                ChannelState::RfEnabled,
            ]),
            4,
        ),
        batch in prop::sample::subsequence(RX_TX.to_vec(), 1..=4),
    ) {
        let mut device = SimulatedDevice::new();
        for (channel, state) in RX_TX.iter().zip(&states) {
            device.set_channel_state(*channel, *state);
        }
        let mut driver = Adrv9001Driver::new(device);
        let before: Vec<_> = RX_TX.iter().map(|c| driver.hal().channel_state(*c)).collect();

        let all_calibrated = batch
            .iter()
            .all(|c| driver.hal().channel_state(*c) == Some(ChannelState::Calibrated));
        let result = driver.channels_prime(&batch, true);
        prop_assert_eq!(result.is_ok(), all_calibrated);

        for (i, channel) in RX_TX.iter().enumerate() {
            let now = driver.hal().channel_state(*channel);
            if all_calibrated && batch.contains(channel) {
                prop_assert_eq!(now, Some(ChannelState::Primed));
            } else if !all_calibrated {
                prop_assert_eq!(now, before[i]);
            }
        }
    }

    /// Mask bits and channel lists convert both ways.
    #[test]
    fn prop_channel_mask_covers_batch(batch in prop::sample::subsequence(RX_TX.to_vec(), 0..=4)) {
        let mask = ChannelMask::from_channels(&batch);
        prop_assert_eq!(mask.bits().count_ones() as usize, batch.len());
        prop_assert_eq!(mask.channels(), batch);
    }

    /// Every even opcode owns a nibble inside the command status block.
    #[test]
    fn prop_status_nibble_in_block(half in 0u8..0x10) {
        let opcode = half * 2;
        let field = cmd_status_field(opcode);
        prop_assert!(field.addr >= REG_ARM_CMD_STATUS_0 && field.addr < REG_ARM_CMD_STATUS_8);
        prop_assert!(field.shift == 0 || field.shift == 4);
    }

    /// Mixed-width fields land at the cursor and read back in order.
    #[test]
    fn prop_codec_cursor(a in any::<u64>(), b in any::<u32>()) {
        let mut buf = [0u8; 12];
        let mut offset = 0;
        load_u64(&mut offset, &mut buf, a);
        load_u32(&mut offset, &mut buf, b);
        prop_assert_eq!(offset, 12);

        let mut offset = 0;
        prop_assert_eq!(parse_u64(&mut offset, &buf), a);
        prop_assert_eq!(parse_u32(&mut offset, &buf), b);
    }
}
