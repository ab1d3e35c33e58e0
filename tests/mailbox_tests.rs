//! Integration tests for the ARM mailbox transport: descriptors, polling windows and error reporting.

use adrv9001_radio::config::{PollConfig, RadioConfig};
use adrv9001_radio::constants::*;
use adrv9001_radio::radio::mailbox::{self, MailboxCommand, ObjectId};
use adrv9001_radio::radio::registers::REG_ARM_CMD_STATUS_9;
use adrv9001_radio::sim::{SimulatedDevice, SIM_ERR_UNSUPPORTED};
use adrv9001_radio::{
    Adrv9001Driver, Carrier, ChannelId, ChannelMask, ChannelState, HalError, Pll,
    PllLoopFilterConfig, RadioError,
};
use std::time::Duration;

fn tight_radio_window() -> RadioConfig {
    let mut config = RadioConfig::default();
    config.timeouts.radio_on_off = PollConfig::new(1_000, 5_000);
    config
}

fn carrier(hz: u64) -> Carrier {
    Carrier {
        carrier_frequency_hz: hz,
        ..Default::default()
    }
}

/// Tests that a command which never completes times out after exactly the configured polls.
#[test]
fn test_stalled_command_times_out() {
    let mut device = SimulatedDevice::calibrated();
    device.stall_opcode(ARM_RADIOON_OPCODE);
    let mut driver = Adrv9001Driver::with_config(device, tight_radio_window());

    let result = driver.channel_prime(ChannelId::RX1, true);
    match result {
        Err(RadioError::Timeout {
            opcode,
            object_id,
            waited,
        }) => {
            assert_eq!(opcode, ARM_RADIOON_OPCODE);
            assert_eq!(object_id, 0);
            assert_eq!(waited, Duration::from_millis(5));
        }
        other => panic!("expected Timeout, got {other:?}"),
    }

    let device = driver.hal();
    assert_eq!(device.status_polls(), 5);
    assert_eq!(device.total_delay(), Duration::from_millis(5));
    assert_eq!(device.commands().len(), 1);
    // Two state reads, mask byte, opcode, five polls and nothing after
    assert_eq!(device.hal_calls(), 9);
    assert_eq!(device.channel_state(ChannelId::RX1), Some(ChannelState::Calibrated));
}

/// Tests that a timed-out prime does not run the errata follow-up.
#[test]
fn test_timeout_stops_the_operation() {
    let mut device = SimulatedDevice::calibrated();
    device.set_channel_state(ChannelId::RX1, ChannelState::RfEnabled);
    device.stall_opcode(ARM_RADIOON_OPCODE);
    let mut driver = Adrv9001Driver::with_config(device, tight_radio_window());

    assert!(driver.channel_prime(ChannelId::TX1, true).is_err());
    assert!(driver.hal().rf_toggles(ChannelId::RX1).is_empty());
}

/// Tests that a non-zero firmware code surfaces as CommandFailed with opcode and object.
#[test]
fn test_firmware_error_code_reported() {
    let mut device = SimulatedDevice::calibrated();
    device.fail_opcode(ARM_SET_OPCODE, 3);
    let mut driver = Adrv9001Driver::new(device);

    let result = driver.carrier_configure(ChannelId::TX1, &carrier(2_400_000_000));
    assert!(matches!(
        result,
        Err(RadioError::CommandFailed {
            opcode: ARM_SET_OPCODE,
            object_id: ARM_OBJECTID_CHANNEL_CARRIER_FREQUENCY,
            code: 3
        })
    ));
    // Failure is reported on the first completed poll
    assert_eq!(driver.hal().status_polls(), 1);
}

/// Tests that completion is detected after the device holds the command pending.
#[test]
fn test_latency_within_window() {
    let mut device = SimulatedDevice::calibrated();
    device.set_command_latency(3);
    let mut driver = Adrv9001Driver::new(device);

    driver.channel_prime(ChannelId::RX2, true).unwrap();
    let device = driver.hal();
    assert_eq!(device.status_polls(), 4);
    assert_eq!(device.delays(), &[Duration::from_micros(RADIOONOFF_INTERVAL_US); 3]);
}

/// Tests that an ARM memory failure aborts a SET before the opcode is written.
#[test]
fn test_memory_failure_propagates() {
    let mut device = SimulatedDevice::calibrated();
    device.fail_memory(true);
    let mut driver = Adrv9001Driver::new(device);

    let result = driver.carrier_configure(ChannelId::RX1, &carrier(900_000_000));
    assert!(matches!(
        result,
        Err(RadioError::Hal(HalError::Memory(ADDR_ARM_MAILBOX_SET)))
    ));
    assert!(driver.hal().commands().is_empty());
}

/// Tests that a register failure surfaces as a HAL error.
#[test]
fn test_register_failure_propagates() {
    let mut device = SimulatedDevice::calibrated();
    device.fail_register(REG_ARM_CMD_STATUS_9);
    let mut driver = Adrv9001Driver::new(device);

    assert!(matches!(
        driver.radio_state_get(),
        Err(RadioError::Hal(HalError::Register(REG_ARM_CMD_STATUS_9)))
    ));
}

/// Tests the descriptor bytes of a per-channel SET.
#[test]
fn test_carrier_set_descriptor() {
    let mut driver = Adrv9001Driver::new(SimulatedDevice::calibrated());
    driver
        .carrier_configure(ChannelId::TX2, &carrier(1_000_000_000))
        .unwrap();

    let command = &driver.hal().commands()[0];
    assert_eq!(command.opcode, ARM_SET_OPCODE);
    assert_eq!(command.ext, vec![0x08, ARM_OBJECTID_CHANNEL_CARRIER_FREQUENCY]);
}

/// Tests that loop filter commands carry the PLL selector after the object id.
#[test]
fn test_loop_filter_descriptor_carries_selector() {
    let mut driver = Adrv9001Driver::new(SimulatedDevice::new());
    let filter = PllLoopFilterConfig {
        phase_margin_degrees: 45,
        loop_bandwidth_khz: 500,
        power_scale: 2,
        effective_loop_bandwidth_khz: 0,
    };
    driver.pll_loop_filter_set(Pll::Lo2, &filter).unwrap();
    driver.pll_loop_filter_get(Pll::Lo2).unwrap();

    let commands = driver.hal().commands();
    assert_eq!(commands[0].ext, vec![0x00, ARM_OBJECTID_PLL_LOOPFILTER, Pll::Lo2 as u8]);
    assert_eq!(commands[1].opcode, ARM_GET_OPCODE);
    assert_eq!(commands[1].ext, vec![0x00, ARM_OBJECTID_PLL_LOOPFILTER, Pll::Lo2 as u8]);
}

/// Tests that GET responses are read with auto-increment addressing.
#[test]
fn test_get_reads_with_auto_increment() {
    let mut device = SimulatedDevice::new();
    let cmd = MailboxCommand::get(ObjectId::ChannelCarrierFrequency, ChannelMask::RX1);
    let response: [u8; CARRIER_PAYLOAD_LEN] =
        mailbox::get(&mut device, &cmd, PollConfig::new(100, 1_000)).unwrap();

    assert_eq!(response, [0u8; CARRIER_PAYLOAD_LEN]);
    assert_eq!(device.last_read_auto_increment(), Some(true));
}

/// Tests the transport layer directly: SET stages the payload, then issues the opcode.
#[test]
fn test_set_stages_payload_before_opcode() {
    let mut device = SimulatedDevice::new();
    let payload = [0xAA, 0x2C, 0x01, 0x03];
    let cmd = MailboxCommand::set(ObjectId::PllLoopFilter, ChannelMask::empty())
        .with_selector(Pll::Aux as u8);

    mailbox::set(&mut device, &cmd, &payload, PollConfig::new(100, 1_000)).unwrap();

    assert_eq!(device.memory(ADDR_ARM_MAILBOX_SET, 4), payload.to_vec());
    assert_eq!(
        device.stored_object(ARM_OBJECTID_PLL_LOOPFILTER, Pll::Aux as u8),
        Some(&payload[..])
    );
}

/// Tests that a GET failing in firmware returns no data.
#[test]
fn test_get_failure_skips_memory_read() {
    let mut device = SimulatedDevice::new();
    device.fail_opcode(ARM_GET_OPCODE, SIM_ERR_UNSUPPORTED);
    let cmd = MailboxCommand::get(ObjectId::TddTimingParams, ChannelMask::TX1);

    let result: Result<[u8; ENABLEMENT_DELAYS_PAYLOAD_LEN], _> =
        mailbox::get(&mut device, &cmd, PollConfig::new(100, 1_000));
    assert!(matches!(
        result,
        Err(RadioError::CommandFailed {
            opcode: ARM_GET_OPCODE,
            object_id: ARM_OBJECTID_TDD_TIMING_PARAMS,
            code: SIM_ERR_UNSUPPORTED
        })
    ));
    assert_eq!(device.last_read_auto_increment(), None);
}
