//! Simulated ADRV9001 for tests, benchmarks and the CLI
//!
//! [`SimulatedDevice`] implements [`Hal`] over an in-memory register file and
//! ARM memory, and plays the ARM side of the mailbox protocol: a write to the
//! opcode register raises the opcode's pending flag, and the command takes
//! effect once the status nibble has been polled `latency` times.
//!
//! Besides the device model it keeps journals (issued commands, register
//! writes, delays, RF enable toggles) so tests can check what the driver did,
//! not only where the device ended up.

use crate::constants::*;
use crate::radio::codec::parse_u16;
use crate::radio::hal::{GpioPin, GpioSignal, Hal, HalError};
use crate::radio::mailbox::{ObjectId, Opcode};
use crate::radio::mask::ChannelMask;
use crate::radio::registers::{
    channel_state_field, cmd_status_field, enable_field, pll_lock_field, BOOT_STATE,
    CMD_STATUS_PENDING,
    MONITOR_MODE_STATE, REG_ARM_CMD_STATUS_0, REG_ARM_CMD_STATUS_8, REG_ARM_CMD_STATUS_9,
    REG_ARM_COMMAND, REG_ARM_EXT_CMD_BYTE_1, REG_BBIC_ENABLE, ARM_EXT_CMD_BYTES, SYSTEM_STATE,
};
use crate::radio::types::{ChannelId, ChannelState, Pll, Port};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Error code reported for opcodes the simulator does not implement
pub const SIM_ERR_UNSUPPORTED: u8 = 0x07;

/// One command as the ARM received it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCommand {
    pub opcode: u8,
    /// Extended bytes written since the previous command
    pub ext: Vec<u8>,
}

impl IssuedCommand {
    pub fn channel_mask(&self) -> ChannelMask {
        ChannelMask::from_bits_truncate(self.ext.first().copied().unwrap_or(0))
    }

    pub fn object_id(&self) -> Option<u8> {
        self.ext.get(1).copied()
    }
}

#[derive(Debug, Clone)]
struct InFlight {
    command: IssuedCommand,
    polls_left: u32,
}

#[derive(Debug, Clone, Copy)]
struct PendingRf {
    channel: ChannelId,
    target: ChannelState,
    reads_left: u32,
}

/// In-memory transceiver model
#[derive(Debug, Clone, Default)]
pub struct SimulatedDevice {
    registers: HashMap<u16, u8>,
    memory: HashMap<u32, u8>,
    channel_states: [[ChannelState; 2]; 2],
    system_state: u8,
    monitor_mode_state: u8,
    boot_state: u8,
    gpio: HashMap<GpioSignal, GpioPin>,
    objects: HashMap<(u8, u8), Vec<u8>>,

    // Knobs
    latency_polls: u32,
    stalled_opcodes: HashSet<u8>,
    command_errors: HashMap<u8, u8>,
    failing_registers: HashSet<u16>,
    fail_memory: bool,
    rf_lag_reads: u32,
    capture_defect: bool,
    effective_bandwidth_offset_khz: i32,

    // Runtime
    ext_pending: Vec<u8>,
    inflight: Option<InFlight>,
    pending_rf: Vec<PendingRf>,
    capture_broken: HashSet<ChannelId>,
    powered_down: HashSet<ChannelId>,

    // Journals
    commands: Vec<IssuedCommand>,
    register_writes: Vec<(u16, u8)>,
    delays: Vec<Duration>,
    rf_toggles: Vec<(ChannelId, bool)>,
    status_polls: usize,
    hal_calls: usize,
    last_read_auto_increment: Option<bool>,
}

impl SimulatedDevice {
    /// All channels in STANDBY, SPI enable mode, commands complete on first poll
    pub fn new() -> Self {
        Self {
            capture_defect: true,
            ..Default::default()
        }
    }

    /// All RX/TX channels in CALIBRATED, the usual state after init calibrations
    pub fn calibrated() -> Self {
        let mut device = Self::new();
        for channel in RX_TX_CHANNELS {
            device.set_channel_state(channel, ChannelState::Calibrated);
        }
        device
    }

    // ================================ SETUP ===================================

    pub fn set_channel_state(&mut self, channel: ChannelId, state: ChannelState) {
        if let Some(slot) = self.slot_mut(channel) {
            *slot = state;
        }
        // Keep the enable bit consistent with the state
        let bit = enable_field(channel.port, channel.channel);
        let reg = self.registers.get(&bit.addr).copied().unwrap_or(0);
        let enabled = (state == ChannelState::RfEnabled) as u8;
        self.registers.insert(bit.addr, bit.insert(reg, enabled));
    }

    pub fn channel_state(&self, channel: ChannelId) -> Option<ChannelState> {
        channel
            .port
            .state_index()
            .map(|p| self.channel_states[p][channel.channel.index()])
    }

    pub fn set_system_state(&mut self, system: u8, monitor_mode: u8, boot: u8) {
        self.system_state = system;
        self.monitor_mode_state = monitor_mode;
        self.boot_state = boot;
    }

    /// Raw register preset, bypassing the journals
    pub fn set_register(&mut self, addr: u16, value: u8) {
        self.registers.insert(addr, value);
    }

    pub fn register(&self, addr: u16) -> u8 {
        self.registers.get(&addr).copied().unwrap_or(0)
    }

    pub fn set_gpio(&mut self, signal: GpioSignal, pin: GpioPin) {
        self.gpio.insert(signal, pin);
    }

    pub fn set_pll_locked(&mut self, pll: Pll, locked: bool) {
        let field = pll_lock_field(pll);
        let reg = self.register(field.addr);
        self.registers.insert(field.addr, field.insert(reg, locked as u8));
    }

    /// Status polls a command stays pending before it completes
    pub fn set_command_latency(&mut self, polls: u32) {
        self.latency_polls = polls;
    }

    /// Commands with this opcode never complete
    pub fn stall_opcode(&mut self, opcode: u8) {
        self.stalled_opcodes.insert(opcode);
    }

    /// Commands with this opcode complete with `code` and no effect
    pub fn fail_opcode(&mut self, opcode: u8, code: u8) {
        self.command_errors.insert(opcode, code & 0x07);
    }

    /// Every access to `addr` fails with [`HalError::Register`]
    pub fn fail_register(&mut self, addr: u16) {
        self.failing_registers.insert(addr);
    }

    pub fn fail_memory(&mut self, fail: bool) {
        self.fail_memory = fail;
    }

    /// Status reads an enable-bit change takes to show in the channel state
    pub fn set_rf_lag(&mut self, reads: u32) {
        self.rf_lag_reads = reads;
    }

    /// Model the firmware defect that drops RX capture when the paired TX is primed
    pub fn set_capture_defect(&mut self, enabled: bool) {
        self.capture_defect = enabled;
    }

    /// Added to the requested loop bandwidth to form the reported effective bandwidth
    pub fn set_effective_bandwidth_offset(&mut self, offset_khz: i32) {
        self.effective_bandwidth_offset_khz = offset_khz;
    }

    // ============================== INSPECTION ================================

    /// True when an RX channel is RF_ENABLED and actually capturing
    pub fn rx_capture_ok(&self, channel: ChannelId) -> bool {
        self.channel_state(channel) == Some(ChannelState::RfEnabled)
            && !self.capture_broken.contains(&channel)
    }

    pub fn is_powered_down(&self, channel: ChannelId) -> bool {
        self.powered_down.contains(&channel)
    }

    /// Last payload stored for an object, keyed by channel mask or PLL selector
    pub fn stored_object(&self, object_id: u8, key: u8) -> Option<&[u8]> {
        self.objects.get(&(object_id, key)).map(|v| v.as_slice())
    }

    pub fn memory(&self, addr: u32, len: usize) -> Vec<u8> {
        (0..len as u32)
            .map(|i| self.memory.get(&(addr + i)).copied().unwrap_or(0))
            .collect()
    }

    pub fn commands(&self) -> &[IssuedCommand] {
        &self.commands
    }

    pub fn register_writes(&self) -> &[(u16, u8)] {
        &self.register_writes
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    pub fn total_delay(&self) -> Duration {
        self.delays.iter().sum()
    }

    /// Enable-bit writes per channel, in order
    pub fn rf_toggles(&self, channel: ChannelId) -> Vec<bool> {
        self.rf_toggles
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, on)| *on)
            .collect()
    }

    /// Disable-then-enable pairs seen on a channel
    pub fn rf_cycles(&self, channel: ChannelId) -> usize {
        self.rf_toggles(channel)
            .windows(2)
            .filter(|w| !w[0] && w[1])
            .count()
    }

    /// Reads of the command status registers
    pub fn status_polls(&self) -> usize {
        self.status_polls
    }

    /// Every HAL call made so far
    pub fn hal_calls(&self) -> usize {
        self.hal_calls
    }

    pub fn last_read_auto_increment(&self) -> Option<bool> {
        self.last_read_auto_increment
    }

    /// Forget journals; device state is kept
    pub fn clear_journals(&mut self) {
        self.commands.clear();
        self.register_writes.clear();
        self.delays.clear();
        self.rf_toggles.clear();
        self.status_polls = 0;
        self.hal_calls = 0;
        self.last_read_auto_increment = None;
    }

    // ============================== INTERNALS =================================

    fn slot_mut(&mut self, channel: ChannelId) -> Option<&mut ChannelState> {
        let p = channel.port.state_index()?;
        Some(&mut self.channel_states[p][channel.channel.index()])
    }

    fn check_register(&self, addr: u16) -> Result<(), HalError> {
        if self.failing_registers.contains(&addr) {
            return Err(HalError::Register(addr));
        }
        Ok(())
    }

    fn check_memory(&self, addr: u32) -> Result<(), HalError> {
        if self.fail_memory {
            return Err(HalError::Memory(addr));
        }
        Ok(())
    }

    fn status_8(&self) -> u8 {
        let reg = SYSTEM_STATE.insert(0, self.system_state);
        let reg = MONITOR_MODE_STATE.insert(reg, self.monitor_mode_state);
        BOOT_STATE.insert(reg, self.boot_state)
    }

    fn status_9(&self) -> u8 {
        RX_TX_CHANNELS.iter().fold(0, |reg, channel| {
            match (
                channel_state_field(channel.port, channel.channel),
                self.channel_state(*channel),
            ) {
                (Some(field), Some(state)) => field.insert(reg, state.bits()),
                _ => reg,
            }
        })
    }

    /// Apply lagging RF transitions whose time has come
    fn advance_rf(&mut self) {
        let mut still_pending = Vec::new();
        for mut pending in std::mem::take(&mut self.pending_rf) {
            if pending.reads_left == 0 {
                self.apply_rf(pending.channel, pending.target);
            } else {
                pending.reads_left -= 1;
                still_pending.push(pending);
            }
        }
        self.pending_rf = still_pending;
    }

    fn apply_rf(&mut self, channel: ChannelId, target: ChannelState) {
        if let Some(slot) = self.slot_mut(channel) {
            *slot = target;
        }
        if target == ChannelState::RfEnabled {
            self.capture_broken.remove(&channel);
        }
    }

    fn write_enable_register(&mut self, old: u8, new: u8) {
        for channel in RX_TX_CHANNELS {
            let field = enable_field(channel.port, channel.channel);
            let (was, now) = (field.extract(old), field.extract(new));
            if was == now {
                continue;
            }
            let enable = now != 0;
            self.rf_toggles.push((channel, enable));

            let (from, target) = if enable {
                (ChannelState::Primed, ChannelState::RfEnabled)
            } else {
                (ChannelState::RfEnabled, ChannelState::Primed)
            };
            if self.channel_state(channel) != Some(from) {
                continue;
            }
            if self.rf_lag_reads == 0 {
                self.apply_rf(channel, target);
            } else {
                self.pending_rf.retain(|p| p.channel != channel);
                self.pending_rf.push(PendingRf {
                    channel,
                    target,
                    reads_left: self.rf_lag_reads - 1,
                });
            }
        }
    }

    fn issue_command(&mut self, opcode: u8) {
        let command = IssuedCommand {
            opcode,
            ext: std::mem::take(&mut self.ext_pending),
        };
        self.commands.push(command.clone());
        self.set_nibble(opcode, CMD_STATUS_PENDING);
        self.inflight = Some(InFlight {
            command,
            polls_left: self.latency_polls,
        });
    }

    fn set_nibble(&mut self, opcode: u8, nibble: u8) {
        let field = cmd_status_field(opcode);
        let reg = self.register(field.addr);
        self.registers.insert(field.addr, field.insert(reg, nibble));
    }

    /// Called on every status register read
    fn advance_command(&mut self, addr: u16) {
        let Some(inflight) = self.inflight.as_mut() else {
            return;
        };
        let opcode = inflight.command.opcode;
        if cmd_status_field(opcode).addr != addr || self.stalled_opcodes.contains(&opcode) {
            return;
        }
        if inflight.polls_left > 0 {
            inflight.polls_left -= 1;
            return;
        }

        let Some(InFlight { command, .. }) = self.inflight.take() else {
            return;
        };
        let code = match self.command_errors.get(&opcode) {
            Some(code) => *code,
            None => self.execute(&command),
        };
        self.set_nibble(opcode, code << 1);
    }

    /// Run a command against the model, returning its status code
    fn execute(&mut self, command: &IssuedCommand) -> u8 {
        let Some(opcode) = Opcode::from_code(command.opcode) else {
            return SIM_ERR_UNSUPPORTED;
        };
        let mask = command.channel_mask();
        match opcode {
            Opcode::RadioOn => {
                for channel in mask.channels() {
                    if self.channel_state(channel) != Some(ChannelState::Calibrated) {
                        continue;
                    }
                    if let Some(slot) = self.slot_mut(channel) {
                        *slot = ChannelState::Primed;
                    }
                    let rx = channel.paired_rx();
                    if self.capture_defect
                        && channel.port == Port::Tx
                        && self.channel_state(rx) == Some(ChannelState::RfEnabled)
                    {
                        self.capture_broken.insert(rx);
                    }
                }
                0
            }
            Opcode::RadioOff => {
                for channel in mask.channels() {
                    if self.channel_state(channel) == Some(ChannelState::Primed) {
                        if let Some(slot) = self.slot_mut(channel) {
                            *slot = ChannelState::Calibrated;
                        }
                    }
                }
                0
            }
            Opcode::PowerDown => {
                self.powered_down.extend(mask.channels());
                0
            }
            Opcode::PowerUp => {
                for channel in mask.channels() {
                    self.powered_down.remove(&channel);
                }
                0
            }
            Opcode::Set => self.execute_set(command),
            Opcode::Get => self.execute_get(command),
        }
    }

    /// Object and storage key: the PLL selector for loop filters, else the channel mask
    fn object_key(command: &IssuedCommand) -> Option<(ObjectId, u8)> {
        let object_id = ObjectId::from_code(command.object_id()?)?;
        let key = match object_id {
            ObjectId::PllLoopFilter => command.ext.get(2),
            _ => command.ext.first(),
        };
        Some((object_id, key.copied().unwrap_or(0)))
    }

    fn execute_set(&mut self, command: &IssuedCommand) -> u8 {
        let Some((object_id, key)) = Self::object_key(command) else {
            return SIM_ERR_UNSUPPORTED;
        };
        let payload = self.memory(ADDR_ARM_MAILBOX_SET, set_payload_len(object_id));
        self.objects.insert((object_id.code(), key), payload);
        0
    }

    fn execute_get(&mut self, command: &IssuedCommand) -> u8 {
        let Some((object_id, key)) = Self::object_key(command) else {
            return SIM_ERR_UNSUPPORTED;
        };
        let mut response = self
            .objects
            .get(&(object_id.code(), key))
            .cloned()
            .unwrap_or_else(|| vec![0; set_payload_len(object_id)]);

        if object_id == ObjectId::PllLoopFilter {
            let mut offset = 1;
            let requested = parse_u16(&mut offset, &response) as i32;
            let effective = (requested + self.effective_bandwidth_offset_khz).clamp(0, u16::MAX as i32);
            response.extend_from_slice(&(effective as u16).to_le_bytes());
        }

        for (i, byte) in response.iter().enumerate() {
            self.memory.insert(ADDR_ARM_MAILBOX_GET + i as u32, *byte);
        }
        0
    }
}

const RX_TX_CHANNELS: [ChannelId; 4] = [
    ChannelId::RX1,
    ChannelId::RX2,
    ChannelId::TX1,
    ChannelId::TX2,
];

fn set_payload_len(object_id: ObjectId) -> usize {
    match object_id {
        ObjectId::ChannelCarrierFrequency => CARRIER_PAYLOAD_LEN,
        ObjectId::PllLoopFilter => LOOP_FILTER_SET_PAYLOAD_LEN,
        ObjectId::TddTimingParams => ENABLEMENT_DELAYS_PAYLOAD_LEN,
    }
}

fn is_cmd_status_register(addr: u16) -> bool {
    (REG_ARM_CMD_STATUS_0..REG_ARM_CMD_STATUS_8).contains(&addr)
}

impl Hal for SimulatedDevice {
    fn read_register(&mut self, addr: u16) -> Result<u8, HalError> {
        self.hal_calls += 1;
        self.check_register(addr)?;
        match addr {
            REG_ARM_CMD_STATUS_8 => Ok(self.status_8()),
            REG_ARM_CMD_STATUS_9 => {
                self.advance_rf();
                Ok(self.status_9())
            }
            a if is_cmd_status_register(a) => {
                self.status_polls += 1;
                self.advance_command(a);
                Ok(self.register(a))
            }
            a => Ok(self.register(a)),
        }
    }

    fn write_register(&mut self, addr: u16, value: u8) -> Result<(), HalError> {
        self.hal_calls += 1;
        self.check_register(addr)?;
        self.register_writes.push((addr, value));

        let ext_end = REG_ARM_EXT_CMD_BYTE_1 + ARM_EXT_CMD_BYTES as u16;
        match addr {
            REG_ARM_COMMAND => {
                self.registers.insert(addr, value);
                self.issue_command(value);
            }
            a if (REG_ARM_EXT_CMD_BYTE_1..ext_end).contains(&a) => {
                self.registers.insert(a, value);
                let index = (a - REG_ARM_EXT_CMD_BYTE_1) as usize;
                if self.ext_pending.len() <= index {
                    self.ext_pending.resize(index + 1, 0);
                }
                self.ext_pending[index] = value;
            }
            REG_BBIC_ENABLE => {
                let old = self.register(addr);
                self.registers.insert(addr, value);
                self.write_enable_register(old, value);
            }
            // Status registers are owned by the ARM
            REG_ARM_CMD_STATUS_8 | REG_ARM_CMD_STATUS_9 => {}
            a => {
                self.registers.insert(a, value);
            }
        }
        Ok(())
    }

    fn write_memory(&mut self, addr: u32, data: &[u8]) -> Result<(), HalError> {
        self.hal_calls += 1;
        self.check_memory(addr)?;
        for (i, byte) in data.iter().enumerate() {
            self.memory.insert(addr + i as u32, *byte);
        }
        Ok(())
    }

    fn read_memory(&mut self, addr: u32, buf: &mut [u8], auto_increment: bool) -> Result<(), HalError> {
        self.hal_calls += 1;
        self.check_memory(addr)?;
        self.last_read_auto_increment = Some(auto_increment);
        buf.copy_from_slice(&self.memory(addr, buf.len()));
        Ok(())
    }

    fn gpio_inspect(&mut self, signal: GpioSignal) -> Result<GpioPin, HalError> {
        self.hal_calls += 1;
        Ok(self.gpio.get(&signal).copied().unwrap_or_default())
    }

    fn delay(&mut self, duration: Duration) {
        self.delays.push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radio::registers::{
        RX1_CHANNEL_STATE, RX2_CHANNEL_STATE, TX1_CHANNEL_STATE, TX2_CHANNEL_STATE,
    };

    fn issue(device: &mut SimulatedDevice, ext: &[u8], opcode: u8) -> u8 {
        for (i, byte) in ext.iter().enumerate() {
            device.write_register(REG_ARM_EXT_CMD_BYTE_1 + i as u16, *byte).unwrap();
        }
        device.write_register(REG_ARM_COMMAND, opcode).unwrap();
        cmd_status_field(opcode).read(device).unwrap() >> 1
    }

    #[test]
    fn test_command_completes_after_latency() {
        let mut device = SimulatedDevice::calibrated();
        device.set_command_latency(2);
        device.write_register(REG_ARM_EXT_CMD_BYTE_1, 0x01).unwrap();
        device.write_register(REG_ARM_COMMAND, ARM_RADIOON_OPCODE).unwrap();

        let field = cmd_status_field(ARM_RADIOON_OPCODE);
        assert_eq!(field.read(&mut device).unwrap(), CMD_STATUS_PENDING);
        assert_eq!(field.read(&mut device).unwrap(), CMD_STATUS_PENDING);
        assert_eq!(field.read(&mut device).unwrap(), 0);
        assert_eq!(device.channel_state(ChannelId::RX1), Some(ChannelState::Primed));
        assert_eq!(device.commands()[0].ext, vec![0x01]);
    }

    #[test]
    fn test_status_9_packs_channel_states() {
        let mut device = SimulatedDevice::new();
        device.set_channel_state(ChannelId::RX2, ChannelState::Calibrated);
        device.set_channel_state(ChannelId::TX2, ChannelState::RfEnabled);
        let reg = device.read_register(REG_ARM_CMD_STATUS_9).unwrap();
        assert_eq!(reg, 0b11_00_01_00);
        assert_eq!(RX1_CHANNEL_STATE.extract(reg), ChannelState::Standby.bits());
        assert_eq!(RX2_CHANNEL_STATE.extract(reg), ChannelState::Calibrated.bits());
        assert_eq!(TX1_CHANNEL_STATE.extract(reg), ChannelState::Standby.bits());
        assert_eq!(TX2_CHANNEL_STATE.extract(reg), ChannelState::RfEnabled.bits());
    }

    #[test]
    fn test_enable_bit_lag() {
        let mut device = SimulatedDevice::new();
        device.set_channel_state(ChannelId::TX1, ChannelState::Primed);
        device.set_rf_lag(2);
        device.write_register(REG_BBIC_ENABLE, 0x04).unwrap();
        let tx1 = |d: &mut SimulatedDevice| TX1_CHANNEL_STATE.extract(d.read_register(REG_ARM_CMD_STATUS_9).unwrap());
        assert_eq!(tx1(&mut device), ChannelState::Primed.bits());
        assert_eq!(tx1(&mut device), ChannelState::RfEnabled.bits());
    }

    #[test]
    fn test_unknown_opcode_is_unsupported() {
        let mut device = SimulatedDevice::calibrated();
        assert_eq!(issue(&mut device, &[0x01], 0x1E), SIM_ERR_UNSUPPORTED);
        assert_eq!(device.channel_state(ChannelId::RX1), Some(ChannelState::Calibrated));
    }

    #[test]
    fn test_unknown_object_is_unsupported() {
        let mut device = SimulatedDevice::new();
        assert_eq!(issue(&mut device, &[0x01, 0x7F], ARM_SET_OPCODE), SIM_ERR_UNSUPPORTED);
        assert_eq!(device.stored_object(0x7F, 0x01), None);
    }

    #[test]
    fn test_set_stores_under_decoded_object() {
        let mut device = SimulatedDevice::new();
        device.write_memory(ADDR_ARM_MAILBOX_SET, &[0x2D, 0xF4, 0x01, 0x02]).unwrap();
        let ext = [0x00, ARM_OBJECTID_PLL_LOOPFILTER, Pll::Lo2 as u8];
        assert_eq!(issue(&mut device, &ext, ARM_SET_OPCODE), 0);
        assert_eq!(
            device.stored_object(ARM_OBJECTID_PLL_LOOPFILTER, Pll::Lo2 as u8),
            Some(&[0x2D, 0xF4, 0x01, 0x02][..])
        );
    }
}
