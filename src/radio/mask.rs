//! # Mailbox Channel Mask
//!
//! Radio-on/off and power commands address several channels at once through a
//! one-byte mask, one bit per (port, channel) pair. SET/GET commands carry the
//! mask of the single channel they target.

use crate::radio::types::{ChannelId, ChannelNumber, Port};
use bitflags::bitflags;

bitflags! {
    /// Channel selection byte of a mailbox command
    ///
    /// ```rust
    /// use adrv9001_radio::radio::mask::ChannelMask;
    /// use adrv9001_radio::radio::types::ChannelId;
    ///
    /// let mask = ChannelMask::from_channels(&[ChannelId::RX1, ChannelId::TX2]);
    /// assert_eq!(mask.bits(), 0x09);
    /// ```
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ChannelMask: u8 {
        const RX1  = 0b0000_0001;
        const RX2  = 0b0000_0010;
        const TX1  = 0b0000_0100;
        const TX2  = 0b0000_1000;
        const ORX1 = 0b0001_0000;
        const ORX2 = 0b0010_0000;
    }
}

impl ChannelMask {
    pub fn from_channel(id: ChannelId) -> Self {
        match (id.port, id.channel) {
            (Port::Rx, ChannelNumber::Channel1) => ChannelMask::RX1,
            (Port::Rx, ChannelNumber::Channel2) => ChannelMask::RX2,
            (Port::Tx, ChannelNumber::Channel1) => ChannelMask::TX1,
            (Port::Tx, ChannelNumber::Channel2) => ChannelMask::TX2,
            (Port::ORx, ChannelNumber::Channel1) => ChannelMask::ORX1,
            (Port::ORx, ChannelNumber::Channel2) => ChannelMask::ORX2,
        }
    }

    /// OR of every listed channel's bit
    pub fn from_channels(ids: &[ChannelId]) -> Self {
        ids.iter()
            .fold(ChannelMask::empty(), |mask, id| mask | ChannelMask::from_channel(*id))
    }

    /// Channels selected by this mask, in bit order
    pub fn channels(&self) -> Vec<ChannelId> {
        [
            (ChannelMask::RX1, ChannelId::RX1),
            (ChannelMask::RX2, ChannelId::RX2),
            (ChannelMask::TX1, ChannelId::TX1),
            (ChannelMask::TX2, ChannelId::TX2),
            (ChannelMask::ORX1, ChannelId::ORX1),
            (ChannelMask::ORX2, ChannelId::ORX2),
        ]
        .iter()
        .filter(|(bit, _)| self.contains(*bit))
        .map(|(_, id)| *id)
        .collect()
    }
}
