//! # Mailbox Payload Codec
//!
//! Little-endian packing of fixed-width integers into the byte arrays exchanged
//! through the ARM mailbox. Every function takes a cursor, reads or writes at that
//! offset and advances it by the width consumed.
//!
//! Payload arrays are sized to the protocol layout at compile time, so bounds are
//! the caller's responsibility: indexing past the end of `buf` panics.
//!
//! ```rust
//! use adrv9001_radio::radio::codec::{load_u64, parse_u64};
//!
//! let mut buf = [0u8; 8];
//! let mut offset = 0;
//! load_u64(&mut offset, &mut buf, 2_450_000_000);
//! assert_eq!(offset, 8);
//!
//! let mut offset = 0;
//! assert_eq!(parse_u64(&mut offset, &buf), 2_450_000_000);
//! ```

pub fn load_u16(offset: &mut usize, buf: &mut [u8], value: u16) {
    buf[*offset..*offset + 2].copy_from_slice(&value.to_le_bytes());
    *offset += 2;
}

pub fn load_u32(offset: &mut usize, buf: &mut [u8], value: u32) {
    buf[*offset..*offset + 4].copy_from_slice(&value.to_le_bytes());
    *offset += 4;
}

pub fn load_u64(offset: &mut usize, buf: &mut [u8], value: u64) {
    buf[*offset..*offset + 8].copy_from_slice(&value.to_le_bytes());
    *offset += 8;
}

pub fn parse_u16(offset: &mut usize, buf: &[u8]) -> u16 {
    let o = *offset;
    *offset += 2;
    u16::from_le_bytes([buf[o], buf[o + 1]])
}

pub fn parse_u32(offset: &mut usize, buf: &[u8]) -> u32 {
    let o = *offset;
    *offset += 4;
    u32::from_le_bytes([buf[o], buf[o + 1], buf[o + 2], buf[o + 3]])
}

pub fn parse_u64(offset: &mut usize, buf: &[u8]) -> u64 {
    let o = *offset;
    *offset += 8;
    u64::from_le_bytes([
        buf[o],
        buf[o + 1],
        buf[o + 2],
        buf[o + 3],
        buf[o + 4],
        buf[o + 5],
        buf[o + 6],
        buf[o + 7],
    ])
}
