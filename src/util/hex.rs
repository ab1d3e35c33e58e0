//! # Hex Rendering Utilities
//!
//! Hex formatting for mailbox payloads in logs and in the CLI's memory dumps.
//!
//! ```rust
//! use adrv9001_radio::util::hex::{format_hex_compact, pretty_hex};
//!
//! let payload = [0x80, 0x1D, 0x2C, 0x04];
//! assert_eq!(format_hex_compact(&payload), "80 1d 2c 04");
//! assert!(pretty_hex(0x2000_0000, &payload, 16).starts_with("20000000:"));
//! ```

/// Format bytes as "80 1d 2c 04"
pub fn format_hex_compact(data: &[u8]) -> String {
    let encoded = hex::encode(data);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / 2);
    for (i, digit) in encoded.chars().enumerate() {
        if i > 0 && i % 2 == 0 {
            out.push(' ');
        }
        out.push(digit);
    }
    out
}

/// Hex dump with ARM addresses, `bytes_per_line` bytes per row
pub fn pretty_hex(base_addr: u32, data: &[u8], bytes_per_line: usize) -> String {
    let width = bytes_per_line.max(1);
    data.chunks(width)
        .enumerate()
        .map(|(i, chunk)| {
            let addr = base_addr.wrapping_add((i * width) as u32);
            format!("{addr:08x}: {}", hex::encode(chunk))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_compact() {
        assert_eq!(format_hex_compact(&[0x0a, 0xff]), "0a ff");
        assert_eq!(format_hex_compact(&[]), "");
    }

    #[test]
    fn test_format_compact_matches_pretty_rows() {
        let data = [0x00, 0x1d, 0xa0, 0xff, 0x07];
        let compact = format_hex_compact(&data);
        assert_eq!(compact, "00 1d a0 ff 07");
        assert_eq!(compact.replace(' ', ""), hex::encode(data));
        assert_eq!(format_hex_compact(&[0x7f]), "7f");
    }

    #[test]
    fn test_pretty_hex_rows_carry_addresses() {
        let data: Vec<u8> = (0..20).collect();
        let dump = pretty_hex(0x2000_0100, &data, 16);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "20000100: 000102030405060708090a0b0c0d0e0f");
        assert_eq!(lines[1], "20000110: 10111213");
    }
}
