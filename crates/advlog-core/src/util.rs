//! Utility functions for advlog-core.
//!
//! Hex rendering shared by the AD decoder and the CLI.

use bytes::Buf;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Bytes per hexdump line.
pub const HEXDUMP_WIDTH: usize = 16;

/// Contiguous lowercase hex, e.g. `0a1bff`.
pub fn hex_string(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for &b in data {
        out.push(HEX_DIGITS[usize::from(b >> 4)] as char);
        out.push(HEX_DIGITS[usize::from(b & 0x0f)] as char);
    }
    out
}

/// Classic 16-bytes-per-line dump with an ASCII column.
///
/// Each line is the space-separated hex bytes, padded to full width, two
/// spaces, then the printable characters (`.` for anything else).
///
/// ```
/// use advlog_core::util::hexdump_lines;
///
/// let lines = hexdump_lines(b"AB\x00");
/// assert_eq!(lines.len(), 1);
/// assert!(lines[0].starts_with("41 42 00 "));
/// assert!(lines[0].ends_with("  AB."));
/// ```
pub fn hexdump_lines(data: &[u8]) -> Vec<String> {
    data.chunks(HEXDUMP_WIDTH)
        .map(|chunk| {
            let mut hex = String::with_capacity(HEXDUMP_WIDTH * 3);
            for (i, &b) in chunk.iter().enumerate() {
                if i > 0 {
                    hex.push(' ');
                }
                hex.push(HEX_DIGITS[usize::from(b >> 4)] as char);
                hex.push(HEX_DIGITS[usize::from(b & 0x0f)] as char);
            }
            let ascii: String = chunk
                .iter()
                .map(|&b| {
                    if b.is_ascii_graphic() || b == b' ' {
                        b as char
                    } else {
                        '.'
                    }
                })
                .collect();
            format!("{hex:<width$}  {ascii}", width = HEXDUMP_WIDTH * 3 - 1)
        })
        .collect()
}

/// Decode device-supplied text, replacing control characters with `.`.
///
/// Keeps names on one line so rendered text reads back as written.
///
/// ```
/// use advlog_core::util::printable_text;
///
/// assert_eq!(printable_text(b"tag\n> Report"), "tag.> Report");
/// ```
pub fn printable_text(data: &[u8]) -> String {
    String::from_utf8_lossy(data)
        .chars()
        .map(|c| if c.is_control() { '.' } else { c })
        .collect()
}

/// Read a little-endian u16 at the start of `data`, if present.
pub fn le16(data: &[u8]) -> Option<u16> {
    let mut buf = data.get(..2)?;
    Some(buf.get_u16_le())
}

/// Read a little-endian u32 at the start of `data`, if present.
pub fn le32(data: &[u8]) -> Option<u32> {
    let mut buf = data.get(..4)?;
    Some(buf.get_u32_le())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printable_text_masks_controls() {
        assert_eq!(printable_text(b"a\r\nb\tc\x1b[0m"), "a..b.c.[0m");
        assert_eq!(printable_text("caf\u{e9}".as_bytes()), "caf\u{e9}");
        assert_eq!(printable_text(&[0xff, b'x']), "\u{fffd}x");
    }

    #[test]
    fn test_hex_string() {
        assert_eq!(hex_string(&[]), "");
        assert_eq!(hex_string(&[0x00, 0x0a, 0xff]), "000aff");
    }

    #[test]
    fn test_hexdump_full_line() {
        let data: Vec<u8> = (0x41..0x51).collect();
        let lines = hexdump_lines(&data);
        assert_eq!(
            lines,
            ["41 42 43 44 45 46 47 48 49 4a 4b 4c 4d 4e 4f 50  ABCDEFGHIJKLMNOP"]
        );
    }

    #[test]
    fn test_hexdump_pads_partial_line() {
        let mut data = vec![0u8; 17];
        data[16] = b'z';
        let lines = hexdump_lines(&data);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), lines[1].len() + 15);
        assert!(lines[1].starts_with("7a "));
        assert!(lines[1].ends_with("  z"));
    }

    #[test]
    fn test_le_readers() {
        assert_eq!(le16(&[0x34, 0x12, 0xff]), Some(0x1234));
        assert_eq!(le16(&[0x34]), None);
        assert_eq!(le32(&[0x78, 0x56, 0x34, 0x12]), Some(0x12345678));
        assert_eq!(le32(&[0x78, 0x56, 0x34]), None);
    }
}
