// Variable-length quantities, the SMF encoding for delta times and meta
// event lengths.
//
// A value is split into 7-bit groups, most significant group first. Every
// group except the last has bit 7 set. The format caps a quantity at four
// bytes, i.e. 28 bits of payload (`MAX_VLQ`).

use crate::error::{Result, SmfError};

/// Largest value a 4-byte VLQ can hold.
pub const MAX_VLQ: u32 = 0x0FFF_FFFF;

/// Append the VLQ encoding of `value` to `out`.
pub fn write_vlq(out: &mut Vec<u8>, value: u32) -> Result<()> {
    if value > MAX_VLQ {
        return Err(SmfError::VlqOverflow(value));
    }
    let mut groups = [0u8; 4];
    let mut len = 0;
    let mut rest = value;
    loop {
        groups[len] = (rest & 0x7F) as u8;
        len += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    // `groups` is least-significant first; emit in reverse.
    for (i, group) in groups[..len].iter().enumerate().rev() {
        let continuation = if i == 0 { 0 } else { 0x80 };
        out.push(group | continuation);
    }
    Ok(())
}

/// Encode `value` into a fresh buffer.
pub fn encode_vlq(value: u32) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(4);
    write_vlq(&mut out, value)?;
    Ok(out)
}

/// Decode a VLQ from the front of `data`.
///
/// Returns the value and the number of bytes consumed.
pub fn read_vlq(data: &[u8]) -> Result<(u32, usize)> {
    let mut value: u32 = 0;
    for (i, &byte) in data.iter().enumerate().take(4) {
        value = (value << 7) | u32::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    if data.len() >= 4 {
        // Four continuation bytes in a row: longer than the format allows.
        Err(SmfError::VlqOverflow(value))
    } else {
        Err(SmfError::UnexpectedEof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_single_zero_byte() {
        assert_eq!(encode_vlq(0).unwrap(), vec![0x00]);
    }

    #[test]
    fn boundary_values() {
        assert_eq!(encode_vlq(127).unwrap(), vec![0x7F]);
        assert_eq!(encode_vlq(128).unwrap(), vec![0x81, 0x00]);
        assert_eq!(encode_vlq(0x3FFF).unwrap(), vec![0xFF, 0x7F]);
        assert_eq!(encode_vlq(0x4000).unwrap(), vec![0x81, 0x80, 0x00]);
        assert_eq!(encode_vlq(MAX_VLQ).unwrap(), vec![0xFF, 0xFF, 0xFF, 0x7F]);
    }

    #[test]
    fn continuation_bit_on_all_but_last() {
        let bytes = encode_vlq(0x0020_0000).unwrap();
        assert_eq!(bytes.len(), 4);
        for b in &bytes[..3] {
            assert_ne!(b & 0x80, 0);
        }
        assert_eq!(bytes[3] & 0x80, 0);
    }

    #[test]
    fn roundtrip_across_ranges() {
        let mut value: u32 = 1;
        while value <= MAX_VLQ {
            for v in [value - 1, value, value + 1] {
                if v > MAX_VLQ {
                    continue;
                }
                let bytes = encode_vlq(v).unwrap();
                assert_eq!(read_vlq(&bytes).unwrap(), (v, bytes.len()), "value {v}");
            }
            value <<= 1;
        }
    }

    #[test]
    fn overflow_is_rejected() {
        assert_eq!(encode_vlq(MAX_VLQ + 1), Err(SmfError::VlqOverflow(MAX_VLQ + 1)));
    }

    #[test]
    fn read_stops_at_first_terminal_byte() {
        // 480 followed by an unrelated status byte.
        let data = [0x83, 0x60, 0x90];
        assert_eq!(read_vlq(&data).unwrap(), (480, 2));
    }

    #[test]
    fn truncated_input() {
        assert_eq!(read_vlq(&[0x81]), Err(SmfError::UnexpectedEof));
        assert_eq!(read_vlq(&[]), Err(SmfError::UnexpectedEof));
    }
}
