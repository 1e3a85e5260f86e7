//! Common parsing utilities

use bitstream_io::{BigEndian, BitRead, BitReader};

/// Read a 33-bit clock split as `[32..30] marker [29..15] marker [14..0] marker`.
///
/// This layout is shared by the pack header SCR base and the PES PTS/DTS
/// fields. Returns `None` if any marker bit is cleared or the input runs out.
pub fn read_marked_clock<R: std::io::Read>(br: &mut BitReader<R, BigEndian>) -> Option<u64> {
    let hi = br.read::<3, u64>().ok()?;
    marker(br)?;
    let mid = br.read::<15, u64>().ok()?;
    marker(br)?;
    let lo = br.read::<15, u64>().ok()?;
    marker(br)?;
    Some((hi << 30) | (mid << 15) | lo)
}

fn marker<R: std::io::Read>(br: &mut BitReader<R, BigEndian>) -> Option<()> {
    br.read_bit().ok()?.then_some(())
}

/// Place a 33-bit clock into the marked layout, starting with `prefix_bits`
/// of `prefix` in the high bits of the first byte. Inverse of
/// [`read_marked_clock`]; used to build synthetic headers.
pub fn write_marked_clock(prefix: u8, prefix_bits: u32, clock: u64) -> [u8; 5] {
    let mut v: u64 = u64::from(prefix) & ((1 << prefix_bits) - 1);
    v = (v << 3) | ((clock >> 30) & 0x7);
    v = (v << 1) | 1;
    v = (v << 15) | ((clock >> 15) & 0x7FFF);
    v = (v << 1) | 1;
    v = (v << 15) | (clock & 0x7FFF);
    v = (v << 1) | 1;
    // prefix_bits + 36 bits, left-aligned into 40
    v <<= 40 - (prefix_bits as u64 + 36);
    let be = v.to_be_bytes();
    [be[3], be[4], be[5], be[6], be[7]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marked_clock_layout() {
        let bytes = write_marked_clock(0b0010, 4, 0x1_2345_6789);
        let mut br = BitReader::endian(&bytes[..], BigEndian);
        assert_eq!(br.read::<4, u8>().unwrap(), 0b0010);
        assert_eq!(read_marked_clock(&mut br), Some(0x1_2345_6789));
    }

    #[test]
    fn test_cleared_marker_is_rejected() {
        let mut bytes = write_marked_clock(0b0010, 4, 90_000);
        bytes[0] &= !0x01; // first marker sits right after the 3 high bits
        let mut br = BitReader::endian(&bytes[..], BigEndian);
        br.skip(4).unwrap();
        assert_eq!(read_marked_clock(&mut br), None);
    }
}
