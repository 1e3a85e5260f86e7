//! Program stream pack header (MPEG-2)
//!
//! ```text
//!  sync bytes              32  0x000001BA
//!  marker bits              2  01b
//!  SCR base [32..30]        3
//!  marker bit               1
//!  SCR base [29..15]       15
//!  marker bit               1
//!  SCR base [14..0]        15
//!  marker bit               1
//! ```
//!
//! DVR recordings are written as a sequence of 2048-byte packs, so a block that
//! still holds intact data starts with one of these headers.

use bitstream_io::{BigEndian, BitRead, BitReader};

use super::utils::read_marked_clock;
use crate::constants::{PACK_SCR_LEN, PACK_START_CODE};
use crate::timestamp::Timestamp;

/// Check the start code and marker bits of a pack header at the start of `data`
pub fn is_pack_header(data: &[u8]) -> bool {
    parse_pack_scr(data).is_some()
}

/// Decode the SCR base of the pack header at the start of `data`
pub fn parse_pack_scr(data: &[u8]) -> Option<Timestamp> {
    if data.len() < PACK_SCR_LEN || data[..4] != PACK_START_CODE {
        return None;
    }
    let mut br = BitReader::endian(&data[4..PACK_SCR_LEN], BigEndian);
    if br.read::<2, u8>().ok()? != 0b01 {
        return None; // MPEG-1 pack or garbage
    }
    read_marked_clock(&mut br).map(Timestamp::from_ticks_masked)
}

/// Build the first bytes of a pack header carrying `scr`
pub fn build_pack_header(scr: Timestamp) -> [u8; PACK_SCR_LEN] {
    let clock = super::utils::write_marked_clock(0b01, 2, scr.ticks());
    let mut out = [0u8; PACK_SCR_LEN];
    out[..4].copy_from_slice(&PACK_START_CODE);
    out[4..].copy_from_slice(&clock);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(scr_bytes: [u8; 5]) -> Vec<u8> {
        let mut v = PACK_START_CODE.to_vec();
        v.extend_from_slice(&scr_bytes);
        v
    }

    #[test]
    fn test_reference_headers() {
        let a = parse_pack_scr(&header([0x44, 0x06, 0x75, 0xFA, 0x9C])).unwrap();
        let b = parse_pack_scr(&header([0x65, 0xC6, 0x04, 0x2F, 0x84])).unwrap();
        assert_eq!(a.to_bytes(), [0x00, 0x00, 0x67, 0x3F, 0x53]);
        assert_eq!(b.to_bytes(), [0x01, 0x1C, 0x60, 0x05, 0xF0]);
        assert_eq!(a.difference(b).to_bytes(), [0x01, 0x1B, 0xF8, 0xC6, 0x9D]);
        assert!(a < b);
    }

    #[test]
    fn test_built_header_round_trips() {
        let scr = Timestamp::from_ticks(1_090_000).unwrap();
        let hdr = build_pack_header(scr);
        assert_eq!(parse_pack_scr(&hdr), Some(scr));
    }

    #[test]
    fn test_rejects_bad_start_code_and_markers() {
        let mut hdr = build_pack_header(Timestamp::from_ticks(5000).unwrap()).to_vec();
        assert!(is_pack_header(&hdr));

        hdr[3] = 0xBB;
        assert!(!is_pack_header(&hdr));
        hdr[3] = 0xBA;

        hdr[6] &= !0x04; // middle marker
        assert!(!is_pack_header(&hdr));
        hdr[6] |= 0x04;

        hdr[4] = (hdr[4] & 0x3F) | 0x80; // '10' instead of '01'
        assert!(!is_pack_header(&hdr));
    }

    #[test]
    fn test_short_and_zeroed_blocks() {
        assert_eq!(parse_pack_scr(&PACK_START_CODE), None);
        assert_eq!(parse_pack_scr(&[0u8; 2048]), None);
    }
}
