//! PES header PTS lookup
//!
//! Transport stream recordings have no pack headers; the clock shows up in the
//! optional header of audio/video PES packets instead. PES headers are not
//! aligned to block boundaries, so the whole block is scanned.

use bitstream_io::{BigEndian, BitRead, BitReader};

use super::utils::{read_marked_clock, write_marked_clock};
use crate::constants::{PES_PTS_HEADER_LEN, PES_START_CODE};
use crate::timestamp::Timestamp;

/// MPEG audio (0xC0–0xDF) or video (0xE0–0xEF) stream id
fn is_av_stream_id(stream_id: u8) -> bool {
    (0xC0..=0xEF).contains(&stream_id)
}

/// Decode the PTS of a PES header starting at `p[0]`
fn pes_pts_at(p: &[u8]) -> Option<Timestamp> {
    if p.len() < PES_PTS_HEADER_LEN || !is_av_stream_id(p[3]) {
        return None;
    }
    // '10' marker of the optional PES header
    if p[6] & 0xC0 != 0x80 {
        return None;
    }
    // PTS_DTS_flags: 10 (PTS) or 11 (PTS + DTS)
    let pts_dts_flags = (p[7] & 0xC0) >> 6;
    if pts_dts_flags & 0b10 == 0 || p[8] < 5 {
        return None;
    }
    let mut br = BitReader::endian(&p[9..PES_PTS_HEADER_LEN], BigEndian);
    let prefix = br.read::<4, u8>().ok()?;
    if prefix != 0b0010 && prefix != 0b0011 {
        return None;
    }
    read_marked_clock(&mut br).map(Timestamp::from_ticks_masked)
}

/// Find the PTS of the first audio/video PES header in `data`
pub fn find_pes_pts(data: &[u8]) -> Option<Timestamp> {
    let last = data.len().checked_sub(PES_PTS_HEADER_LEN)?;
    (0..=last)
        .filter(|&i| data[i..i + 3] == PES_START_CODE)
        .find_map(|i| pes_pts_at(&data[i..]))
}

/// Build a minimal video PES header (stream 0xE0) carrying `pts`
pub fn build_pes_header(pts: Timestamp) -> [u8; PES_PTS_HEADER_LEN] {
    let mut out = [0u8; PES_PTS_HEADER_LEN];
    out[..3].copy_from_slice(&PES_START_CODE);
    out[3] = 0xE0;
    // PES_packet_length 0: unbounded, allowed for video
    out[6] = 0x80;
    out[7] = 0x80; // PTS only
    out[8] = 5;
    out[9..].copy_from_slice(&write_marked_clock(0b0010, 4, pts.ticks()));
    out
}
