//! 33-bit MPEG clock values (PTS / DTS / SCR base).
//!
//! The clock runs at 90 kHz and wraps after 2^33 ticks (~26.5 hours). On the
//! wire and in reports a timestamp has a 5-byte big-endian view whose first
//! byte only ever carries bit 32.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::constants::{PTS_CLOCK_HZ, PTS_MAX, TIMESTAMP_BYTES};
use crate::error::{RecoverError, Result};

/// A 33-bit unsigned clock value.
///
/// Ordering is plain magnitude ordering, which is the same as comparing the
/// big-endian byte view from the most significant byte down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);
    pub const MAX: Timestamp = Timestamp(PTS_MAX);

    /// Build a timestamp from a tick count, rejecting anything wider than 33 bits.
    pub fn from_ticks(ticks: u64) -> Result<Self> {
        if ticks > PTS_MAX {
            return Err(RecoverError::OutOfRangeTimestamp { ticks });
        }
        Ok(Self(ticks))
    }

    /// For values assembled from exactly 33 decoded bits.
    pub(crate) const fn from_ticks_masked(ticks: u64) -> Self {
        Self(ticks & PTS_MAX)
    }

    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Decode the 5-byte big-endian view. Only bit 0 of the first byte may be set.
    pub fn from_bytes(bytes: [u8; TIMESTAMP_BYTES]) -> Result<Self> {
        let ticks = bytes
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
        Self::from_ticks(ticks)
    }

    /// The 5-byte big-endian view.
    pub fn to_bytes(self) -> [u8; TIMESTAMP_BYTES] {
        let be = self.0.to_be_bytes();
        [be[3], be[4], be[5], be[6], be[7]]
    }

    /// Absolute distance between two timestamps, `|self - other|`.
    pub fn difference(self, other: Timestamp) -> Timestamp {
        Timestamp(self.0.abs_diff(other.0))
    }

    pub fn greater_than(self, other: Timestamp) -> bool {
        self > other
    }

    pub fn less_than(self, other: Timestamp) -> bool {
        self < other
    }

    /// Wall-clock length of this many ticks at 90 kHz.
    pub fn as_duration(self) -> Duration {
        let secs = self.0 / PTS_CLOCK_HZ;
        let rem = self.0 % PTS_CLOCK_HZ;
        // 90_000 ticks per second -> one tick is 100_000 / 9 ns
        Duration::new(secs, (rem * 100_000 / 9) as u32)
    }
}

/// Free-function form of [`Timestamp::difference`].
pub fn difference(a: Timestamp, b: Timestamp) -> Timestamp {
    a.difference(b)
}

impl TryFrom<u64> for Timestamp {
    type Error = RecoverError;

    fn try_from(ticks: u64) -> Result<Self> {
        Self::from_ticks(ticks)
    }
}

impl From<Timestamp> for u64 {
    fn from(ts: Timestamp) -> u64 {
        ts.0
    }
}

impl fmt::Display for Timestamp {
    /// `HH:MM:SS.mmm`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.0 / (PTS_CLOCK_HZ / 1000);
        let (secs, ms) = (millis / 1000, millis % 1000);
        let (mins, s) = (secs / 60, secs % 60);
        let (h, m) = (mins / 60, mins % 60);
        write!(f, "{h:02}:{m:02}:{s:02}.{ms:03}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ts(ticks: u64) -> Timestamp {
        Timestamp::from_ticks(ticks).unwrap()
    }

    #[test]
    fn test_byte_view_matches_reference_value() {
        let t = ts(117_453_876);
        assert_eq!(t.to_bytes(), [0x00, 0x07, 0x00, 0x34, 0x34]);
        assert_eq!(Timestamp::from_bytes([0, 7, 0, 52, 52]).unwrap(), t);
    }

    #[test]
    fn test_byte_view_uses_bit_32() {
        let t = ts(PTS_MAX);
        assert_eq!(t.to_bytes(), [0x01, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_from_bytes_rejects_wide_values() {
        let err = Timestamp::from_bytes([0x02, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(
            err,
            RecoverError::OutOfRangeTimestamp { ticks } if ticks == 1 << 33
        ));
    }

    #[test]
    fn test_from_ticks_bounds() {
        assert!(Timestamp::from_ticks(PTS_MAX).is_ok());
        assert!(Timestamp::from_ticks(PTS_MAX + 1).is_err());
        assert!(Timestamp::try_from(u64::MAX).is_err());
    }

    #[test]
    fn test_ordering_by_magnitude() {
        let small = ts(0x00_FF_FF_FF_FF);
        let big = ts(0x01_00_00_00_00);
        assert!(big.greater_than(small));
        assert!(small.less_than(big));
        assert!(!small.greater_than(small));
        assert!(!small.less_than(small));
        assert_eq!(small, ts(0x00_FF_FF_FF_FF));
    }

    #[test]
    fn test_difference_with_borrow_chain() {
        // 0x07003434 - 0x05008888 needs borrows across several bytes
        let a = ts(117_453_876);
        let b = ts(83_921_032);
        assert_eq!(difference(a, b), ts(33_532_844));
        assert_eq!(difference(a, b).to_bytes(), [0x00, 0x01, 0xFF, 0xAB, 0xAC]);
    }

    #[test]
    fn test_difference_across_bit_32() {
        let a = ts(0x00_67_3F_53);
        let b = ts(0x01_1C_60_05_F0);
        assert_eq!(a.difference(b), ts(0x01_1B_F8_C6_9D));
        assert_eq!(b.difference(a), ts(0x01_1B_F8_C6_9D));
    }

    #[test]
    fn test_display_and_duration() {
        let five_minutes = ts(27_000_000);
        assert_eq!(five_minutes.to_string(), "00:05:00.000");
        assert_eq!(five_minutes.as_duration(), Duration::from_secs(300));
        assert_eq!(ts(90_045).to_string(), "00:00:01.000");
        assert_eq!(ts(45_000).as_duration(), Duration::from_millis(500));
    }

    proptest! {
        #[test]
        fn difference_is_commutative(a in 0..=PTS_MAX, b in 0..=PTS_MAX) {
            let (a, b) = (ts(a), ts(b));
            prop_assert_eq!(difference(a, b), difference(b, a));
        }

        #[test]
        fn difference_with_self_is_zero(a in 0..=PTS_MAX) {
            prop_assert_eq!(difference(ts(a), ts(a)), Timestamp::ZERO);
        }

        #[test]
        fn difference_is_additive_on_ordered_triples(
            x in 0..=PTS_MAX,
            y in 0..=PTS_MAX,
            z in 0..=PTS_MAX,
        ) {
            let mut v = [x, y, z];
            v.sort_unstable();
            let (a, b, c) = (ts(v[0]), ts(v[1]), ts(v[2]));
            prop_assert_eq!(
                difference(a, c).ticks(),
                difference(a, b).ticks() + difference(b, c).ticks()
            );
        }

        #[test]
        fn byte_view_preserves_order(a in 0..=PTS_MAX, b in 0..=PTS_MAX) {
            let (a, b) = (ts(a), ts(b));
            prop_assert_eq!(a.cmp(&b), a.to_bytes().cmp(&b.to_bytes()));
        }
    }
}
