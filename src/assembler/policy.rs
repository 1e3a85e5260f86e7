//! Keep/discard decision for closed fragments

use crate::types::{AssessedFragment, Fragment, RecoverConfig, Verdict};

/// Clock span of a fragment in 90 kHz ticks.
///
/// Every assembled fragment is anchored on timestamped blocks, so the span is
/// always the distance between its start and end clocks.
pub fn span(fragment: &Fragment) -> u64 {
    fragment.time_diff().ticks()
}

/// A fragment is worth keeping once it spans at least `discardsize` ticks
pub fn keep(fragment: &Fragment, discardsize: u64) -> bool {
    span(fragment) >= discardsize
}

pub fn judge(fragment: &Fragment, discardsize: u64) -> Verdict {
    if keep(fragment, discardsize) {
        Verdict::Keep
    } else {
        Verdict::Discard
    }
}

pub fn assess(fragment: Fragment, config: &RecoverConfig) -> AssessedFragment {
    AssessedFragment {
        verdict: judge(&fragment, config.discardsize),
        fragment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::Timestamp;

    fn spanning(ticks: u64) -> Fragment {
        Fragment {
            start: 0,
            end: 4096,
            start_time: Timestamp::from_ticks(1_000).unwrap(),
            end_time: Timestamp::from_ticks(1_000 + ticks).unwrap(),
        }
    }

    #[test]
    fn test_discard_boundary_is_inclusive_keep() {
        assert!(!keep(&spanning(26_999_999), 27_000_000));
        assert!(keep(&spanning(27_000_000), 27_000_000));
        assert!(keep(&spanning(27_000_001), 27_000_000));
    }

    #[test]
    fn test_zero_span_only_kept_without_threshold() {
        assert_eq!(judge(&spanning(0), 0), Verdict::Keep);
        assert_eq!(judge(&spanning(0), 1), Verdict::Discard);
    }

    #[test]
    fn test_span_ignores_clock_direction() {
        let mut f = spanning(500);
        std::mem::swap(&mut f.start_time, &mut f.end_time);
        assert_eq!(span(&f), 500);
    }

    #[test]
    fn test_assess_uses_configured_threshold() {
        let cfg = RecoverConfig {
            discardsize: 90_000,
            ..RecoverConfig::default()
        };
        assert!(assess(spanning(90_000), &cfg).verdict.is_keep());
        assert!(!assess(spanning(89_999), &cfg).verdict.is_keep());
    }
}
