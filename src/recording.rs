//! Grouping kept fragments into recordings
//!
//! A damaged disk often holds one recording scattered over several fragments.
//! When a chain gap is configured, fragments whose clocks pick up where
//! another one stopped are exported together, in clock order.

use tracing::debug;

use crate::types::{Fragment, Recording};

/// Build recordings out of kept fragments.
///
/// Without `chain_gap` every fragment becomes its own recording, in input
/// order. With it, fragments are visited by start clock and each one is
/// followed by the unused fragment starting closest after its end clock, as
/// long as that distance is at most `chain_gap` ticks.
pub fn chain_recordings(kept: &[Fragment], chain_gap: Option<u64>) -> Vec<Recording> {
    let Some(gap) = chain_gap else {
        return kept
            .iter()
            .enumerate()
            .map(|(index, f)| Recording { index, parts: vec![*f] })
            .collect();
    };

    let mut order: Vec<usize> = (0..kept.len()).collect();
    order.sort_by_key(|&i| (kept[i].start_time, kept[i].start));

    let mut used = vec![false; kept.len()];
    let mut recordings = Vec::new();

    for &head in &order {
        if used[head] {
            continue;
        }
        used[head] = true;
        let mut parts = vec![kept[head]];
        let mut current = head;

        while let Some(next) = next_part(kept, &order, &used, current, gap) {
            debug!(
                from = kept[current].start,
                to = kept[next].start,
                "fragments chained"
            );
            used[next] = true;
            parts.push(kept[next]);
            current = next;
        }

        recordings.push(Recording {
            index: recordings.len(),
            parts,
        });
    }
    recordings
}

fn next_part(kept: &[Fragment], order: &[usize], used: &[bool], current: usize, gap: u64) -> Option<usize> {
    let end = kept[current].end_time;
    order
        .iter()
        .copied()
        .filter(|&j| !used[j] && kept[j].start_time >= end)
        .map(|j| (kept[j].start_time.difference(end).ticks(), j))
        .filter(|&(delta, _)| delta <= gap)
        .min_by_key(|&(delta, _)| delta)
        .map(|(_, j)| j)
}
