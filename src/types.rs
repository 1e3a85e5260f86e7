use std::path::PathBuf;

use bytes::Bytes;
use serde::Serialize;

use crate::constants::{DEFAULT_BLOCKSIZE, DEFAULT_DISCARDSIZE, DEFAULT_GAPSIZE};
use crate::error::{RecoverError, Result};
use crate::timestamp::Timestamp;

/// Where in a block the clock value is looked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimestampSource {
    /// SCR of a program stream pack header at the start of the block
    #[default]
    Pack,
    /// PTS of the first audio/video PES header found anywhere in the block
    Pes,
}

/// Thresholds and switches for one recovery run
#[derive(Debug, Clone, Serialize)]
pub struct RecoverConfig {
    /// Bytes per read unit
    pub blocksize: usize,
    /// Largest tolerated clock jump between blocks, in 90 kHz ticks
    pub gapsize: u64,
    /// Minimum fragment span worth keeping, in 90 kHz ticks
    pub discardsize: u64,
    /// Close the open fragment at a block without a timestamp
    pub split_on_untimed: bool,
    /// Close the open fragment when the clock runs backwards
    pub split_on_backward: bool,
    /// Link kept fragments whose clocks continue within this many ticks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_gap: Option<u64>,
    pub source: TimestampSource,
}

impl Default for RecoverConfig {
    fn default() -> Self {
        Self {
            blocksize: DEFAULT_BLOCKSIZE,
            gapsize: DEFAULT_GAPSIZE,
            discardsize: DEFAULT_DISCARDSIZE,
            split_on_untimed: false,
            split_on_backward: false,
            chain_gap: None,
            source: TimestampSource::default(),
        }
    }
}

impl RecoverConfig {
    pub fn validate(&self) -> Result<()> {
        if self.blocksize == 0 {
            return Err(RecoverError::invalid_config("blocksize must be positive"));
        }
        Ok(())
    }

    pub fn blocksize_u64(&self) -> u64 {
        self.blocksize as u64
    }
}

/// Configuration options for a recovery run
#[derive(Debug, Clone)]
pub struct Options {
    /// Input image, or the pieces of one image split across several files,
    /// in order
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub config: RecoverConfig,
    /// Analyse only, write nothing
    pub dry_run: bool,
}

/// One fixed-size read unit of the input
#[derive(Debug, Clone)]
pub struct Block {
    /// Byte offset of the first byte of this block
    pub offset: u64,
    pub data: Bytes,
    pub timestamp: Option<Timestamp>,
}

impl Block {
    pub fn new(offset: u64, data: Bytes, timestamp: Option<Timestamp>) -> Self {
        Self { offset, data, timestamp }
    }

    /// Block without payload, for driving the assembler directly
    pub fn marker(offset: u64, timestamp: Option<Timestamp>) -> Self {
        Self::new(offset, Bytes::new(), timestamp)
    }
}

/// A contiguous, time-continuous byte range `[start, end)` of the input.
///
/// The assembler always produces `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub start: u64,
    pub end: u64,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

impl Fragment {
    /// Length in bytes; zero for a hand-built range with `end < start`
    pub fn size(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// `|end_time - start_time|`
    pub fn time_diff(&self) -> Timestamp {
        self.end_time.difference(self.start_time)
    }

    pub fn block_count(&self, blocksize: u64) -> u64 {
        self.size().div_ceil(blocksize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Keep,
    Discard,
}

impl Verdict {
    pub fn is_keep(self) -> bool {
        self == Verdict::Keep
    }
}

/// A closed fragment together with the discard policy's decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssessedFragment {
    #[serde(flatten)]
    pub fragment: Fragment,
    pub verdict: Verdict,
}

/// Kept fragments exported together, in playback order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recording {
    pub index: usize,
    pub parts: Vec<Fragment>,
}

impl Recording {
    pub fn size(&self) -> u64 {
        self.parts.iter().map(Fragment::size).sum()
    }

    pub fn start_time(&self) -> Option<Timestamp> {
        self.parts.first().map(|f| f.start_time)
    }

    pub fn end_time(&self) -> Option<Timestamp> {
        self.parts.last().map(|f| f.end_time)
    }
}

/// Counters for a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub blocks: u64,
    pub timestamped_blocks: u64,
    pub fragments: u64,
    pub kept: u64,
    pub discarded: u64,
    pub recordings: u64,
    pub bytes_written: u64,
}

impl RunSummary {
    /// The input carried no timestamp at all, so nothing could be anchored
    pub fn no_timestamps(&self) -> bool {
        self.timestamped_blocks == 0
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecoveryOutcome {
    pub fragments: Vec<AssessedFragment>,
    pub recordings: Vec<Recording>,
    /// Files written, one per recording; empty on a dry run
    pub files: Vec<PathBuf>,
    pub summary: RunSummary,
}

impl RecoveryOutcome {
    pub fn kept(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments
            .iter()
            .filter(|a| a.verdict.is_keep())
            .map(|a| &a.fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(start: u64, end: u64) -> Fragment {
        Fragment {
            start,
            end,
            start_time: Timestamp::ZERO,
            end_time: Timestamp::from_ticks(90_000).unwrap(),
        }
    }

    #[test]
    fn test_fragment_size_and_blocks() {
        let f = fragment(4096, 10_240);
        assert_eq!(f.size(), 6144);
        assert_eq!(f.block_count(2048), 3);
        assert_eq!(f.time_diff().ticks(), 90_000);
    }

    #[test]
    fn test_inverted_fragment_has_no_size() {
        let f = fragment(8192, 4096);
        assert_eq!(f.size(), 0);
        assert_eq!(f.block_count(2048), 0);
        let rec = Recording {
            index: 0,
            parts: vec![f, fragment(0, 2048)],
        };
        assert_eq!(rec.size(), 2048);
    }
}
