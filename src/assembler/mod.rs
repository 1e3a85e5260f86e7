//! Block → fragment grouping
//!
//! The assembler is a single-pass state machine. It only remembers the open
//! fragment's boundaries, so it can sit behind a reader of any size.

pub mod policy;

use tracing::{debug, trace};

use crate::error::{RecoverError, Result};
use crate::timestamp::Timestamp;
use crate::types::{Block, Fragment, RecoverConfig};

pub use policy::{assess, judge, keep, span};

#[derive(Debug, Clone, Copy)]
struct OpenFragment {
    start: u64,
    start_time: Timestamp,
    last_time: Timestamp,
    last_offset: u64,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Idle,
    Open(OpenFragment),
}

/// Why an open fragment was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cut {
    Gap(Timestamp),
    Backward,
    Untimed,
}

pub struct Assembler {
    blocksize: u64,
    gapsize: u64,
    split_on_untimed: bool,
    split_on_backward: bool,
    state: State,
    next_offset: Option<u64>,
    blocks: u64,
    timestamped_blocks: u64,
}

impl Assembler {
    pub fn new(config: &RecoverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            blocksize: config.blocksize_u64(),
            gapsize: config.gapsize,
            split_on_untimed: config.split_on_untimed,
            split_on_backward: config.split_on_backward,
            state: State::Idle,
            next_offset: None,
            blocks: 0,
            timestamped_blocks: 0,
        })
    }

    /// Feed the next block. Returns a fragment when this block closed one.
    ///
    /// Blocks must arrive exactly `blocksize` apart and end inside the `u64`
    /// offset range; anything else is an error and leaves the assembler
    /// unchanged.
    pub fn push(&mut self, block: &Block) -> Result<Option<Fragment>> {
        if let Some(expected) = self.next_offset {
            if block.offset != expected {
                return Err(RecoverError::NonMonotonicOffset {
                    expected,
                    found: block.offset,
                });
            }
        }
        let next = block
            .offset
            .checked_add(self.blocksize)
            .ok_or(RecoverError::OffsetOverflow {
                offset: block.offset,
                blocksize: self.blocksize,
            })?;
        self.next_offset = Some(next);
        self.blocks += 1;
        if block.timestamp.is_some() {
            self.timestamped_blocks += 1;
        }

        match (self.state, block.timestamp) {
            (State::Idle, None) => Ok(None),
            (State::Idle, Some(ts)) => {
                self.open(block.offset, ts);
                Ok(None)
            }
            (State::Open(mut open), Some(ts)) => {
                let gap = ts.difference(open.last_time);
                let cut = if gap.ticks() > self.gapsize {
                    Some(Cut::Gap(gap))
                } else if self.split_on_backward && ts < open.last_time {
                    Some(Cut::Backward)
                } else {
                    None
                };
                match cut {
                    Some(cut) => {
                        let closed = self.close(open, cut);
                        self.open(block.offset, ts);
                        Ok(Some(closed))
                    }
                    None => {
                        open.last_time = ts;
                        open.last_offset = block.offset;
                        self.state = State::Open(open);
                        Ok(None)
                    }
                }
            }
            (State::Open(mut open), None) => {
                if self.split_on_untimed {
                    let closed = self.close(open, Cut::Untimed);
                    self.state = State::Idle;
                    Ok(Some(closed))
                } else {
                    open.last_offset = block.offset;
                    self.state = State::Open(open);
                    Ok(None)
                }
            }
        }
    }

    /// Close the fragment still open at the end of input, if any
    pub fn finish(&mut self) -> Option<Fragment> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => None,
            State::Open(open) => Some(self.fragment(open)),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open(_))
    }

    pub fn blocks_seen(&self) -> u64 {
        self.blocks
    }

    pub fn timestamped_blocks(&self) -> u64 {
        self.timestamped_blocks
    }

    fn open(&mut self, offset: u64, ts: Timestamp) {
        trace!(offset, clock = ts.ticks(), "fragment opened");
        self.state = State::Open(OpenFragment {
            start: offset,
            start_time: ts,
            last_time: ts,
            last_offset: offset,
        });
    }

    fn close(&self, open: OpenFragment, cut: Cut) -> Fragment {
        let fragment = self.fragment(open);
        match cut {
            Cut::Gap(gap) => debug!(
                end = fragment.end,
                gap = gap.ticks(),
                "clock jump exceeds gap size, fragment closed"
            ),
            Cut::Backward => debug!(end = fragment.end, "clock ran backwards, fragment closed"),
            Cut::Untimed => debug!(end = fragment.end, "block without timestamp, fragment closed"),
        }
        fragment
    }

    // last_offset + blocksize was checked in push
    fn fragment(&self, open: OpenFragment) -> Fragment {
        Fragment {
            start: open.start,
            end: open.last_offset + self.blocksize,
            start_time: open.start_time,
            end_time: open.last_time,
        }
    }
}

/// Lazily turns a block sequence into fragments.
///
/// The first error ends the sequence; a fragment open at that point is dropped.
pub struct Fragments<I> {
    blocks: I,
    assembler: Assembler,
    done: bool,
}

impl<I> Fragments<I>
where
    I: Iterator<Item = Block>,
{
    pub fn new(blocks: I, config: &RecoverConfig) -> Result<Self> {
        Ok(Self {
            blocks,
            assembler: Assembler::new(config)?,
            done: false,
        })
    }
}

impl<I> Iterator for Fragments<I>
where
    I: Iterator<Item = Block>,
{
    type Item = Result<Fragment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        for block in self.blocks.by_ref() {
            match self.assembler.push(&block) {
                Ok(Some(fragment)) => return Some(Ok(fragment)),
                Ok(None) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        self.done = true;
        self.assembler.finish().map(Ok)
    }
}

/// Run a whole block sequence through a fresh assembler
pub fn assemble<B>(blocks: B, config: &RecoverConfig) -> Result<Vec<Fragment>>
where
    B: IntoIterator<Item = Block>,
{
    Fragments::new(blocks.into_iter(), config)?.collect()
}
