//! Fixed-size block reader
//!
//! Cuts the input into `blocksize` chunks, in order, and tags each one with
//! the timestamp found in it.

pub mod split;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::error::Result;
use crate::parsers::locate_timestamp;
use crate::types::{Block, RecoverConfig, TimestampSource};

pub use split::{InputStream, SplitImage};

pub struct BlockReader<R> {
    inner: R,
    blocksize: usize,
    source: TimestampSource,
    offset: u64,
    done: bool,
}

impl BlockReader<InputStream> {
    /// Read `image` block-wise, all pieces back to back
    pub async fn open(image: &SplitImage, config: &RecoverConfig) -> Result<Self> {
        Self::new(image.stream().await?, config)
    }
}

impl<R> BlockReader<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(inner: R, config: &RecoverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner,
            blocksize: config.blocksize,
            source: config.source,
            offset: 0,
            done: false,
        })
    }

    /// Offset of the next block to be read
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the next full block.
    ///
    /// `Ok(None)` marks the end of input. A trailing block shorter than
    /// `blocksize` is not returned.
    pub async fn next_block(&mut self) -> Result<Option<Block>> {
        if self.done {
            return Ok(None);
        }
        let mut buf = BytesMut::zeroed(self.blocksize);
        let filled = read_full(&mut self.inner, &mut buf).await?;
        if filled < self.blocksize {
            self.done = true;
            if filled > 0 {
                debug!(offset = self.offset, bytes = filled, "partial trailing block dropped");
            }
            return Ok(None);
        }

        let data: Bytes = buf.freeze();
        let timestamp = locate_timestamp(self.source, &data);
        let block = Block::new(self.offset, data, timestamp);
        self.offset += self.blocksize as u64;
        Ok(Some(block))
    }
}

/// Fill `buf` unless the input ends first; returns the number of bytes read
async fn read_full<R>(r: &mut R, buf: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]).await? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}
