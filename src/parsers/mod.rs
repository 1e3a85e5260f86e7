//! Timestamp locators
//!
//! Each locator looks at the raw bytes of one block and returns the clock
//! value it carries, if any. Nothing here demultiplexes the stream.

mod pack;
mod pes;
mod utils;

pub use pack::{build_pack_header, is_pack_header, parse_pack_scr};
pub use pes::{build_pes_header, find_pes_pts};

use crate::timestamp::Timestamp;
use crate::types::TimestampSource;

/// Locate the timestamp of a block according to `source`
pub fn locate_timestamp(source: TimestampSource, data: &[u8]) -> Option<Timestamp> {
    match source {
        TimestampSource::Pack => parse_pack_scr(data),
        TimestampSource::Pes => find_pes_pts(data),
    }
}
