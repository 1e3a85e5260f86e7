//! Constants for MPEG stream recovery

/// Program stream pack header constants
pub const PACK_START_CODE: [u8; 4] = [0x00, 0x00, 0x01, 0xBA];
pub const PACK_SCR_LEN: usize = 9; // start code + marker bits + SCR base

/// PES packet constants
pub const PES_START_CODE: [u8; 3] = [0x00, 0x00, 0x01];
pub const PES_PTS_HEADER_LEN: usize = 14; // start code .. last PTS byte

/// PTS / SCR constants
pub const PTS_CLOCK_HZ: u64 = 90_000; // 90 kHz
pub const PTS_BITS: u32 = 33;
pub const PTS_MAX: u64 = (1u64 << PTS_BITS) - 1; // 33-bit counter
pub const TIMESTAMP_BYTES: usize = 5;

/// Recovery defaults
pub const DEFAULT_BLOCKSIZE: usize = 2048;
pub const DEFAULT_GAPSIZE: u64 = PTS_CLOCK_HZ; // 1 second
pub const DEFAULT_DISCARDSIZE: u64 = PTS_CLOCK_HZ * 60 * 5; // 5 minutes

/// Exported file naming
pub const RECORDING_PREFIX: &str = "recording_";
pub const RECORDING_EXTENSION: &str = "mpg";
