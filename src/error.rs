//! Error types for stream recovery.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for recovery operations.
pub type Result<T> = std::result::Result<T, RecoverError>;

/// Error type for recovery operations.
#[derive(Debug, Error)]
pub enum RecoverError {
    /// A clock value does not fit in 33 bits.
    #[error("timestamp out of range: {ticks} exceeds 2^33 - 1")]
    OutOfRangeTimestamp { ticks: u64 },

    /// A block did not follow its predecessor by exactly one block size.
    #[error("non-monotonic block offset: expected {expected}, found {found}")]
    NonMonotonicOffset { expected: u64, found: u64 },

    /// A block sits so close to the end of the address space that its end
    /// offset cannot be represented.
    #[error("block offset {offset} overflows with block size {blocksize}")]
    OffsetOverflow { offset: u64, blocksize: u64 },

    /// An input file could not be opened or measured.
    #[error("cannot read input {}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration rejected before the run started.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error while reading blocks or writing fragments.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl RecoverError {
    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub(crate) fn input(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Input {
            path: path.into(),
            source,
        }
    }
}
