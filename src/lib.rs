// src/lib.rs
pub mod recover {
    pub use crate::types::{Options, RecoverConfig, RecoveryOutcome, TimestampSource};

    /// Async entry-point; scans `opts.inputs` as one image and exports what survives to `opts.output`
    pub async fn run(opts: Options) -> anyhow::Result<RecoveryOutcome> {
        crate::core::recover(&opts).await
    }
}

pub mod assembler;
pub mod constants;
pub mod error;
pub mod parsers;
pub mod reader;
pub mod recording;
pub mod report;
pub mod timestamp;
pub mod types;
pub mod writer;
mod core;

pub use assembler::{assemble, Assembler, Fragments};
pub use crate::core::scan;
pub use error::{RecoverError, Result};
pub use timestamp::{difference, Timestamp};
pub use types::{AssessedFragment, Block, Fragment, Recording, RunSummary, Verdict};
