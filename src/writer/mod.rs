//! Exporting recovered byte ranges
//!
//! Each recording becomes one file in the output directory holding its parts'
//! bytes back to back, sliced straight out of the input image.

use std::io;
use std::path::PathBuf;

use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

use crate::constants::{RECORDING_EXTENSION, RECORDING_PREFIX};
use crate::error::Result;
use crate::reader::SplitImage;
use crate::types::Recording;

pub struct FragmentWriter<'a> {
    image: &'a SplitImage,
    output_dir: PathBuf,
}

impl<'a> FragmentWriter<'a> {
    /// Prepare to export from `image` into `output_dir`, creating the directory
    pub async fn create(image: &'a SplitImage, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).await?;
        Ok(Self { image, output_dir })
    }

    /// `<output>/recording_0007.mpg`
    pub fn path_for(&self, recording: &Recording) -> PathBuf {
        self.output_dir.join(format!(
            "{RECORDING_PREFIX}{:04}.{RECORDING_EXTENSION}",
            recording.index
        ))
    }

    /// Write one recording; returns the number of bytes written
    pub async fn write(&self, recording: &Recording) -> Result<u64> {
        let path = self.path_for(recording);
        let mut dst = BufWriter::new(File::create(&path).await?);

        let mut total = 0u64;
        for part in &recording.parts {
            let copied = self.image.copy_range(part.start, part.end, &mut dst).await?;
            if copied < part.size() {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "input ended at {} inside fragment [{}, {})",
                        part.start + copied,
                        part.start,
                        part.end
                    ),
                )
                .into());
            }
            debug!(start = part.start, end = part.end, "fragment copied");
            total += copied;
        }
        dst.flush().await?;

        info!(path = %path.display(), bytes = total, parts = recording.parts.len(), "recording written");
        Ok(total)
    }
}
