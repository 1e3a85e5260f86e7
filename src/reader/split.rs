//! Disk images split across several files
//!
//! Dumps taken from FAT32 media are often cut into pieces. The pieces are read
//! back to back as one address space, so block offsets and fragment ranges
//! refer to the joined image.

use std::io::SeekFrom;
use std::path::PathBuf;

use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, AsyncWrite, BufReader};
use tracing::debug;

use crate::error::{RecoverError, Result};

/// Byte stream over every piece of an image, in order
pub type InputStream = Box<dyn AsyncRead + Unpin + Send>;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Piece {
    path: PathBuf,
    len: u64,
}

#[derive(Debug, Clone)]
pub struct SplitImage {
    pieces: Vec<Piece>,
}

impl SplitImage {
    /// Measure every piece; fails on the first one that cannot be read
    pub async fn open(paths: &[PathBuf]) -> Result<Self> {
        if paths.is_empty() {
            return Err(RecoverError::invalid_config("no input files given"));
        }
        let mut pieces = Vec::with_capacity(paths.len());
        for path in paths {
            let meta = fs::metadata(path)
                .await
                .map_err(|e| RecoverError::input(path, e))?;
            debug!(path = %path.display(), len = meta.len(), "input piece");
            pieces.push(Piece {
                path: path.clone(),
                len: meta.len(),
            });
        }
        Ok(Self { pieces })
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.pieces.iter().map(|p| &p.path)
    }

    /// Combined length as measured at open time
    pub fn len(&self) -> u64 {
        self.pieces.iter().map(|p| p.len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Open every piece and chain them into one stream
    pub async fn stream(&self) -> Result<InputStream> {
        let mut stream: InputStream = Box::new(tokio::io::empty());
        for piece in &self.pieces {
            let file = File::open(&piece.path)
                .await
                .map_err(|e| RecoverError::input(&piece.path, e))?;
            stream = Box::new(stream.chain(BufReader::new(file)));
        }
        Ok(stream)
    }

    /// Copy image bytes `[start, end)` into `dst`; returns the number copied.
    ///
    /// The last piece has no upper bound, so a device that reports no length
    /// is still read to its end. A short count means the image ended early.
    pub async fn copy_range<W>(&self, start: u64, end: u64, dst: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let mut copied = 0u64;
        let mut base = 0u64;
        let last = self.pieces.len().saturating_sub(1);
        for (i, piece) in self.pieces.iter().enumerate() {
            if base >= end {
                break;
            }
            let piece_end = if i == last {
                u64::MAX
            } else {
                base.saturating_add(piece.len)
            };
            let from = start.max(base);
            let to = end.min(piece_end);
            if from < to {
                let mut file = File::open(&piece.path)
                    .await
                    .map_err(|e| RecoverError::input(&piece.path, e))?;
                file.seek(SeekFrom::Start(from - base)).await?;
                let n = tokio::io::copy(&mut file.take(to - from), dst).await?;
                copied += n;
                if n < to - from {
                    break;
                }
            }
            base = piece_end;
        }
        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn image(dir: &std::path::Path, pieces: &[&[u8]]) -> SplitImage {
        let mut paths = Vec::new();
        for (i, bytes) in pieces.iter().enumerate() {
            let path = dir.join(format!("dump.{i:03}"));
            std::fs::write(&path, bytes).unwrap();
            paths.push(path);
        }
        SplitImage::open(&paths).await.unwrap()
    }

    #[tokio::test]
    async fn test_pieces_read_as_one_stream() {
        let dir = tempfile::tempdir().unwrap();
        let img = image(dir.path(), &[b"abcde", b"", b"fgh"]).await;
        assert_eq!(img.len(), 8);
        assert_eq!(img.paths().count(), 3);

        let mut out = Vec::new();
        img.stream().await.unwrap().read_to_end(&mut out).await.unwrap();
        assert_eq!(out, b"abcdefgh");
    }

    #[tokio::test]
    async fn test_range_across_piece_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let img = image(dir.path(), &[b"abcde", b"fgh", b"ijkl"]).await;

        let mut out = Vec::new();
        assert_eq!(img.copy_range(3, 10, &mut out).await.unwrap(), 7);
        assert_eq!(out, b"defghij");

        let mut tail = Vec::new();
        assert_eq!(img.copy_range(9, 20, &mut tail).await.unwrap(), 3);
        assert_eq!(tail, b"jkl");
    }

    #[tokio::test]
    async fn test_missing_piece_is_named() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("dump.001");
        let err = SplitImage::open(&[missing.clone()]).await.unwrap_err();
        assert!(matches!(err, RecoverError::Input { ref path, .. } if *path == missing));
    }

    #[tokio::test]
    async fn test_no_pieces_rejected() {
        assert!(matches!(
            SplitImage::open(&[]).await,
            Err(RecoverError::InvalidConfig(_))
        ));
    }
}
