//! The file being made sparse.

use std::fs::{File, OpenOptions};
use std::io::Seek;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use log::info;

use crate::result::{Error, Result};
use crate::sparsify::{ScanReport, Sparsifier, MAX_BLOCK_SIZE};

/// `st_blocks` is counted in 512-byte units regardless of the file system.
const STAT_BLOCK_SIZE: u64 = 512;

/// A regular file opened for reading and writing, together with the size and
/// preferred I/O block size it had when it was opened.
#[derive(Debug)]
pub struct Target {
    path: PathBuf,
    file: File,
    len: u64,
    block_size: usize,
}

impl Target {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| Error::Open {
                path: path.clone(),
                source,
            })?;

        let metadata = file.metadata().map_err(|source| Error::Stat {
            path: path.clone(),
            source,
        })?;
        if !metadata.file_type().is_file() {
            return Err(Error::NotRegularFile { path });
        }

        let block_size = clamp_block_size(metadata.blksize());
        info!(
            "{}: {} bytes, preferred block size {}",
            path.display(),
            metadata.len(),
            block_size
        );

        Ok(Self {
            len: metadata.len(),
            path,
            file,
            block_size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Logical size in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Preferred I/O block size reported by the file system.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Bytes of storage currently allocated to the file.
    pub fn allocated_bytes(&self) -> Result<u64> {
        let metadata = self.file.metadata().map_err(|source| Error::Stat {
            path: self.path.clone(),
            source,
        })?;
        Ok(metadata.blocks() * STAT_BLOCK_SIZE)
    }

    /// Runs `sparsifier` over the whole file, from offset 0 to the size
    /// recorded at open time.
    pub fn sparsify(&self, sparsifier: &Sparsifier) -> Result<ScanReport> {
        let mut file = &self.file;
        file.rewind()
            .map_err(|source| Error::Rewind { source })?;
        sparsifier.scan(&mut file, self.len)
    }
}

/// Bounds the preferred I/O size to what a single block buffer may hold.
fn clamp_block_size(blksize: u64) -> usize {
    usize::try_from(blksize)
        .unwrap_or(usize::MAX)
        .min(MAX_BLOCK_SIZE)
}
