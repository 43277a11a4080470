//! The block scan that turns zero blocks into holes.

use std::cmp;
use std::io::{self, ErrorKind, Read};

use indicatif::ProgressBar;
use log::{debug, trace};

use crate::result::{Error, Result};
use crate::sys::PunchHole;
use crate::zero::is_zero;

/// Largest block the scan will hold in memory at once.
pub const MAX_BLOCK_SIZE: usize = 1 << 30;

/// What a completed scan did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Bytes read, equal to the logical size of the file on success.
    pub bytes_scanned: u64,
    pub blocks_scanned: u64,
    /// Blocks found to be all zero, punched or not.
    pub zero_blocks: u64,
    /// Bytes handed to the hole punch. Always 0 in dry-run mode.
    pub bytes_punched: u64,
}

/// Scans a file block by block and punches a hole for every all-zero block.
///
/// Each block is deallocated for exactly the number of bytes read, so the
/// final partial block never asks for a range past the end of the file. The
/// first failing read or hole punch aborts the scan; holes punched before
/// that point stay in place.
#[derive(Clone)]
pub struct Sparsifier {
    chunk_size: usize,
    dry_run: bool,
    progress: ProgressBar,
}

impl Sparsifier {
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::ZeroChunkSize);
        }

        Ok(Self {
            chunk_size,
            dry_run: false,
            progress: ProgressBar::hidden(),
        })
    }

    /// Detect zero blocks without deallocating them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Advance `progress` by the size of every scanned block.
    pub fn progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Scans the first `len` bytes of `file`, starting at its current
    /// position, which is taken to be offset 0.
    pub fn scan<F: Read + PunchHole>(&self, file: &mut F, len: u64) -> Result<ScanReport> {
        let mut report = ScanReport::default();
        let mut block = vec![0; self.chunk_size];

        let mut offset = 0;
        while offset < len {
            let size = cmp::min(self.chunk_size as u64, len - offset) as usize;
            let buf = &mut block[..size];
            read_block(file, buf, offset)?;

            let size = size as u64;
            if is_zero(buf) {
                report.zero_blocks += 1;
                if self.dry_run {
                    debug!("zero block @ {} ({} bytes)", offset, size);
                } else {
                    file.punch_hole(offset, size)
                        .map_err(|source| Error::HolePunch {
                            offset,
                            len: size,
                            source,
                        })?;
                    report.bytes_punched += size;
                    debug!("punched hole @ {} ({} bytes)", offset, size);
                }
            } else {
                trace!("data block @ {} ({} bytes)", offset, size);
            }

            report.blocks_scanned += 1;
            offset += size;
            report.bytes_scanned = offset;
            self.progress.inc(size);
        }

        Ok(report)
    }
}

/// Reads the block with a single `read`. Anything short of a full block,
/// including an interrupted read, is a short read.
fn read_block<R: Read>(r: &mut R, buf: &mut [u8], offset: u64) -> Result<()> {
    let expected = buf.len();
    let short_read = |actual: usize, source: io::Error| Error::ShortRead {
        offset,
        expected,
        actual,
        source,
    };

    match r.read(buf) {
        Ok(n) if n == expected => Ok(()),
        Ok(n) => Err(short_read(n, io::Error::from(ErrorKind::UnexpectedEof))),
        Err(e) => Err(short_read(0, e)),
    }
}
