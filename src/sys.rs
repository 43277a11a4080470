//! Hole punching syscall wrapper.

use std::fs::File;
use std::io;

use cfg_if::cfg_if;

/// Something whose backing storage can be released for a byte range without
/// changing its logical size.
pub trait PunchHole {
    /// Deallocates `[offset, offset + len)`. The range reads back as zeros
    /// afterwards and the length of the file is left untouched.
    fn punch_hole(&mut self, offset: u64, len: u64) -> io::Result<()>;
}

impl PunchHole for File {
    fn punch_hole(&mut self, offset: u64, len: u64) -> io::Result<()> {
        punch_hole(self, offset, len)
    }
}

impl PunchHole for &File {
    fn punch_hole(&mut self, offset: u64, len: u64) -> io::Result<()> {
        punch_hole(self, offset, len)
    }
}

cfg_if! {
    if #[cfg(target_os = "linux")] {
        use std::os::fd::AsRawFd;

        /// `fallocate64` so that offsets stay 64-bit on 32-bit targets too.
        pub fn punch_hole(file: &File, offset: u64, len: u64) -> io::Result<()> {
            let fd = file.as_raw_fd();
            let mode = libc::FALLOC_FL_PUNCH_HOLE | libc::FALLOC_FL_KEEP_SIZE;
            let offset = to_off64(offset)?;
            let len = to_off64(len)?;
            if -1 == unsafe { libc::fallocate64(fd, mode, offset, len) } {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        }

        fn to_off64(value: u64) -> io::Result<libc::off64_t> {
            value.try_into().map_err(|_| {
                io::Error::new(io::ErrorKind::InvalidInput, "offset does not fit in off64_t")
            })
        }
    } else {
        pub fn punch_hole(_file: &File, _offset: u64, _len: u64) -> io::Result<()> {
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "hole punching is not supported on this platform",
            ))
        }
    }
}
