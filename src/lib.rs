//! Turn a regular file into a sparse one by punching holes where its blocks
//! are entirely zero. The logical size and contents of the file don't change.

pub mod result;
pub mod sparsify;
pub mod sys;
pub mod target;
pub mod zero;

pub use result::{Error, ErrorKind, Result};
pub use sparsify::{ScanReport, Sparsifier, MAX_BLOCK_SIZE};
pub use sys::PunchHole;
pub use target::Target;
pub use zero::is_zero;
