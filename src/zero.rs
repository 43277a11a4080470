//! Fast detection of all-zero blocks.

use std::mem;

const WORD: usize = mem::size_of::<usize>();
const LANES: usize = 4;
const STRIDE: usize = WORD * LANES;

/// Returns `true` if every byte of `buf` is zero. An empty buffer is zero.
///
/// The bulk of the buffer is OR-ed together a word at a time into `LANES`
/// independent accumulators, which are only folded into a single flag once
/// the whole buffer has been visited. Bytes that don't fill a whole stride
/// are compared one by one.
pub fn is_zero(buf: &[u8]) -> bool {
    let mut strides = buf.chunks_exact(STRIDE);

    let mut acc = [0_usize; LANES];
    for stride in &mut strides {
        for (lane, word) in acc.iter_mut().zip(stride.chunks_exact(WORD)) {
            *lane |= load_word(word);
        }
    }
    let words_zero = acc.iter().fold(0, |folded, lane| folded | lane) == 0;

    let tail_zero = strides.remainder().iter().all(|&b| b == 0);

    words_zero && tail_zero
}

fn load_word(word: &[u8]) -> usize {
    let mut bytes = [0; WORD];
    bytes.copy_from_slice(word);
    usize::from_ne_bytes(bytes)
}
