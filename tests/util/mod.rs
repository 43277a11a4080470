#![allow(dead_code)]

use std::fs::File;
use std::io::prelude::*;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use tempfile::NamedTempFile;

/// Data block followed by `zero_blocks` zero blocks and a trailing data block.
pub fn test_content(block_size: usize, zero_blocks: usize) -> Vec<u8> {
    let mut content = vec![0; block_size * (zero_blocks + 2)];
    for (i, b) in content[..block_size].iter_mut().enumerate() {
        *b = i as u8 | 1;
    }
    let last = content.len() - 1;
    content[last] = 0x66;
    content
}

pub fn write_file(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content).unwrap();
    file.as_file().sync_all().unwrap();
    file
}

pub fn read_path(path: &Path) -> Vec<u8> {
    let mut file = File::open(path).unwrap();
    read_file(&mut file)
}

pub fn read_file(file: &mut File) -> Vec<u8> {
    let mut result = Vec::new();
    file.read_to_end(&mut result).unwrap();
    result
}

/// Bytes of storage allocated to the file at `path`.
pub fn allocated(path: &Path) -> u64 {
    std::fs::metadata(path).unwrap().blocks() * 512
}

pub fn preferred_block_size(path: &Path) -> usize {
    std::fs::metadata(path).unwrap().blksize() as usize
}
