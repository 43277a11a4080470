mod util;

use makesparse::{Error, Sparsifier, Target};

use util::{allocated, preferred_block_size, read_path, test_content, write_file};

/// Punches holes in `target`, or returns `None` when the file
/// system can't punch holes at all.
fn sparsify(target: &Target, chunk_size: usize) -> Option<makesparse::ScanReport> {
    let sparsifier = Sparsifier::new(chunk_size).unwrap();
    match target.sparsify(&sparsifier) {
        Ok(report) => Some(report),
        Err(Error::HolePunch { ref source, .. })
            if source.raw_os_error() == Some(libc::EOPNOTSUPP) =>
        {
            None
        }
        Err(err) => panic!("sparsify failed: {}", err),
    }
}

#[test]
fn content_is_preserved() {
    let content = test_content(4096, 5);
    let tmp = write_file(&content);

    let target = Target::open(tmp.path()).unwrap();
    let Some(report) = sparsify(&target, 4096) else {
        return;
    };

    assert_eq!(report.zero_blocks, 5);
    assert_eq!(report.bytes_punched, 5 * 4096);
    assert_eq!(read_path(tmp.path()), content);
    assert_eq!(
        std::fs::metadata(tmp.path()).unwrap().len(),
        content.len() as u64
    );
}

#[test]
fn storage_shrinks() {
    let block_size = preferred_block_size(&std::env::temp_dir()).max(4096);
    let content = test_content(block_size, 16);
    let tmp = write_file(&content);
    let before = allocated(tmp.path());

    let target = Target::open(tmp.path()).unwrap();
    if sparsify(&target, target.block_size()).is_none() {
        return;
    }

    assert!(
        allocated(tmp.path()) < before,
        "{} bytes allocated before, {} after",
        before,
        allocated(tmp.path())
    );
    assert_eq!(read_path(tmp.path()), content);
}

#[test]
fn second_run_is_a_no_op() {
    let content = test_content(4096, 3);
    let tmp = write_file(&content);
    let target = Target::open(tmp.path()).unwrap();

    let Some(first) = sparsify(&target, 4096) else {
        return;
    };
    let after_first = allocated(tmp.path());
    let second = sparsify(&target, 4096).unwrap();

    assert_eq!(first, second);
    assert_eq!(allocated(tmp.path()), after_first);
    assert_eq!(read_path(tmp.path()), content);
}

#[test]
fn partial_final_block() {
    let mut content = test_content(4096, 2);
    content.truncate(3 * 4096 - 100);
    let tmp = write_file(&content);
    let target = Target::open(tmp.path()).unwrap();

    let Some(report) = sparsify(&target, 4096) else {
        return;
    };

    assert_eq!(report.blocks_scanned, 3);
    assert_eq!(report.zero_blocks, 2);
    assert_eq!(report.bytes_punched, 2 * 4096 - 100);
    assert_eq!(report.bytes_scanned, content.len() as u64);
    assert_eq!(read_path(tmp.path()), content);
}

#[test]
fn file_shrunk_after_open_is_a_short_read() {
    let content = test_content(4096, 2);
    let tmp = write_file(&content);
    let target = Target::open(tmp.path()).unwrap();
    tmp.as_file().set_len(4096 + 1000).unwrap();

    let sparsifier = Sparsifier::new(4096).unwrap().dry_run(true);
    let err = target.sparsify(&sparsifier).unwrap_err();

    match err {
        Error::ShortRead {
            offset,
            expected,
            actual,
            ..
        } => {
            assert_eq!(offset, 4096);
            assert_eq!(expected, 4096);
            assert_eq!(actual, 1000);
        }
        other => panic!("unexpected error: {}", other),
    }
}
