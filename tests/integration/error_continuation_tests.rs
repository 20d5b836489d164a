use dupfunnel::duplicates::{
    group_by_size, phase2_prehash, DuplicateFinder, FinderConfig, FinderError,
};
use dupfunnel::scanner::{FileHasher, FileRecord, HashError, ScanError};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_prehash_continues_on_missing_files() {
    let (groups, _) = group_by_size(vec![
        FileRecord::new(PathBuf::from("nonexistent_1.txt"), 100),
        FileRecord::new(PathBuf::from("nonexistent_2.txt"), 100),
    ]);

    let (survivors, stats) =
        phase2_prehash(&groups, &FileHasher::default(), &FinderConfig::default());

    assert!(survivors.is_empty());
    assert_eq!(stats.failed_files, 2);
    assert_eq!(stats.errors.len(), 2);
    for err in &stats.errors {
        match err {
            ScanError::Hash(HashError::NotFound(_)) => {}
            _ => panic!("Expected NotFound HashError, got: {:?}", err),
        }
    }
}

#[test]
fn test_failed_file_does_not_break_its_bucket() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, b"same").unwrap();
    fs::write(&b, b"same").unwrap();

    // A vanished sibling of the same size sits between the two real files
    let (groups, _) = group_by_size(vec![
        FileRecord::new(a.clone(), 4),
        FileRecord::new(dir.path().join("gone.txt"), 4),
        FileRecord::new(b.clone(), 4),
    ]);

    let (survivors, stats) =
        phase2_prehash(&groups, &FileHasher::default(), &FinderConfig::default());

    assert_eq!(stats.failed_files, 1);
    assert_eq!(survivors.len(), 1);
    let bucket = survivors.iter().next().unwrap();
    let paths: Vec<_> = bucket.files.iter().map(|f| f.path.clone()).collect();
    assert_eq!(paths, vec![a, b]);
}

#[test]
fn test_missing_root_is_reported_but_scan_continues() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"dup").unwrap();
    fs::write(dir.path().join("b.txt"), b"dup").unwrap();
    let missing = dir.path().join("does-not-exist");

    let finder = DuplicateFinder::with_defaults();
    let (set, summary) = finder
        .find_duplicates(&[missing.clone(), dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(set.len(), 1);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].path(), missing.as_path());
    assert!(matches!(summary.errors[0], ScanError::NotFound(_)));
}

#[test]
fn test_all_roots_missing() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let result = finder.find_duplicates(&[dir.path().join("x"), dir.path().join("y")]);

    match result {
        Err(FinderError::NoValidPaths(paths)) => assert_eq!(paths.len(), 2),
        other => panic!("Expected NoValidPaths, got: {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"same content").unwrap();
    fs::write(dir.path().join("b.txt"), b"same content").unwrap();
    let locked = dir.path().join("c.txt");
    fs::write(&locked, b"same content").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root can read anything; nothing to test then
    if fs::File::open(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
        return;
    }

    let finder = DuplicateFinder::with_defaults();
    let (set, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(set.len(), 1);
    assert_eq!(set.duplicate_files(), 1);
    assert!(set.group_of(&locked).is_none());
    assert_eq!(summary.errors.len(), 1);
    assert!(matches!(
        summary.errors[0],
        ScanError::Hash(HashError::PermissionDenied(_))
    ));
}
