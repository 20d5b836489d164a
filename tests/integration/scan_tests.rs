use dupfunnel::duplicates::{DuplicateFinder, FinderConfig};
use dupfunnel::scanner::{FileHasher, HashKind, WalkerConfig};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_file(path: &Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

fn roots(path: &Path) -> Vec<PathBuf> {
    vec![path.to_path_buf()]
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (set, summary) = finder.find_duplicates(&roots(dir.path())).unwrap();

    assert!(set.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_single_file() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("only.txt"), b"alone");

    let finder = DuplicateFinder::with_defaults();
    let (set, summary) = finder.find_duplicates(&roots(dir.path())).unwrap();

    assert!(set.is_empty());
    assert_eq!(summary.total_files, 1);
    assert_eq!(summary.bytes_hashed, 0);
}

#[test]
fn test_scan_hello_world() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"hello");
    write_file(&dir.path().join("b.txt"), b"hello");
    write_file(&dir.path().join("c.txt"), b"world");

    let finder = DuplicateFinder::with_defaults();
    let (set, summary) = finder.find_duplicates(&roots(dir.path())).unwrap();

    assert_eq!(set.len(), 1);
    let entry = set.get(&dir.path().join("a.txt")).unwrap();
    assert_eq!(entry.duplicates.len(), 1);
    assert_eq!(entry.duplicates[0].path, dir.path().join("b.txt"));
    assert!(set.group_of(&dir.path().join("c.txt")).is_none());
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 5);
}

#[test]
fn test_scan_unique_files_same_size() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"content a");
    write_file(&dir.path().join("b.txt"), b"content b");
    write_file(&dir.path().join("c.txt"), b"content c");

    let finder = DuplicateFinder::with_defaults();
    let (set, summary) = finder.find_duplicates(&roots(dir.path())).unwrap();

    assert!(set.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.eliminated_by_prehash, 3);
}

#[test]
fn test_shared_prefix_different_sizes_never_duplicates() {
    let dir = tempdir().unwrap();
    let prefix = vec![b'p'; 1024];
    let mut long = prefix.clone();
    long.extend_from_slice(&prefix);
    write_file(&dir.path().join("short.bin"), &prefix);
    write_file(&dir.path().join("long.bin"), &long);

    let finder = DuplicateFinder::with_defaults();
    let (set, summary) = finder.find_duplicates(&roots(dir.path())).unwrap();

    assert!(set.is_empty());
    assert_eq!(summary.eliminated_by_size, 2);
    assert_eq!(summary.bytes_hashed, 0);
}

#[test]
fn test_shared_prefix_different_tail_separated_by_full_hash() {
    let dir = tempdir().unwrap();
    let mut a = vec![b'q'; 4096];
    let b = a.clone();
    a[4095] = b'z';
    write_file(&dir.path().join("a.bin"), &a);
    write_file(&dir.path().join("b.bin"), &b);

    let finder = DuplicateFinder::with_defaults();
    let (set, summary) = finder.find_duplicates(&roots(dir.path())).unwrap();

    assert!(set.is_empty());
    assert_eq!(summary.eliminated_by_prehash, 0);
    assert_eq!(summary.eliminated_by_fullhash, 2);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("subdir");
    fs::create_dir(&sub).unwrap();
    write_file(&dir.path().join("z.txt"), b"nested duplicate");
    write_file(&sub.join("a.txt"), b"nested duplicate");

    let finder = DuplicateFinder::with_defaults();
    let (set, _) = finder.find_duplicates(&roots(dir.path())).unwrap();

    assert_eq!(set.len(), 1);
    let entry = set.iter().next().unwrap();
    // Sorted walk: "subdir" comes before "z.txt"
    assert_eq!(entry.representative.path, sub.join("a.txt"));
    assert_eq!(entry.duplicates[0].path, dir.path().join("z.txt"));
}

#[test]
fn test_scan_multiple_groups_in_discovery_order() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("1.txt"), b"group two content");
    write_file(&dir.path().join("2.txt"), b"group one");
    write_file(&dir.path().join("3.txt"), b"group one");
    write_file(&dir.path().join("4.txt"), b"group two content");
    write_file(&dir.path().join("5.txt"), b"group two content");

    let finder = DuplicateFinder::with_defaults();
    let (set, summary) = finder.find_duplicates(&roots(dir.path())).unwrap();

    let reps: Vec<_> = set.iter().map(|e| e.representative.path.clone()).collect();
    assert_eq!(
        reps,
        vec![dir.path().join("1.txt"), dir.path().join("2.txt")]
    );
    assert_eq!(summary.duplicate_groups, 2);
    assert_eq!(summary.duplicate_files, 3);
}

#[test]
fn test_scan_is_idempotent() {
    let dir = tempdir().unwrap();
    for i in 0..6 {
        write_file(&dir.path().join(format!("f{i}.txt")), format!("v{}", i % 2).as_bytes());
    }

    let finder = DuplicateFinder::with_defaults();
    let (first, _) = finder.find_duplicates(&roots(dir.path())).unwrap();
    let (second, _) = finder.find_duplicates(&roots(dir.path())).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn test_results_independent_of_thread_count() {
    let dir = tempdir().unwrap();
    for i in 0..40 {
        let content = format!("payload-{:02}", i % 7);
        write_file(&dir.path().join(format!("file_{i:02}.txt")), content.as_bytes());
    }

    let single = DuplicateFinder::new(
        FinderConfig::default().with_io_threads(1),
        FileHasher::default(),
    );
    let many = DuplicateFinder::new(
        FinderConfig::default().with_io_threads(8),
        FileHasher::default(),
    );

    let (a, _) = single.find_duplicates(&roots(dir.path())).unwrap();
    let (b, _) = many.find_duplicates(&roots(dir.path())).unwrap();

    assert_eq!(a, b);
    assert_eq!(a.len(), 7);
}

#[test]
fn test_all_hash_algorithms_agree() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"same bytes");
    write_file(&dir.path().join("b.txt"), b"same bytes");
    write_file(&dir.path().join("c.txt"), b"diff bytes");

    for kind in [HashKind::Xxh64, HashKind::Blake3, HashKind::Sha256] {
        let finder = DuplicateFinder::new(
            FinderConfig::default(),
            FileHasher::new(kind.algorithm()),
        );
        let (set, _) = finder.find_duplicates(&roots(dir.path())).unwrap();
        assert_eq!(set.len(), 1, "algorithm {kind}");
        assert_eq!(set.duplicate_files(), 1, "algorithm {kind}");
    }
}

#[test]
fn test_empty_files_are_duplicates_by_default() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.empty"), b"");
    write_file(&dir.path().join("b.empty"), b"");

    let finder = DuplicateFinder::with_defaults();
    let (set, summary) = finder.find_duplicates(&roots(dir.path())).unwrap();

    assert_eq!(set.len(), 1);
    assert_eq!(summary.reclaimable_space, 0);
}

#[test]
fn test_skip_empty_files() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.empty"), b"");
    write_file(&dir.path().join("b.empty"), b"");

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        skip_empty: true,
        ..Default::default()
    });
    let finder = DuplicateFinder::new(config, FileHasher::default());
    let (set, summary) = finder.find_duplicates(&roots(dir.path())).unwrap();

    assert!(set.is_empty());
    assert_eq!(summary.total_files, 0);
}

#[test]
fn test_size_filters() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("small1.txt"), b"tiny");
    write_file(&dir.path().join("small2.txt"), b"tiny");
    write_file(&dir.path().join("big1.txt"), &[b'b'; 100]);
    write_file(&dir.path().join("big2.txt"), &[b'b'; 100]);

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        min_size: Some(10),
        ..Default::default()
    });
    let finder = DuplicateFinder::new(config, FileHasher::default());
    let (set, _) = finder.find_duplicates(&roots(dir.path())).unwrap();

    assert_eq!(set.len(), 1);
    assert_eq!(set.iter().next().unwrap().size, 100);

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        max_size: Some(10),
        ..Default::default()
    });
    let finder = DuplicateFinder::new(config, FileHasher::default());
    let (set, _) = finder.find_duplicates(&roots(dir.path())).unwrap();

    assert_eq!(set.len(), 1);
    assert_eq!(set.iter().next().unwrap().size, 4);
}

#[test]
fn test_skip_hidden() {
    let dir = tempdir().unwrap();
    let hidden = dir.path().join(".cache");
    fs::create_dir(&hidden).unwrap();
    write_file(&dir.path().join("visible.txt"), b"shared");
    write_file(&hidden.join("copy.txt"), b"shared");

    let default_finder = DuplicateFinder::with_defaults();
    let (set, _) = default_finder.find_duplicates(&roots(dir.path())).unwrap();
    assert_eq!(set.len(), 1);

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        skip_hidden: true,
        ..Default::default()
    });
    let finder = DuplicateFinder::new(config, FileHasher::default());
    let (set, _) = finder.find_duplicates(&roots(dir.path())).unwrap();
    assert!(set.is_empty());
}

#[test]
fn test_large_files_use_multiple_chunks() {
    let dir = tempdir().unwrap();
    let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    write_file(&dir.path().join("a.bin"), &data);
    write_file(&dir.path().join("b.bin"), &data);

    let finder = DuplicateFinder::with_defaults();
    let (set, summary) = finder.find_duplicates(&roots(dir.path())).unwrap();

    assert_eq!(set.len(), 1);
    // Prefix of both files, then both files in full
    assert_eq!(summary.bytes_hashed, 2 * 1024 + 2 * 200_000);
}
