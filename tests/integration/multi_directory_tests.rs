use dupfunnel::duplicates::{DuplicateFinder, FinderConfig};
use dupfunnel::scanner::{FileHasher, WalkerConfig};
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

#[test]
fn test_scan_two_non_overlapping_directories() {
    let dir1 = tempdir().unwrap();
    let dir2 = tempdir().unwrap();

    File::create(dir1.path().join("a.txt"))
        .unwrap()
        .write_all(b"dup")
        .unwrap();
    File::create(dir2.path().join("b.txt"))
        .unwrap()
        .write_all(b"dup")
        .unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (set, summary) = finder
        .find_duplicates(&[dir1.path().to_path_buf(), dir2.path().to_path_buf()])
        .unwrap();

    assert_eq!(set.len(), 1);
    let entry = set.iter().next().unwrap();
    assert_eq!(entry.representative.path, dir1.path().join("a.txt"));
    assert_eq!(entry.duplicates[0].path, dir2.path().join("b.txt"));
    assert_eq!(summary.total_files, 2);
    assert_eq!(summary.roots.len(), 2);
}

#[test]
fn test_root_order_decides_representative() {
    let dir1 = tempdir().unwrap();
    let dir2 = tempdir().unwrap();
    fs::write(dir1.path().join("a.txt"), b"dup").unwrap();
    fs::write(dir2.path().join("b.txt"), b"dup").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (set, _) = finder
        .find_duplicates(&[dir2.path().to_path_buf(), dir1.path().to_path_buf()])
        .unwrap();

    let entry = set.iter().next().unwrap();
    assert_eq!(entry.representative.path, dir2.path().join("b.txt"));
}

#[test]
fn test_scan_overlapping_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();

    File::create(dir.path().join("a.txt"))
        .unwrap()
        .write_all(b"content")
        .unwrap();
    File::create(sub.join("b.txt"))
        .unwrap()
        .write_all(b"content")
        .unwrap();

    let finder = DuplicateFinder::with_defaults();
    // Parent and child given: the child must not be walked twice
    let (set, summary) = finder
        .find_duplicates(&[sub.clone(), dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(summary.roots, vec![dir.path().to_path_buf()]);
    assert_eq!(set.len(), 1);
    assert_eq!(set.duplicate_files(), 1);
}

#[test]
fn test_same_root_twice_is_not_a_duplicate_of_itself() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("only.txt"), b"just one").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (set, summary) = finder
        .find_duplicates(&[dir.path().to_path_buf(), dir.path().to_path_buf()])
        .unwrap();

    assert!(set.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_file_root_and_directory_root() {
    let dir = tempdir().unwrap();
    let other = tempdir().unwrap();
    let single = other.path().join("single.txt");
    fs::write(&single, b"payload").unwrap();
    fs::write(dir.path().join("copy.txt"), b"payload").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (set, _) = finder
        .find_duplicates(&[single.clone(), dir.path().to_path_buf()])
        .unwrap();

    let entry = set.iter().next().unwrap();
    assert_eq!(entry.representative.path, single);
    assert_eq!(entry.duplicates[0].path, dir.path().join("copy.txt"));
}

#[test]
fn test_cross_directory_groups() {
    let dir1 = tempdir().unwrap();
    let dir2 = tempdir().unwrap();
    let dir3 = tempdir().unwrap();

    for dir in [&dir1, &dir2, &dir3] {
        fs::write(dir.path().join("common.txt"), b"shared everywhere").unwrap();
    }
    fs::write(dir1.path().join("pair.txt"), b"pair").unwrap();
    fs::write(dir3.path().join("pair.txt"), b"pair").unwrap();
    fs::write(dir2.path().join("solo.txt"), b"solo!").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (set, summary) = finder
        .find_duplicates(&[
            dir1.path().to_path_buf(),
            dir2.path().to_path_buf(),
            dir3.path().to_path_buf(),
        ])
        .unwrap();

    assert_eq!(set.len(), 2);
    assert_eq!(set.duplicate_files(), 3);
    assert_eq!(summary.total_files, 6);
    assert!(set.group_of(&dir2.path().join("solo.txt")).is_none());
    let common = set.get(&dir1.path().join("common.txt")).unwrap();
    assert_eq!(common.len(), 3);
}

#[test]
fn test_hidden_root_inside_parent_root_is_scanned_when_skipping_hidden() {
    let dir = tempdir().unwrap();
    let hidden = dir.path().join(".cfg");
    fs::create_dir(&hidden).unwrap();
    fs::write(hidden.join("x.txt"), b"same").unwrap();
    fs::write(hidden.join("y.txt"), b"same").unwrap();

    let finder = DuplicateFinder::new(
        FinderConfig::default().with_walker_config(WalkerConfig {
            skip_hidden: true,
            ..WalkerConfig::default()
        }),
        FileHasher::default(),
    );

    let (alone, _) = finder.find_duplicates(&[hidden.clone()]).unwrap();
    assert_eq!(alone.len(), 1);

    // Adding the parent must not hide the explicitly given root
    let (set, summary) = finder
        .find_duplicates(&[dir.path().to_path_buf(), hidden.clone()])
        .unwrap();

    assert_eq!(set.len(), 1);
    assert_eq!(summary.total_files, 2);
    let entry = set.iter().next().unwrap();
    assert_eq!(entry.representative.path, hidden.join("x.txt"));
    assert_eq!(entry.duplicates[0].path, hidden.join("y.txt"));
}
