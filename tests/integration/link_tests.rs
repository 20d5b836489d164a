use dupfunnel::duplicates::{DuplicateFinder, FinderConfig};
use dupfunnel::scanner::{FileHasher, WalkerConfig};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn make_symlink(original: &Path, link: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(original, link)
    }
    #[cfg(windows)]
    {
        // symlink_file requires admin rights or developer mode on some Windows versions
        std::os::windows::fs::symlink_file(original, link)
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = (original, link);
        Err(std::io::Error::other("Unsupported platform"))
    }
}

fn following_finder() -> DuplicateFinder {
    let walker_config = WalkerConfig {
        follow_symlinks: true,
        ..Default::default()
    };
    DuplicateFinder::new(
        FinderConfig::default().with_walker_config(walker_config),
        FileHasher::default(),
    )
}

#[test]
fn test_hardlinks_are_reported_as_duplicates() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("original.txt");
    let hardlink = dir.path().join("hardlink.txt");

    File::create(&original)
        .unwrap()
        .write_all(b"identical content")
        .unwrap();

    if let Err(e) = fs::hard_link(&original, &hardlink) {
        eprintln!("Skipping hardlink test: failed to create hardlink: {}", e);
        return;
    }

    let finder = DuplicateFinder::with_defaults();
    let (set, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    // Two names with the same content; comparison is by content only
    assert_eq!(summary.total_files, 2);
    assert_eq!(set.len(), 1);
}

#[test]
fn test_symlinks_not_followed_by_default() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("original.txt");
    let symlink = dir.path().join("symlink.txt");

    File::create(&original)
        .unwrap()
        .write_all(b"content")
        .unwrap();

    if let Err(e) = make_symlink(&original, &symlink) {
        eprintln!("Skipping symlink test: failed to create symlink: {}", e);
        return;
    }

    let finder = DuplicateFinder::with_defaults();
    let (set, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(summary.total_files, 1);
    assert!(set.is_empty());
}

#[test]
fn test_followed_symlink_is_not_a_duplicate_of_its_target() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("original.txt");
    let symlink = dir.path().join("symlink.txt");

    File::create(&original)
        .unwrap()
        .write_all(b"content")
        .unwrap();

    if let Err(e) = make_symlink(&original, &symlink) {
        eprintln!("Skipping symlink test: failed to create symlink: {}", e);
        return;
    }

    let (set, summary) = following_finder()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(summary.total_files, 1);
    assert!(set.is_empty());
}

#[test]
fn test_followed_directory_symlink_visits_files_once() {
    let dir = tempdir().unwrap();
    let real = dir.path().join("real");
    fs::create_dir(&real).unwrap();
    fs::write(real.join("a.txt"), b"same").unwrap();
    fs::write(real.join("b.txt"), b"same").unwrap();

    if let Err(e) = make_symlink(&real, &dir.path().join("alias")) {
        eprintln!("Skipping symlink test: failed to create symlink: {}", e);
        return;
    }

    let (set, summary) = following_finder()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(set.len(), 1);
    assert_eq!(set.duplicate_files(), 1);
}

#[cfg(unix)]
#[test]
fn test_symlink_cycle_detection() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();

    let link = sub.join("link");
    if let Err(e) = std::os::unix::fs::symlink(&sub, &link) {
        eprintln!("Skipping cycle test: failed to create symlink: {}", e);
        return;
    }

    // Must not hang; the loop is reported as a diagnostic
    let (set, summary) = following_finder()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(set.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.errors.len(), 1);
}
