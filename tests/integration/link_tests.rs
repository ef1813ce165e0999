use clap::Parser;
use sdd::actions::{RealFs, TerminalPrompter};
use sdd::cli::Cli;
use sdd::config::{Defaults, Settings};
use sdd::duplicates::LinkMode;
use sdd::scanner::hardlink::{is_same_file, InodeKey};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tempfile::tempdir;

fn settings(args: &[&str], root: &Path) -> Settings {
    let mut argv: Vec<String> = vec!["sdd".into(), "-q".into()];
    argv.extend(args.iter().map(|a| a.to_string()));
    argv.push(root.display().to_string());
    Settings::resolve(&Cli::try_parse_from(argv).unwrap(), &Defaults::default())
}

#[test]
fn test_hardlinks_folded_by_default() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("original.txt");
    let link = dir.path().join("link.txt");
    fs::write(&original, b"identical content").unwrap();
    if let Err(e) = fs::hard_link(&original, &link) {
        eprintln!("Skipping hardlink test: failed to create hardlink: {}", e);
        return;
    }

    let hashes = sdd::find_duplicates(&settings(&["--dry-run"], dir.path()), None).unwrap();

    if InodeKey::is_supported() {
        // One logical file: not even a candidate
        assert!(hashes.is_empty());
    } else {
        assert_eq!(hashes.leaf_count(LinkMode::Distinct), 2);
    }
}

#[test]
fn test_hardlinks_distinct_with_flag() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("original.txt");
    fs::write(&original, b"identical content").unwrap();
    for i in 0..3 {
        if fs::hard_link(&original, dir.path().join(format!("link{i}.txt"))).is_err() {
            return;
        }
    }

    let hashes = sdd::find_duplicates(&settings(&["--dry-run", "-H"], dir.path()), None).unwrap();
    let groups = sdd::actions::duplicate_groups(&hashes);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 4);
}

#[test]
fn test_folded_hardlink_plus_copy() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("a");
    fs::write(&original, b"content").unwrap();
    if fs::hard_link(&original, dir.path().join("a-link")).is_err() {
        return;
    }
    fs::write(dir.path().join("copy"), b"content").unwrap();

    let hashes = sdd::find_duplicates(&settings(&["--dry-run"], dir.path()), None).unwrap();
    let groups = sdd::actions::duplicate_groups(&hashes);

    // Only the representative of the linked pair reaches the group
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert!(groups[0].contains(&dir.path().join("copy")));
}

#[cfg(unix)]
#[test]
fn test_link_policy_shares_canonical_inode() {
    let dir = tempdir().unwrap();
    for name in ["a", "b", "c"] {
        fs::write(dir.path().join(name), b"banana").unwrap();
    }
    let mut prompter = TerminalPrompter::new(Cursor::new(Vec::new()), Vec::new());
    let mut out = Vec::new();

    let resolution = sdd::run(
        &settings(&["--link"], dir.path()),
        &RealFs,
        &mut prompter,
        &mut out,
        None,
    )
    .unwrap();

    let a = dir.path().join("a");
    assert!(is_same_file(&a, &dir.path().join("b")).unwrap());
    assert!(is_same_file(&a, &dir.path().join("c")).unwrap());
    assert_eq!(resolution.linked.len(), 2);
    assert_eq!(fs::read(dir.path().join("c")).unwrap(), b"banana");

    // No backup left behind
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().contains(".sdd-bak"))
        .collect();
    assert!(leftovers.is_empty());

    // A second run finds nothing to do: the links fold into one file
    let mut out = Vec::new();
    let resolution = sdd::run(
        &settings(&["--link"], dir.path()),
        &RealFs,
        &mut prompter,
        &mut out,
        None,
    )
    .unwrap();
    assert!(resolution.linked.is_empty());
}
