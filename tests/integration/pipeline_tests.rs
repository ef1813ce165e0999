use clap::Parser;
use sdd::actions::{RealFs, TerminalPrompter};
use sdd::cli::Cli;
use sdd::config::{Defaults, Settings};
use sdd::duplicates::LinkMode;
use sdd::error::{ErrorKind, SddError};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn settings(args: &[&str], roots: &[&Path]) -> Settings {
    let mut argv: Vec<String> = vec!["sdd".into(), "-q".into()];
    argv.extend(args.iter().map(|a| a.to_string()));
    argv.extend(roots.iter().map(|r| r.display().to_string()));
    Settings::resolve(&Cli::try_parse_from(argv).unwrap(), &Defaults::default())
}

fn run_with_input(settings: &Settings, input: &str) -> (sdd::actions::Resolution, String) {
    let mut prompter = TerminalPrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
    let mut out = Vec::new();
    let resolution = sdd::run(settings, &RealFs, &mut prompter, &mut out, None).unwrap();
    (resolution, String::from_utf8(out).unwrap())
}

fn banana_tree() -> (tempfile::TempDir, Vec<PathBuf>) {
    let dir = tempdir().unwrap();
    let paths: Vec<PathBuf> = ["a", "b", "c"]
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            fs::write(&path, b"banana").unwrap();
            path
        })
        .collect();
    (dir, paths)
}

#[test]
fn test_auto_confirmed_keeps_only_first() {
    let (dir, paths) = banana_tree();
    let settings = settings(&["--auto", "--no-color"], &[dir.path()]);

    let (resolution, out) = run_with_input(&settings, "y\n");

    assert!(paths[0].exists());
    assert!(!paths[1].exists());
    assert!(!paths[2].exists());
    assert_eq!(resolution.removed.len(), 2);
    assert_eq!(resolution.bytes_freed, 12);
    assert!(out.contains("Is that OK? y/n: "));
}

#[test]
fn test_auto_declined_keeps_everything() {
    let (dir, paths) = banana_tree();
    let settings = settings(&["--auto"], &[dir.path()]);

    let (resolution, out) = run_with_input(&settings, "n\n");

    assert!(paths.iter().all(|p| p.exists()));
    assert!(resolution.declined);
    assert!(out.contains("OK then! Aborting."));
}

#[test]
fn test_interactive_keep_second() {
    let (dir, paths) = banana_tree();
    let settings = settings(&["--interactive"], &[dir.path()]);

    let (resolution, _) = run_with_input(&settings, "5\n2\nyes\n");

    assert!(!paths[0].exists());
    assert!(paths[1].exists());
    assert!(!paths[2].exists());
    assert_eq!(resolution.removed.len(), 2);
}

#[test]
fn test_interactive_zero_deletes_nothing() {
    let (dir, paths) = banana_tree();
    let settings = settings(&[], &[dir.path()]);

    let (resolution, out) = run_with_input(&settings, "0\n");

    assert!(paths.iter().all(|p| p.exists()));
    assert!(resolution.removed.is_empty());
    assert!(out.contains("Nothing to be deleted."));
}

#[test]
fn test_same_size_different_content_two_groups() {
    let dir = tempdir().unwrap();
    let x = vec![b'x'; 42];
    let y = vec![b'y'; 42];
    fs::write(dir.path().join("x1"), &x).unwrap();
    fs::write(dir.path().join("x2"), &x).unwrap();
    fs::write(dir.path().join("y1"), &y).unwrap();
    fs::write(dir.path().join("y2"), &y).unwrap();
    fs::write(dir.path().join("z"), vec![b'z'; 42]).unwrap();

    let settings = settings(&["--dry-run"], &[dir.path()]);
    let hashes = sdd::find_duplicates(&settings, None).unwrap();
    let groups = sdd::actions::duplicate_groups(&hashes);

    // The lone "z" shares a size but not content: it is hashed, never grouped
    assert_eq!(hashes.len(), 3);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0], vec![dir.path().join("x1"), dir.path().join("x2")]);
    assert_eq!(groups[1], vec![dir.path().join("y1"), dir.path().join("y2")]);
}

#[test]
fn test_dry_run_reports_without_changes() {
    let (dir, paths) = banana_tree();
    let settings = settings(&["--dry-run", "--no-color"], &[dir.path()]);

    let (resolution, out) = run_with_input(&settings, "");

    assert!(paths.iter().all(|p| p.exists()));
    assert!(resolution.removed.is_empty());
    assert!(out.contains("Delete: "));
    assert!(out.contains("this was a dry run"));
}

#[test]
fn test_nested_roots_scanned_once() {
    let outer = tempdir().unwrap();
    let inner = outer.path().join("inner");
    fs::create_dir(&inner).unwrap();
    fs::write(outer.path().join("a"), b"same").unwrap();
    fs::write(inner.join("b"), b"same").unwrap();

    let settings = settings(&["--dry-run"], &[&inner, outer.path()]);
    let hashes = sdd::find_duplicates(&settings, None).unwrap();

    // Each file appears once even though "inner" was listed separately
    assert_eq!(hashes.leaf_count(LinkMode::Distinct), 2);
}

#[test]
fn test_missing_root_is_setup_error() {
    let dir = tempdir().unwrap();
    let settings = settings(&["--dry-run"], &[&dir.path().join("missing")]);

    let err = sdd::find_duplicates(&settings, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Setup);
}

#[test]
fn test_file_root_is_setup_error() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    fs::write(&file, b"x").unwrap();
    let settings = settings(&["--dry-run"], &[&file]);

    let err = sdd::find_duplicates(&settings, None).unwrap_err();
    assert!(matches!(err, SddError::InvalidRoot(_)));
}

#[test]
fn test_no_duplicates() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("one"), b"1").unwrap();
    fs::write(dir.path().join("two"), b"22").unwrap();
    let settings = settings(&["--auto"], &[dir.path()]);

    let (resolution, out) = run_with_input(&settings, "");

    assert!(resolution.removed.is_empty());
    assert!(out.contains("Nothing to be deleted."));
}

#[test]
fn test_all_algorithms_agree_on_groups() {
    let (dir, _) = banana_tree();
    fs::write(dir.path().join("d"), b"orange").unwrap();

    for flag in ["--md5", "--sha1", "--sha256"] {
        let settings = settings(&[flag, "--dry-run"], &[dir.path()]);
        let hashes = sdd::find_duplicates(&settings, None).unwrap();
        let groups = sdd::actions::duplicate_groups(&hashes);
        assert_eq!(groups.len(), 1, "algorithm {flag}");
        assert_eq!(groups[0].len(), 3, "algorithm {flag}");
    }
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_aborts_or_skips() {
    use std::os::unix::fs::PermissionsExt;

    let (dir, paths) = banana_tree();
    let locked = dir.path().join("locked");
    fs::write(&locked, b"banana").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root can read anything; nothing to test then
    if fs::read(&locked).is_ok() {
        return;
    }

    let settings_abort = settings(&["--dry-run"], &[dir.path()]);
    let err = sdd::find_duplicates(&settings_abort, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Hash);

    let settings_skip = settings(&["--dry-run", "--skip-unreadable"], &[dir.path()]);
    let hashes = sdd::find_duplicates(&settings_skip, None).unwrap();
    let groups = sdd::actions::duplicate_groups(&hashes);
    assert_eq!(groups, vec![paths]);

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
}
