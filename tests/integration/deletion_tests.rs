use sdd::actions::{
    duplicate_groups, DeleteError, DeletionPolicy, FileOps, PolicyEngine, RealFs,
    TerminalPrompter,
};
use sdd::duplicates::{EngineConfig, HashEngine};
use sdd::scanner::{scan_roots, Hasher};
use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Real filesystem that refuses to create hard links.
struct NoLinks;

impl FileOps for NoLinks {
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        RealFs.remove_file(path)
    }
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        RealFs.rename(from, to)
    }
    fn hard_link(&self, _original: &Path, _link: &Path) -> io::Result<()> {
        Err(io::Error::other("links not supported here"))
    }
    fn file_len(&self, path: &Path) -> io::Result<u64> {
        RealFs.file_len(path)
    }
    fn link_count(&self, path: &Path) -> io::Result<u64> {
        RealFs.link_count(path)
    }
    fn same_file(&self, a: &Path, b: &Path) -> io::Result<bool> {
        RealFs.same_file(a, b)
    }
    fn exists(&self, path: &Path) -> bool {
        RealFs.exists(path)
    }
}

fn groups_for(root: &Path) -> Vec<Vec<PathBuf>> {
    let sizes = scan_roots(&[root.to_path_buf()]).unwrap();
    let hashes = HashEngine::new(Hasher::default(), EngineConfig::default())
        .find_duplicates(&sizes)
        .unwrap();
    duplicate_groups(&hashes)
}

fn apply(
    fs_ops: &dyn FileOps,
    policy: DeletionPolicy,
    groups: &[Vec<PathBuf>],
    input: &str,
) -> (sdd::actions::Resolution, String) {
    let mut prompter = TerminalPrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
    let mut out = Vec::new();
    let resolution = PolicyEngine::new(fs_ops, &mut prompter, &mut out)
        .with_color(false)
        .apply(policy, groups)
        .unwrap();
    (resolution, String::from_utf8(out).unwrap())
}

#[test]
fn test_groups_are_sorted_and_ordered() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("z2"), b"zz").unwrap();
    fs::write(dir.path().join("z1"), b"zz").unwrap();
    fs::write(dir.path().join("m"), b"mmm").unwrap();
    fs::write(dir.path().join("a"), b"mmm").unwrap();

    let groups = groups_for(dir.path());

    assert_eq!(
        groups,
        vec![
            vec![dir.path().join("a"), dir.path().join("m")],
            vec![dir.path().join("z1"), dir.path().join("z2")],
        ]
    );
}

#[test]
fn test_auto_across_groups_single_confirmation() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a1"), b"apple").unwrap();
    fs::write(dir.path().join("a2"), b"apple").unwrap();
    fs::write(dir.path().join("p1"), b"pear").unwrap();
    fs::write(dir.path().join("p2"), b"pear").unwrap();
    let groups = groups_for(dir.path());

    let (resolution, out) = apply(&RealFs, DeletionPolicy::Automatic, &groups, "Y\n");

    assert_eq!(out.matches("Is that OK?").count(), 1);
    assert!(dir.path().join("a1").exists());
    assert!(dir.path().join("p1").exists());
    assert!(!dir.path().join("a2").exists());
    assert!(!dir.path().join("p2").exists());
    assert_eq!(resolution.bytes_freed, 9);
}

#[test]
fn test_vanished_file_reported_and_others_removed() {
    let dir = tempdir().unwrap();
    for name in ["a", "b", "c"] {
        fs::write(dir.path().join(name), b"banana").unwrap();
    }
    let groups = groups_for(dir.path());

    // Something else removes "b" between hashing and deletion
    fs::remove_file(dir.path().join("b")).unwrap();
    let (resolution, out) = apply(&RealFs, DeletionPolicy::Automatic, &groups, "y\n");

    assert_eq!(resolution.removed, vec![dir.path().join("c")]);
    assert!(matches!(
        resolution.failures.as_slice(),
        [DeleteError::NotFound(_)]
    ));
    assert!(out.contains("Failed to remove"));
    assert!(dir.path().join("a").exists());
}

#[test]
fn test_failed_link_restores_original() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"banana").unwrap();
    fs::write(dir.path().join("b"), b"banana").unwrap();
    let groups = groups_for(dir.path());

    let (resolution, _) = apply(&NoLinks, DeletionPolicy::HardLink, &groups, "");

    assert!(resolution.linked.is_empty());
    assert!(matches!(
        resolution.failures.as_slice(),
        [DeleteError::LinkFailed { restored: true, .. }]
    ));
    assert_eq!(fs::read(dir.path().join("b")).unwrap(), b"banana");
    assert!(!dir.path().join("b.sdd-bak").exists());
}

#[test]
fn test_dry_run_leaves_tree_identical() {
    let dir = tempdir().unwrap();
    for name in ["a", "b", "c"] {
        fs::write(dir.path().join(name), b"banana").unwrap();
    }
    let before: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    let groups = groups_for(dir.path());

    let (resolution, out) = apply(&RealFs, DeletionPolicy::DryRun, &groups, "");

    let after: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(before.len(), after.len());
    assert!(resolution.removed.is_empty());
    assert_eq!(out.matches("Delete: ").count(), 2);
}

#[test]
fn test_interactive_eof_fails_without_changes() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"banana").unwrap();
    fs::write(dir.path().join("b"), b"banana").unwrap();
    let groups = groups_for(dir.path());

    let mut prompter = TerminalPrompter::new(Cursor::new(b"1\n".to_vec()), Vec::new());
    let mut out = Vec::new();
    let err = PolicyEngine::new(&RealFs, &mut prompter, &mut out)
        .apply(DeletionPolicy::Interactive, &groups)
        .unwrap_err();

    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    assert!(dir.path().join("a").exists());
    assert!(dir.path().join("b").exists());
}
