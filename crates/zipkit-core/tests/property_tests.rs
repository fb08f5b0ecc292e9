//! Property-based tests for path containment and archive round trips.
//!
//! These tests use proptest to generate arbitrary inputs and verify
//! security properties hold across a wide range of cases.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;
use zipkit_core::Engine;
use zipkit_core::ErrorKind;
use zipkit_core::security::PathGuard;
use zipkit_core::security::is_contained;
use zipkit_core::security::sanitize_permissions;
use zipkit_core::test_utils::create_test_zip;
use zipkit_core::types::DestDir;

fn create_test_dest() -> (TempDir, DestDir) {
    let temp = TempDir::new().expect("failed to create temp dir");
    let dest = DestDir::create(temp.path().join("dest")).expect("failed to create dest");
    (temp, dest)
}

fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            files.extend(files_under(&path));
        } else {
            files.push(path);
        }
    }
    files
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Climbing out more levels than were descended always escapes.
    #[test]
    fn prop_escaping_traversal_rejected(
        descend in prop::collection::vec("[a-z]{1,8}", 0..4),
        suffix in prop::collection::vec("[a-z]{1,8}", 0..3),
    ) {
        let (_temp, dest) = create_test_dest();
        let guard = PathGuard::new(dest);

        let mut segments: Vec<String> = descend.clone();
        segments.extend(std::iter::repeat_n("..".to_string(), descend.len() + 1));
        segments.extend(suffix);
        let name = segments.join("/");

        let result = guard.guard(&name);
        prop_assert!(result.is_err(), "{name:?} should be rejected");
    }

    /// Traversal that stays below the root is harmless and resolves inside it.
    #[test]
    fn prop_inner_traversal_accepted(
        descend in prop::collection::vec("[a-z]{1,8}", 1..4),
        leaf in "[a-z]{1,8}\\.txt",
    ) {
        let (_temp, dest) = create_test_dest();
        let guard = PathGuard::new(dest);
        let name = format!("{}/../{leaf}", descend.join("/"));

        let target = guard.guard(&name).unwrap();
        prop_assert!(target.starts_with(guard.root()));
    }

    /// Valid relative paths without special components should be accepted.
    #[test]
    fn prop_valid_relative_paths_accepted(
        components in prop::collection::vec("[a-zA-Z0-9_-]{1,20}", 1..5)
    ) {
        let (_temp, dest) = create_test_dest();
        let guard = PathGuard::new(dest);
        let name = components.join("/");

        let target = guard.guard(&name).unwrap();
        prop_assert_eq!(target, guard.root().join(&name));
    }

    /// Absolute names are never contained.
    #[test]
    fn prop_absolute_paths_rejected(
        components in prop::collection::vec("[a-z]{1,10}", 1..4)
    ) {
        let (_temp, dest) = create_test_dest();
        let name = format!("/{}", components.join("/"));

        prop_assert!(!is_contained(dest.as_path(), Path::new(&name)));
        prop_assert!(PathGuard::new(dest).guard(&name).is_err());
    }

    /// A sibling whose name merely starts with the root's name is outside.
    #[test]
    fn prop_prefix_sibling_rejected(suffix in "[a-z0-9-]{1,10}", leaf in "[a-z]{1,8}") {
        let (_temp, dest) = create_test_dest();
        let name = format!("../dest{suffix}/{leaf}");

        prop_assert!(!is_contained(dest.as_path(), Path::new(&name)));
    }

    /// Sanitized modes never carry more than the rwx bits.
    #[test]
    fn prop_sanitized_mode_is_plain(mode in any::<u32>()) {
        let sanitized = sanitize_permissions(mode);
        prop_assert_eq!(sanitized & !0o777, 0);
        prop_assert_eq!(sanitized, mode & 0o777);
    }

    /// Extraction either succeeds entirely inside the destination or
    /// fails with a zip slip error, for arbitrary entry names.
    #[test]
    fn prop_extraction_never_escapes(
        prefixes in prop::collection::vec("(\\.\\./|d/){0,4}", 1..5)
    ) {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("fuzz.zip");
        let names: Vec<String> = prefixes
            .iter()
            .enumerate()
            .map(|(i, prefix)| format!("{prefix}f{i}.txt"))
            .collect();
        let entries: Vec<(&str, &[u8])> =
            names.iter().map(|n| (n.as_str(), b"x".as_slice())).collect();
        fs::write(&archive, create_test_zip(entries)).unwrap();
        let out = temp.path().join("a/b/c/out");

        match Engine::default().extract_archive(&archive, &out, None) {
            Ok(_) => {}
            Err(err) => prop_assert_eq!(err.kind(), ErrorKind::ZipSlipDetected),
        }

        for file in files_under(temp.path()) {
            prop_assert!(
                file == archive || file.starts_with(&out),
                "unexpected file {file:?} outside destination"
            );
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Arbitrary file contents survive create then extract, with and
    /// without a password.
    #[test]
    fn prop_roundtrip_preserves_contents(
        files in prop::collection::btree_map("[a-z]{1,8}\\.(txt|bin)", prop::collection::vec(any::<u8>(), 0..2048), 1..6),
        password in prop::option::of("[ -~]{1,16}"),
    ) {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("tree");
        fs::create_dir(&source).unwrap();
        for (name, data) in &files {
            fs::write(source.join(name), data).unwrap();
        }
        let archive = temp.path().join("tree.zip");
        let out = temp.path().join("out");
        let engine = Engine::default();

        let created = engine
            .create_archive(&source, &archive, password.as_deref())
            .unwrap();
        prop_assert_eq!(created.files_added, files.len());

        let extracted = engine
            .extract_archive(&archive, &out, password.as_deref())
            .unwrap();
        prop_assert_eq!(extracted.files_extracted, files.len());

        for (name, data) in &files {
            let restored = fs::read(out.join("tree").join(name)).unwrap();
            prop_assert_eq!(&restored, data);
        }
    }
}
