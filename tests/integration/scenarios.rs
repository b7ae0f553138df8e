use simple_patcher::{
    apply_patch_sets, load_from_paths, ApplyError, CodecError, DiffEngine, DiffError,
    NullReporter, PatchFileError, SafetyError,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const UI_PATCHES: &str = r#"
---
name: Skip Intro
author: alice
group: ui
description: Skips the intro movie.
patch:
- offset: '00000001'
  bytes: FF FF
---
name: Big Font
author: carol
group: ui
description: Larger menu font.
patch:
- offset: '00000005'
  bytes: '20'
"#;

const MISC_PATCHES: &str = r#"
---
name: No CD
author: bob
group: misc
description: Removes the disc check.
patch:
- offset: '00000003'
  bytes: 90 90
"#;

fn write(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_two_byte_run_diff_and_apply() {
    let dir = TempDir::new().unwrap();
    let original = write(dir.path(), "orig.exe", [0x00u8, 0x01, 0x02, 0x03, 0x04, 0x05]);
    let modified = write(dir.path(), "mod.exe", [0x00u8, 0xff, 0xff, 0x03, 0x04, 0x05]);

    let records = DiffEngine::new().diff_files(&original, &modified).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].offset(), 1);
    assert_eq!(records[0].payload(), &[0xff, 0xff]);
}

#[test]
fn test_load_select_apply_across_files() {
    let dir = TempDir::new().unwrap();
    let ui = write(dir.path(), "ui.yaml", UI_PATCHES);
    let misc = write(dir.path(), "misc.yaml", MISC_PATCHES);
    let original = write(dir.path(), "orig.exe", [0u8; 8]);
    let destination = dir.path().join("new.exe");

    let mut catalog = load_from_paths(&[ui, misc]).unwrap();
    let groups: Vec<&str> = catalog.index().names().collect();
    assert_eq!(groups, vec!["ui", "misc"]);

    catalog.select_group("misc").unwrap();
    catalog.select_patch("Skip Intro").unwrap();
    let selected = catalog.selected();
    let names: Vec<&str> = selected.iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["Skip Intro", "No CD"]);

    // "Skip Intro" writes 1..3 and "No CD" writes 3..5; no overlap.
    assert!(catalog.overlaps().is_empty());

    let report = apply_patch_sets(&original, &destination, &selected, &NullReporter).unwrap();
    assert_eq!(report.patch_sets, 2);
    assert_eq!(
        fs::read(&destination).unwrap(),
        vec![0x00, 0xff, 0xff, 0x90, 0x90, 0x00, 0x00, 0x00]
    );
}

#[test]
fn test_apply_is_repeatable() {
    let dir = TempDir::new().unwrap();
    let ui = write(dir.path(), "ui.yaml", UI_PATCHES);
    let original = write(dir.path(), "orig.exe", [7u8; 16]);
    let first = dir.path().join("first.exe");
    let second = dir.path().join("second.exe");

    let mut catalog = load_from_paths(&[ui]).unwrap();
    catalog.select_group("ui").unwrap();
    let selected = catalog.selected();

    apply_patch_sets(&original, &first, &selected, &NullReporter).unwrap();
    apply_patch_sets(&original, &second, &selected, &NullReporter).unwrap();
    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());

    // Re-applying over an existing output gives the same bytes again.
    apply_patch_sets(&original, &first, &selected, &NullReporter).unwrap();
    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_missing_fields_named_with_path() {
    let dir = TempDir::new().unwrap();
    let bad = write(
        dir.path(),
        "bad.yaml",
        "name: Broken\ndescription: nothing\npatch: []\n",
    );

    let err = load_from_paths(&[&bad]).unwrap_err();
    assert_eq!(err.path(), Some(bad.as_path()));
    match &err {
        PatchFileError::Codec {
            source: CodecError::MissingFields { fields, .. },
            ..
        } => assert_eq!(fields, &vec!["author", "group"]),
        other => panic!("unexpected error: {other}"),
    }
    let message = err.to_string();
    assert!(message.contains("author") && message.contains("group"));
}

#[test]
fn test_bad_file_fails_whole_load() {
    let dir = TempDir::new().unwrap();
    let good = write(dir.path(), "good.yaml", UI_PATCHES);
    let bad = write(
        dir.path(),
        "bad.yaml",
        "name: x\nauthor: a\ngroup: g\ndescription: d\npatch:\n- offset: zz\n  bytes: '00'\n",
    );
    assert!(matches!(
        load_from_paths(&[good, bad]),
        Err(PatchFileError::Codec {
            source: CodecError::InvalidOffset { .. },
            ..
        })
    ));
}

#[test]
fn test_truncation_produces_nothing() {
    let dir = TempDir::new().unwrap();
    let original = write(dir.path(), "orig.exe", [1u8; 10]);
    let modified = write(dir.path(), "mod.exe", [1u8; 9]);
    assert!(matches!(
        DiffEngine::new().diff_files(&original, &modified),
        Err(DiffError::Truncation {
            original_len: 10,
            modified_len: 9
        })
    ));
}

#[test]
fn test_self_overwrite_guard() {
    let dir = TempDir::new().unwrap();
    let ui = write(dir.path(), "ui.yaml", UI_PATCHES);
    let original = write(dir.path(), "orig.exe", [0u8; 8]);

    let mut catalog = load_from_paths(&[ui]).unwrap();
    catalog.select_group("ui").unwrap();

    let alias = dir.path().join(".").join("orig.exe");
    let result = apply_patch_sets(&original, &alias, &catalog.selected(), &NullReporter);
    assert!(matches!(
        result,
        Err(ApplyError::Safety(SafetyError::SameFile { .. }))
    ));
    assert_eq!(fs::read(&original).unwrap(), vec![0u8; 8]);
}
