//! Integration tests for the built-in circuit-synth patch set.
//!
//! Runs the catalog against synthetic installs in every state the applier
//! distinguishes: unpatched, patched, drifted, and partially absent.

use super::fixtures::{self, *};
use circuit_synth_patcher::config::{
    apply_patches, builtin_patches, check_patches, PatchResult, PatchSpec,
};
use circuit_synth_patcher::locator::{FixedLocator, LibraryLocator};
use circuit_synth_patcher::safety::RootGuard;
use std::fs;

fn guard_for(dir: &tempfile::TempDir) -> RootGuard {
    RootGuard::new(dir.path()).unwrap()
}

#[test]
fn test_unpatched_library_is_fully_patched() {
    let lib = unpatched_library();
    let guard = guard_for(&lib);

    let results = apply_patches(&guard, &builtin_patches());

    assert_eq!(results.len(), 2);
    for (id, result) in &results {
        assert!(
            matches!(result, Ok(PatchResult::Applied { replacements: 1, .. })),
            "{id}: {result:?}"
        );
    }
    assert_eq!(read(lib.path(), COMPONENT_PATH), COMPONENT_PATCHED);
    assert_eq!(read(lib.path(), LOADER_PATH), LOADER_PATCHED);
}

#[test]
fn test_second_run_is_a_fixed_point() {
    let lib = unpatched_library();
    let guard = guard_for(&lib);
    let patches = builtin_patches();

    let _ = apply_patches(&guard, &patches);
    let component_after_first = read(lib.path(), COMPONENT_PATH);
    let loader_after_first = read(lib.path(), LOADER_PATH);

    let results = apply_patches(&guard, &patches);
    for (id, result) in &results {
        assert!(
            matches!(result, Ok(PatchResult::AlreadyPatched { .. })),
            "{id}: {result:?}"
        );
    }
    assert_eq!(read(lib.path(), COMPONENT_PATH), component_after_first);
    assert_eq!(read(lib.path(), LOADER_PATH), loader_after_first);
}

#[test]
fn test_pin_key_scenario() {
    let lib = library(&[(COMPONENT_PATH, "\"pin_id\": pin_num,")]);
    let guard = guard_for(&lib);
    let patches = builtin_patches();

    let result = circuit_synth_patcher::apply_patch(&guard, &patches[0]).unwrap();
    assert!(matches!(result, PatchResult::Applied { .. }));
    assert_eq!(read(lib.path(), COMPONENT_PATH), "\"number\": pin_num,");

    let result = circuit_synth_patcher::apply_patch(&guard, &patches[0]).unwrap();
    assert!(matches!(result, PatchResult::AlreadyPatched { .. }));
    assert_eq!(read(lib.path(), COMPONENT_PATH), "\"number\": pin_num,");
}

#[test]
fn test_loader_block_preserves_surrounding_code() {
    let lib = library(&[(LOADER_PATH, LOADER_UNPATCHED)]);
    let guard = guard_for(&lib);

    let results = apply_patches(&guard, &builtin_patches());
    assert!(matches!(results[0].1, Ok(PatchResult::FileMissing { .. })));
    assert!(matches!(results[1].1, Ok(PatchResult::Applied { .. })));

    let patched = read(lib.path(), LOADER_PATH);
    assert_eq!(patched, LOADER_PATCHED);
    assert!(patched.starts_with("import logging\n\nlogger = logging.getLogger(__name__)\n"));
    assert!(patched.ends_with("    return nets\n"));
}

#[test]
fn test_drifted_loader_is_left_untouched() {
    let lib = library(&[
        (COMPONENT_PATH, COMPONENT_UNPATCHED),
        (LOADER_PATH, LOADER_DRIFTED),
    ]);
    let guard = guard_for(&lib);

    let results = apply_patches(&guard, &builtin_patches());

    // Drift in one file does not stop the other patch.
    assert!(matches!(results[0].1, Ok(PatchResult::Applied { .. })));
    match &results[1].1 {
        Ok(PatchResult::TargetMissing { file }) => {
            assert!(file.ends_with("kicad/sch_gen/circuit_loader.py"));
        }
        other => panic!("expected TargetMissing, got {other:?}"),
    }
    assert_eq!(
        fs::read(lib.path().join(LOADER_PATH)).unwrap(),
        LOADER_DRIFTED.as_bytes()
    );
}

#[test]
fn test_missing_files_are_reported_in_order() {
    let lib = library(&[]);
    let guard = guard_for(&lib);

    let results = apply_patches(&guard, &builtin_patches());

    let ids: Vec<&str> = results.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(
        ids,
        ["component-pin-number-key", "loader-pin-number-priority"]
    );
    for (_, result) in &results {
        assert!(matches!(result, Ok(PatchResult::FileMissing { .. })));
    }
    assert!(!lib.path().join("core").exists());
    assert!(!lib.path().join("kicad").exists());
}

#[test]
fn test_patches_only_touch_their_own_file() {
    let lib = library(&[
        (COMPONENT_PATH, COMPONENT_UNPATCHED),
        (LOADER_PATH, LOADER_UNPATCHED),
    ]);
    let guard = guard_for(&lib);
    let patches = builtin_patches();

    let result = circuit_synth_patcher::apply_patch(&guard, &patches[0]).unwrap();
    assert!(matches!(result, PatchResult::Applied { .. }));

    assert_eq!(read(lib.path(), LOADER_PATH), LOADER_UNPATCHED);
    assert_eq!(
        read(lib.path(), "__init__.py"),
        "__version__ = \"0.0.0\"\n"
    );
}

#[test]
fn test_check_reports_without_writing() {
    let lib = unpatched_library();
    let guard = guard_for(&lib);

    let results = check_patches(&guard, &builtin_patches());
    for (_, result) in &results {
        assert!(matches!(result, Ok(PatchResult::Applied { .. })));
    }
    assert_eq!(read(lib.path(), COMPONENT_PATH), COMPONENT_UNPATCHED);
    assert_eq!(read(lib.path(), LOADER_PATH), LOADER_UNPATCHED);
}

#[test]
fn test_io_failure_does_not_stop_later_patches() {
    let lib = library(&[(COMPONENT_PATH, COMPONENT_UNPATCHED)]);
    // A directory where a file is expected cannot be read as text.
    fs::create_dir_all(lib.path().join(LOADER_PATH)).unwrap();
    let guard = guard_for(&lib);

    let mut patches = builtin_patches();
    patches.reverse();
    let results = apply_patches(&guard, &patches);

    match &results[0].1 {
        Err(circuit_synth_patcher::ApplicationError::Io { path, .. }) => {
            assert!(path.ends_with("circuit_loader.py"));
        }
        other => panic!("expected I/O error, got {other:?}"),
    }
    assert!(matches!(results[1].1, Ok(PatchResult::Applied { .. })));
    assert_eq!(read(lib.path(), COMPONENT_PATH), COMPONENT_PATCHED);
}

#[test]
fn test_absent_library_is_not_found() {
    let outer = tempfile::tempdir().unwrap();
    let locator = FixedLocator::new("circuit_synth", outer.path().join("circuit_synth"));

    let err = locator.locate().unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(fs::read_dir(outer.path()).unwrap().count(), 0);
}

#[test]
fn test_custom_spec_with_multiple_occurrences() {
    let lib = library(&[("util.py", "a = OLD\nb = OLD\n")]);
    let guard = guard_for(&lib);
    let spec = PatchSpec::new("multi", ["util.py"], "OLD", "NEW");

    let result = circuit_synth_patcher::apply_patch(&guard, &spec).unwrap();
    assert!(matches!(result, PatchResult::Applied { replacements: 2, .. }));
    assert_eq!(fixtures::read(lib.path(), "util.py"), "a = NEW\nb = NEW\n");
}
