//! Patch applicator - applies patch specs with idempotency checks
//!
//! Each spec resolves to one file under the library root and lands in exactly
//! one of four states:
//! - the old text was found and replaced (`Applied`)
//! - the new text is already there (`AlreadyPatched`)
//! - the file drifted away from both shapes (`TargetMissing`)
//! - the file is absent (`FileMissing`)
//!
//! None of those is an error. Errors are reserved for I/O faults on a file
//! that exists, invalid specs, and paths escaping the root, and they only
//! affect the spec that produced them.

use crate::config::schema::{PatchSpec, ValidationError};
use crate::edit::{self, EditError, Substitution, SubstitutionOutcome};
use crate::safety::{RootGuard, SafetyError};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result of applying a single patch
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "PatchResult should be reported to the operator"]
pub enum PatchResult {
    /// Old text was replaced (in check mode: would be replaced)
    Applied { file: PathBuf, replacements: usize },
    /// New text already present, nothing written
    AlreadyPatched { file: PathBuf },
    /// File matches neither the old nor the new text
    TargetMissing { file: PathBuf },
    /// File does not exist under the library root
    FileMissing { file: PathBuf },
}

impl fmt::Display for PatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchResult::Applied { file, replacements } => {
                write!(
                    f,
                    "Applied patch to {} ({} replacement{})",
                    file.display(),
                    replacements,
                    if *replacements == 1 { "" } else { "s" }
                )
            }
            PatchResult::AlreadyPatched { file } => {
                write!(f, "Already patched: {}", file.display())
            }
            PatchResult::TargetMissing { file } => {
                write!(
                    f,
                    "Target text not found in {}; manual review needed",
                    file.display()
                )
            }
            PatchResult::FileMissing { file } => {
                write!(f, "File not found: {}", file.display())
            }
        }
    }
}

/// Errors during patch application
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("invalid patch spec: {0}")]
    InvalidSpec(#[from] ValidationError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("refusing to edit {path}: resolves outside library root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

impl From<EditError> for ApplicationError {
    fn from(e: EditError) -> Self {
        let EditError::Io { path, source } = e;
        ApplicationError::Io { path, source }
    }
}

impl From<SafetyError> for ApplicationError {
    fn from(e: SafetyError) -> Self {
        match e {
            SafetyError::OutsideRoot { path, root } => ApplicationError::OutsideRoot { path, root },
            SafetyError::Canonicalize { path, source } => ApplicationError::Io { path, source },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Write,
    Check,
}

/// Apply one patch spec to the library rooted at `guard`.
pub fn apply_patch(guard: &RootGuard, spec: &PatchSpec) -> Result<PatchResult, ApplicationError> {
    run_patch(guard, spec, Mode::Write)
}

/// Evaluate one patch spec without writing anything.
///
/// `Applied` means "would apply".
pub fn check_patch(guard: &RootGuard, spec: &PatchSpec) -> Result<PatchResult, ApplicationError> {
    run_patch(guard, spec, Mode::Check)
}

/// Apply every spec in declared order.
///
/// A result or error for one spec never stops the remaining specs.
pub fn apply_patches(
    guard: &RootGuard,
    specs: &[PatchSpec],
) -> Vec<(String, Result<PatchResult, ApplicationError>)> {
    specs
        .iter()
        .map(|spec| (spec.id().to_string(), apply_patch(guard, spec)))
        .collect()
}

/// Read-only counterpart of [`apply_patches`].
pub fn check_patches(
    guard: &RootGuard,
    specs: &[PatchSpec],
) -> Vec<(String, Result<PatchResult, ApplicationError>)> {
    specs
        .iter()
        .map(|spec| (spec.id().to_string(), check_patch(guard, spec)))
        .collect()
}

fn run_patch(
    guard: &RootGuard,
    spec: &PatchSpec,
    mode: Mode,
) -> Result<PatchResult, ApplicationError> {
    spec.validate()?;

    let file = spec.resolve(guard.root());

    match std::fs::metadata(&file) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(PatchResult::FileMissing { file });
        }
        Err(source) => return Err(ApplicationError::Io { path: file, source }),
    }

    let canonical = guard.validate_path(&file)?;
    let content = edit::read_text(&canonical)?;

    let substitution = Substitution::new(spec.old_text(), spec.new_text());
    match substitution.evaluate(&content) {
        SubstitutionOutcome::Replaced {
            content: patched,
            replacements,
        } => {
            if mode == Mode::Write {
                let canonical = guard.revalidate(&canonical)?;
                edit::atomic_write(&canonical, patched.as_bytes())?;
            }
            Ok(PatchResult::Applied { file, replacements })
        }
        SubstitutionOutcome::AlreadyPresent => Ok(PatchResult::AlreadyPatched { file }),
        SubstitutionOutcome::NotFound => Ok(PatchResult::TargetMissing { file }),
    }
}
