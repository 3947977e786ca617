//! Circuit Synth Patcher: idempotent fixes for an installed circuit-synth
//!
//! Applies a fixed list of exact-text patches to source files inside the
//! installed `circuit_synth` package.
//!
//! # Architecture
//!
//! Every patch is a [`PatchSpec`]: a path relative to the library root plus
//! an exact before-text and after-text. Applying it reduces to a single
//! primitive, [`Substitution`], which either finds the before-text verbatim or
//! leaves the file alone. The library root comes from a [`LibraryLocator`], so
//! the applier can run against a synthetic tree as easily as a real install.
//!
//! # Safety
//!
//! - Old text is matched byte-for-byte, never fuzzily
//! - Already-patched files are detected and left untouched
//! - Atomic file writes (tempfile + fsync + rename), permissions preserved
//! - Edits are confined to the canonical library root
//! - One patch failing never stops the others
//!
//! # Example
//!
//! ```no_run
//! use circuit_synth_patcher::{apply_patches, builtin_patches, FixedLocator, LibraryLocator, RootGuard};
//!
//! let location = FixedLocator::new("circuit_synth", "/opt/venv/lib/python3.12/site-packages/circuit_synth")
//!     .locate()
//!     .expect("library installed");
//! let guard = RootGuard::new(&location.root).expect("root readable");
//!
//! for (id, result) in apply_patches(&guard, &builtin_patches()) {
//!     match result {
//!         Ok(outcome) => println!("{id}: {outcome}"),
//!         Err(e) => eprintln!("{id}: {e}"),
//!     }
//! }
//! ```

pub mod config;
pub mod edit;
pub mod locator;
pub mod safety;

// Re-exports
pub use config::{
    apply_patch, apply_patches, builtin_patches, check_patch, check_patches, ApplicationError,
    LocatorSettings, PatchResult, PatchSpec, RootSource, ValidationError, ValidationIssue,
    PACKAGE,
};
pub use edit::{EditError, Substitution, SubstitutionOutcome};
pub use locator::{FixedLocator, LibraryLocation, LibraryLocator, LocateError, PythonLocator};
pub use safety::{RootGuard, SafetyError};
