//! Resolution of an installed library's root directory.
//!
//! The applier only ever sees the root a [`LibraryLocator`] hands back, so
//! tests can point it at a synthetic tree with [`FixedLocator`] while the CLI
//! asks the host Python environment through [`PythonLocator`].

use serde::Deserialize;
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

/// Where an installed library lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryLocation {
    pub root: PathBuf,
    /// Reported version, when the package exposes one
    pub version: Option<String>,
}

#[derive(Error, Debug)]
pub enum LocateError {
    /// The library is not installed (or not reachable) in this environment.
    #[error("{library} not found in the current environment: {reason}")]
    LibraryNotFound { library: String, reason: String },

    #[error("unexpected response while locating {library}: {reason}")]
    MalformedResponse { library: String, reason: String },
}

impl LocateError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LocateError::LibraryNotFound { .. })
    }
}

/// Capability to resolve a library root.
pub trait LibraryLocator {
    /// Human-readable name of the library being located.
    fn library(&self) -> &str;

    fn locate(&self) -> Result<LibraryLocation, LocateError>;
}

/// Returns a root chosen up front (CLI flag, env var, tests).
#[derive(Debug, Clone)]
pub struct FixedLocator {
    library: String,
    root: PathBuf,
}

impl FixedLocator {
    pub fn new(library: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            library: library.into(),
            root: root.into(),
        }
    }
}

impl LibraryLocator for FixedLocator {
    fn library(&self) -> &str {
        &self.library
    }

    fn locate(&self) -> Result<LibraryLocation, LocateError> {
        if !self.root.is_dir() {
            return Err(LocateError::LibraryNotFound {
                library: self.library.clone(),
                reason: format!("{} is not a directory", self.root.display()),
            });
        }
        Ok(LibraryLocation {
            root: self.root.clone(),
            version: None,
        })
    }
}

/// Asks a Python interpreter where a package is installed.
#[derive(Debug, Clone)]
pub struct PythonLocator {
    interpreter: String,
    package: String,
}

/// Imports the package named in argv[1] and prints its directory and version
/// as one JSON object.
const LOCATE_PROGRAM: &str = "\
import importlib, json, os, sys
m = importlib.import_module(sys.argv[1])
v = getattr(m, '__version__', None)
print(json.dumps({'root': os.path.dirname(os.path.abspath(m.__file__)), 'version': None if v is None else str(v)}))
";

#[derive(Debug, Deserialize)]
struct LocateResponse {
    root: PathBuf,
    #[serde(default)]
    version: Option<String>,
}

impl PythonLocator {
    pub fn new(interpreter: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            package: package.into(),
        }
    }

    fn not_found(&self, reason: impl Into<String>) -> LocateError {
        LocateError::LibraryNotFound {
            library: self.package.clone(),
            reason: reason.into(),
        }
    }

    fn parse_response(&self, stdout: &str) -> Result<LibraryLocation, LocateError> {
        // Imports may print before our line; the answer is the last one.
        let line = stdout
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("");

        let response: LocateResponse =
            serde_json::from_str(line.trim()).map_err(|e| LocateError::MalformedResponse {
                library: self.package.clone(),
                reason: format!("{e} (output: {line:?})"),
            })?;

        if !response.root.is_dir() {
            return Err(self.not_found(format!(
                "reported root {} is not a directory",
                response.root.display()
            )));
        }

        Ok(LibraryLocation {
            root: response.root,
            version: response.version,
        })
    }
}

impl LibraryLocator for PythonLocator {
    fn library(&self) -> &str {
        &self.package
    }

    fn locate(&self) -> Result<LibraryLocation, LocateError> {
        let output = Command::new(&self.interpreter)
            .args(["-c", LOCATE_PROGRAM, self.package.as_str()])
            .output()
            .map_err(|e| self.not_found(format!("could not run {}: {e}", self.interpreter)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("import failed")
                .trim()
                .to_string();
            return Err(self.not_found(reason));
        }

        self.parse_response(&String::from_utf8_lossy(&output.stdout))
    }
}
