//! Locator settings resolved from CLI flags and the environment
//!
//! Priority order for the library root:
//! 1. Explicit `--root` flag
//! 2. `CIRCUIT_SYNTH_ROOT` environment variable (ignored if not a directory)
//! 3. Ask the Python interpreter (`--python` > `CIRCUIT_SYNTH_PYTHON` > `python3`)

use crate::locator::{FixedLocator, LibraryLocator, PythonLocator};
use std::path::PathBuf;

pub const ROOT_ENV: &str = "CIRCUIT_SYNTH_ROOT";
pub const PYTHON_ENV: &str = "CIRCUIT_SYNTH_PYTHON";
pub const DEFAULT_PYTHON: &str = "python3";

/// How the library root will be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootSource {
    Flag(PathBuf),
    Env(PathBuf),
    Python { interpreter: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorSettings {
    pub source: RootSource,
    /// `CIRCUIT_SYNTH_ROOT` value that was set but skipped
    pub ignored_env_root: Option<String>,
}

impl LocatorSettings {
    /// Resolve settings from the process environment.
    pub fn from_env(cli_root: Option<PathBuf>, cli_python: Option<String>) -> Self {
        Self::resolve(cli_root, cli_python, |key| std::env::var(key).ok())
    }

    /// Resolve settings with an explicit environment lookup.
    pub fn resolve(
        cli_root: Option<PathBuf>,
        cli_python: Option<String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        if let Some(root) = cli_root {
            return Self {
                source: RootSource::Flag(root),
                ignored_env_root: None,
            };
        }

        let mut ignored_env_root = None;
        if let Some(env_root) = env(ROOT_ENV).filter(|v| !v.trim().is_empty()) {
            let path = PathBuf::from(&env_root);
            if path.is_dir() {
                return Self {
                    source: RootSource::Env(path),
                    ignored_env_root: None,
                };
            }
            ignored_env_root = Some(env_root);
        }

        let interpreter = cli_python
            .or_else(|| env(PYTHON_ENV).filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_PYTHON.to_string());

        Self {
            source: RootSource::Python { interpreter },
            ignored_env_root,
        }
    }

    /// Build the locator for `package` described by these settings.
    pub fn locator(&self, package: &str) -> Box<dyn LibraryLocator> {
        match &self.source {
            RootSource::Flag(root) | RootSource::Env(root) => {
                Box::new(FixedLocator::new(package, root.clone()))
            }
            RootSource::Python { interpreter } => {
                Box::new(PythonLocator::new(interpreter.clone(), package))
            }
        }
    }
}
