use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The fundamental edit primitive: whole-content exact-substring replacement.
///
/// A substitution never interprets the text it operates on. It either finds
/// `old_text` byte-for-byte or it does nothing, so unrelated code can never be
/// rewritten by a near match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution<'a> {
    pub old_text: &'a str,
    pub new_text: &'a str,
}

/// Outcome of evaluating a [`Substitution`] against some content.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "SubstitutionOutcome should be checked before writing"]
pub enum SubstitutionOutcome {
    /// `old_text` was found; `content` is the rewritten text.
    Replaced { content: String, replacements: usize },
    /// `old_text` is absent but `new_text` is already present.
    AlreadyPresent,
    /// Neither `old_text` nor `new_text` occurs in the content.
    NotFound,
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("File I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl<'a> Substitution<'a> {
    pub fn new(old_text: &'a str, new_text: &'a str) -> Self {
        Self { old_text, new_text }
    }

    /// Decide what this substitution does to `content`.
    ///
    /// Old text wins over new text: a file holding both is still rewritten.
    /// All occurrences of `old_text` are replaced.
    pub fn evaluate(&self, content: &str) -> SubstitutionOutcome {
        // An empty needle matches between every character.
        if self.old_text.is_empty() {
            return SubstitutionOutcome::NotFound;
        }

        let replacements = content.matches(self.old_text).count();
        if replacements > 0 {
            return SubstitutionOutcome::Replaced {
                content: content.replace(self.old_text, self.new_text),
                replacements,
            };
        }

        if !self.new_text.is_empty() && content.contains(self.new_text) {
            return SubstitutionOutcome::AlreadyPresent;
        }

        SubstitutionOutcome::NotFound
    }
}

/// Read a file as UTF-8 text.
///
/// Invalid UTF-8 surfaces as an `InvalidData` I/O error rather than a lossy
/// decode, so a file we cannot represent exactly is never rewritten.
pub fn read_text(path: &Path) -> Result<String, EditError> {
    fs::read_to_string(path).map_err(|source| EditError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Atomic file write: tempfile + fsync + rename.
///
/// The replacement inherits the original file's permissions. A read-only
/// target is refused with `PermissionDenied` rather than replaced by rename.
/// Either the full write succeeds or the original file is left as it was.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    let io_err = |source: std::io::Error| EditError::Io {
        path: path.to_path_buf(),
        source,
    };

    // Create tempfile in same directory to ensure same filesystem
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| {
            io_err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            ))
        })?;

    let permissions = fs::metadata(path).map_err(io_err)?.permissions();
    if permissions.readonly() {
        return Err(io_err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "file is read-only",
        )));
    }

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
    temp.write_all(content).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.as_file().set_permissions(permissions).map_err(io_err)?;

    temp.persist(path).map_err(|e| io_err(e.error))?;

    Ok(())
}
