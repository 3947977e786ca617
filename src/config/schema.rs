use std::fmt;
use std::path::{Path, PathBuf};

/// One exact-text substitution to attempt against one file.
///
/// The file is addressed by path segments relative to the library root so a
/// spec can never name an absolute location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchSpec {
    id: String,
    description: String,
    segments: Vec<String>,
    old_text: String,
    new_text: String,
}

impl PatchSpec {
    pub fn new<I, S>(
        id: impl Into<String>,
        segments: I,
        old_text: impl Into<String>,
        new_text: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            description: String::new(),
            segments: segments.into_iter().map(Into::into).collect(),
            old_text: old_text.into(),
            new_text: new_text.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn old_text(&self) -> &str {
        &self.old_text
    }

    pub fn new_text(&self) -> &str {
        &self.new_text
    }

    /// Path relative to the library root, e.g. `core/component.py`.
    pub fn relative_path(&self) -> PathBuf {
        self.segments.iter().collect()
    }

    /// Absolute target path under `root`.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(self.relative_path())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        let patch_id = || (!self.id.trim().is_empty()).then(|| self.id.clone());

        if self.id.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                patch_id: None,
                field: "id",
            });
        }
        if self.segments.is_empty() {
            issues.push(ValidationIssue::MissingField {
                patch_id: patch_id(),
                field: "path",
            });
        }
        for segment in &self.segments {
            if !is_plain_segment(segment) {
                issues.push(ValidationIssue::InvalidSegment {
                    patch_id: patch_id(),
                    segment: segment.clone(),
                });
            }
        }
        if self.old_text.is_empty() {
            issues.push(ValidationIssue::MissingField {
                patch_id: patch_id(),
                field: "old_text",
            });
        }
        if self.new_text.is_empty() {
            issues.push(ValidationIssue::MissingField {
                patch_id: patch_id(),
                field: "new_text",
            });
        }
        if !self.old_text.is_empty() && self.new_text.contains(&self.old_text) {
            issues.push(ValidationIssue::NonIdempotent {
                patch_id: patch_id(),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains('/')
        && !segment.contains('\\')
        && !segment.contains(':')
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingField {
        patch_id: Option<String>,
        field: &'static str,
    },
    InvalidSegment {
        patch_id: Option<String>,
        segment: String,
    },
    /// New text contains old text, so the patch would re-apply forever.
    NonIdempotent { patch_id: Option<String> },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { patch_id, field } => match patch_id {
                Some(id) => write!(f, "patch '{id}' is missing required field '{field}'"),
                None => write!(f, "patch is missing required field '{field}'"),
            },
            ValidationIssue::InvalidSegment { patch_id, segment } => match patch_id {
                Some(id) => write!(f, "patch '{id}' has invalid path segment {segment:?}"),
                None => write!(f, "patch has invalid path segment {segment:?}"),
            },
            ValidationIssue::NonIdempotent { patch_id } => match patch_id {
                Some(id) => write!(f, "patch '{id}' new text contains its old text"),
                None => write!(f, "patch new text contains its old text"),
            },
        }
    }
}
