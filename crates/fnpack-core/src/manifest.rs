//! Dependency manifest loading and classification.
//!
//! A manifest is a line-oriented list of dependency specifiers. Lines whose
//! first non-whitespace character is `#` are comments; blank lines are
//! ignored. A present manifest with nothing else in it is *vacuous* and
//! must not trigger dependency installation.

use std::path::{Path, PathBuf};

use serde::Serialize;

const COMMENT: char = '#';

/// Three-way classification of a dependency manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ManifestStatus {
    /// The manifest file does not exist.
    Absent,
    /// The manifest exists but holds only comments and blank lines.
    Vacuous,
    /// The manifest lists at least one specifier, in file order.
    Actionable { specifiers: Vec<String> },
}

impl ManifestStatus {
    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::Actionable { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Vacuous => "no dependencies",
            Self::Actionable { .. } => "dependencies listed",
        }
    }
}

/// Classify raw manifest contents. `None` means the file does not exist.
///
/// # Examples
///
/// ```
/// use fnpack_core::manifest::{classify, ManifestStatus};
///
/// assert_eq!(classify(None), ManifestStatus::Absent);
/// assert_eq!(classify(Some("# pinned below\n\n")), ManifestStatus::Vacuous);
/// assert!(classify(Some("requests==2.31.0\n")).is_actionable());
/// ```
pub fn classify(contents: Option<&str>) -> ManifestStatus {
    let Some(text) = contents else {
        return ManifestStatus::Absent;
    };

    let specifiers: Vec<String> = text
        .trim_start_matches('\u{feff}')
        .lines()
        .filter_map(specifier)
        .collect();

    if specifiers.is_empty() {
        ManifestStatus::Vacuous
    } else {
        ManifestStatus::Actionable { specifiers }
    }
}

/// Extract the specifier on one line, dropping a trailing inline comment.
fn specifier(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(COMMENT) {
        return None;
    }

    // Inline comments need whitespace before the marker; `pkg#egg=x` is a URL fragment.
    let body = trimmed
        .char_indices()
        .find(|&(i, c)| {
            c == COMMENT
                && trimmed[..i]
                    .chars()
                    .next_back()
                    .is_some_and(char::is_whitespace)
        })
        .map_or(trimmed, |(i, _)| &trimmed[..i]);

    Some(body.trim_end().to_owned())
}

/// A dependency manifest located on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub path: PathBuf,
    pub status: ManifestStatus,
}

impl Manifest {
    /// Read and classify the manifest at `path`.
    ///
    /// A missing file is not an error here; it yields
    /// [`ManifestStatus::Absent`] so the caller decides how fatal it is.
    ///
    /// # Errors
    ///
    /// [`Error::ManifestRead`](crate::Error::ManifestRead) when the file
    /// exists but cannot be read.
    pub fn load(path: &Path) -> crate::Result<Self> {
        // Non-UTF-8 bytes (e.g. Latin-1 comments) must not make classification fail
        let contents = match std::fs::read(path) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(crate::Error::ManifestRead {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        let status = classify(contents.as_deref());
        tracing::debug!(path = %path.display(), status = status.label(), "classified manifest");

        Ok(Self {
            path: path.to_path_buf(),
            status,
        })
    }

    /// Specifiers to install; empty unless the manifest is actionable.
    pub fn specifiers(&self) -> &[String] {
        match &self.status {
            ManifestStatus::Actionable { specifiers } => specifiers,
            ManifestStatus::Absent | ManifestStatus::Vacuous => &[],
        }
    }
}
