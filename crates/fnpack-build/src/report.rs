use std::fmt;
use std::path::{Path, PathBuf};

use fnpack_core::ManifestStatus;
use fnpack_tools::{ArchiveEntry, Archiver, ToolError};
use serde::Serialize;

/// Read-only facts about a built archive, for operator feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveReport {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub entry_count: usize,
    /// The first entries, at most the configured preview length
    pub preview: Vec<ArchiveEntry>,
    /// Entries not shown in `preview`
    pub remaining: usize,
}

impl ArchiveReport {
    fn new(path: &Path, size_bytes: u64, mut entries: Vec<ArchiveEntry>, limit: usize) -> Self {
        let entry_count = entries.len();
        entries.truncate(limit);
        Self {
            path: path.to_path_buf(),
            size_bytes,
            entry_count,
            remaining: entry_count - entries.len(),
            preview: entries,
        }
    }
}

impl fmt::Display for ArchiveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Archive: {}", self.path.display())?;
        writeln!(f, "Size:    {}", human_size(self.size_bytes))?;
        writeln!(f, "Entries: {}", self.entry_count)?;
        for entry in &self.preview {
            writeln!(f, "  {}", entry.name)?;
        }
        if self.remaining > 0 {
            writeln!(f, "  ... and {} more", self.remaining)?;
        }
        Ok(())
    }
}

/// Everything a successful pipeline run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub manifest: ManifestStatus,
    pub dependencies_installed: bool,
    pub source_files: usize,
    pub archive: ArchiveReport,
}

/// Inspect an existing archive: confirm it exists, measure it, list it.
pub async fn inspect<A: Archiver>(
    archiver: &A,
    archive: &Path,
    preview_entries: usize,
) -> Result<ArchiveReport, VerifyError> {
    let metadata = match std::fs::metadata(archive) {
        Ok(m) if m.is_file() => m,
        Ok(_) => return Err(VerifyError::Missing(archive.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(VerifyError::Missing(archive.to_path_buf()));
        }
        Err(e) => {
            return Err(VerifyError::Metadata {
                path: archive.to_path_buf(),
                source: e,
            });
        }
    };

    let entries = archiver
        .list(archive)
        .await
        .map_err(|e| VerifyError::Unreadable {
            path: archive.to_path_buf(),
            source: e,
        })?;

    Ok(ArchiveReport::new(
        archive,
        metadata.len(),
        entries,
        preview_entries,
    ))
}

/// Format a byte count the way `ls -lh` would.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["K", "M", "G", "T"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}iB", UNITS[unit])
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("no archive at {0}")]
    Missing(PathBuf),
    #[error("failed to read metadata of {path}")]
    Metadata {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("archive at {path} exists but could not be listed")]
    Unreadable { path: PathBuf, source: ToolError },
}
