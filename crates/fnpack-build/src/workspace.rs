use std::path::{Path, PathBuf};

use fnpack_core::ProjectLayout;

/// Reset the output root to a single empty staging directory.
///
/// Removes the whole output directory (previous staging tree and archive)
/// and recreates the staging directory. Idempotent: a missing, partial, or
/// stale output directory all end in the same state.
pub fn prepare(layout: &ProjectLayout) -> Result<(), WorkspaceError> {
    remove_output(&layout.output_dir)?;

    std::fs::create_dir_all(&layout.staging_dir).map_err(|e| WorkspaceError::Create {
        path: layout.staging_dir.clone(),
        source: e,
    })?;

    tracing::debug!(staging = %layout.staging_dir.display(), "workspace prepared");
    Ok(())
}

/// Remove the output directory. Returns whether anything was removed.
pub fn clean(layout: &ProjectLayout) -> Result<bool, WorkspaceError> {
    remove_output(&layout.output_dir)
}

fn remove_output(output_dir: &Path) -> Result<bool, WorkspaceError> {
    let metadata = match std::fs::symlink_metadata(output_dir) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(WorkspaceError::Inspect {
                path: output_dir.to_path_buf(),
                source: e,
            });
        }
    };

    // A stray file or symlink squatting on the output path is removed, never followed
    let removed = if metadata.is_dir() {
        std::fs::remove_dir_all(output_dir)
    } else {
        std::fs::remove_file(output_dir)
    };
    removed.map_err(|e| WorkspaceError::Cleanup {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(path = %output_dir.display(), "removed previous output");
    Ok(true)
}

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("failed to inspect output directory {path}")]
    Inspect {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to clean up output directory {path}")]
    Cleanup {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create staging directory {path}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
}
