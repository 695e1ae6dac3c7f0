use std::path::{Path, PathBuf};

/// Copies the handler source tree into the staging root.
///
/// The *contents* of `source_dir` land directly in `staging_dir`: a file
/// `handlers/app.py` becomes `staging/app.py`, never
/// `staging/handlers/app.py`. Entries whose file name appears in `exclude`
/// are skipped at any depth. Symlinks are followed; one that leads back
/// into a directory still being copied fails with
/// [`AssembleError::SymlinkCycle`]. Returns the number of files copied.
pub fn assemble_source(
    source_dir: &Path,
    staging_dir: &Path,
    exclude: &[String],
) -> Result<usize, AssembleError> {
    if !source_dir.is_dir() {
        return Err(AssembleError::MissingSource(source_dir.to_path_buf()));
    }

    let root = canonical(source_dir)?;
    let copied = copy_tree(source_dir, staging_dir, exclude, &mut vec![root])?;
    tracing::debug!(
        source = %source_dir.display(),
        staging = %staging_dir.display(),
        files = copied,
        "source assembled"
    );
    Ok(copied)
}

/// `active` holds the canonical paths of the directories currently being
/// copied; re-entering one means a symlink points back up the tree.
fn copy_tree(
    src: &Path,
    dst: &Path,
    exclude: &[String],
    active: &mut Vec<PathBuf>,
) -> Result<usize, AssembleError> {
    let read_dir = std::fs::read_dir(src).map_err(|e| AssembleError::ReadDir {
        path: src.to_path_buf(),
        source: e,
    })?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| AssembleError::ReadDir {
            path: src.to_path_buf(),
            source: e,
        })?;
        entries.push(entry.path());
    }
    entries.sort();

    let mut copied = 0;
    for path in entries {
        let Some(name) = path.file_name() else {
            continue;
        };
        if exclude.iter().any(|ex| name == ex.as_str()) {
            tracing::debug!(path = %path.display(), "excluded");
            continue;
        }

        let target = dst.join(name);
        // Follows symlinks so linked helpers are packaged as regular files
        let metadata = std::fs::metadata(&path).map_err(|e| AssembleError::CopyFile {
            path: path.clone(),
            source: e,
        })?;

        if metadata.is_dir() {
            let resolved = canonical(&path)?;
            if active.contains(&resolved) {
                return Err(AssembleError::SymlinkCycle {
                    path,
                    target: resolved,
                });
            }
            std::fs::create_dir_all(&target).map_err(|e| AssembleError::Create {
                path: target.clone(),
                source: e,
            })?;
            active.push(resolved);
            copied += copy_tree(&path, &target, exclude, active)?;
            active.pop();
        } else {
            std::fs::copy(&path, &target).map_err(|e| AssembleError::CopyFile {
                path: path.clone(),
                source: e,
            })?;
            copied += 1;
        }
    }

    Ok(copied)
}

fn canonical(path: &Path) -> Result<PathBuf, AssembleError> {
    path.canonicalize().map_err(|e| AssembleError::ReadDir {
        path: path.to_path_buf(),
        source: e,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error("handler source directory not found at {0}")]
    MissingSource(PathBuf),
    #[error("failed to read directory {path}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create directory {path}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("symlink cycle at {path}: {target} is already being copied")]
    SymlinkCycle { path: PathBuf, target: PathBuf },
    #[error("failed to copy file {path}")]
    CopyFile {
        path: PathBuf,
        source: std::io::Error,
    },
}
