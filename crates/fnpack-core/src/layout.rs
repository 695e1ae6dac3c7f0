use std::path::{Path, PathBuf};

use crate::config::{CONFIG_FILE, FnpackConfig};

/// Absolute locations of every pipeline input and output for one project.
///
/// All paths are derived from the project root, so the pipeline behaves
/// the same regardless of the caller's working directory.
///
/// # Examples
///
/// ```
/// use fnpack_core::{FnpackConfig, ProjectLayout};
/// use std::path::Path;
///
/// let layout = ProjectLayout::new(Path::new("/srv/app"), &FnpackConfig::default());
/// assert_eq!(layout.staging_dir, Path::new("/srv/app/dist/package"));
/// assert_eq!(layout.archive_path, Path::new("/srv/app/dist/function.zip"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub manifest: PathBuf,
    pub source_dir: PathBuf,
    /// Output root owning both the staging tree and the archive
    pub output_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub archive_path: PathBuf,
    /// Path components skipped while assembling source
    pub exclude: Vec<String>,
}

impl ProjectLayout {
    pub fn new(root: &Path, config: &FnpackConfig) -> Self {
        let paths = &config.paths;
        let output_dir = root.join(&paths.output_dir);
        Self {
            root: root.to_path_buf(),
            manifest: root.join(&paths.manifest),
            source_dir: root.join(&paths.source_dir),
            staging_dir: output_dir.join(&paths.staging_dir),
            archive_path: output_dir.join(&paths.archive),
            output_dir,
            exclude: paths.exclude.clone(),
        }
    }
}

/// Locate the project root for a command started in `start`.
///
/// Walks upward to the nearest directory containing `fnpack.toml`; when
/// none exists, `start` itself is the root.
pub fn discover_root(start: &Path) -> PathBuf {
    let found = start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE).is_file());

    match found {
        Some(dir) => {
            tracing::debug!(root = %dir.display(), "found {CONFIG_FILE}");
            dir.to_path_buf()
        }
        None => start.to_path_buf(),
    }
}

/// [`discover_root`] starting from the process working directory.
pub fn discover_root_from_cwd() -> crate::Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(|e| crate::Error::CurrentDir { source: e })?;
    Ok(discover_root(&cwd))
}
