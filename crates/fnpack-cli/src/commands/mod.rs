mod build;
mod clean;
mod doctor;
mod inspect;

use std::path::{Path, PathBuf};

use fnpack_core::{FnpackConfig, ProjectLayout};

pub use build::build;
pub use clean::clean;
pub use doctor::doctor;
pub use inspect::inspect;

/// A project root together with its loaded configuration.
pub(crate) struct Project {
    pub config: FnpackConfig,
    pub layout: ProjectLayout,
}

/// Resolve the project root: the explicit `--project-dir`, else the nearest
/// ancestor of the working directory holding fnpack.toml.
pub(crate) fn project_root(project_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    let root = match project_dir {
        Some(dir) => dir.to_path_buf(),
        None => fnpack_core::discover_root_from_cwd()?,
    };

    root.canonicalize().map_err(|e| {
        anyhow::anyhow!(
            "project directory {} is not accessible: {e}",
            root.display()
        )
    })
}

pub(crate) fn load_project(project_dir: Option<&Path>) -> anyhow::Result<Project> {
    let root = project_root(project_dir)?;
    let config = FnpackConfig::load(&root)?;
    let layout = ProjectLayout::new(&root, &config);
    tracing::debug!(root = %root.display(), "loaded project");
    Ok(Project { config, layout })
}
