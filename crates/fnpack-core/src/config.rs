use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name of the configuration file looked up at the project root.
pub const CONFIG_FILE: &str = "fnpack.toml";

/// fnpack.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FnpackConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub install: InstallConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Dependency manifest, relative to the project root
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
    /// Handler source tree, relative to the project root
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    /// Output root. Deleted and recreated on every build.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Staging directory name inside `output_dir`
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,
    /// Archive file name inside `output_dir`
    #[serde(default = "default_archive")]
    pub archive: String,
    /// Path components never copied out of `source_dir`
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Dependency-resolution tool
    #[serde(default = "default_install_program")]
    pub program: String,
    /// Target platform tag for binary wheels (e.g. manylinux2014_x86_64)
    #[serde(default)]
    pub platform: Option<String>,
    /// Interpreter version the wheels must match (e.g. 3.12)
    #[serde(default)]
    pub python_version: Option<String>,
    /// Extra arguments appended verbatim
    #[serde(default)]
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Archival tool
    #[serde(default = "default_archive_program")]
    pub program: String,
    /// Tool used to list archive entries during verification
    #[serde(default = "default_list_program")]
    pub list_program: String,
    /// Number of entries shown in the build summary
    #[serde(default = "default_preview_entries")]
    pub preview_entries: usize,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            source_dir: default_source_dir(),
            output_dir: default_output_dir(),
            staging_dir: default_staging_dir(),
            archive: default_archive(),
            exclude: default_exclude(),
        }
    }
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            program: default_install_program(),
            platform: None,
            python_version: None,
            extra_args: Vec::new(),
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            program: default_archive_program(),
            list_program: default_list_program(),
            preview_entries: default_preview_entries(),
        }
    }
}

impl FnpackConfig {
    /// Load from fnpack.toml at the given path, or return defaults if not found.
    ///
    /// The loaded configuration is validated before it is returned.
    pub fn load(project_dir: &Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        let config: Self = if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })?
        } else {
            tracing::debug!(dir = %project_dir.display(), "no {CONFIG_FILE}, using defaults");
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would make the pipeline write outside its
    /// output root or delete its own inputs.
    pub fn validate(&self) -> crate::Result<()> {
        let paths = &self.paths;
        check_relative("manifest", &paths.manifest)?;
        check_relative("source_dir", &paths.source_dir)?;
        check_relative("output_dir", &paths.output_dir)?;
        check_file_name("staging_dir", &paths.staging_dir)?;
        check_file_name("archive", &paths.archive)?;

        if paths.staging_dir == paths.archive {
            return Err(crate::Error::InvalidValue {
                field: "archive",
                reason: "must differ from staging_dir",
            });
        }

        let output = normalize(&paths.output_dir);
        for (field, path) in [
            ("source_dir", &paths.source_dir),
            ("manifest", &paths.manifest),
        ] {
            if normalize(path).starts_with(&output) {
                return Err(crate::Error::InvalidPath {
                    field,
                    path: path.clone(),
                    reason: "lies inside output_dir, which is deleted on every build",
                });
            }
        }
        if output.starts_with(normalize(&paths.source_dir)) {
            return Err(crate::Error::InvalidPath {
                field: "output_dir",
                path: paths.output_dir.clone(),
                reason: "lies inside source_dir, which is copied into the staging directory",
            });
        }

        if self.archive.preview_entries == 0 {
            return Err(crate::Error::InvalidValue {
                field: "archive.preview_entries",
                reason: "must be at least 1",
            });
        }

        Ok(())
    }
}

fn check_relative(field: &'static str, path: &Path) -> crate::Result<()> {
    let invalid = |reason| crate::Error::InvalidPath {
        field,
        path: path.to_path_buf(),
        reason,
    };

    if path.as_os_str().is_empty() {
        return Err(invalid("must not be empty"));
    }
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => return Err(invalid("must not contain '..'")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("must be relative to the project root"));
            }
        }
    }
    if normalize(path).as_os_str().is_empty() {
        return Err(invalid("must not be the project root itself"));
    }
    Ok(())
}

fn check_file_name(field: &'static str, name: &str) -> crate::Result<()> {
    let path = Path::new(name);
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(crate::Error::InvalidPath {
            field,
            path: path.to_path_buf(),
            reason: "must be a plain file name",
        }),
    }
}

/// Drop `.` components so `./dist` and `dist` compare equal.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn default_manifest() -> PathBuf {
    PathBuf::from("requirements.txt")
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("handlers")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_staging_dir() -> String {
    "package".to_owned()
}

fn default_archive() -> String {
    "function.zip".to_owned()
}

fn default_exclude() -> Vec<String> {
    vec!["__pycache__".to_owned()]
}

fn default_install_program() -> String {
    "pip".to_owned()
}

fn default_archive_program() -> String {
    "zip".to_owned()
}

fn default_list_program() -> String {
    "unzip".to_owned()
}

fn default_preview_entries() -> usize {
    20
}
