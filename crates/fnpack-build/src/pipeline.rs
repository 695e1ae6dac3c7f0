//! The packaging pipeline as an explicit state machine.
//!
//! ```text
//! Start → Cleaned → ManifestChecked ─┬→ DepsInstalled ─┬→ SourceCopied → Archived → Verified → Done
//!                                    └→ DepsSkipped ───┘
//! ```
//!
//! [`Pipeline::advance`] performs exactly one transition. Any transition may
//! fail with a [`PipelineError`] naming the [`Step`] that failed; failure is
//! terminal.

use std::fmt;
use std::path::PathBuf;

use fnpack_core::{ArchiveConfig, Manifest, ManifestStatus, ProjectLayout};
use fnpack_tools::{Archiver, DependencyInstaller, ToolError};

use crate::assemble::{AssembleError, assemble_source};
use crate::report::{BuildReport, VerifyError, inspect};
use crate::workspace::{self, WorkspaceError};

/// Pipeline state. Each state carries what later stages need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Start,
    Cleaned,
    ManifestChecked(Manifest),
    DepsInstalled(Manifest),
    DepsSkipped(Manifest),
    SourceCopied(Assembled),
    Archived(Assembled),
    Verified(BuildReport),
    Done(BuildReport),
}

/// Staging contents once dependencies and source are in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled {
    pub manifest: Manifest,
    pub dependencies_installed: bool,
    pub source_files: usize,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Cleaned => "cleaned",
            Self::ManifestChecked(_) => "manifest-checked",
            Self::DepsInstalled(_) => "deps-installed",
            Self::DepsSkipped(_) => "deps-skipped",
            Self::SourceCopied(_) => "source-copied",
            Self::Archived(_) => "archived",
            Self::Verified(_) => "verified",
            Self::Done(_) => "done",
        }
    }
}

/// The unit of work a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Prepare,
    Manifest,
    Install,
    Assemble,
    Archive,
    Verify,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Prepare => "prepare",
            Self::Manifest => "manifest",
            Self::Install => "install",
            Self::Assemble => "assemble",
            Self::Archive => "archive",
            Self::Verify => "verify",
        })
    }
}

/// Sequences workspace preparation, dependency installation, source
/// assembly, archiving and verification for one project.
pub struct Pipeline<I: DependencyInstaller, A: Archiver> {
    layout: ProjectLayout,
    installer: I,
    archiver: A,
    preview_entries: usize,
}

impl<I: DependencyInstaller, A: Archiver> Pipeline<I, A> {
    pub fn new(layout: ProjectLayout, installer: I, archiver: A) -> Self {
        Self {
            layout,
            installer,
            archiver,
            preview_entries: ArchiveConfig::default().preview_entries,
        }
    }

    pub fn preview_entries(mut self, limit: usize) -> Self {
        self.preview_entries = limit;
        self
    }

    /// Run every transition from [`Stage::Start`] to [`Stage::Done`].
    pub async fn run(&self) -> Result<BuildReport, PipelineError> {
        self.run_with(|_| {}).await
    }

    /// Like [`run`](Self::run), calling `observe` after each transition.
    pub async fn run_with(
        &self,
        mut observe: impl FnMut(&Stage),
    ) -> Result<BuildReport, PipelineError> {
        let mut stage = Stage::Start;
        loop {
            stage = self.advance(stage).await?;
            observe(&stage);
            if let Stage::Done(report) = stage {
                return Ok(report);
            }
        }
    }

    /// Perform one transition.
    pub async fn advance(&self, stage: Stage) -> Result<Stage, PipelineError> {
        let from = stage.name();
        let next = match stage {
            Stage::Start => {
                workspace::prepare(&self.layout)
                    .map_err(|e| PipelineError::WorkspacePreparation { source: e })?;
                Stage::Cleaned
            }

            Stage::Cleaned => {
                let manifest = Manifest::load(&self.layout.manifest)
                    .map_err(|e| PipelineError::ManifestRead { source: e })?;
                if manifest.status == ManifestStatus::Absent {
                    return Err(PipelineError::MissingManifest(manifest.path));
                }
                Stage::ManifestChecked(manifest)
            }

            Stage::ManifestChecked(manifest) => {
                if manifest.status.is_actionable() {
                    self.installer
                        .install(&manifest, &self.layout.staging_dir)
                        .await
                        .map_err(|e| PipelineError::DependencyInstallation { source: e })?;
                    Stage::DepsInstalled(manifest)
                } else {
                    tracing::info!("manifest lists no dependencies, skipping install");
                    Stage::DepsSkipped(manifest)
                }
            }

            Stage::DepsInstalled(manifest) => self.assemble(manifest, true)?,
            Stage::DepsSkipped(manifest) => self.assemble(manifest, false)?,

            Stage::SourceCopied(assembled) => {
                let archive = &self.layout.archive_path;
                if let Err(e) = self.archiver.create(&self.layout.staging_dir, archive).await {
                    self.discard_archive();
                    return Err(PipelineError::ArchiveCreation {
                        path: archive.clone(),
                        source: e,
                    });
                }
                Stage::Archived(assembled)
            }

            Stage::Archived(assembled) => {
                let archive = &self.layout.archive_path;
                let report = match inspect(&self.archiver, archive, self.preview_entries).await {
                    Ok(report) => report,
                    Err(VerifyError::Missing(path)) => {
                        return Err(PipelineError::ArchiveNotProduced(path));
                    }
                    Err(e) => {
                        self.discard_archive();
                        return Err(PipelineError::ArchiveVerification {
                            path: archive.clone(),
                            source: e,
                        });
                    }
                };
                Stage::Verified(BuildReport {
                    manifest: assembled.manifest.status,
                    dependencies_installed: assembled.dependencies_installed,
                    source_files: assembled.source_files,
                    archive: report,
                })
            }

            Stage::Verified(report) | Stage::Done(report) => Stage::Done(report),
        };

        tracing::info!(from, to = next.name(), "pipeline transition");
        Ok(next)
    }

    fn assemble(
        &self,
        manifest: Manifest,
        dependencies_installed: bool,
    ) -> Result<Stage, PipelineError> {
        let source_files = assemble_source(
            &self.layout.source_dir,
            &self.layout.staging_dir,
            &self.layout.exclude,
        )
        .map_err(|e| match e {
            AssembleError::MissingSource(path) => PipelineError::MissingSourceTree(path),
            other => PipelineError::SourceCopy { source: other },
        })?;

        Ok(Stage::SourceCopied(Assembled {
            manifest,
            dependencies_installed,
            source_files,
        }))
    }

    /// Remove a partial or unreadable archive so no misleading artifact remains.
    fn discard_archive(&self) {
        let path = &self.layout.archive_path;
        match std::fs::remove_file(path) {
            Ok(()) => tracing::debug!(path = %path.display(), "removed partial archive"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to remove partial archive"
                );
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("[prepare] failed to prepare workspace")]
    WorkspacePreparation { source: WorkspaceError },

    #[error("[manifest] dependency manifest not found at {0}")]
    MissingManifest(PathBuf),

    #[error("[manifest] could not read dependency manifest")]
    ManifestRead { source: fnpack_core::Error },

    #[error("[install] dependency installation failed")]
    DependencyInstallation { source: ToolError },

    #[error("[assemble] handler source directory not found at {0}")]
    MissingSourceTree(PathBuf),

    #[error("[assemble] failed to copy handler source")]
    SourceCopy { source: AssembleError },

    #[error("[archive] failed to create archive at {path}; nothing was built")]
    ArchiveCreation { path: PathBuf, source: ToolError },

    #[error("[archive] archiver succeeded but no archive exists at {0}; nothing was built")]
    ArchiveNotProduced(PathBuf),

    #[error("[verify] archive was built at {path} but could not be inspected")]
    ArchiveVerification { path: PathBuf, source: VerifyError },
}

impl PipelineError {
    pub fn step(&self) -> Step {
        match self {
            Self::WorkspacePreparation { .. } => Step::Prepare,
            Self::MissingManifest(_) | Self::ManifestRead { .. } => Step::Manifest,
            Self::DependencyInstallation { .. } => Step::Install,
            Self::MissingSourceTree(_) | Self::SourceCopy { .. } => Step::Assemble,
            Self::ArchiveCreation { .. } | Self::ArchiveNotProduced(_) => Step::Archive,
            Self::ArchiveVerification { .. } => Step::Verify,
        }
    }
}
