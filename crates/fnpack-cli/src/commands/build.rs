use std::path::Path;

use fnpack_build::{Pipeline, Stage};
use fnpack_tools::{PipInstaller, ZipArchiver};

/// Run the full packaging pipeline and print its summary.
pub async fn build(project_dir: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let project = super::load_project(project_dir)?;
    let installer = PipInstaller::new(project.config.install.clone());
    let archiver = ZipArchiver::new(project.config.archive.clone());
    let pipeline = Pipeline::new(project.layout, installer, archiver)
        .preview_entries(project.config.archive.preview_entries);

    let report = pipeline
        .run_with(|stage| {
            if json {
                return;
            }
            if let Some(line) = describe(stage) {
                println!("{line}");
            }
        })
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        print!("{}", report.archive);
    }

    Ok(())
}

/// Progress line for a completed transition.
fn describe(stage: &Stage) -> Option<String> {
    let line = match stage {
        Stage::Start | Stage::Done(_) => return None,
        Stage::Cleaned => "Workspace cleaned".to_owned(),
        Stage::ManifestChecked(manifest) => format!(
            "Manifest {}: {}",
            manifest.path.display(),
            manifest.status.label()
        ),
        Stage::DepsInstalled(manifest) => format!(
            "Installed dependencies from {} specifier(s)",
            manifest.specifiers().len()
        ),
        Stage::DepsSkipped(_) => "No dependencies to install".to_owned(),
        Stage::SourceCopied(assembled) => {
            format!("Copied {} source file(s)", assembled.source_files)
        }
        Stage::Archived(_) => "Archive created".to_owned(),
        Stage::Verified(_) => "Archive verified".to_owned(),
    };
    Some(line)
}
