use std::path::Path;

use fnpack_build::workspace;

pub fn clean(project_dir: Option<&Path>) -> anyhow::Result<()> {
    let project = super::load_project(project_dir)?;
    let output_dir = &project.layout.output_dir;

    if workspace::clean(&project.layout)? {
        println!("Removed {}", output_dir.display());
    } else {
        println!("Nothing to clean at {}", output_dir.display());
    }
    Ok(())
}
