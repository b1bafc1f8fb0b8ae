//! `revdeploy branches`

use anyhow::{Context, Result};

use revdeploy::config::Config;
use revdeploy::presentation::{create_workspace, select_projects};

use super::write_json_line;

pub fn cmd_branches(config: &Config, project: Option<&str>, json: bool) -> Result<()> {
    let indices = select_projects(config, project)?;
    let workspace = create_workspace(config)?;

    for index in indices {
        let Some(project) = workspace.project(index) else {
            continue;
        };
        let branches = project
            .source()
            .branches()
            .with_context(|| format!("cannot list branches of {}", project.name()))?;

        if json {
            write_json_line(&serde_json::json!({
                "event": "branches",
                "project": project.name(),
                "branches": branches,
            }));
            continue;
        }
        println!("{}:", project.name());
        for branch in &branches {
            let mark = if branch.is_default { '*' } else { ' ' };
            println!("  {} {}", mark, branch.name);
        }
    }
    Ok(())
}
