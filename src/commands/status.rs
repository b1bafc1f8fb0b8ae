//! `revdeploy status`

use anyhow::{Context, Result};

use revdeploy::application::{remote_status, RemoteStatus};
use revdeploy::config::Config;
use revdeploy::presentation::{create_workspace, select_targets};

use super::write_json_line;

pub fn cmd_status(
    config: &Config,
    project: Option<&str>,
    remote: Option<&str>,
    branch: Option<&str>,
    json: bool,
) -> Result<()> {
    let targets = select_targets(config, project, remote, branch)?;
    let mut workspace = create_workspace(config)?;

    for target in targets {
        let status = remote_status(&mut workspace, &target)
            .with_context(|| format!("cannot inspect {}", target))?;
        if json {
            let mut record = serde_json::to_value(&status)?;
            record["event"] = "status".into();
            record["up_to_date"] = status.is_up_to_date().into();
            write_json_line(&record);
        } else {
            println!("{}", render(&status));
        }
    }
    Ok(())
}

fn render(status: &RemoteStatus) -> String {
    let state = match (&status.marker, &status.newest) {
        (_, None) => "empty repository".to_string(),
        (None, Some(_)) => "never deployed".to_string(),
        _ if status.is_up_to_date() => "up to date".to_string(),
        (Some(marker), Some(newest)) => format!("at {} (newest {})", marker.short(), newest.short()),
    };
    let mut line = format!("{} -> {}: {}", status.project, status.remote, state);
    if let (Some(owner), Some(when)) = (&status.owner, &status.last_change) {
        line.push_str(&format!(", last change by {} on {}", owner, when.format("%Y-%m-%d %H:%M")));
    }
    line
}
