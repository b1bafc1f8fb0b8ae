//! `revdeploy deploy`

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;

use revdeploy::config::Config;
use revdeploy::domain::ports::DeploymentObserver;
use revdeploy::infrastructure::{ConsoleObserver, JsonObserver, TracingObserver};
use revdeploy::presentation::{create_workspace, select_targets};
use revdeploy::{DeployOutcome, Deployment};

use super::write_json_line;

/// Flags of the deploy subcommand
pub struct DeployArgs<'a> {
    pub project: Option<&'a str>,
    pub remote: Option<&'a str>,
    pub branch: Option<&'a str>,
    pub install: bool,
    pub detailed: bool,
    pub json: bool,
}

/// Deploy every selected target in config order, stopping at the first failure
pub fn cmd_deploy(config: &Config, args: DeployArgs<'_>) -> Result<()> {
    let targets = select_targets(config, args.project, args.remote, args.branch)?;
    if targets.is_empty() {
        warn!("no remotes configured for the selected projects");
        return Ok(());
    }

    let mut workspace = create_workspace(config)?;
    let progress: Arc<dyn DeploymentObserver> = if args.json {
        Arc::new(JsonObserver::stdout())
    } else {
        Arc::new(ConsoleObserver::stderr(args.detailed))
    };
    let log: Arc<dyn DeploymentObserver> = Arc::new(TracingObserver::new());

    let mut deployed = 0usize;
    let mut up_to_date = 0usize;
    for target in targets {
        let label = target.to_string();
        let mut deployment = Deployment::for_target(&mut workspace, target)
            .with_context(|| format!("cannot deploy {}", label))?;
        deployment.set_install(args.install);
        deployment.add_observer(Arc::clone(&progress));
        deployment.add_observer(Arc::clone(&log));

        let info = deployment.info();
        let outcome = deployment.start();
        drop(deployment);

        match outcome {
            Ok(DeployOutcome::UpToDate { .. }) => up_to_date += 1,
            Ok(DeployOutcome::Deployed(_)) => deployed += 1,
            Err(err) => {
                if args.json {
                    write_json_line(&serde_json::json!({
                        "event": "error",
                        "command": "deploy",
                        "project": info.project_name,
                        "remote": info.remote_name,
                        "kind": error_kind(&err),
                        "message": err.to_string(),
                    }));
                }
                return Err(err).with_context(|| {
                    format!("deploying {} -> {} failed", info.project_name, info.remote_name)
                });
            }
        }
    }

    if args.json {
        write_json_line(&serde_json::json!({
            "event": "complete",
            "command": "deploy",
            "deployed": deployed,
            "up_to_date": up_to_date,
        }));
    } else {
        eprintln!("{} deployed, {} already up to date", deployed, up_to_date);
    }
    Ok(())
}

fn error_kind(err: &revdeploy::DeployError) -> &'static str {
    use revdeploy::DeployError::*;
    match err {
        UnresolvedTarget(_) => "unresolved_target",
        BackendUnavailable(_) => "backend_unavailable",
        FileNotFound { .. } => "file_not_found",
        RemoteUnreachable(_) => "remote_unreachable",
        RemoteAuthFailed(_) => "remote_auth_failed",
        Transfer { .. } => "transfer",
        AlreadyRun => "already_run",
    }
}
