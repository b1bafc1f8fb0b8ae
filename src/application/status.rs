//! Remote Status
//!
//! Read-only comparison of a source's newest revision with a remote marker.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::domain::value_objects::{ProjectTarget, RevisionId};
use crate::error::DeployResult;

use super::workspace::Workspace;

/// Deployment state of one remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteStatus {
    pub project: String,
    pub remote: String,
    pub newest: Option<RevisionId>,
    pub marker: Option<RevisionId>,
    pub owner: Option<String>,
    pub last_change: Option<DateTime<Utc>>,
}

impl RemoteStatus {
    /// The remote holds the newest revision
    pub fn is_up_to_date(&self) -> bool {
        self.marker.is_some() && self.marker == self.newest
    }
}

/// Inspect a target without transferring anything
///
/// The store is opened and released around the marker read.
pub fn remote_status(workspace: &mut Workspace, target: &ProjectTarget) -> DeployResult<RemoteStatus> {
    let resolved = workspace.resolve(target)?;
    resolved.source.select_branch(target.branch.as_deref());

    let newest = resolved.source.newest_revision()?;
    let owner = resolved.source.owner()?;
    let last_change = resolved.source.last_change_timestamp()?;

    let marker = match resolved.store.init() {
        Ok(()) => resolved.store.get_marker(),
        Err(err) => Err(err),
    };
    resolved.store.clean_up();
    let marker = marker?;

    debug!(
        project = resolved.project_name,
        remote = resolved.remote_name,
        "status collected"
    );
    Ok(RemoteStatus {
        project: resolved.project_name.to_string(),
        remote: resolved.remote_name.to_string(),
        newest,
        marker,
        owner,
        last_change,
    })
}
