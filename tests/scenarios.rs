//! Scenario tests for revdeploy.
//!
//! Scenarios deploy real git repositories into local directory remotes and
//! check the remote tree after each run.
//!
//! Run with: cargo test --test scenarios

mod common;

#[path = "scenarios/local_deploy.rs"]
mod local_deploy;

#[path = "scenarios/resumable.rs"]
mod resumable;
