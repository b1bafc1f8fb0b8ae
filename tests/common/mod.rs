//! Common test utilities for revdeploy integration tests.
//!
//! This module provides:
//! - `GitRepo`: a scratch git repository with commit helpers
//! - `TestEnv`: a temp directory with a config file and CLI runner
//! - `list_files`: sorted listing of a deployed tree

#![allow(dead_code)]

pub mod env;
pub mod repo;

pub use env::*;
pub use repo::*;

use std::path::Path;

/// Every file under `dir`, relative and `/`-separated, sorted
pub fn list_files(dir: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(root, &path, out);
            } else if let Ok(relative) = path.strip_prefix(root) {
                out.push(relative.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    let mut files = Vec::new();
    walk(dir, dir, &mut files);
    files.sort();
    files
}
