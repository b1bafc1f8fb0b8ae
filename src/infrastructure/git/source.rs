//! Git Revision Source
//!
//! Implements the `RevisionSource` port on top of the `git` command line.

use std::cell::OnceCell;
use std::io::{Cursor, Read};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::command::Git;
use crate::domain::entities::{Branch, FileChangeSet, PathPair};
use crate::domain::ports::{RevisionSource, SourceError, SourceResult};
use crate::domain::services::classify_entries;
use crate::domain::value_objects::{RepoPath, RevisionId};

/// A git working copy or bare repository
///
/// The ancestry of the selected branch (or `HEAD`) is listed once and cached
/// until `reset()`/`select_branch()`.
pub struct GitRevisionSource {
    git: Git,
    list_branches: bool,
    branch: Option<String>,
    revisions: OnceCell<Vec<RevisionId>>,
}

impl GitRevisionSource {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self {
            git: Git::new(repo),
            list_branches: true,
            branch: None,
            revisions: OnceCell::new(),
        }
    }

    /// With listing disabled, `branches()` reports a single synthetic `master`
    pub fn with_branch_listing(mut self, enabled: bool) -> Self {
        self.list_branches = enabled;
        self
    }

    fn tip(&self) -> &str {
        self.branch.as_deref().unwrap_or("HEAD")
    }

    /// Newest-first ancestry of the tip, computed at most once
    fn revisions(&self) -> SourceResult<&[RevisionId]> {
        if let Some(revisions) = self.revisions.get() {
            return Ok(revisions);
        }
        let revisions = self.query_revisions()?;
        Ok(self.revisions.get_or_init(|| revisions))
    }

    fn query_revisions(&self) -> SourceResult<Vec<RevisionId>> {
        let tip = self.tip();
        if !self.git.verify_commit(tip)? {
            debug!(repo = %self.git.repo().display(), tip, "no commits");
            return Ok(Vec::new());
        }
        let listing = self.git.run_text(&["rev-list", tip])?;
        let revisions: Vec<RevisionId> = listing.lines().filter_map(RevisionId::parse).collect();
        debug!(tip, count = revisions.len(), "listed ancestry");
        Ok(revisions)
    }

    fn newest(&self) -> SourceResult<Option<RevisionId>> {
        Ok(self.revisions()?.first().cloned())
    }

    /// `git log -1` field of the newest commit
    fn newest_commit_field(&self, format: &str, extra: &[&str]) -> SourceResult<Option<String>> {
        let Some(newest) = self.newest()? else {
            return Ok(None);
        };
        let format = format!("--format={}", format);
        let mut args = vec!["log", "-1", format.as_str()];
        args.extend_from_slice(extra);
        args.push(newest.as_str());

        let value = self.git.run_text(&args)?;
        let value = value.trim();
        Ok((!value.is_empty()).then(|| value.to_string()))
    }
}

impl RevisionSource for GitRevisionSource {
    fn display_name(&self) -> String {
        match &self.branch {
            Some(branch) => format!("git:{}@{}", self.git.repo().display(), branch),
            None => format!("git:{}", self.git.repo().display()),
        }
    }

    fn select_branch(&mut self, branch: Option<&str>) {
        self.branch = branch.map(str::to_string);
        self.reset();
    }

    fn reset(&mut self) {
        self.revisions = OnceCell::new();
    }

    fn newest_revision(&self) -> SourceResult<Option<RevisionId>> {
        self.newest()
    }

    fn oldest_revision(&self) -> SourceResult<Option<RevisionId>> {
        Ok(self.revisions()?.last().cloned())
    }

    fn changes_since(&self, from: &RevisionId, to: &RevisionId) -> SourceResult<FileChangeSet> {
        if from == to {
            return Ok(FileChangeSet::new());
        }
        let output = self.git.run(&[
            "diff",
            "--no-ext-diff",
            "--raw",
            "--no-abbrev",
            "-z",
            "-M100%",
            "-C100%",
            "--find-copies-harder",
            from.as_str(),
            to.as_str(),
        ])?;
        let changes = demote_stale_copies(classify_entries(parse_raw_diff(&output)?)?);
        debug!(from = from.short(), to = to.short(), stats = %changes.stats(), "diffed");
        Ok(changes)
    }

    fn all_tracked_files(&self) -> SourceResult<FileChangeSet> {
        let Some(newest) = self.newest()? else {
            return Ok(FileChangeSet::new());
        };
        let listing = self.git.run(&[
            "ls-tree",
            "-r",
            "-z",
            "--full-tree",
            newest.as_str(),
        ])?;
        let paths = parse_tree_listing(&listing)?;
        Ok(FileChangeSet::install(paths))
    }

    fn open_file(&self, path: &RepoPath) -> SourceResult<Box<dyn Read>> {
        let not_found = |revision: Option<RevisionId>| SourceError::FileNotFound {
            path: path.clone(),
            revision,
        };
        let Some(newest) = self.newest()? else {
            return Err(not_found(None));
        };

        let entry = self.git.run_text(&[
            "--literal-pathspecs",
            "ls-tree",
            "--full-tree",
            newest.as_str(),
            "--",
            path.as_str(),
        ])?;
        if !is_blob_entry(&entry) {
            return Err(not_found(Some(newest)));
        }

        let object = format!("{}:{}", newest, path);
        let content = self.git.run(&["cat-file", "blob", object.as_str()])?;
        Ok(Box::new(Cursor::new(content)))
    }

    fn owner(&self) -> SourceResult<Option<String>> {
        self.newest_commit_field("%an", &[])
    }

    fn last_change_timestamp(&self) -> SourceResult<Option<DateTime<Utc>>> {
        match self.newest_commit_field("%ad", &["--date=raw"])? {
            Some(raw) => parse_raw_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| SourceError::BackendUnavailable(format!("bad timestamp '{}'", raw))),
            None => Ok(None),
        }
    }

    fn branches(&self) -> SourceResult<Vec<Branch>> {
        if !self.list_branches {
            return Ok(vec![Branch::synthetic()]);
        }
        let listing = self.git.run_text(&[
            "for-each-ref",
            "--format=%(HEAD)%00%(refname:short)",
            "refs/heads",
        ])?;
        Ok(listing.lines().filter_map(parse_branch_line).collect())
    }
}

/// Turn copies of modified files into uploads
///
/// Modified files reach the remote before copies run, so a server-side copy
/// would duplicate the new content instead of the old one.
fn demote_stale_copies(mut changes: FileChangeSet) -> FileChangeSet {
    let (stale, kept): (Vec<PathPair>, Vec<PathPair>) = changes
        .copied
        .drain(..)
        .partition(|pair| changes.modified.contains(&pair.source));
    changes.copied = kept;
    for pair in stale {
        debug!(
            source = %pair.source,
            destination = %pair.destination,
            "copy of modified file uploaded instead"
        );
        changes.added.push(pair.destination);
    }
    changes
}

/// Parse git's raw date (`<epoch seconds> <+hhmm>`), discarding the offset
pub fn parse_raw_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let seconds = raw.split_whitespace().next()?.parse::<i64>().ok()?;
    DateTime::from_timestamp(seconds, 0)
}

/// One `for-each-ref` line: `*` or space, NUL, short ref name
fn parse_branch_line(line: &str) -> Option<Branch> {
    let (head, name) = line.split_once('\0')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some(Branch::new(name, head.trim() == "*"))
}

/// `ls-tree` line: `<mode> <type> <object>\t<path>`
fn is_blob_entry(entry: &str) -> bool {
    entry
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .is_some_and(|kind| kind == "blob")
}

/// Tree entry mode of a submodule commit
const GITLINK_MODE: &str = "160000";

/// Mode reported for the missing side of an addition or deletion
const ABSENT_MODE: &str = "000000";

/// Split `git diff --raw -z` output into `[status, path, (path)]` entries
///
/// A record is `:<old mode> <new mode> <old id> <new id> <status>` followed by
/// one path, or two for copies and renames. Submodules have no content to
/// transfer: their entries are dropped, a file replaced by a submodule is
/// deleted and a submodule replaced by a file is added.
fn parse_raw_diff(output: &[u8]) -> SourceResult<Vec<Vec<String>>> {
    let malformed = |record: &str| {
        SourceError::BackendUnavailable(format!("unexpected git diff record '{}'", record))
    };
    let mut fields = output
        .split(|b| *b == 0)
        .map(|field| String::from_utf8_lossy(field).into_owned());

    let mut entries = Vec::new();
    while let Some(header) = fields.next() {
        if header.is_empty() {
            continue;
        }
        let meta: Vec<&str> = header
            .strip_prefix(':')
            .ok_or_else(|| malformed(&header))?
            .split(' ')
            .collect();
        let &[old_mode, new_mode, _, _, status] = meta.as_slice() else {
            return Err(malformed(&header));
        };

        let path_count = if status.starts_with(['C', 'R']) { 2 } else { 1 };
        let mut entry = vec![status.to_string()];
        for _ in 0..path_count {
            let path = fields
                .next()
                .filter(|path| !path.is_empty())
                .ok_or_else(|| malformed(&header))?;
            entry.push(path);
        }

        match (old_mode == GITLINK_MODE, new_mode == GITLINK_MODE) {
            (false, false) => entries.push(entry),
            (false, true) if old_mode != ABSENT_MODE => {
                entry[0] = String::from("D");
                entries.push(entry);
            }
            (true, false) if new_mode != ABSENT_MODE => {
                entry[0] = String::from("A");
                entries.push(entry);
            }
            _ => debug!(path = %entry[entry.len() - 1], "submodule change skipped"),
        }
    }
    Ok(entries)
}

/// Blob paths of `git ls-tree -r -z` output (`<mode> <type> <object>\t<path>`)
///
/// Submodule (`commit`) entries are skipped.
fn parse_tree_listing(listing: &[u8]) -> SourceResult<Vec<RepoPath>> {
    let mut paths = Vec::new();
    for record in listing.split(|b| *b == 0).filter(|record| !record.is_empty()) {
        let record = String::from_utf8_lossy(record);
        let Some((meta, path)) = record.split_once('\t') else {
            return Err(SourceError::BackendUnavailable(format!(
                "unexpected git ls-tree record '{}'",
                record
            )));
        };
        if meta.split(' ').nth(1) != Some("blob") {
            debug!(path, "non-file tree entry skipped");
            continue;
        }
        let path = RepoPath::new(path).map_err(|e| {
            SourceError::BackendUnavailable(format!("bad tracked path '{}': {}", path, e))
        })?;
        paths.push(path);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::classify;

    #[test]
    fn raw_timestamp_discards_offset() {
        let ts = parse_raw_timestamp("1700000000 +0200").unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);

        let ts = parse_raw_timestamp("1700000000 -0530").unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
    }

    #[test]
    fn raw_timestamp_rejects_garbage() {
        assert!(parse_raw_timestamp("").is_none());
        assert!(parse_raw_timestamp("yesterday +0000").is_none());
    }

    #[test]
    fn branch_lines() {
        assert_eq!(parse_branch_line("*\0main"), Some(Branch::new("main", true)));
        assert_eq!(
            parse_branch_line(" \0feature/x"),
            Some(Branch::new("feature/x", false))
        );
        assert_eq!(parse_branch_line("garbage"), None);
    }

    #[test]
    fn blob_entries() {
        assert!(is_blob_entry(
            "100644 blob 3b18e512dba79e4c8300dd08aeb37f8e728b8dad\tREADME.md\n"
        ));
        assert!(!is_blob_entry(
            "040000 tree 3b18e512dba79e4c8300dd08aeb37f8e728b8dad\tsrc\n"
        ));
        assert!(!is_blob_entry(""));
    }

    #[test]
    fn tree_listing_keeps_blobs_only() {
        let listing = b"100644 blob 3b18e512dba79e4c8300dd08aeb37f8e728b8dad\tsay\"hi\".txt\0\
160000 commit 4b825dc642cb6eb9a060e54bf8d69288fbee4904\tvendor/lib\0\
120000 blob 9daeafb9864cf43055ae93beb0afd6c7d144bfa4\tdir/link\0";
        let paths = parse_tree_listing(listing).unwrap();
        assert_eq!(
            paths,
            vec![RepoPath::new("say\"hi\".txt").unwrap(), RepoPath::new("dir/link").unwrap()]
        );
    }

    #[test]
    fn raw_diff_records_split_on_nul() {
        let output = b":100644 100644 aaaaaaa bbbbbbb M\0tab\there.txt\0\
:100644 100644 ccccccc ccccccc R100\0old.txt\0new \"name\".txt\0\
:000000 100644 0000000 ddddddd A\0added.txt\0";
        let entries = parse_raw_diff(output).unwrap();
        assert_eq!(
            entries,
            vec![
                vec!["M", "tab\there.txt"],
                vec!["R100", "old.txt", "new \"name\".txt"],
                vec!["A", "added.txt"],
            ]
        );
    }

    #[test]
    fn raw_diff_drops_submodule_entries() {
        let output = b":000000 160000 0000000 aaaaaaa A\0vendor/lib\0\
:160000 160000 aaaaaaa bbbbbbb M\0vendor/other\0\
:100644 160000 ccccccc ddddddd T\0was-a-file\0\
:160000 100644 eeeeeee fffffff T\0now-a-file\0\
:160000 000000 aaaaaaa 0000000 D\0vendor/gone\0";
        let entries = parse_raw_diff(output).unwrap();
        assert_eq!(entries, vec![vec!["D", "was-a-file"], vec!["A", "now-a-file"]]);
    }

    #[test]
    fn raw_diff_rejects_truncated_records() {
        assert!(parse_raw_diff(b":100644 100644 aaaaaaa bbbbbbb R100\0only-one\0").is_err());
        assert!(parse_raw_diff(b"M\0no-header\0").is_err());
    }

    #[test]
    fn copies_of_modified_files_become_additions() {
        let changes = classify([
            "M\tfile1.txt",
            "C100\tfile1.txt\tdup.txt",
            "C100\tfile2.txt\tcopy/file2.txt",
        ])
        .unwrap();
        let changes = demote_stale_copies(changes);

        assert_eq!(changes.added, vec![RepoPath::new("dup.txt").unwrap()]);
        assert_eq!(changes.copied.len(), 1);
        assert_eq!(changes.copied[0].destination.as_str(), "copy/file2.txt");
    }

    #[test]
    fn listing_disabled_reports_synthetic_master() {
        let source = GitRevisionSource::new("/nonexistent").with_branch_listing(false);
        assert_eq!(source.branches().unwrap(), vec![Branch::new("master", false)]);
    }

    #[test]
    fn display_name_includes_branch() {
        let mut source = GitRevisionSource::new("/srv/repo");
        assert_eq!(source.display_name(), "git:/srv/repo");
        source.select_branch(Some("release"));
        assert_eq!(source.display_name(), "git:/srv/repo@release");
    }
}
