//! Delta Classifier Domain Service
//!
//! Turns raw `<status> <path> [<path>]` lines (as printed by
//! `git diff --name-status`), or entries already split into those fields,
//! into a [`FileChangeSet`].
//!
//! Status mapping, by first character of the status field:
//! `D` deleted, `M` modified, `C` copied, `R` renamed, anything else added.

use std::collections::HashSet;

use crate::domain::entities::{FileChangeSet, PathPair};
use crate::domain::value_objects::{PathError, RepoPath};

/// Error raised for diff output that cannot be classified
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    /// Line is missing a status or a required path
    #[error("malformed diff line {line}: '{content}'")]
    MalformedLine { line: usize, content: String },

    /// Path failed validation
    #[error("invalid path on diff line {line}: {source}")]
    InvalidPath {
        line: usize,
        #[source]
        source: PathError,
    },

    /// The same path was reported twice
    #[error("path '{path}' appears more than once in the diff (line {line})")]
    DuplicatePath { line: usize, path: RepoPath },
}

/// Classify raw diff lines into change buckets
///
/// Blank lines are skipped. Fields are tab-separated when the line contains a
/// tab (git's native format, which allows spaces in paths), otherwise
/// whitespace-separated. Entries keep their input order within each bucket.
pub fn classify<I, S>(lines: I) -> Result<FileChangeSet, ClassifyError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let lines: Vec<S> = lines.into_iter().collect();
    let entries = lines.iter().enumerate().filter_map(|(idx, raw)| {
        let raw = raw.as_ref().trim_end_matches(['\r', '\n']);
        if raw.trim().is_empty() {
            return None;
        }
        let fields: Vec<&str> = if raw.contains('\t') {
            raw.split('\t').filter(|f| !f.is_empty()).collect()
        } else {
            raw.split_whitespace().collect()
        };
        Some((idx + 1, raw, fields))
    });
    classify_numbered(entries)
}

/// Classify entries already split into `[status, path, (path)]` fields
///
/// Used for NUL-delimited diff output, where paths may hold any character
/// except NUL. Error line numbers count entries from 1.
pub fn classify_entries<I, F, S>(entries: I) -> Result<FileChangeSet, ClassifyError>
where
    I: IntoIterator<Item = F>,
    F: AsRef<[S]>,
    S: AsRef<str>,
{
    let entries: Vec<F> = entries.into_iter().collect();
    let contents: Vec<String> = entries
        .iter()
        .map(|entry| fields_of(entry).join("\t"))
        .collect();
    classify_numbered(
        entries
            .iter()
            .zip(&contents)
            .enumerate()
            .map(|(idx, (entry, content))| (idx + 1, content.as_str(), fields_of(entry))),
    )
}

fn fields_of<'a, F, S>(entry: &'a F) -> Vec<&'a str>
where
    F: AsRef<[S]>,
    S: AsRef<str> + 'a,
{
    entry.as_ref().iter().map(AsRef::as_ref).collect()
}

fn classify_numbered<'a, I>(entries: I) -> Result<FileChangeSet, ClassifyError>
where
    I: IntoIterator<Item = (usize, &'a str, Vec<&'a str>)>,
{
    let mut changes = FileChangeSet::new();
    let mut claimed: HashSet<RepoPath> = HashSet::new();

    for (line_no, raw, fields) in entries {
        let malformed = || ClassifyError::MalformedLine {
            line: line_no,
            content: raw.to_string(),
        };

        let (status, paths) = fields.split_first().ok_or_else(malformed)?;
        let code = status.trim().chars().next().ok_or_else(malformed)?;

        let parse = |path: &str| {
            RepoPath::new(path).map_err(|source| ClassifyError::InvalidPath {
                line: line_no,
                source,
            })
        };
        let mut claim = |path: &RepoPath| {
            if claimed.insert(path.clone()) {
                Ok(())
            } else {
                Err(ClassifyError::DuplicatePath {
                    line: line_no,
                    path: path.clone(),
                })
            }
        };

        match code {
            'C' | 'R' => {
                let &[source, destination] = paths else {
                    return Err(malformed());
                };
                let pair = PathPair::new(parse(source)?, parse(destination)?);
                claim(&pair.destination)?;
                if code == 'R' {
                    claim(&pair.source)?;
                    changes.renamed.push(pair);
                } else {
                    changes.copied.push(pair);
                }
            }
            _ => {
                let path = paths.first().copied().ok_or_else(malformed)?;
                let path = parse(path)?;
                claim(&path)?;
                match code {
                    'D' => changes.deleted.push(path),
                    'M' => changes.modified.push(path),
                    _ => changes.added.push(path),
                }
            }
        }
    }

    Ok(changes)
}
