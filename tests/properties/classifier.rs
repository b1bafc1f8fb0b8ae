//! Property tests for the delta classifier.

use proptest::prelude::*;

use revdeploy::domain::services::classify;
use revdeploy::{PathPair, RepoPath};

fn segment() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9_-][A-Za-z0-9._-]{0,11}")
        .unwrap()
        .prop_filter("not a dot segment", |s| s != "." && s != "..")
}

fn relative_path() -> impl Strategy<Value = String> {
    proptest::collection::vec(segment(), 1..=3).prop_map(|segments| segments.join("/"))
}

/// Status letters of single-path lines
fn single_status() -> impl Strategy<Value = char> {
    prop_oneof![
        Just('A'),
        Just('M'),
        Just('D'),
        Just('T'),
        Just('U'),
        Just('X'),
    ]
}

/// Distinct paths, at least `min` of them
fn distinct_paths(min: usize) -> impl Strategy<Value = Vec<String>> {
    proptest::collection::hash_set(relative_path(), min..24)
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Arbitrary input never panics the classifier.
    #[test]
    fn property_classify_never_panics(
        lines in proptest::collection::vec("(?s).{0,64}", 0..16)
    ) {
        let _ = classify(&lines);
    }

    /// PROPERTY: Each single-path line lands in the bucket its first letter names,
    /// in input order, and nothing is lost or invented.
    #[test]
    fn property_single_path_status_mapping(
        entries in distinct_paths(0).prop_flat_map(|paths| {
            let n = paths.len();
            (Just(paths), proptest::collection::vec(single_status(), n))
        })
    ) {
        let (paths, statuses) = entries;
        let lines: Vec<String> = paths
            .iter()
            .zip(&statuses)
            .map(|(path, status)| format!("{}\t{}", status, path))
            .collect();

        let changes = classify(&lines).unwrap();

        let expected = |wanted: &dyn Fn(char) -> bool| -> Vec<RepoPath> {
            paths
                .iter()
                .zip(&statuses)
                .filter(|(_, status)| wanted(**status))
                .map(|(path, _)| RepoPath::new(path).unwrap())
                .collect()
        };
        prop_assert_eq!(&changes.deleted, &expected(&|c| c == 'D'));
        prop_assert_eq!(&changes.modified, &expected(&|c| c == 'M'));
        prop_assert_eq!(&changes.added, &expected(&|c| c != 'D' && c != 'M'));
        prop_assert!(changes.copied.is_empty());
        prop_assert!(changes.renamed.is_empty());
        prop_assert_eq!(changes.len(), lines.len());
    }

    /// PROPERTY: Renames and copies keep their (source, destination) pairing
    /// and order, with or without git's similarity score.
    #[test]
    fn property_pairs_preserve_order(
        paths in distinct_paths(2),
        score in proptest::option::of(0u8..=100),
        copy_first in any::<bool>()
    ) {
        let pairs: Vec<(String, String)> = paths
            .chunks_exact(2)
            .map(|chunk| (chunk[0].clone(), chunk[1].clone()))
            .collect();
        let score = score.map(|s| s.to_string()).unwrap_or_default();
        let letter = if copy_first { 'C' } else { 'R' };
        let lines: Vec<String> = pairs
            .iter()
            .map(|(from, to)| format!("{}{}\t{}\t{}", letter, score, from, to))
            .collect();

        let changes = classify(&lines).unwrap();

        let expected: Vec<PathPair> = pairs
            .iter()
            .map(|(from, to)| PathPair::new(RepoPath::new(from).unwrap(), RepoPath::new(to).unwrap()))
            .collect();
        if copy_first {
            prop_assert_eq!(&changes.copied, &expected);
            prop_assert!(changes.renamed.is_empty());
        } else {
            prop_assert_eq!(&changes.renamed, &expected);
            prop_assert!(changes.copied.is_empty());
        }
    }

    /// PROPERTY: Classification is deterministic.
    #[test]
    fn property_classify_is_deterministic(
        paths in distinct_paths(0),
        seed in any::<u64>()
    ) {
        let lines: Vec<String> = paths
            .iter()
            .enumerate()
            .map(|(i, path)| {
                let status = ['A', 'M', 'D'][((seed as usize).wrapping_add(i)) % 3];
                format!("{} {}", status, path)
            })
            .collect();

        prop_assert_eq!(classify(&lines), classify(&lines));
    }
}
