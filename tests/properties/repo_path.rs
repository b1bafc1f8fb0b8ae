//! Property tests for repository path validation.

use std::path::Path;

use proptest::prelude::*;

use revdeploy::RepoPath;

fn segment() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9_-][A-Za-z0-9._ -]{0,15}").unwrap()
}

fn segments() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(segment(), 1..=5)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Validation never panics on arbitrary input.
    #[test]
    fn property_new_never_panics(s in "(?s).{0,128}") {
        let _ = RepoPath::new(&s);
    }

    /// PROPERTY: Anything containing a `..` segment is rejected.
    #[test]
    fn property_traversal_is_rejected(
        before in segments(),
        after in proptest::collection::vec(segment(), 0..=3)
    ) {
        let mut parts = before;
        parts.push("..".to_string());
        parts.extend(after);
        prop_assert!(RepoPath::new(parts.join("/")).is_err());
    }

    /// PROPERTY: Redundant `.` segments and slashes normalize away.
    #[test]
    fn property_normalizes_to_slash_joined_segments(parts in segments()) {
        let canonical = parts.join("/");
        let noisy = format!("./{}/", parts.join("//./"));

        let from_canonical = RepoPath::new(&canonical).unwrap();
        prop_assert_eq!(from_canonical.as_str(), canonical.as_str());
        let from_noisy = RepoPath::new(&noisy).unwrap();
        prop_assert_eq!(from_noisy.as_str(), canonical.as_str());
    }

    /// PROPERTY: Ancestors walk up one segment at a time, nearest first.
    #[test]
    fn property_ancestors_are_prefixes(parts in segments()) {
        let path = RepoPath::new(parts.join("/")).unwrap();
        let ancestors: Vec<String> = path.ancestors().map(|a| a.as_str().to_string()).collect();

        let expected: Vec<String> = (1..parts.len())
            .rev()
            .map(|n| parts[..n].join("/"))
            .collect();
        prop_assert_eq!(ancestors, expected);
    }

    /// PROPERTY: Resolving under a root stays inside the root.
    #[test]
    fn property_under_stays_inside_root(parts in segments()) {
        let root = Path::new("/srv/remote");
        let path = RepoPath::new(parts.join("/")).unwrap();
        prop_assert!(path.under(root).starts_with(root));
    }
}
