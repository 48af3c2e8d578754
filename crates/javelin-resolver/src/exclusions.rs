//! Per-path exclusion sets.
//!
//! A coordinate's `exclusions` suppress the named libraries everywhere
//! beneath the path where that coordinate sits, but not at the path itself
//! and not via unrelated paths.

use std::collections::{HashMap, HashSet};

use javelin_core::Lib;

/// Exclusions recorded during expansion, keyed by the path they apply under.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    by_path: HashMap<Vec<Lib>, HashSet<Lib>>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `libs` as excluded from expansion beneath `path`.
    ///
    /// Entries are stored classifier-stripped so classifier variants share
    /// one exclusion with their base library.
    pub fn add(&mut self, path: &[Lib], libs: impl IntoIterator<Item = Lib>) {
        self.by_path
            .entry(path.to_vec())
            .or_default()
            .extend(libs.into_iter().map(|l| l.base()));
    }

    /// Whether `lib` is excluded at `path`: true iff any prefix of `path`
    /// (including `path` itself) carries it. A `group/*` entry excludes the
    /// whole group.
    pub fn is_excluded(&self, path: &[Lib], lib: &Lib) -> bool {
        let base = lib.base();
        let group_wildcard = Lib::new(base.group(), "*");
        let mut prefix = path.to_vec();
        loop {
            if let Some(set) = self.by_path.get(&prefix) {
                if set.contains(&base) || set.contains(&group_wildcard) {
                    return true;
                }
            }
            if prefix.pop().is_none() {
                return false;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lib(s: &str) -> Lib {
        Lib::parse(s).unwrap()
    }

    #[test]
    fn excluded_beneath_not_elsewhere() {
        let mut ex = ExclusionSet::new();
        ex.add(&[lib("a/a")], [lib("e/e")]);

        // at the recording path and below
        assert!(ex.is_excluded(&[lib("a/a")], &lib("e/e")));
        assert!(ex.is_excluded(&[lib("a/a"), lib("b/b")], &lib("e/e")));
        // not via a sibling path
        assert!(!ex.is_excluded(&[lib("c/c")], &lib("e/e")));
        assert!(!ex.is_excluded(&[], &lib("e/e")));
    }

    #[test]
    fn top_level_exclusion_applies_everywhere() {
        let mut ex = ExclusionSet::new();
        ex.add(&[], [lib("e/e")]);
        assert!(ex.is_excluded(&[lib("x/x"), lib("y/y")], &lib("e/e")));
    }

    #[test]
    fn classifier_variants_share_exclusion() {
        let mut ex = ExclusionSet::new();
        ex.add(&[lib("a/a")], [lib("org.lwjgl/lwjgl")]);
        assert!(ex.is_excluded(&[lib("a/a")], &lib("org.lwjgl/lwjgl$natives-linux")));
    }

    #[test]
    fn group_wildcard_excludes_group() {
        let mut ex = ExclusionSet::new();
        ex.add(&[lib("a/a")], [lib("org.slf4j/*")]);
        assert!(ex.is_excluded(&[lib("a/a")], &lib("org.slf4j/slf4j-api")));
        assert!(!ex.is_excluded(&[lib("a/a")], &lib("org.other/slf4j-api")));
    }

    #[test]
    fn unrelated_lib_not_excluded() {
        let mut ex = ExclusionSet::new();
        ex.add(&[lib("a/a")], [lib("e/e")]);
        assert!(!ex.is_excluded(&[lib("a/a"), lib("b/b")], &lib("f/f")));
    }
}
