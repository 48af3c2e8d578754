//! Deps-map merging and alias composition.
//!
//! `merge_deps_maps` folds several deps maps left to right with one level of
//! map-merge; `combine_aliases` folds named aliases with per-key rules
//! (map-merge for dep maps, ordered concat for paths and jvm-opts,
//! last-non-nil for main-opts).

use std::collections::BTreeMap;

use javelin_util::errors::{JavelinError, JavelinResult};

use crate::manifest::{AliasArgs, AliasValue, DepsMap, PathRef};

/// Merge deps maps left to right. At each top-level key, map values merge
/// key-by-key with the right side winning; non-map values are replaced
/// wholesale by the right side.
pub fn merge_deps_maps<'a>(edns: impl IntoIterator<Item = &'a DepsMap>) -> DepsMap {
    let mut merged = DepsMap::default();
    for edn in edns {
        merged.deps.extend(edn.deps.clone());
        if !edn.paths.is_empty() {
            merged.paths = edn.paths.clone();
        }
        merged.aliases.extend(edn.aliases.clone());
        merged.mvn_repos.extend(edn.mvn_repos.clone());
        for (key, value) in &edn.extra {
            match (merged.extra.get_mut(key), value) {
                (Some(toml::Value::Table(left)), toml::Value::Table(right)) => {
                    left.extend(right.clone());
                }
                _ => {
                    merged.extra.insert(key.clone(), value.clone());
                }
            }
        }
    }
    merged
}

/// Combine the named argument-map aliases of `edn` into a single `AliasArgs`.
///
/// Per-key rules:
/// - `deps`, `extra-deps`, `override-deps`, `default-deps`,
///   `classpath-overrides`: map-merge, right wins key-by-key
/// - `paths`, `extra-paths`: ordered concat, de-duplicated keeping the first
///   occurrence
/// - `jvm-opts`: ordered concat
/// - `main-opts`: last non-nil wins
///
/// Naming a missing alias, or a path alias, is an error.
pub fn combine_aliases(edn: &DepsMap, alias_names: &[&str]) -> JavelinResult<AliasArgs> {
    let mut combined = AliasArgs::default();
    for name in alias_names {
        let alias = edn.aliases.get(*name).ok_or_else(|| JavelinError::Input {
            message: format!("unknown alias: :{name}"),
        })?;
        let args = match alias {
            AliasValue::Args(args) => args,
            AliasValue::Paths(_) => {
                return Err(JavelinError::Input {
                    message: format!(
                        ":{name} is a path alias and cannot be combined as an argument map"
                    ),
                }
                .into())
            }
        };
        combined.deps.extend(args.deps.clone());
        combined.extra_deps.extend(args.extra_deps.clone());
        combined.override_deps.extend(args.override_deps.clone());
        combined.default_deps.extend(args.default_deps.clone());
        combined
            .classpath_overrides
            .extend(args.classpath_overrides.clone());
        concat_dedup(&mut combined.paths, &args.paths);
        concat_dedup(&mut combined.extra_paths, &args.extra_paths);
        combined.jvm_opts.extend(args.jvm_opts.iter().cloned());
        if args.main_opts.is_some() {
            combined.main_opts = args.main_opts.clone();
        }
    }
    Ok(combined)
}

/// Seed deps for expansion: the project `deps` with combined alias `deps`
/// merged over them (right wins key-by-key).
pub fn effective_deps(edn: &DepsMap, combined: &AliasArgs) -> BTreeMap<crate::Lib, crate::CoordSpec> {
    let mut deps = edn.deps.clone();
    deps.extend(combined.deps.clone());
    deps
}

fn concat_dedup(target: &mut Vec<PathRef>, additions: &[PathRef]) {
    for p in additions {
        if !target.contains(p) {
            target.push(p.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::CoordSpec;
    use crate::library::Lib;

    fn edn_with_aliases(source: &str) -> DepsMap {
        DepsMap::parse_toml(source).unwrap()
    }

    #[test]
    fn merge_right_wins_per_dep() {
        let base = edn_with_aliases(
            r#"
paths = ["src"]
[deps]
"a/a" = "1.0"
"b/b" = "1.0"
"#,
        );
        let user = edn_with_aliases(
            r#"
[deps]
"b/b" = "2.0"
"#,
        );
        let merged = merge_deps_maps([&base, &user]);
        assert_eq!(
            merged.deps.get(&Lib::new("b", "b")),
            Some(&CoordSpec::Version("2.0".into()))
        );
        assert_eq!(
            merged.deps.get(&Lib::new("a", "a")),
            Some(&CoordSpec::Version("1.0".into()))
        );
        // paths is not a map: left value survives only because right has none
        assert_eq!(merged.paths.len(), 1);
    }

    #[test]
    fn merge_non_map_right_replaces() {
        let left = edn_with_aliases(r#"paths = ["src"]"#);
        let right = edn_with_aliases(r#"paths = ["source"]"#);
        let merged = merge_deps_maps([&left, &right]);
        assert_eq!(merged.paths, vec![PathRef::dir("source")]);
    }

    #[test]
    fn merge_aliases_replace_whole_alias() {
        let left = edn_with_aliases(
            r#"
[aliases.test]
extra-paths = ["test"]
jvm-opts = ["-Xmx1g"]
"#,
        );
        let right = edn_with_aliases(
            r#"
[aliases.test]
extra-paths = ["itest"]
"#,
        );
        let merged = merge_deps_maps([&left, &right]);
        match merged.aliases.get("test") {
            Some(AliasValue::Args(args)) => {
                assert_eq!(args.extra_paths, vec![PathRef::dir("itest")]);
                assert!(args.jvm_opts.is_empty());
            }
            other => panic!("expected args alias, got {other:?}"),
        }
    }

    #[test]
    fn combine_map_keys_right_wins() {
        let edn = edn_with_aliases(
            r#"
[aliases.a.extra-deps]
"x/x" = "1.0"
"y/y" = "1.0"
[aliases.b.extra-deps]
"y/y" = "2.0"
"#,
        );
        let combined = combine_aliases(&edn, &["a", "b"]).unwrap();
        assert_eq!(
            combined.extra_deps.get(&Lib::new("y", "y")),
            Some(&CoordSpec::Version("2.0".into()))
        );
        assert_eq!(
            combined.extra_deps.get(&Lib::new("x", "x")),
            Some(&CoordSpec::Version("1.0".into()))
        );
    }

    #[test]
    fn combine_paths_concat_dedup() {
        let edn = edn_with_aliases(
            r#"
[aliases.a]
paths = ["src", "shared"]
[aliases.b]
paths = ["shared", "gen"]
"#,
        );
        let combined = combine_aliases(&edn, &["a", "b"]).unwrap();
        assert_eq!(
            combined.paths,
            vec![PathRef::dir("src"), PathRef::dir("shared"), PathRef::dir("gen")]
        );
    }

    #[test]
    fn combine_jvm_opts_concat_keeps_duplicates() {
        let edn = edn_with_aliases(
            r#"
[aliases.a]
jvm-opts = ["-ea"]
[aliases.b]
jvm-opts = ["-ea", "-Xmx2g"]
"#,
        );
        let combined = combine_aliases(&edn, &["a", "b"]).unwrap();
        assert_eq!(combined.jvm_opts, vec!["-ea", "-ea", "-Xmx2g"]);
    }

    #[test]
    fn combine_main_opts_last_non_nil() {
        let edn = edn_with_aliases(
            r#"
[aliases.a]
main-opts = ["-m", "app.core"]
[aliases.b]
jvm-opts = ["-ea"]
"#,
        );
        let combined = combine_aliases(&edn, &["a", "b"]).unwrap();
        assert_eq!(
            combined.main_opts,
            Some(vec!["-m".to_string(), "app.core".to_string()])
        );

        let combined = combine_aliases(&edn, &["b", "a"]).unwrap();
        assert_eq!(
            combined.main_opts,
            Some(vec!["-m".to_string(), "app.core".to_string()])
        );
    }

    #[test]
    fn combine_unknown_alias_is_fatal() {
        let edn = edn_with_aliases("[deps]");
        assert!(combine_aliases(&edn, &["nope"]).is_err());
    }

    #[test]
    fn combine_path_alias_is_fatal() {
        let edn = edn_with_aliases(
            r#"
[aliases]
clj-paths = ["src/clj"]
"#,
        );
        assert!(combine_aliases(&edn, &["clj-paths"]).is_err());
    }

    #[test]
    fn effective_deps_alias_deps_win() {
        let edn = edn_with_aliases(
            r#"
[deps]
"a/a" = "1.0"
[aliases.pin.deps]
"a/a" = "2.0"
"#,
        );
        let combined = combine_aliases(&edn, &["pin"]).unwrap();
        let deps = effective_deps(&edn, &combined);
        assert_eq!(
            deps.get(&Lib::new("a", "a")),
            Some(&CoordSpec::Version("2.0".into()))
        );
    }
}
