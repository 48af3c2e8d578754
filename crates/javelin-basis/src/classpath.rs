//! Classpath assembly from the lib map and the deps map's source paths.
//!
//! The classpath map is insertion-ordered; its order is the classpath order:
//! expanded `paths`, then `extra-paths`, then library roots. Duplicate roots
//! keep their first position.

use std::collections::HashSet;
use std::path::PathBuf;

use javelin_core::{AliasValue, ClasspathArgs, DepsMap, Lib, PathRef};
use javelin_resolver::LibMap;
use javelin_util::errors::{JavelinError, JavelinResult};

/// Where a classpath root came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClasspathSource {
    /// Contributed by a resolved library.
    Lib(Lib),
    /// Contributed by a path vector; carries the alias key it was reached
    /// through (`paths`, `extra-paths`, or a path alias name).
    PathKey(String),
}

/// The ordered classpath: filesystem roots tagged with their source.
#[derive(Debug, Clone, Default)]
pub struct ClasspathMap {
    entries: Vec<(PathBuf, ClasspathSource)>,
}

impl ClasspathMap {
    fn insert(&mut self, seen: &mut HashSet<PathBuf>, root: PathBuf, source: ClasspathSource) {
        if seen.insert(root.clone()) {
            self.entries.push((root, source));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(PathBuf, ClasspathSource)> {
        self.entries.iter()
    }

    /// The classpath roots in classpath order.
    pub fn roots(&self) -> Vec<&PathBuf> {
        self.entries.iter().map(|(p, _)| p).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Join the roots with the host path separator (`:` on Unix, `;` on
    /// Windows).
    pub fn join(&self) -> String {
        self.entries
            .iter()
            .map(|(p, _)| p.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(separator())
    }
}

fn separator() -> &'static str {
    if cfg!(windows) {
        ";"
    } else {
        ":"
    }
}

/// Assemble the classpath map from the merged deps map, the resolved lib
/// map, and classpath args.
pub fn make_classpath_map(
    edn: &DepsMap,
    libs: &LibMap,
    args: &ClasspathArgs,
) -> JavelinResult<ClasspathMap> {
    let mut map = ClasspathMap::default();
    let mut seen = HashSet::new();

    // Project paths first: `paths`, then `extra-paths`, alias refs chased.
    chase_paths(edn, "paths", &edn.paths, &mut map, &mut seen, &mut Vec::new())?;
    chase_paths(
        edn,
        "extra-paths",
        &args.extra_paths,
        &mut map,
        &mut seen,
        &mut Vec::new(),
    )?;

    // Then every root contributed by a resolved library, with overrides
    // replacing a lib's roots wholesale.
    for (lib, entry) in libs.iter() {
        let roots: Vec<PathBuf> = match args.classpath_overrides.get(lib) {
            Some(replacement) => vec![PathBuf::from(replacement)],
            None => entry.paths.clone(),
        };
        for root in roots {
            map.insert(&mut seen, root, ClasspathSource::Lib(lib.clone()));
        }
    }

    Ok(map)
}

/// Flatten a path vector: literal entries land in the map tagged with the
/// alias key most recently entered; alias entries recurse through the deps
/// map's path aliases.
fn chase_paths(
    edn: &DepsMap,
    key: &str,
    paths: &[PathRef],
    map: &mut ClasspathMap,
    seen: &mut HashSet<PathBuf>,
    chasing: &mut Vec<String>,
) -> JavelinResult<()> {
    for path in paths {
        match path {
            PathRef::Dir(dir) => {
                map.insert(
                    seen,
                    PathBuf::from(dir),
                    ClasspathSource::PathKey(key.to_string()),
                );
            }
            PathRef::Alias(alias_key) => {
                if chasing.iter().any(|k| k == alias_key) {
                    return Err(JavelinError::Input {
                        message: format!("path alias cycle through :{alias_key}"),
                    }
                    .into());
                }
                let value = edn.aliases.get(alias_key).ok_or_else(|| JavelinError::Input {
                    message: format!("unknown path alias :{alias_key}"),
                })?;
                let nested = match value {
                    AliasValue::Paths(paths) => paths,
                    AliasValue::Args(_) => {
                        return Err(JavelinError::Input {
                            message: format!(":{alias_key} is not a path alias"),
                        }
                        .into())
                    }
                };
                chasing.push(alias_key.clone());
                chase_paths(edn, alias_key, nested, map, seen, chasing)?;
                chasing.pop();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_is_host_specific() {
        if cfg!(windows) {
            assert_eq!(separator(), ";");
        } else {
            assert_eq!(separator(), ":");
        }
    }

    #[test]
    fn join_orders_entries() {
        let mut map = ClasspathMap::default();
        let mut seen = HashSet::new();
        map.insert(
            &mut seen,
            PathBuf::from("src"),
            ClasspathSource::PathKey("paths".into()),
        );
        map.insert(
            &mut seen,
            PathBuf::from("/repo/a.jar"),
            ClasspathSource::Lib(Lib::new("a", "a")),
        );
        assert_eq!(map.join(), format!("src{}{}", separator(), "/repo/a.jar"));
    }

    #[test]
    fn duplicate_roots_keep_first_position() {
        let mut map = ClasspathMap::default();
        let mut seen = HashSet::new();
        map.insert(
            &mut seen,
            PathBuf::from("src"),
            ClasspathSource::PathKey("paths".into()),
        );
        map.insert(
            &mut seen,
            PathBuf::from("src"),
            ClasspathSource::PathKey("extra-paths".into()),
        );
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.iter().next().unwrap().1,
            ClasspathSource::PathKey("paths".into())
        );
    }
}
