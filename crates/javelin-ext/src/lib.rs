//! Procurer extensions: pluggable providers that read child dependencies and
//! materialize coordinates to local filesystem paths.
//!
//! Each coordinate kind carries a procurer tag (`mvn`, `local`, `git`) and a
//! [`Registry`] dispatches on it. The resolver core only ever talks to the
//! [`Procurer`] trait, so tests (and embedders) can swap a tag for their own
//! implementation.

pub mod git;
pub mod local;
pub mod maven;
pub mod pom;
pub mod version;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use javelin_core::{CoordId, CoordSpec, DepsMap, Lib, ManifestInfo, ManifestKind};
use javelin_util::errors::{JavelinError, JavelinResult};

/// A provider for one coordinate kind.
///
/// All methods take the merged deps map as `config` (for procurer-scoped
/// keys such as `mvn-repos`). Implementations must be thread-safe; calls are
/// dispatched from worker threads during expansion and download.
pub trait Procurer: Send + Sync {
    /// Normalize shorthand forms (e.g. a bare version string) and validate
    /// required coordinate data.
    fn canonicalize(
        &self,
        lib: &Lib,
        coord: &CoordSpec,
        config: &DepsMap,
    ) -> JavelinResult<(Lib, CoordSpec)>;

    /// Stable identity of the coordinate for dominance comparison.
    fn dep_id(&self, lib: &Lib, coord: &CoordSpec, config: &DepsMap) -> JavelinResult<CoordId>;

    /// Classify how child dependencies of the coordinate are read.
    fn manifest_type(
        &self,
        lib: &Lib,
        coord: &CoordSpec,
        config: &DepsMap,
    ) -> JavelinResult<ManifestInfo>;

    /// Read the coordinate's direct children. `dir` is the working directory
    /// relative file references resolve against (the coordinate's root, or
    /// the project directory for rootless manifests); it is threaded
    /// explicitly rather than through ambient process state.
    fn coord_deps(
        &self,
        lib: &Lib,
        coord: &CoordSpec,
        manifest: ManifestKind,
        config: &DepsMap,
        dir: &Path,
    ) -> JavelinResult<Vec<(Lib, CoordSpec)>>;

    /// Procure the coordinate and return its local filesystem roots. May
    /// fetch over the network.
    fn coord_paths(
        &self,
        lib: &Lib,
        coord: &CoordSpec,
        manifest: ManifestKind,
        config: &DepsMap,
    ) -> JavelinResult<Vec<PathBuf>>;

    /// Compare two coordinates of this kind. `Ordering::Greater` means `a`
    /// dominates `b`.
    fn compare_versions(
        &self,
        lib: &Lib,
        a: &CoordSpec,
        b: &CoordSpec,
        config: &DepsMap,
    ) -> JavelinResult<Ordering>;

    /// One-line rendering of the coordinate for trees and error messages.
    fn coord_summary(&self, lib: &Lib, coord: &CoordSpec) -> String;
}

/// Dispatch table from procurer tag to provider.
#[derive(Clone)]
pub struct Registry {
    procurers: HashMap<&'static str, Arc<dyn Procurer>>,
}

impl Registry {
    /// An empty registry. Useful for tests that register fakes.
    pub fn new() -> Self {
        Self {
            procurers: HashMap::new(),
        }
    }

    /// A registry with the built-in procurers, caching under the default
    /// javelin home directory. Builds per-call state (HTTP client, POM
    /// memoization), so construct one per resolve call.
    pub fn with_defaults() -> Self {
        Self::with_home(&javelin_util::dirs_path())
    }

    /// Like [`Registry::with_defaults`] but rooted at an explicit home
    /// directory (tests point this at a tempdir).
    pub fn with_home(home: &Path) -> Self {
        let mut registry = Self::new();
        registry.register("mvn", Arc::new(maven::MavenProcurer::new(home.join("m2"))));
        registry.register("local", Arc::new(local::LocalProcurer::new()));
        registry.register("git", Arc::new(git::GitProcurer::new(home.join("gitlibs"))));
        registry
    }

    /// Register (or replace) the provider for a tag.
    pub fn register(&mut self, tag: &'static str, procurer: Arc<dyn Procurer>) {
        self.procurers.insert(tag, procurer);
    }

    /// Look up the provider for a coordinate.
    pub fn procurer_for(&self, coord: &CoordSpec) -> JavelinResult<Arc<dyn Procurer>> {
        let tag = coord.procurer_tag();
        self.procurers.get(tag).cloned().ok_or_else(|| {
            JavelinError::Input {
                message: format!("no procurer registered for coordinate tag '{tag}'"),
            }
            .into()
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve any relative `local` roots in a child list against `dir`, so
/// downstream calls see absolute roots regardless of which manifest the
/// children were read from.
pub fn absolutize_children(
    children: Vec<(Lib, CoordSpec)>,
    dir: &Path,
) -> Vec<(Lib, CoordSpec)> {
    children
        .into_iter()
        .map(|(lib, coord)| (lib, absolutize_coord(coord, dir)))
        .collect()
}

/// Resolve a relative `local` root against `base`. Other coordinate kinds
/// pass through untouched.
pub fn absolutize_coord(coord: CoordSpec, base: &Path) -> CoordSpec {
    match coord {
        CoordSpec::Local(mut c) => {
            if Path::new(&c.root).is_relative() {
                let resolved = javelin_util::fs::resolve_relative(base, Path::new(&c.root));
                c.root = resolved.to_string_lossy().into_owned();
            }
            CoordSpec::Local(c)
        }
        other => other,
    }
}

/// Read the direct dependencies of a `javelin.toml` project rooted at `dir`.
///
/// Shared by the local and git procurers for `Deps` manifests.
pub fn project_deps(dir: &Path) -> JavelinResult<Vec<(Lib, CoordSpec)>> {
    let edn = DepsMap::load(&dir.join("javelin.toml"))?;
    Ok(absolutize_children(edn.deps.into_iter().collect(), dir))
}

/// The source paths of a `javelin.toml` project rooted at `dir`, resolved to
/// absolute paths. Projects with no declared paths default to `src`.
pub fn project_paths(dir: &Path) -> JavelinResult<Vec<PathBuf>> {
    let edn = DepsMap::load(&dir.join("javelin.toml"))?;
    let mut paths: Vec<PathBuf> = edn
        .paths
        .iter()
        .filter_map(|p| match p {
            javelin_core::PathRef::Dir(d) => {
                Some(javelin_util::fs::resolve_relative(dir, Path::new(d)))
            }
            javelin_core::PathRef::Alias(_) => None,
        })
        .collect();
    if paths.is_empty() {
        paths.push(dir.join("src"));
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use javelin_core::LocalCoord;

    #[test]
    fn registry_unknown_tag_errors() {
        let registry = Registry::new();
        let coord = CoordSpec::mvn("1.0");
        assert!(registry.procurer_for(&coord).is_err());
    }

    #[test]
    fn absolutize_relative_local_root() {
        let coord = CoordSpec::Local(LocalCoord {
            root: "lib/dep".into(),
            exclusions: vec![],
        });
        let abs = absolutize_coord(coord, Path::new("/project"));
        match abs {
            CoordSpec::Local(c) => assert_eq!(c.root, "/project/lib/dep"),
            other => panic!("unexpected coord: {other:?}"),
        }
    }

    #[test]
    fn absolutize_leaves_absolute_and_other_kinds() {
        let coord = CoordSpec::Local(LocalCoord {
            root: "/already/abs".into(),
            exclusions: vec![],
        });
        match absolutize_coord(coord, Path::new("/project")) {
            CoordSpec::Local(c) => assert_eq!(c.root, "/already/abs"),
            other => panic!("unexpected coord: {other:?}"),
        }
        let mvn = CoordSpec::mvn("1.0");
        assert_eq!(absolutize_coord(mvn.clone(), Path::new("/p")), mvn);
    }
}
