//! Local procurer: coordinates pointing at a jar file or a project
//! directory on disk.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use javelin_core::{CoordId, CoordSpec, DepsMap, Lib, ManifestInfo, ManifestKind};
use javelin_util::errors::{JavelinError, JavelinResult};

use crate::Procurer;

/// Procurer for `local` coordinates.
#[derive(Debug, Default)]
pub struct LocalProcurer;

impl LocalProcurer {
    pub fn new() -> Self {
        Self
    }

    fn root_of<'c>(&self, lib: &Lib, coord: &'c CoordSpec) -> JavelinResult<&'c Path> {
        match coord {
            CoordSpec::Local(c) if !c.root.is_empty() => Ok(Path::new(&c.root)),
            CoordSpec::Local(_) => Err(JavelinError::resolution(
                lib.to_string(),
                "local coordinate has an empty root",
            )
            .into()),
            _ => Err(JavelinError::Input {
                message: format!("local procurer got a non-local coordinate for {lib}"),
            }
            .into()),
        }
    }
}

impl Procurer for LocalProcurer {
    fn canonicalize(
        &self,
        lib: &Lib,
        coord: &CoordSpec,
        _config: &DepsMap,
    ) -> JavelinResult<(Lib, CoordSpec)> {
        let root = self.root_of(lib, coord)?;
        if !root.exists() {
            return Err(JavelinError::Resolution {
                lib: lib.to_string(),
                coord: Some(root.display().to_string()),
                message: "local root does not exist".to_string(),
            }
            .into());
        }
        Ok((lib.clone(), coord.clone()))
    }

    fn dep_id(&self, lib: &Lib, coord: &CoordSpec, _config: &DepsMap) -> JavelinResult<CoordId> {
        Ok(CoordId(self.root_of(lib, coord)?.display().to_string()))
    }

    fn manifest_type(
        &self,
        lib: &Lib,
        coord: &CoordSpec,
        _config: &DepsMap,
    ) -> JavelinResult<ManifestInfo> {
        let root = self.root_of(lib, coord)?;
        if root.is_dir() && root.join("javelin.toml").is_file() {
            Ok(ManifestInfo {
                kind: ManifestKind::Deps,
                root: Some(root.to_path_buf()),
            })
        } else {
            Ok(ManifestInfo {
                kind: ManifestKind::None,
                root: Some(root.to_path_buf()),
            })
        }
    }

    fn coord_deps(
        &self,
        _lib: &Lib,
        _coord: &CoordSpec,
        manifest: ManifestKind,
        _config: &DepsMap,
        dir: &Path,
    ) -> JavelinResult<Vec<(Lib, CoordSpec)>> {
        match manifest {
            ManifestKind::Deps => crate::project_deps(dir),
            _ => Ok(Vec::new()),
        }
    }

    fn coord_paths(
        &self,
        lib: &Lib,
        coord: &CoordSpec,
        manifest: ManifestKind,
        _config: &DepsMap,
    ) -> JavelinResult<Vec<PathBuf>> {
        let root = self.root_of(lib, coord)?;
        match manifest {
            ManifestKind::Deps => crate::project_paths(root),
            _ => Ok(vec![root.to_path_buf()]),
        }
    }

    fn compare_versions(
        &self,
        lib: &Lib,
        a: &CoordSpec,
        b: &CoordSpec,
        _config: &DepsMap,
    ) -> JavelinResult<Ordering> {
        let a = self.root_of(lib, a)?;
        let b = self.root_of(lib, b)?;
        if a == b {
            Ok(Ordering::Equal)
        } else {
            Err(JavelinError::resolution(
                lib.to_string(),
                format!(
                    "cannot choose between distinct local roots {} and {}; pin one",
                    a.display(),
                    b.display()
                ),
            )
            .into())
        }
    }

    fn coord_summary(&self, _lib: &Lib, coord: &CoordSpec) -> String {
        match coord {
            CoordSpec::Local(c) => format!("local {}", c.root),
            other => format!("{other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use javelin_core::LocalCoord;
    use tempfile::TempDir;

    fn local_coord(root: &Path) -> CoordSpec {
        CoordSpec::Local(LocalCoord {
            root: root.display().to_string(),
            exclusions: vec![],
        })
    }

    #[test]
    fn jar_root_has_no_manifest() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("thing.jar");
        std::fs::write(&jar, b"").unwrap();

        let procurer = LocalProcurer::new();
        let lib = Lib::new("local", "thing");
        let config = DepsMap::default();
        let coord = local_coord(&jar);

        let info = procurer.manifest_type(&lib, &coord, &config).unwrap();
        assert_eq!(info.kind, ManifestKind::None);
        let paths = procurer
            .coord_paths(&lib, &coord, info.kind, &config)
            .unwrap();
        assert_eq!(paths, vec![jar]);
    }

    #[test]
    fn project_root_reads_deps_and_paths() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("javelin.toml"),
            r#"
paths = ["src", "resources"]

[deps]
"org.clojure/clojure" = "1.12.0"
"#,
        )
        .unwrap();

        let procurer = LocalProcurer::new();
        let lib = Lib::new("local", "project");
        let config = DepsMap::default();
        let coord = local_coord(tmp.path());

        let info = procurer.manifest_type(&lib, &coord, &config).unwrap();
        assert_eq!(info.kind, ManifestKind::Deps);

        let children = procurer
            .coord_deps(&lib, &coord, info.kind, &config, tmp.path())
            .unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].0, Lib::new("org.clojure", "clojure"));

        let paths = procurer
            .coord_paths(&lib, &coord, info.kind, &config)
            .unwrap();
        assert_eq!(
            paths,
            vec![tmp.path().join("src"), tmp.path().join("resources")]
        );
    }

    #[test]
    fn project_paths_default_to_src() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("javelin.toml"), "[deps]\n").unwrap();

        let procurer = LocalProcurer::new();
        let lib = Lib::new("local", "project");
        let coord = local_coord(tmp.path());
        let paths = procurer
            .coord_paths(&lib, &coord, ManifestKind::Deps, &DepsMap::default())
            .unwrap();
        assert_eq!(paths, vec![tmp.path().join("src")]);
    }

    #[test]
    fn canonicalize_rejects_missing_root() {
        let procurer = LocalProcurer::new();
        let lib = Lib::new("local", "ghost");
        let coord = local_coord(Path::new("/does/not/exist"));
        assert!(procurer
            .canonicalize(&lib, &coord, &DepsMap::default())
            .is_err());
    }

    #[test]
    fn distinct_roots_do_not_compare() {
        let procurer = LocalProcurer::new();
        let lib = Lib::new("local", "thing");
        let a = local_coord(Path::new("/a"));
        let b = local_coord(Path::new("/b"));
        assert!(procurer
            .compare_versions(&lib, &a, &b, &DepsMap::default())
            .is_err());
        assert_eq!(
            procurer
                .compare_versions(&lib, &a, &a, &DepsMap::default())
                .unwrap(),
            Ordering::Equal
        );
    }
}
