//! Basis pipeline and classpath ordering behavior.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use javelin_basis::{calc_basis, calc_basis_with_aliases, ClasspathSource};
use javelin_core::{
    ClasspathArgs, CoordId, CoordSpec, DepsMap, Lib, ManifestInfo, ManifestKind, PathRef,
    ResolveArgs,
};
use javelin_ext::{Procurer, Registry};
use javelin_util::errors::{JavelinError, JavelinResult};

fn lib(s: &str) -> Lib {
    Lib::parse(s).unwrap()
}

/// Minimal in-memory procurer for `mvn` coordinates.
#[derive(Default)]
struct FakeProcurer {
    children: HashMap<(Lib, String), Vec<(Lib, CoordSpec)>>,
}

impl FakeProcurer {
    fn version_of<'c>(&self, lib: &Lib, coord: &'c CoordSpec) -> JavelinResult<&'c str> {
        match coord {
            CoordSpec::Version(v) => Ok(v),
            CoordSpec::Maven(m) => Ok(&m.version),
            _ => Err(JavelinError::Input {
                message: format!("fake procurer got a non-maven coordinate for {lib}"),
            }
            .into()),
        }
    }
}

impl Procurer for FakeProcurer {
    fn canonicalize(
        &self,
        lib: &Lib,
        coord: &CoordSpec,
        _config: &DepsMap,
    ) -> JavelinResult<(Lib, CoordSpec)> {
        self.version_of(lib, coord)?;
        Ok((lib.clone(), coord.clone()))
    }

    fn dep_id(&self, lib: &Lib, coord: &CoordSpec, _config: &DepsMap) -> JavelinResult<CoordId> {
        Ok(CoordId(self.version_of(lib, coord)?.to_string()))
    }

    fn manifest_type(
        &self,
        _lib: &Lib,
        _coord: &CoordSpec,
        _config: &DepsMap,
    ) -> JavelinResult<ManifestInfo> {
        Ok(ManifestInfo {
            kind: ManifestKind::Pom,
            root: None,
        })
    }

    fn coord_deps(
        &self,
        lib: &Lib,
        coord: &CoordSpec,
        _manifest: ManifestKind,
        _config: &DepsMap,
        _dir: &Path,
    ) -> JavelinResult<Vec<(Lib, CoordSpec)>> {
        let version = self.version_of(lib, coord)?.to_string();
        Ok(self
            .children
            .get(&(lib.clone(), version))
            .cloned()
            .unwrap_or_default())
    }

    fn coord_paths(
        &self,
        lib: &Lib,
        coord: &CoordSpec,
        _manifest: ManifestKind,
        _config: &DepsMap,
    ) -> JavelinResult<Vec<PathBuf>> {
        let version = self.version_of(lib, coord)?;
        Ok(vec![PathBuf::from(format!(
            "/repo/{}-{version}.jar",
            lib.artifact()
        ))])
    }

    fn compare_versions(
        &self,
        lib: &Lib,
        a: &CoordSpec,
        b: &CoordSpec,
        _config: &DepsMap,
    ) -> JavelinResult<Ordering> {
        Ok(self.version_of(lib, a)?.cmp(self.version_of(lib, b)?))
    }

    fn coord_summary(&self, _lib: &Lib, coord: &CoordSpec) -> String {
        format!("{coord:?}")
    }
}

fn registry(fake: FakeProcurer) -> Registry {
    let mut registry = Registry::new();
    registry.register("mvn", Arc::new(fake));
    registry
}

#[tokio::test]
async fn alias_extra_deps_reach_the_lib_map() {
    let edn = DepsMap::parse_toml(
        r#"
[deps]
"a/a" = "1.0"

[aliases.x.extra-deps]
"b/b" = "1.0"
"#,
    )
    .unwrap();

    let basis = calc_basis_with_aliases(&edn, &["x"], registry(FakeProcurer::default()), Path::new("."))
        .await
        .unwrap();
    assert!(basis.libs.contains(&lib("a/a")));
    assert!(basis.libs.contains(&lib("b/b")));
}

#[tokio::test]
async fn classpath_overrides_replace_lib_roots() {
    let edn = DepsMap::parse_toml(
        r#"
[deps]
"org.clojure/clojure" = "1.12.0"
"#,
    )
    .unwrap();
    let classpath_args = ClasspathArgs {
        classpath_overrides: [(lib("org.clojure/clojure"), "foo".to_string())]
            .into_iter()
            .collect(),
        ..Default::default()
    };

    let basis = calc_basis(
        &edn,
        ResolveArgs::default(),
        classpath_args,
        registry(FakeProcurer::default()),
        Path::new("."),
    )
    .await
    .unwrap();

    let roots = basis.classpath.roots();
    assert!(roots.contains(&&PathBuf::from("foo")));
    assert!(!roots.iter().any(|p| p.to_string_lossy().contains("clojure-1.12.0.jar")));
}

#[tokio::test]
async fn classpath_orders_paths_then_extra_paths_then_libs() {
    let edn = DepsMap::parse_toml(
        r#"
paths = ["src", ":clj-paths"]

[deps]
"a/a" = "1.0"

[aliases]
clj-paths = ["src/clj", "src/cljc"]
"#,
    )
    .unwrap();
    let classpath_args = ClasspathArgs {
        extra_paths: vec![PathRef::dir("test"), PathRef::dir("dev")],
        ..Default::default()
    };

    let basis = calc_basis(
        &edn,
        ResolveArgs::default(),
        classpath_args,
        registry(FakeProcurer::default()),
        Path::new("."),
    )
    .await
    .unwrap();

    let roots: Vec<String> = basis
        .classpath
        .roots()
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        roots,
        vec!["src", "src/clj", "src/cljc", "test", "dev", "/repo/a-1.0.jar"]
    );

    // literal roots reached through a path alias carry that alias key
    let cljc = basis
        .classpath
        .iter()
        .find(|(p, _)| p == &PathBuf::from("src/cljc"))
        .unwrap();
    assert_eq!(cljc.1, ClasspathSource::PathKey("clj-paths".into()));

    let string = basis.classpath_string();
    let sep = if cfg!(windows) { ';' } else { ':' };
    assert_eq!(string.matches(sep).count(), 5);
    assert!(string.starts_with("src"));
}

#[tokio::test]
async fn unknown_path_alias_is_fatal() {
    let edn = DepsMap::parse_toml(r#"paths = [":nope"]"#).unwrap();
    let result = calc_basis(
        &edn,
        ResolveArgs::default(),
        ClasspathArgs::default(),
        registry(FakeProcurer::default()),
        Path::new("."),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn alias_deps_pin_replaces_project_dep() {
    let mut fake = FakeProcurer::default();
    fake.children.insert(
        (lib("a/a"), "2.0".to_string()),
        vec![(lib("c/c"), CoordSpec::mvn("1.0"))],
    );
    let edn = DepsMap::parse_toml(
        r#"
[deps]
"a/a" = "1.0"

[aliases.pin.deps]
"a/a" = "2.0"
"#,
    )
    .unwrap();

    let basis = calc_basis_with_aliases(&edn, &["pin"], registry(fake), Path::new("."))
        .await
        .unwrap();
    match &basis.libs.get(&lib("a/a")).unwrap().coord.spec {
        CoordSpec::Version(v) => assert_eq!(v, "2.0"),
        CoordSpec::Maven(m) => assert_eq!(m.version, "2.0"),
        other => panic!("unexpected coord: {other:?}"),
    }
    // and the pinned version's children were expanded
    assert!(basis.libs.contains(&lib("c/c")));
}

#[tokio::test]
async fn basis_carries_trace_on_request() {
    let edn = DepsMap::parse_toml(
        r#"
[deps]
"a/a" = "1.0"
"#,
    )
    .unwrap();
    let basis = calc_basis(
        &edn,
        ResolveArgs {
            trace: true,
            ..Default::default()
        },
        ClasspathArgs::default(),
        registry(FakeProcurer::default()),
        Path::new("."),
    )
    .await
    .unwrap();

    let trace = basis.trace.as_ref().expect("trace requested");
    assert!(!trace.log.is_empty());
    let rendered = javelin_basis::tree::render_tree(trace, &Registry::new(), false);
    assert!(rendered.contains("a/a"));
}
