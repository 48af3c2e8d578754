use javelin_core::merge::{combine_aliases, merge_deps_maps};
use javelin_core::{CoordSpec, DepsMap, Lib, PathRef};
use tempfile::TempDir;

#[test]
fn load_from_file() {
    let tmp = TempDir::new().unwrap();
    let manifest = tmp.path().join("javelin.toml");
    std::fs::write(
        &manifest,
        r#"
paths = ["src", "resources"]

[deps]
"org.clojure/clojure" = "1.12.0"
"cheshire/cheshire" = { version = "5.13.0" }
"#,
    )
    .unwrap();

    let edn = DepsMap::load(&manifest).unwrap();
    assert_eq!(edn.deps.len(), 2);
    assert_eq!(
        edn.paths,
        vec![PathRef::dir("src"), PathRef::dir("resources")]
    );
}

#[test]
fn load_missing_file_is_manifest_error() {
    let tmp = TempDir::new().unwrap();
    let err = DepsMap::load(&tmp.path().join("javelin.toml")).unwrap_err();
    assert!(err.to_string().contains("Manifest error"), "got: {err}");
}

#[test]
fn unqualified_dep_key_is_canonicalized() {
    // `cheshire` is rewritten to `cheshire/cheshire` at the read boundary.
    let edn = DepsMap::parse_toml(
        r#"
[deps]
cheshire = "5.13.0"
"#,
    )
    .unwrap();
    assert_eq!(
        edn.deps.get(&Lib::new("cheshire", "cheshire")),
        Some(&CoordSpec::Version("5.13.0".into()))
    );
}

#[test]
fn root_deps_provide_default_paths() {
    let project = DepsMap::parse_toml(
        r#"
[deps]
"org.clojure/clojure" = "1.12.0"
"#,
    )
    .unwrap();
    let master = merge_deps_maps([&DepsMap::root_deps(), &project]);
    assert_eq!(master.paths, vec![PathRef::dir("src")]);

    // a project that declares paths replaces the default
    let project = DepsMap::parse_toml(r#"paths = ["source"]"#).unwrap();
    let master = merge_deps_maps([&DepsMap::root_deps(), &project]);
    assert_eq!(master.paths, vec![PathRef::dir("source")]);
}

#[test]
fn root_and_user_maps_merge_then_combine() {
    let root = DepsMap::parse_toml(
        r#"
paths = ["src"]

[deps]
"org.clojure/clojure" = "1.12.0"

[aliases.test]
extra-paths = ["test"]
"#,
    )
    .unwrap();
    let user = DepsMap::parse_toml(
        r#"
[aliases.dev.extra-deps]
"nrepl/nrepl" = "1.3.0"
"#,
    )
    .unwrap();

    let master = merge_deps_maps([&root, &user]);
    assert!(master.aliases.contains_key("test"));
    assert!(master.aliases.contains_key("dev"));

    let combined = combine_aliases(&master, &["test", "dev"]).unwrap();
    assert_eq!(combined.extra_paths, vec![PathRef::dir("test")]);
    assert_eq!(combined.extra_deps.len(), 1);
}
