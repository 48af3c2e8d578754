use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::library::Lib;

/// A coordinate: how to obtain a specific instance of a library.
///
/// Supports the shorthand bare-version string form (`"1.11.1"`) and the
/// detailed per-procurer forms. The shorthand is normalized to a full Maven
/// coordinate by the maven procurer's `canonicalize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordSpec {
    Version(String),
    Maven(MavenCoord),
    Git(GitCoord),
    Local(LocalCoord),
}

/// A Maven artifact coordinate: `{ version = "1.2.3" }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MavenCoord {
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<Lib>,
}

/// A git coordinate: `{ url = "...", sha = "..." }`.
///
/// `sha` must be a full commit sha after canonicalization; `tag` is
/// annotation only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitCoord {
    pub url: String,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<Lib>,
}

/// A local coordinate: `{ root = "path" }`, pointing at a jar file or a
/// project directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCoord {
    pub root: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<Lib>,
}

impl CoordSpec {
    /// Shorthand constructor for a Maven coordinate with no exclusions.
    pub fn mvn(version: impl Into<String>) -> Self {
        Self::Maven(MavenCoord {
            version: version.into(),
            exclusions: Vec::new(),
        })
    }

    /// The procurer tag this coordinate dispatches on.
    pub fn procurer_tag(&self) -> &'static str {
        match self {
            CoordSpec::Version(_) | CoordSpec::Maven(_) => "mvn",
            CoordSpec::Git(_) => "git",
            CoordSpec::Local(_) => "local",
        }
    }

    /// Libraries excluded from expansion beneath this coordinate.
    pub fn exclusions(&self) -> &[Lib] {
        match self {
            CoordSpec::Version(_) => &[],
            CoordSpec::Maven(c) => &c.exclusions,
            CoordSpec::Git(c) => &c.exclusions,
            CoordSpec::Local(c) => &c.exclusions,
        }
    }
}

/// Canonical identity of a coordinate instance, as determined by its
/// procurer: version for Maven, commit sha for git, root path for local.
/// Dominance comparison and the version map are keyed by this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordId(pub String);

impl fmt::Display for CoordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a library's direct dependencies are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// Maven POM.
    Pom,
    /// A javelin.toml project.
    Deps,
    /// No manifest; the coordinate has no children.
    None,
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ManifestKind::Pom => "pom",
            ManifestKind::Deps => "deps",
            ManifestKind::None => "none",
        })
    }
}

/// Result of manifest classification: the manifest kind plus the filesystem
/// root child-dependency reads should run relative to, when there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestInfo {
    pub kind: ManifestKind,
    pub root: Option<PathBuf>,
}

/// A coordinate after manifest classification: the declared coordinate
/// merged with `{manifest, root}`. This is what the version map records and
/// what download and classpath assembly consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCoord {
    pub spec: CoordSpec,
    pub manifest: ManifestKind,
    pub root: Option<PathBuf>,
}

impl ResolvedCoord {
    pub fn new(spec: CoordSpec, info: ManifestInfo) -> Self {
        Self {
            spec,
            manifest: info.kind,
            root: info.root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn procurer_tags() {
        assert_eq!(CoordSpec::Version("1.0".into()).procurer_tag(), "mvn");
        assert_eq!(CoordSpec::mvn("1.0").procurer_tag(), "mvn");
        assert_eq!(
            CoordSpec::Local(LocalCoord {
                root: "../lib".into(),
                exclusions: vec![],
            })
            .procurer_tag(),
            "local"
        );
        assert_eq!(
            CoordSpec::Git(GitCoord {
                url: "https://example.com/r.git".into(),
                sha: Some("a".repeat(40)),
                tag: None,
                exclusions: vec![],
            })
            .procurer_tag(),
            "git"
        );
    }

    #[test]
    fn exclusions_accessor() {
        let coord = CoordSpec::Maven(MavenCoord {
            version: "1.0".into(),
            exclusions: vec![Lib::new("org.slf4j", "slf4j-api")],
        });
        assert_eq!(coord.exclusions().len(), 1);
        assert!(CoordSpec::Version("1.0".into()).exclusions().is_empty());
    }

    #[test]
    fn coord_id_orders_lexically() {
        assert!(CoordId("1.0".into()) < CoordId("2.0".into()));
    }
}
