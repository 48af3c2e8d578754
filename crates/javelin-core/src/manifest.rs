use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use javelin_util::errors::{JavelinError, JavelinResult};

use crate::coord::CoordSpec;
use crate::library::Lib;

/// The parsed representation of a `javelin.toml` deps map.
///
/// Top-level keys recognized by the core are `deps`, `paths`, and `aliases`;
/// procurer-scoped keys (`mvn-repos` for Maven repositories) ride along.
/// Anything else is preserved opaquely in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DepsMap {
    #[serde(default)]
    pub deps: BTreeMap<Lib, CoordSpec>,

    #[serde(default)]
    pub paths: Vec<PathRef>,

    #[serde(default)]
    pub aliases: BTreeMap<String, AliasValue>,

    #[serde(default)]
    pub mvn_repos: BTreeMap<String, RepositoryEntry>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, toml::Value>,
}

impl DepsMap {
    /// The root deps map every merge starts from: source paths default to
    /// `src`. Tool-level and project-level maps merge over this.
    pub fn root_deps() -> Self {
        Self {
            paths: vec![PathRef::Dir("src".to_string())],
            ..Self::default()
        }
    }

    /// Parse a deps map from TOML source.
    pub fn parse_toml(source: &str) -> JavelinResult<Self> {
        toml::from_str(source).map_err(|e| {
            JavelinError::Manifest {
                message: format!("invalid deps map: {e}"),
            }
            .into()
        })
    }

    /// Load a deps map from a `javelin.toml` file.
    pub fn load(path: &Path) -> JavelinResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| JavelinError::Manifest {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::parse_toml(&content)
    }
}

/// An entry in a `paths` (or `extra-paths`) vector: either a literal
/// directory or a reference to a path alias, written `":alias-key"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PathRef {
    Dir(String),
    Alias(String),
}

impl From<String> for PathRef {
    fn from(s: String) -> Self {
        match s.strip_prefix(':') {
            Some(key) => PathRef::Alias(key.to_string()),
            None => PathRef::Dir(s),
        }
    }
}

impl From<PathRef> for String {
    fn from(p: PathRef) -> Self {
        match p {
            PathRef::Dir(d) => d,
            PathRef::Alias(k) => format!(":{k}"),
        }
    }
}

impl PathRef {
    pub fn dir(s: impl Into<String>) -> Self {
        PathRef::Dir(s.into())
    }
}

/// The value of a named alias: either an argument map combined via
/// `combine_aliases`, or a bare path vector referenced from `paths` entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AliasValue {
    Paths(Vec<PathRef>),
    Args(AliasArgs),
}

/// Argument-map alias contents. Unknown keys are fatal at parse time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct AliasArgs {
    pub deps: BTreeMap<Lib, CoordSpec>,
    pub extra_deps: BTreeMap<Lib, CoordSpec>,
    pub override_deps: BTreeMap<Lib, CoordSpec>,
    pub default_deps: BTreeMap<Lib, CoordSpec>,
    pub classpath_overrides: BTreeMap<Lib, String>,
    pub paths: Vec<PathRef>,
    pub extra_paths: Vec<PathRef>,
    pub jvm_opts: Vec<String>,
    pub main_opts: Option<Vec<String>>,
}

/// A Maven repository reference, either a URL string or a detailed
/// configuration with credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepositoryEntry {
    Url(String),
    Detailed {
        url: String,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        password: Option<String>,
    },
}

impl RepositoryEntry {
    pub fn url(&self) -> &str {
        match self {
            RepositoryEntry::Url(url) => url,
            RepositoryEntry::Detailed { url, .. } => url,
        }
    }
}
