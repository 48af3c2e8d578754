use std::fmt;

use javelin_util::errors::JavelinError;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// A qualified library name, `group/artifact`.
///
/// The artifact part may carry a trailing `$classifier` suffix
/// (`org.lwjgl/lwjgl$natives-linux`); [`Lib::base`] strips it so classifier
/// variants share state keyed by the base library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Lib {
    group: String,
    artifact: String,
}

impl Lib {
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
        }
    }

    /// Parse a qualified `group/artifact` name. Unqualified names are
    /// rejected; rewriting them is the read boundary's job, see
    /// [`Lib::from_manifest_key`].
    pub fn parse(s: &str) -> Result<Self, JavelinError> {
        match s.split_once('/') {
            Some((group, artifact)) if !group.is_empty() && !artifact.is_empty() => {
                if artifact.contains('/') {
                    Err(JavelinError::Input {
                        message: format!("library name has more than one '/': {s}"),
                    })
                } else {
                    Ok(Self::new(group, artifact))
                }
            }
            _ => Err(JavelinError::Input {
                message: format!("library name must be qualified as group/artifact: {s}"),
            }),
        }
    }

    /// Read-boundary parse for deps-map keys. Unqualified names `foo` are
    /// rewritten to `foo/foo` with a deprecation warning; everything else
    /// goes through [`Lib::parse`].
    pub fn from_manifest_key(s: &str) -> Result<Self, JavelinError> {
        if s.is_empty() {
            return Err(JavelinError::Input {
                message: "empty library name".to_string(),
            });
        }
        if !s.contains('/') {
            tracing::warn!(
                "unqualified library name '{s}' is deprecated, use '{s}/{s}' instead"
            );
            return Ok(Self::new(s, s));
        }
        Self::parse(s)
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// The artifact name without any `$classifier` suffix.
    pub fn artifact_base(&self) -> &str {
        self.artifact
            .split_once('$')
            .map(|(base, _)| base)
            .unwrap_or(&self.artifact)
    }

    /// The classifier, when the artifact carries a `$classifier` suffix.
    pub fn classifier(&self) -> Option<&str> {
        self.artifact.split_once('$').map(|(_, c)| c)
    }

    /// This library with any classifier suffix stripped.
    pub fn base(&self) -> Lib {
        match self.artifact.split_once('$') {
            Some((base, _)) => Lib::new(self.group.clone(), base),
            None => self.clone(),
        }
    }
}

impl fmt::Display for Lib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.artifact)
    }
}

impl Serialize for Lib {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

struct LibVisitor;

impl Visitor<'_> for LibVisitor {
    type Value = Lib;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a qualified library name like group/artifact")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Lib, E> {
        Lib::from_manifest_key(v).map_err(|e| E::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for Lib {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(LibVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_qualified() {
        let lib = Lib::parse("org.clojure/clojure").unwrap();
        assert_eq!(lib.group(), "org.clojure");
        assert_eq!(lib.artifact(), "clojure");
        assert_eq!(lib.to_string(), "org.clojure/clojure");
    }

    #[test]
    fn parse_rejects_unqualified() {
        assert!(Lib::parse("clojure").is_err());
    }

    #[test]
    fn parse_rejects_extra_slash() {
        assert!(Lib::parse("a/b/c").is_err());
    }

    #[test]
    fn manifest_key_rewrites_unqualified() {
        let lib = Lib::from_manifest_key("cheshire").unwrap();
        assert_eq!(lib, Lib::new("cheshire", "cheshire"));
    }

    #[test]
    fn classifier_split() {
        let lib = Lib::parse("org.lwjgl/lwjgl$natives-linux").unwrap();
        assert_eq!(lib.artifact_base(), "lwjgl");
        assert_eq!(lib.classifier(), Some("natives-linux"));
        assert_eq!(lib.base(), Lib::new("org.lwjgl", "lwjgl"));
    }

    #[test]
    fn base_of_plain_lib_is_identity() {
        let lib = Lib::new("org.clojure", "clojure");
        assert_eq!(lib.base(), lib);
    }
}
