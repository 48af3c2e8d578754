//! Data model for javelin deps manifests.
//!
//! A project declares its dependencies in a `javelin.toml` deps map: a `deps`
//! table of qualified library names to coordinates, source `paths`, named
//! `aliases`, and procurer-scoped configuration such as `mvn-repos`. This
//! crate parses and merges those maps and composes aliases into resolve and
//! classpath arguments; the resolution algorithm itself lives in
//! `javelin-resolver`.

pub mod args;
pub mod coord;
pub mod library;
pub mod manifest;
pub mod merge;

pub use args::{ClasspathArgs, ResolveArgs};
pub use coord::{
    CoordId, CoordSpec, GitCoord, LocalCoord, ManifestInfo, ManifestKind, MavenCoord,
    ResolvedCoord,
};
pub use library::Lib;
pub use manifest::{AliasArgs, AliasValue, DepsMap, PathRef, RepositoryEntry};
