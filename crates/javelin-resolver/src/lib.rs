//! Dependency expansion engine: breadth-first traversal of the dependency
//! graph with top-wins/dominance version selection, per-path exclusions, and
//! concurrent child-dependency reads.
//!
//! The policy here is deliberately not Maven's nearest-wins: exactly one
//! coordinate is selected per library, top-level declarations are sticky, and
//! otherwise the dominant coordinate (per the procurer's version comparison)
//! wins regardless of depth. Superseded subtrees are hidden lazily by the
//! parent-selection check rather than eagerly deleted.

pub mod exclusions;
pub mod executor;
pub mod expand;
pub mod libmap;
pub mod trace;
pub mod vmap;

pub use exclusions::ExclusionSet;
pub use expand::{expand_deps, ExpandResult};
pub use libmap::{resolve_deps, LibMap, LibUse, Resolution};
pub use trace::{Reason, TraceEntry, TraceLog};
pub use vmap::VersionMap;
