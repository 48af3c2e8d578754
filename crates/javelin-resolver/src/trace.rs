//! Expansion trace: one entry per considered pathed dependency, recording
//! the decision taken and why.

use std::fmt;

use javelin_core::{CoordId, CoordSpec, Lib};

use crate::exclusions::ExclusionSet;
use crate::vmap::VersionMap;

/// Why a pathed dependency was included or omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// Included: first occurrence as a top-level dep.
    NewTopDep,
    /// Included: first coordinate seen for this lib.
    NewDep,
    /// Included: dominates the previously selected coordinate.
    NewerVersion,
    /// Omitted: same coordinate id as the current selection.
    SameVersion,
    /// Omitted: dominated by the current selection.
    OlderVersion,
    /// Omitted: excluded beneath this path.
    Excluded,
    /// Omitted: a top-level declaration is sticky for this lib.
    UseTop,
    /// Omitted: the path here runs through a parent coordinate that is no
    /// longer selected.
    ParentOmitted,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Reason::NewTopDep => ":new-top-dep",
            Reason::NewDep => ":new-dep",
            Reason::NewerVersion => ":newer-version",
            Reason::SameVersion => ":same-version",
            Reason::OlderVersion => ":older-version",
            Reason::Excluded => ":excluded",
            Reason::UseTop => ":use-top",
            Reason::ParentOmitted => ":parent-omitted",
        })
    }
}

/// One expansion decision.
#[derive(Debug, Clone)]
pub struct TraceEntry {
    /// Ancestry of the considered dependency (empty for top deps).
    pub path: Vec<Lib>,
    pub lib: Lib,
    /// The coordinate as declared by the parent manifest, when any.
    pub coord: Option<CoordSpec>,
    /// The coordinate actually considered, after override/default precedence.
    pub use_coord: CoordSpec,
    pub coord_id: CoordId,
    /// The override that displaced the declared coordinate, when any.
    pub override_coord: Option<CoordSpec>,
    pub include: bool,
    pub reason: Reason,
}

/// The full trace of an expansion, attached to resolution results on
/// request.
#[derive(Debug, Clone)]
pub struct TraceLog {
    pub log: Vec<TraceEntry>,
    pub vmap: VersionMap,
    pub exclusions: ExclusionSet,
}
