//! The version map: per-library candidate coordinates, contributing paths,
//! and the currently selected coordinate id.
//!
//! Selections only ever move to a dominating coordinate, and every
//! candidate's contributing paths are retained even when it loses, because a
//! later retraction can make a previously rejected path relevant again.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use javelin_core::{CoordId, Lib, ResolvedCoord};
use javelin_util::errors::{JavelinError, JavelinResult};

use crate::exclusions::ExclusionSet;
use crate::trace::Reason;

/// Comparison callback used by [`VersionMap::add_coord`]:
/// `Ordering::Greater` means the first coordinate dominates.
pub type CompareFn<'a> = &'a dyn Fn(&ResolvedCoord, &ResolvedCoord) -> JavelinResult<Ordering>;

/// Per-library state.
#[derive(Debug, Clone, Default)]
pub struct LibEntry {
    /// Every coordinate ever seen for this lib, by coordinate id.
    pub versions: HashMap<CoordId, ResolvedCoord>,
    /// Every ancestry path through which each coordinate id was introduced.
    pub paths: HashMap<CoordId, HashSet<Vec<Lib>>>,
    /// The currently selected coordinate id.
    pub select: Option<CoordId>,
    /// Whether this lib was introduced at the empty path. Top deps are
    /// sticky: transitive contributions never displace them.
    pub top: bool,
}

/// Outcome of an include or add decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub include: bool,
    pub reason: Reason,
}

/// The working version map for one expansion.
#[derive(Debug, Clone, Default)]
pub struct VersionMap {
    entries: BTreeMap<Lib, LibEntry>,
}

impl VersionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, lib: &Lib) -> Option<&LibEntry> {
        self.entries.get(lib)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Lib, &LibEntry)> {
        self.entries.iter()
    }

    /// The selected coordinate id for a lib, when one is selected.
    pub fn selected_id(&self, lib: &Lib) -> Option<&CoordId> {
        self.entries.get(lib).and_then(|e| e.select.as_ref())
    }

    /// Decide whether the node at `path` (for `lib`) should be expanded,
    /// before its children are read. Rules, in order: top paths are always
    /// candidates; exclusions omit; a top-level lib's coordinate is sticky;
    /// a path through a no-longer-selected parent is dead.
    pub fn include_decision(
        &self,
        lib: &Lib,
        path: &[Lib],
        exclusions: &ExclusionSet,
    ) -> JavelinResult<Decision> {
        if path.is_empty() {
            return Ok(Decision {
                include: true,
                reason: Reason::NewTopDep,
            });
        }
        if exclusions.is_excluded(path, lib) {
            return Ok(Decision {
                include: false,
                reason: Reason::Excluded,
            });
        }
        if self.entries.get(lib).is_some_and(|e| e.top) {
            return Ok(Decision {
                include: false,
                reason: Reason::UseTop,
            });
        }

        let parent = &path[path.len() - 1];
        let parent_path = &path[..path.len() - 1];
        let parent_entry = self.entries.get(parent).ok_or_else(|| invariant(parent))?;
        let parent_select = parent_entry.select.as_ref().ok_or_else(|| invariant(parent))?;
        let parent_paths = parent_entry
            .paths
            .get(parent_select)
            .ok_or_else(|| invariant(parent))?;
        if !parent_paths.contains(parent_path) {
            return Ok(Decision {
                include: false,
                reason: Reason::ParentOmitted,
            });
        }

        Ok(Decision {
            include: true,
            reason: Reason::NewDep,
        })
    }

    /// Record a coordinate for `lib` and decide whether it becomes the
    /// selection. The coordinate and its path are recorded regardless of the
    /// outcome. No other library's state is touched; superseded subtrees are
    /// hidden later by [`VersionMap::include_decision`].
    pub fn add_coord(
        &mut self,
        lib: &Lib,
        coord_id: CoordId,
        coord: ResolvedCoord,
        path: &[Lib],
        top: bool,
        compare: CompareFn<'_>,
    ) -> JavelinResult<Decision> {
        let entry = self.entries.entry(lib.clone()).or_default();
        entry.versions.insert(coord_id.clone(), coord.clone());
        entry
            .paths
            .entry(coord_id.clone())
            .or_default()
            .insert(path.to_vec());

        if top {
            entry.select = Some(coord_id);
            entry.top = true;
            return Ok(Decision {
                include: true,
                reason: Reason::NewTopDep,
            });
        }

        let Some(selected_id) = entry.select.clone() else {
            entry.select = Some(coord_id);
            return Ok(Decision {
                include: true,
                reason: Reason::NewDep,
            });
        };

        if selected_id == coord_id {
            return Ok(Decision {
                include: false,
                reason: Reason::SameVersion,
            });
        }

        let selected = entry
            .versions
            .get(&selected_id)
            .cloned()
            .ok_or_else(|| invariant(lib))?;
        if compare(&coord, &selected)? == Ordering::Greater {
            let entry = self.entries.entry(lib.clone()).or_default();
            entry.select = Some(coord_id);
            Ok(Decision {
                include: true,
                reason: Reason::NewerVersion,
            })
        } else {
            Ok(Decision {
                include: false,
                reason: Reason::OlderVersion,
            })
        }
    }

    /// Project the terminal version map to selected coordinates with their
    /// dependents (the direct parents of every contributing path).
    pub fn lib_paths(&self) -> JavelinResult<BTreeMap<Lib, (ResolvedCoord, Vec<Lib>)>> {
        let mut out = BTreeMap::new();
        for (lib, entry) in &self.entries {
            let Some(select) = entry.select.as_ref() else {
                continue;
            };
            let coord = entry.versions.get(select).cloned().ok_or_else(|| invariant(lib))?;
            let dependents: std::collections::BTreeSet<Lib> = entry
                .paths
                .get(select)
                .map(|paths| {
                    paths
                        .iter()
                        .filter_map(|p| p.last().cloned())
                        .collect()
                })
                .unwrap_or_default();
            out.insert(lib.clone(), (coord, dependents.into_iter().collect()));
        }
        Ok(out)
    }
}

fn invariant(lib: &Lib) -> miette::Report {
    JavelinError::Invariant {
        message: format!("version map has no selection state for {lib}"),
    }
    .into()
}
