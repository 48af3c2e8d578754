//! Breadth-first expansion of the dependency graph.
//!
//! The driver owns every mutable structure (queue, version map, exclusions,
//! trace) and is the only thread touching them; workers only read child
//! dependency lists. Children of a completed fetch are flushed through a
//! scratch queue before the FIFO is drained further, so expansion order
//! depends solely on the order providers return children, never on worker
//! completion order.

use std::cmp::Ordering;
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use javelin_core::{CoordId, CoordSpec, DepsMap, Lib, ResolveArgs, ResolvedCoord};
use javelin_ext::{absolutize_children, absolutize_coord, Registry};
use javelin_util::errors::{JavelinError, JavelinResult};

use crate::exclusions::ExclusionSet;
use crate::executor::{PendingTask, TaskExecutor};
use crate::trace::{Reason, TraceEntry};
use crate::vmap::VersionMap;

/// Backstop for pathological inputs; selection monotonicity means honest
/// expansions terminate long before this.
const MAX_STEPS: usize = 500_000;

/// Result of an expansion: the terminal version map plus the structures a
/// trace consumer wants alongside it.
#[derive(Debug)]
pub struct ExpandResult {
    pub vmap: VersionMap,
    pub exclusions: ExclusionSet,
    pub log: Option<Vec<TraceEntry>>,
}

/// A concrete pathed dependency awaiting a decision.
struct PathEntry {
    parents: Vec<Lib>,
    lib: Lib,
    coord: Option<CoordSpec>,
}

/// A child-list fetch in flight, tagged with the path its children extend.
struct PendingNode {
    children: PendingTask<Vec<(Lib, CoordSpec)>>,
    ppath: Vec<Lib>,
}

enum QueueItem {
    Entry(PathEntry),
    Pending(PendingNode),
}

/// Expand `deps` (already canonicalized seed coordinates; `None` marks a
/// lib declared without a coordinate, resolved via `default-deps`)
/// breadth-first, applying override/default/exclusion/selection rules, and
/// return the terminal version map.
pub async fn expand_deps(
    deps: &BTreeMap<Lib, Option<CoordSpec>>,
    args: &ResolveArgs,
    config: Arc<DepsMap>,
    registry: Arc<Registry>,
    executor: &TaskExecutor,
    project_dir: &Path,
) -> JavelinResult<ExpandResult> {
    let mut q: VecDeque<QueueItem> = deps
        .iter()
        .map(|(lib, coord)| {
            QueueItem::Entry(PathEntry {
                parents: Vec::new(),
                lib: lib.clone(),
                coord: coord.clone(),
            })
        })
        .collect();
    let mut pendq: VecDeque<PathEntry> = VecDeque::new();

    let mut vmap = VersionMap::new();
    let mut exclusions = ExclusionSet::new();
    let mut log = args.trace.then(Vec::new);
    let mut steps = 0usize;

    loop {
        let entry = match next_entry(&mut pendq, &mut q, executor).await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                executor.shutdown();
                return Err(e);
            }
        };

        steps += 1;
        if steps > MAX_STEPS {
            executor.shutdown();
            return Err(JavelinError::Invariant {
                message: format!("expansion exceeded {MAX_STEPS} steps; aborting"),
            }
            .into());
        }

        if let Err(e) = expand_step(
            entry,
            args,
            &config,
            &registry,
            executor,
            project_dir,
            &mut q,
            &mut vmap,
            &mut exclusions,
            &mut log,
        ) {
            executor.shutdown();
            return Err(e);
        }
    }

    Ok(ExpandResult {
        vmap,
        exclusions,
        log,
    })
}

/// Produce the next concrete path entry: drain the scratch queue first,
/// otherwise pop the FIFO, awaiting pending child lists as they surface.
async fn next_entry(
    pendq: &mut VecDeque<PathEntry>,
    q: &mut VecDeque<QueueItem>,
    executor: &TaskExecutor,
) -> JavelinResult<Option<PathEntry>> {
    loop {
        if let Some(entry) = pendq.pop_front() {
            return Ok(Some(entry));
        }
        match q.pop_front() {
            None => return Ok(None),
            Some(QueueItem::Entry(entry)) => return Ok(Some(entry)),
            Some(QueueItem::Pending(pending)) => {
                let children = match pending.children.join().await {
                    Ok(children) => children,
                    Err(e) => {
                        executor.shutdown();
                        return Err(e);
                    }
                };
                *pendq = children
                    .into_iter()
                    .map(|(lib, coord)| PathEntry {
                        parents: pending.ppath.clone(),
                        lib,
                        coord: Some(coord),
                    })
                    .collect();
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn expand_step(
    entry: PathEntry,
    args: &ResolveArgs,
    config: &Arc<DepsMap>,
    registry: &Arc<Registry>,
    executor: &TaskExecutor,
    project_dir: &Path,
    q: &mut VecDeque<QueueItem>,
    vmap: &mut VersionMap,
    exclusions: &mut ExclusionSet,
    log: &mut Option<Vec<TraceEntry>>,
) -> JavelinResult<()> {
    let PathEntry {
        parents,
        lib,
        coord,
    } = entry;

    let override_coord = args.override_deps.get(&lib).cloned();
    let use_spec = override_coord
        .clone()
        .or_else(|| coord.clone())
        .or_else(|| args.default_deps.get(&lib).cloned())
        .ok_or_else(|| JavelinError::Input {
            message: format!(
                "no coordinate declared for {lib} and no default-deps entry provides one"
            ),
        })?;

    let procurer = registry.procurer_for(&use_spec)?;
    let coord_id = procurer.dep_id(&lib, &use_spec, config)?;

    let decision = vmap.include_decision(&lib, &parents, exclusions)?;
    if !decision.include {
        tracing::trace!("omit {lib} at {parents:?}: {}", decision.reason);
        push_trace(log, &parents, &lib, &coord, &use_spec, &coord_id, &override_coord, decision.include, decision.reason);
        return Ok(());
    }

    let info = procurer.manifest_type(&lib, &use_spec, config)?;
    let resolved = ResolvedCoord::new(use_spec.clone(), info);

    // Launch the child read now; if add_coord rejects the coordinate the
    // fetch is dropped and only its cache side-effects remain.
    let task_dir: PathBuf = resolved
        .root
        .clone()
        .unwrap_or_else(|| project_dir.to_path_buf());
    let pending = {
        let registry = registry.clone();
        let config = config.clone();
        let lib = lib.clone();
        let spec = use_spec.clone();
        let manifest = resolved.manifest;
        executor.submit(move || {
            let procurer = registry.procurer_for(&spec)?;
            let children = procurer.coord_deps(&lib, &spec, manifest, &config, &task_dir)?;
            canonicalize_children(
                absolutize_children(children, &task_dir),
                &registry,
                &config,
            )
        })
    };

    let compare = |a: &ResolvedCoord, b: &ResolvedCoord| -> JavelinResult<Ordering> {
        if a.spec.procurer_tag() != b.spec.procurer_tag() {
            return Err(JavelinError::resolution(
                lib.to_string(),
                format!(
                    "cannot compare {} and {} coordinates; pin one at the top level",
                    a.spec.procurer_tag(),
                    b.spec.procurer_tag()
                ),
            )
            .into());
        }
        registry
            .procurer_for(&a.spec)?
            .compare_versions(&lib, &a.spec, &b.spec, config)
    };
    let added = vmap.add_coord(
        &lib,
        coord_id.clone(),
        resolved,
        &parents,
        parents.is_empty(),
        &compare,
    )?;

    if added.include {
        let mut use_path = parents.clone();
        use_path.push(lib.clone());
        if !use_spec.exclusions().is_empty() {
            exclusions.add(&use_path, use_spec.exclusions().iter().cloned());
        }
        q.push_back(QueueItem::Pending(PendingNode {
            children: pending,
            ppath: use_path,
        }));
    }
    // else: drop the pending fetch

    push_trace(log, &parents, &lib, &coord, &use_spec, &coord_id, &override_coord, added.include, added.reason);
    Ok(())
}

/// Canonicalize a freshly read child list through each child's procurer.
pub fn canonicalize_children(
    children: Vec<(Lib, CoordSpec)>,
    registry: &Registry,
    config: &DepsMap,
) -> JavelinResult<Vec<(Lib, CoordSpec)>> {
    children
        .into_iter()
        .map(|(lib, coord)| registry.procurer_for(&coord)?.canonicalize(&lib, &coord, config))
        .collect()
}

/// Canonicalize a deps map (override/default args) against `project_dir`:
/// relative local roots are resolved, then each coordinate goes through its
/// procurer.
pub fn canonicalize_deps(
    deps: &BTreeMap<Lib, CoordSpec>,
    registry: &Registry,
    config: &DepsMap,
    project_dir: &Path,
) -> JavelinResult<BTreeMap<Lib, CoordSpec>> {
    deps.iter()
        .map(|(lib, coord)| {
            let coord = absolutize_coord(coord.clone(), project_dir);
            registry.procurer_for(&coord)?.canonicalize(lib, &coord, config)
        })
        .collect()
}

/// Canonicalize seed deps, passing coordinate-less entries through for
/// `default-deps` to fill in.
pub fn canonicalize_seeds(
    deps: &BTreeMap<Lib, Option<CoordSpec>>,
    registry: &Registry,
    config: &DepsMap,
    project_dir: &Path,
) -> JavelinResult<BTreeMap<Lib, Option<CoordSpec>>> {
    deps.iter()
        .map(|(lib, coord)| match coord {
            None => Ok((lib.clone(), None)),
            Some(coord) => {
                let coord = absolutize_coord(coord.clone(), project_dir);
                let (lib, coord) =
                    registry.procurer_for(&coord)?.canonicalize(lib, &coord, config)?;
                Ok((lib, Some(coord)))
            }
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn push_trace(
    log: &mut Option<Vec<TraceEntry>>,
    parents: &[Lib],
    lib: &Lib,
    coord: &Option<CoordSpec>,
    use_coord: &CoordSpec,
    coord_id: &CoordId,
    override_coord: &Option<CoordSpec>,
    include: bool,
    reason: Reason,
) {
    if let Some(log) = log {
        log.push(TraceEntry {
            path: parents.to_vec(),
            lib: lib.clone(),
            coord: coord.clone(),
            use_coord: use_coord.clone(),
            coord_id: coord_id.clone(),
            override_coord: override_coord.clone(),
            include,
            reason,
        });
    }
}
