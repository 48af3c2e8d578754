//! Projection of the terminal version map to the lib map, and concurrent
//! procurement of each selected coordinate's local paths.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use javelin_core::{args::default_threads, DepsMap, Lib, ResolveArgs, ResolvedCoord};
use javelin_ext::Registry;
use javelin_util::errors::JavelinResult;

use crate::executor::TaskExecutor;
use crate::expand::{canonicalize_deps, canonicalize_seeds, expand_deps};
use crate::trace::TraceLog;

/// One selected library: its coordinate, the libs that depend on it, and
/// (after download) its local filesystem roots.
#[derive(Debug, Clone)]
pub struct LibUse {
    pub coord: ResolvedCoord,
    pub dependents: Vec<Lib>,
    pub paths: Vec<PathBuf>,
}

/// The final lib map: exactly one coordinate per library.
#[derive(Debug, Clone, Default)]
pub struct LibMap {
    entries: BTreeMap<Lib, LibUse>,
}

impl LibMap {
    pub fn get(&self, lib: &Lib) -> Option<&LibUse> {
        self.entries.get(lib)
    }

    pub fn contains(&self, lib: &Lib) -> bool {
        self.entries.contains_key(lib)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Lib, &LibUse)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A completed resolution: the lib map, plus the expansion trace when the
/// caller asked for one.
#[derive(Debug)]
pub struct Resolution {
    pub libs: LibMap,
    pub trace: Option<TraceLog>,
}

/// Resolve the deps map's dependencies: expand the graph, project the
/// version map, and procure local paths for every selected library.
///
/// `project_dir` anchors relative local roots and is the working directory
/// for reading the top-level manifests' children.
pub async fn resolve_deps(
    deps_map: &DepsMap,
    args: &ResolveArgs,
    registry: Registry,
    project_dir: &Path,
) -> JavelinResult<Resolution> {
    let executor = TaskExecutor::new(args.threads.unwrap_or_else(default_threads));
    let result = resolve_with(deps_map, args, registry, project_dir, &executor).await;
    executor.shutdown();
    result
}

async fn resolve_with(
    deps_map: &DepsMap,
    args: &ResolveArgs,
    registry: Registry,
    project_dir: &Path,
    executor: &TaskExecutor,
) -> JavelinResult<Resolution> {
    let registry = Arc::new(registry);
    let config = Arc::new(deps_map.clone());

    // Seed deps: the deps map's own entries plus extra-deps, canonicalized.
    let mut seeds: BTreeMap<Lib, Option<_>> = deps_map
        .deps
        .iter()
        .map(|(lib, coord)| (lib.clone(), Some(coord.clone())))
        .collect();
    seeds.extend(
        args.extra_deps
            .iter()
            .map(|(lib, coord)| (lib.clone(), Some(coord.clone()))),
    );
    let seeds = canonicalize_seeds(&seeds, &registry, &config, project_dir)?;
    let args = ResolveArgs {
        extra_deps: args.extra_deps.clone(),
        override_deps: canonicalize_deps(&args.override_deps, &registry, &config, project_dir)?,
        default_deps: canonicalize_deps(&args.default_deps, &registry, &config, project_dir)?,
        threads: args.threads,
        trace: args.trace,
    };

    let expansion = expand_deps(
        &seeds,
        &args,
        config.clone(),
        registry.clone(),
        executor,
        project_dir,
    )
    .await?;

    let mut entries = BTreeMap::new();
    for (lib, (coord, dependents)) in expansion.vmap.lib_paths()? {
        entries.insert(
            lib,
            LibUse {
                coord,
                dependents,
                paths: Vec::new(),
            },
        );
    }

    download_libs(&mut entries, &config, &registry, executor).await?;

    let trace = expansion.log.map(|log| TraceLog {
        log,
        vmap: expansion.vmap,
        exclusions: expansion.exclusions,
    });

    Ok(Resolution {
        libs: LibMap { entries },
        trace,
    })
}

/// Procure local paths for every entry concurrently. The first failure
/// aborts the call; remaining in-flight fetches are discarded.
async fn download_libs(
    entries: &mut BTreeMap<Lib, LibUse>,
    config: &Arc<DepsMap>,
    registry: &Arc<Registry>,
    executor: &TaskExecutor,
) -> JavelinResult<()> {
    let mut pending = Vec::new();
    for (lib, lib_use) in entries.iter() {
        let registry = registry.clone();
        let config = config.clone();
        let lib = lib.clone();
        let spec = lib_use.coord.spec.clone();
        let manifest = lib_use.coord.manifest;
        pending.push((
            lib.clone(),
            executor.submit(move || {
                registry
                    .procurer_for(&spec)?
                    .coord_paths(&lib, &spec, manifest, &config)
            }),
        ));
    }

    for (lib, task) in pending {
        let paths = match task.join().await {
            Ok(paths) => paths,
            Err(e) => {
                executor.shutdown();
                return Err(e);
            }
        };
        if let Some(entry) = entries.get_mut(&lib) {
            entry.paths = paths;
        }
    }
    Ok(())
}
