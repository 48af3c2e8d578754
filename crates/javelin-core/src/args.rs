use std::collections::BTreeMap;

use crate::coord::CoordSpec;
use crate::library::Lib;
use crate::manifest::{AliasArgs, PathRef};

/// Options controlling dependency expansion.
#[derive(Debug, Clone, Default)]
pub struct ResolveArgs {
    /// Additional top-level deps, seeded alongside the deps map's own.
    pub extra_deps: BTreeMap<Lib, CoordSpec>,
    /// Coordinates that win over any manifest-declared coordinate.
    pub override_deps: BTreeMap<Lib, CoordSpec>,
    /// Coordinates used when a dependency declares none.
    pub default_deps: BTreeMap<Lib, CoordSpec>,
    /// Worker pool size; `None` means available parallelism.
    pub threads: Option<usize>,
    /// Record a trace log of every expansion decision.
    pub trace: bool,
}

/// Options controlling classpath assembly.
#[derive(Debug, Clone, Default)]
pub struct ClasspathArgs {
    /// Paths appended after the project's own `paths`.
    pub extra_paths: Vec<PathRef>,
    /// Per-library replacement of resolved paths.
    pub classpath_overrides: BTreeMap<Lib, String>,
}

impl ResolveArgs {
    /// Build resolve args from combined alias args.
    pub fn from_alias_args(args: &AliasArgs) -> Self {
        Self {
            extra_deps: args.extra_deps.clone(),
            override_deps: args.override_deps.clone(),
            default_deps: args.default_deps.clone(),
            threads: None,
            trace: false,
        }
    }
}

impl ClasspathArgs {
    /// Build classpath args from combined alias args.
    pub fn from_alias_args(args: &AliasArgs) -> Self {
        Self {
            extra_paths: args.extra_paths.clone(),
            classpath_overrides: args.classpath_overrides.clone(),
        }
    }
}

/// Default worker pool size: available processors.
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
