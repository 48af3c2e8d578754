//! `calc_basis`: run the resolve → download → classpath pipeline over a
//! merged deps map and return the runtime basis.

use std::path::Path;

use javelin_core::merge::{combine_aliases, effective_deps};
use javelin_core::{ClasspathArgs, DepsMap, ResolveArgs};
use javelin_ext::Registry;
use javelin_resolver::{resolve_deps, LibMap, TraceLog};
use javelin_util::errors::JavelinResult;

use crate::classpath::{make_classpath_map, ClasspathMap};

/// The computed basis: the master deps map plus everything needed to launch
/// against it.
#[derive(Debug)]
pub struct Basis {
    pub edn: DepsMap,
    pub libs: LibMap,
    pub classpath: ClasspathMap,
    pub resolve_args: ResolveArgs,
    pub classpath_args: ClasspathArgs,
    /// JVM options contributed by combined aliases, in combination order.
    pub jvm_opts: Vec<String>,
    /// Main options from the last contributing alias.
    pub main_opts: Option<Vec<String>>,
    /// Expansion trace, when `resolve_args.trace` was set.
    pub trace: Option<TraceLog>,
}

impl Basis {
    /// The classpath string with the host path separator.
    pub fn classpath_string(&self) -> String {
        self.classpath.join()
    }
}

/// Compute a basis from a merged deps map and explicit args.
///
/// The registry (and the per-call caches its procurers hold) lives exactly
/// as long as this call: expansion and download share it, and it is dropped
/// on return.
pub async fn calc_basis(
    master: &DepsMap,
    resolve_args: ResolveArgs,
    classpath_args: ClasspathArgs,
    registry: Registry,
    project_dir: &Path,
) -> JavelinResult<Basis> {
    let resolution = resolve_deps(master, &resolve_args, registry, project_dir).await?;
    let classpath = make_classpath_map(master, &resolution.libs, &classpath_args)?;
    Ok(Basis {
        edn: master.clone(),
        libs: resolution.libs,
        classpath,
        resolve_args,
        classpath_args,
        jvm_opts: Vec::new(),
        main_opts: None,
        trace: resolution.trace,
    })
}

/// Compute a basis after combining the named aliases: alias `deps` merge
/// over the project deps, and the combined args drive resolution and
/// classpath assembly.
pub async fn calc_basis_with_aliases(
    master: &DepsMap,
    alias_names: &[&str],
    registry: Registry,
    project_dir: &Path,
) -> JavelinResult<Basis> {
    let combined = combine_aliases(master, alias_names)?;
    let resolve_args = ResolveArgs::from_alias_args(&combined);
    let classpath_args = ClasspathArgs::from_alias_args(&combined);

    let mut edn = master.clone();
    edn.deps = effective_deps(master, &combined);

    let mut basis = calc_basis(&edn, resolve_args, classpath_args, registry, project_dir).await?;
    basis.jvm_opts = combined.jvm_opts;
    basis.main_opts = combined.main_opts;
    Ok(basis)
}
