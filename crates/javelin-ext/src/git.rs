//! Git procurer: coordinates identified by a repository URL and commit sha,
//! materialized through the `git` CLI into `~/.javelin/gitlibs`.
//!
//! Layout mirrors the artifact cache: bare mirrors under `_repos/<dir>` and
//! detached worktrees under `libs/<group>/<artifact>/<sha>`.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use javelin_core::{CoordId, CoordSpec, DepsMap, GitCoord, Lib, ManifestInfo, ManifestKind};
use javelin_util::errors::{JavelinError, JavelinResult};

use crate::Procurer;

/// Run `git` with `args`, in `repo` when given, and capture its output.
/// A non-zero exit becomes an error carrying the trimmed stderr.
fn run_git(repo: Option<&Path>, args: &[&str]) -> Result<Output, JavelinError> {
    let mut cmd = Command::new("git");
    cmd.args(args);
    if let Some(dir) = repo {
        cmd.current_dir(dir);
    }
    let out = cmd.output()?;
    if !out.status.success() {
        return Err(JavelinError::Io(std::io::Error::other(format!(
            "git {} exited with {}: {}",
            args.join(" "),
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        ))));
    }
    Ok(out)
}

/// Run `git` in `repo` and report only whether it exited zero. Used for
/// queries that answer through the exit status, like
/// `merge-base --is-ancestor`.
fn git_succeeds(repo: &Path, args: &[&str]) -> Result<bool, JavelinError> {
    let mut cmd = Command::new("git");
    cmd.args(args).current_dir(repo);
    Ok(cmd.output()?.status.success())
}

/// Procurer for `git` coordinates.
pub struct GitProcurer {
    gitlibs_root: PathBuf,
}

impl GitProcurer {
    pub fn new(gitlibs_root: PathBuf) -> Self {
        Self { gitlibs_root }
    }

    fn coord_of<'c>(&self, lib: &Lib, coord: &'c CoordSpec) -> JavelinResult<&'c GitCoord> {
        match coord {
            CoordSpec::Git(c) => Ok(c),
            _ => Err(JavelinError::Input {
                message: format!("git procurer got a non-git coordinate for {lib}"),
            }
            .into()),
        }
    }

    fn sha_of<'c>(&self, lib: &Lib, coord: &'c GitCoord) -> JavelinResult<&'c str> {
        coord.sha.as_deref().ok_or_else(|| {
            JavelinError::resolution(lib.to_string(), "git coordinate has no sha").into()
        })
    }

    /// Directory of the bare mirror for a URL, fetching or cloning as needed.
    fn ensure_repo(&self, lib: &Lib, url: &str) -> JavelinResult<PathBuf> {
        let dir = self.gitlibs_root.join("_repos").join(sanitize_url(url));
        if dir.join("HEAD").is_file() {
            run_git(Some(&dir), &["fetch", "--quiet", "origin"])
                .map_err(|e| git_error(lib, url, e))?;
        } else {
            javelin_util::fs::ensure_dir(self.gitlibs_root.join("_repos"))
                .map_err(JavelinError::from)?;
            let dest = dir.display().to_string();
            run_git(None, &["clone", "--quiet", "--mirror", url, &dest])
                .map_err(|e| git_error(lib, url, e))?;
        }
        Ok(dir)
    }

    /// Detached worktree for `sha`, created from the mirror when missing.
    fn ensure_worktree(&self, lib: &Lib, url: &str, sha: &str) -> JavelinResult<PathBuf> {
        let dest = self
            .gitlibs_root
            .join("libs")
            .join(lib.group())
            .join(lib.artifact_base())
            .join(sha);
        if dest.join(".git").exists() {
            return Ok(dest);
        }

        let repo = self.ensure_repo(lib, url)?;
        javelin_util::fs::ensure_dir(dest.parent().unwrap_or(Path::new(".")))
            .map_err(JavelinError::from)?;
        let from = repo.display().to_string();
        let to = dest.display().to_string();
        run_git(None, &["clone", "--quiet", &from, &to]).map_err(|e| git_error(lib, url, e))?;
        run_git(Some(&dest), &["checkout", "--quiet", "--detach", sha])
            .map_err(|e| git_error(lib, url, e))?;
        Ok(dest)
    }

    /// Resolve a revision (short sha or tag) to a full commit sha.
    fn rev_parse(&self, lib: &Lib, url: &str, rev: &str) -> JavelinResult<String> {
        let repo = self.ensure_repo(lib, url)?;
        let spec = format!("{rev}^{{commit}}");
        let out = run_git(Some(&repo), &["rev-parse", &spec])
            .map_err(|e| git_error(lib, url, e))?;
        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    }
}

impl Procurer for GitProcurer {
    fn canonicalize(
        &self,
        lib: &Lib,
        coord: &CoordSpec,
        _config: &DepsMap,
    ) -> JavelinResult<(Lib, CoordSpec)> {
        let git = self.coord_of(lib, coord)?;
        let rev = git
            .sha
            .as_deref()
            .or(git.tag.as_deref())
            .ok_or_else(|| JavelinError::Resolution {
                lib: lib.to_string(),
                coord: Some(git.url.clone()),
                message: "git coordinate needs a sha or tag".to_string(),
            })?;

        if is_full_sha(rev) {
            return Ok((lib.clone(), coord.clone()));
        }
        let full = self.rev_parse(lib, &git.url, rev)?;
        let mut canonical = git.clone();
        canonical.sha = Some(full);
        Ok((lib.clone(), CoordSpec::Git(canonical)))
    }

    fn dep_id(&self, lib: &Lib, coord: &CoordSpec, _config: &DepsMap) -> JavelinResult<CoordId> {
        let git = self.coord_of(lib, coord)?;
        Ok(CoordId(self.sha_of(lib, git)?.to_string()))
    }

    fn manifest_type(
        &self,
        lib: &Lib,
        coord: &CoordSpec,
        _config: &DepsMap,
    ) -> JavelinResult<ManifestInfo> {
        let git = self.coord_of(lib, coord)?;
        let sha = self.sha_of(lib, git)?;
        let root = self.ensure_worktree(lib, &git.url, sha)?;
        let kind = if root.join("javelin.toml").is_file() {
            ManifestKind::Deps
        } else {
            ManifestKind::None
        };
        Ok(ManifestInfo {
            kind,
            root: Some(root),
        })
    }

    fn coord_deps(
        &self,
        _lib: &Lib,
        _coord: &CoordSpec,
        manifest: ManifestKind,
        _config: &DepsMap,
        dir: &Path,
    ) -> JavelinResult<Vec<(Lib, CoordSpec)>> {
        match manifest {
            ManifestKind::Deps => crate::project_deps(dir),
            _ => Ok(Vec::new()),
        }
    }

    fn coord_paths(
        &self,
        lib: &Lib,
        coord: &CoordSpec,
        manifest: ManifestKind,
        _config: &DepsMap,
    ) -> JavelinResult<Vec<PathBuf>> {
        let git = self.coord_of(lib, coord)?;
        let sha = self.sha_of(lib, git)?;
        let root = self.ensure_worktree(lib, &git.url, sha)?;
        match manifest {
            ManifestKind::Deps => crate::project_paths(&root),
            _ => Ok(vec![root]),
        }
    }

    fn compare_versions(
        &self,
        lib: &Lib,
        a: &CoordSpec,
        b: &CoordSpec,
        _config: &DepsMap,
    ) -> JavelinResult<Ordering> {
        let ga = self.coord_of(lib, a)?;
        let gb = self.coord_of(lib, b)?;
        let sha_a = self.sha_of(lib, ga)?;
        let sha_b = self.sha_of(lib, gb)?;
        if sha_a == sha_b {
            return Ok(Ordering::Equal);
        }

        let repo = self.ensure_repo(lib, &ga.url)?;
        if is_ancestor(&repo, sha_a, sha_b)? {
            return Ok(Ordering::Less);
        }
        if is_ancestor(&repo, sha_b, sha_a)? {
            return Ok(Ordering::Greater);
        }
        Err(JavelinError::resolution(
            lib.to_string(),
            format!("git commits {sha_a} and {sha_b} are unrelated; pin one in your deps map"),
        )
        .into())
    }

    fn coord_summary(&self, _lib: &Lib, coord: &CoordSpec) -> String {
        match coord {
            CoordSpec::Git(c) => {
                let sha = c.sha.as_deref().unwrap_or("?");
                format!("git {}", &sha[..sha.len().min(7)])
            }
            other => format!("{other:?}"),
        }
    }
}

fn is_ancestor(repo: &Path, ancestor: &str, descendant: &str) -> JavelinResult<bool> {
    Ok(git_succeeds(
        repo,
        &["merge-base", "--is-ancestor", ancestor, descendant],
    )?)
}

fn git_error(lib: &Lib, url: &str, cause: JavelinError) -> miette::Report {
    JavelinError::Resolution {
        lib: lib.to_string(),
        coord: Some(url.to_string()),
        message: cause.to_string(),
    }
    .into()
}

fn is_full_sha(rev: &str) -> bool {
    rev.len() == 40 && rev.chars().all(|c| c.is_ascii_hexdigit())
}

/// Flatten a URL into a cache directory name.
fn sanitize_url(url: &str) -> String {
    url.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
            c
        } else {
            '_'
        })
        .collect()
}
