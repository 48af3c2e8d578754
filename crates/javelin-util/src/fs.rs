use std::path::{Path, PathBuf};

/// Create `dir` and any missing parents. Succeeds when it already exists.
pub fn ensure_dir(dir: impl AsRef<Path>) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}

/// Resolve `path` against `base` when it is relative.
///
/// Does not touch the filesystem; `..` and symlinks are left as-is so the
/// result stays usable for paths that do not exist yet.
pub fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
