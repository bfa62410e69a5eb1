//! Detection of input that names an executable on the search path.

use std::path::{Path, PathBuf};

/// If the first word of `line` is an executable found on `search_path`
/// (a `PATH`-style list), return its full path.
pub fn resolve_executable(line: &str, search_path: Option<&std::ffi::OsStr>) -> Option<PathBuf> {
    let program = line.split_whitespace().next()?;

    // Explicit paths are not looked up.
    if program.contains('/') {
        let candidate = Path::new(program);
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let search_path = search_path?;
    std::env::split_paths(search_path)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

/// Resolve against the current process `PATH`.
pub fn resolve_on_path(line: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH");
    resolve_executable(line, path.as_deref())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
