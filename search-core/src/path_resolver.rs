//! Maps a server-reported path onto a file that exists on this machine.
//!
//! Tiers, first existing regular file wins:
//! 1. `api_path` itself, when absolute
//! 2. `workspace/api_path`, when the workspace is an existing directory
//! 3. `parent(workspace)/api_path` (service paths rooted one level above the
//!    indexed folder)
//! 4. `cwd/api_path`
//! 5. `api_path` unchanged
//!
//! Matches are returned in canonical absolute form. Nothing here fails or
//! caches: the workspace can change between two clicks.

use std::{
    fmt,
    path::{MAIN_SEPARATOR, Path, PathBuf},
};

use tracing::debug;

/// Which tier produced a [`ResolvedPath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveTier {
    Absolute,
    Workspace,
    WorkspaceParent,
    CurrentDir,
    Unresolved,
}

impl fmt::Display for ResolveTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResolveTier::Absolute => "absolute",
            ResolveTier::Workspace => "workspace",
            ResolveTier::WorkspaceParent => "workspace-parent",
            ResolveTier::CurrentDir => "cwd",
            ResolveTier::Unresolved => "unresolved",
        };
        f.write_str(s)
    }
}

/// Outcome of a resolution, so callers can report a missing file without
/// probing the filesystem again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: String,
    pub exists: bool,
    pub tier: ResolveTier,
}

/// Converts both `/` and `\` to the host separator.
///
/// The only place separators are touched; every tier goes through it.
pub fn normalize_separators(raw: &str) -> String {
    raw.chars()
        .map(|c| if c == '/' || c == '\\' { MAIN_SEPARATOR } else { c })
        .collect()
}

/// Resolves `api_path` and returns only the path string.
///
/// Falls back to the unmodified input when nothing exists.
pub fn resolve(api_path: &str, workspace: Option<&str>) -> String {
    resolve_detailed(api_path, workspace).path
}

/// Resolves `api_path` and reports the tier that matched.
pub fn resolve_detailed(api_path: &str, workspace: Option<&str>) -> ResolvedPath {
    let unresolved = || ResolvedPath {
        path: api_path.to_string(),
        exists: false,
        tier: ResolveTier::Unresolved,
    };

    if api_path.trim().is_empty() {
        return unresolved();
    }

    let normalized = normalize_separators(api_path);
    let rel = Path::new(&normalized);

    if rel.is_absolute() && rel.is_file() {
        return found(rel, ResolveTier::Absolute);
    }

    let workspace = workspace
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(|w| PathBuf::from(normalize_separators(w)));

    if let Some(ws) = workspace.as_deref() {
        if ws.is_dir() {
            let candidate = ws.join(rel);
            if candidate.is_file() {
                return found(&candidate, ResolveTier::Workspace);
            }
        }
        if let Some(parent) = ws.parent().filter(|p| !p.as_os_str().is_empty()) {
            let candidate = parent.join(rel);
            if candidate.is_file() {
                return found(&candidate, ResolveTier::WorkspaceParent);
            }
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        let candidate = cwd.join(rel);
        if candidate.is_file() {
            return found(&candidate, ResolveTier::CurrentDir);
        }
    }

    debug!(api_path, workspace = ?workspace, "path did not resolve to an existing file");
    unresolved()
}

fn found(path: &Path, tier: ResolveTier) -> ResolvedPath {
    let canonical = dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    debug!(path = %canonical.display(), %tier, "resolved citation path");
    ResolvedPath {
        path: canonical.to_string_lossy().into_owned(),
        exists: true,
        tier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn canon(p: &Path) -> String {
        dunce::canonicalize(p).unwrap().to_string_lossy().into_owned()
    }

    #[test]
    fn existing_absolute_path_is_returned_canonical_for_any_workspace() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("report.pdf");
        fs::write(&file, b"x").unwrap();
        let abs = file.to_string_lossy().into_owned();

        let other = TempDir::new().unwrap();
        for ws in [None, Some(other.path().to_str().unwrap()), Some("/does/not/exist")] {
            let r = resolve_detailed(&abs, ws);
            assert_eq!(r.path, canon(&file));
            assert_eq!(r.tier, ResolveTier::Absolute);
        }
    }

    #[test]
    fn relative_path_resolves_under_workspace() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("docs")).unwrap();
        let file = tmp.path().join("docs").join("history.pdf");
        fs::write(&file, b"x").unwrap();

        let r = resolve_detailed("docs/history.pdf", tmp.path().to_str());
        assert_eq!(r.path, canon(&file));
        assert_eq!(r.tier, ResolveTier::Workspace);
        assert!(r.exists);
    }

    #[test]
    fn relative_path_resolves_under_workspace_parent() {
        let tmp = TempDir::new().unwrap();
        let ws = tmp.path().join("data");
        fs::create_dir_all(&ws).unwrap();
        let file = tmp.path().join("data").join("rome.pdf");
        fs::write(&file, b"x").unwrap();

        // The service reports paths relative to the workspace's parent.
        let r = resolve_detailed("data/rome.pdf", ws.to_str());
        assert_eq!(r.path, canon(&file));
        assert_eq!(r.tier, ResolveTier::WorkspaceParent);
    }

    #[test]
    fn parent_tier_works_when_workspace_is_gone() {
        let tmp = TempDir::new().unwrap();
        let gone = tmp.path().join("gone");
        let file = tmp.path().join("x.txt");
        fs::write(&file, b"x").unwrap();

        let r = resolve_detailed("x.txt", gone.to_str());
        assert!(!gone.exists());
        assert!(r.exists);
        assert_eq!(r.tier, ResolveTier::WorkspaceParent);
        assert_eq!(r.path, canon(&file));
    }

    #[test]
    fn workspace_wins_over_parent() {
        let tmp = TempDir::new().unwrap();
        let ws = tmp.path().join("ws");
        fs::create_dir_all(&ws).unwrap();
        fs::write(ws.join("a.txt"), b"inner").unwrap();
        fs::write(tmp.path().join("a.txt"), b"outer").unwrap();

        let r = resolve_detailed("a.txt", ws.to_str());
        assert_eq!(r.path, canon(&ws.join("a.txt")));
    }

    #[test]
    fn backslashes_are_normalized() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("logs")).unwrap();
        let file = tmp.path().join("logs").join("app.log");
        fs::write(&file, b"x").unwrap();

        assert_eq!(resolve("logs\\app.log", tmp.path().to_str()), canon(&file));
    }

    #[test]
    fn current_dir_is_the_last_tier() {
        // cargo runs unit tests from the crate root.
        let r = resolve_detailed("Cargo.toml", None);
        assert_eq!(r.tier, ResolveTier::CurrentDir);
        assert!(r.exists);
    }

    #[test]
    fn unresolvable_path_is_returned_unchanged() {
        let tmp = TempDir::new().unwrap();
        let p = "no/such\\file-7f3a.pdf";
        let r = resolve_detailed(p, tmp.path().to_str());
        assert_eq!(r.path, p);
        assert!(!r.exists);
        assert_eq!(r.tier, ResolveTier::Unresolved);
        assert_eq!(resolve("", None), "");
    }

    #[test]
    fn directories_do_not_match() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("sub")).unwrap();
        let r = resolve_detailed("sub", tmp.path().to_str());
        assert_eq!(r.tier, ResolveTier::Unresolved);
    }
}
