//! Local path resolution
//!
//! Settings live in the per-user config directory; relative local folders
//! given on the command line resolve against the CI checkout when one is set.

use crate::config::{CONFIG_DIRECTORY, CONFIG_FILE_NAME, WORKSPACE_ENV};
use std::path::{Path, PathBuf};

/// `~/.config/flowbox/config.toml` (platform equivalent)
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIRECTORY).join(CONFIG_FILE_NAME))
}

/// Resolve a local folder argument against `GITHUB_WORKSPACE`.
pub fn resolve_local_path(path: &Path) -> PathBuf {
    let workspace = std::env::var_os(WORKSPACE_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);
    resolve_local_path_with(path, workspace.as_deref())
}

pub fn resolve_local_path_with(path: &Path, workspace: Option<&Path>) -> PathBuf {
    match workspace {
        Some(root) if path.is_relative() => root.join(path),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_paths_join_workspace() {
        let resolved =
            resolve_local_path_with(Path::new("data/output"), Some(Path::new("/ci/checkout")));
        assert_eq!(resolved, PathBuf::from("/ci/checkout/data/output"));
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let resolved = resolve_local_path_with(Path::new("/tmp/out"), Some(Path::new("/ci")));
        assert_eq!(resolved, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_without_workspace() {
        let resolved = resolve_local_path_with(Path::new("out"), None);
        assert_eq!(resolved, PathBuf::from("out"));
    }
}
