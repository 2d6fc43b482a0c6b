use super::error::{SyncError, SyncResult};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// A regular file found under a local folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub path: PathBuf,
    /// `/`-separated path relative to the walked folder
    pub relative: String,
}

/// Regular files directly inside `dir`, sorted by name. Subdirectories are
/// not included; symlinks are followed and dangling ones skipped.
pub fn top_level_files(dir: &Path) -> SyncResult<Vec<LocalFile>> {
    collect_files(dir, Some(1))
}

/// Every regular file below `dir`, depth first, sorted by name per level.
pub fn walk_files(dir: &Path) -> SyncResult<Vec<LocalFile>> {
    collect_files(dir, None)
}

fn collect_files(dir: &Path, max_depth: Option<usize>) -> SyncResult<Vec<LocalFile>> {
    if !dir.is_dir() {
        return Err(SyncError::directory_not_found(dir));
    }

    let mut walker = WalkDir::new(dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if is_dangling_link(&err) => {
                warn!(
                    "⚠️  Skipping {}: link target does not exist",
                    err.path().unwrap_or(dir).display()
                );
                continue;
            }
            Err(err) => return Err(SyncError::walk(dir, err)),
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = relative_slash_path(dir, entry.path())?;
        files.push(LocalFile {
            path: entry.into_path(),
            relative,
        });
    }

    Ok(files)
}

fn is_dangling_link(err: &walkdir::Error) -> bool {
    err.depth() >= 1
        && err
            .io_error()
            .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}

fn relative_slash_path(root: &Path, path: &Path) -> SyncResult<String> {
    let relative = path.strip_prefix(root).map_err(|e| {
        SyncError::invalid_path(
            "local_path",
            path.display().to_string(),
            format!("Failed to create relative path: {e}"),
        )
    })?;

    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(segments.join("/"))
}

/// Map a remote relative path onto `root`, refusing anything that would
/// land outside of it.
pub fn local_target(root: &Path, relative: &str) -> SyncResult<PathBuf> {
    let mut target = root.to_path_buf();
    let mut pushed = false;

    for segment in relative.split('/') {
        let escapes = matches!(
            Path::new(segment).components().next(),
            Some(Component::ParentDir | Component::RootDir | Component::Prefix(_))
        ) || Path::new(segment).components().count() != 1;

        if segment.is_empty() || segment == "." || escapes {
            return Err(SyncError::invalid_path(
                "remote_entry",
                relative,
                format!("Remote entry '{relative}' does not map to a path inside the local folder"),
            ));
        }

        target.push(segment);
        pushed = true;
    }

    if !pushed {
        return Err(SyncError::invalid_path(
            "remote_entry",
            relative,
            "Remote entry has an empty relative path",
        ));
    }

    Ok(target)
}

/// Number of entries (files or folders) directly inside `dir`.
pub fn count_entries(dir: &Path) -> SyncResult<usize> {
    if !dir.is_dir() {
        return Err(SyncError::directory_not_found(dir));
    }
    let entries = fs::read_dir(dir).map_err(|e| SyncError::io(dir, e))?;
    Ok(entries.count())
}
