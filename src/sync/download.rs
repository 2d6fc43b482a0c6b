use super::error::{SyncError, SyncResult};
use super::local_tree::{count_entries, local_target};
use super::remote_path::RemotePath;
use super::remote_store::{EntryKind, RemoteEntry, RemoteStore};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Mirror everything under `root` into `local_root`.
///
/// Returns the local paths of the downloaded files. Directories are created
/// as needed; the first failing download aborts the run.
pub async fn run<S>(store: &mut S, root: &RemotePath, local_root: &Path) -> SyncResult<Vec<PathBuf>>
where
    S: RemoteStore + ?Sized,
{
    info!("📥 Downloading {} into {}", root, local_root.display());
    fs::create_dir_all(local_root).map_err(|e| SyncError::io(local_root, e))?;

    let mut entries = store.list_folder(root, true).await?;
    entries.sort_by(|a, b| a.path_lower.cmp(&b.path_lower));

    // path_lower of each created folder -> its local relative path
    let mut folders: HashMap<String, String> = HashMap::new();
    let mut downloaded = Vec::new();

    for entry in entries {
        let Some(relative) = local_relative(&entry, root, &folders) else {
            continue;
        };
        let target = local_target(local_root, &relative)?;

        match entry.kind {
            EntryKind::Folder => {
                fs::create_dir_all(&target).map_err(|e| SyncError::io(&target, e))?;
                debug!("Created directory {}", target.display());
                folders.insert(entry.path_lower.clone(), relative);
            }
            EntryKind::File => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
                }
                let bytes = store.download(&entry.remote_path()?, &target).await?;
                info!("✅ {} -> {} ({} bytes)", entry.path_display, target.display(), bytes);
                downloaded.push(target);
            }
        }
    }

    info!("Downloaded {} file(s)", downloaded.len());
    Ok(downloaded)
}

/// Relative local path for `entry`, placed under the local directory already
/// created for its parent folder when there is one.
fn local_relative(
    entry: &RemoteEntry,
    root: &RemotePath,
    folders: &HashMap<String, String>,
) -> Option<String> {
    let relative = entry.relative_to(root)?;
    let parent = entry
        .path_lower
        .rsplit_once('/')
        .and_then(|(parent_lower, _)| folders.get(parent_lower));

    match (parent, relative.rsplit_once('/')) {
        (Some(parent), Some((_, leaf))) => Some(format!("{parent}/{leaf}")),
        _ => Some(relative),
    }
}

/// Fail unless `local_root` exists and holds at least one entry. An empty
/// folder after a download usually means wrong credentials or a wrong
/// remote path.
pub fn verify_not_empty(local_root: &Path) -> SyncResult<usize> {
    let count = count_entries(local_root)?;
    if count == 0 {
        return Err(SyncError::empty_download(local_root));
    }
    info!("{} contains {} entries", local_root.display(), count);
    Ok(count)
}
