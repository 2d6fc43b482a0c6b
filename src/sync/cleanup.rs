use super::allow_list::AllowList;
use super::error::SyncResult;
use super::remote_path::RemotePath;
use super::remote_store::{RemoteEntry, RemoteStore};
use tracing::{debug, info};

/// Outcome of planning a cleanup pass over one remote folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionPlan {
    /// Entries to delete, parents before children
    pub delete: Vec<RemoteEntry>,
    /// Allow-listed entries and folders that contain one
    pub keep: Vec<RemoteEntry>,
    /// Entries that disappear together with a deleted folder
    pub covered: Vec<RemoteEntry>,
}

impl DeletionPlan {
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty()
    }
}

/// Decide which entries under `root` to delete.
///
/// Allow-listed entries are never deleted, and neither is a folder holding
/// one. Every other entry is deleted, either directly or as part of a
/// deleted folder. The root itself is never part of the plan.
pub fn plan_deletions(
    root: &RemotePath,
    entries: &[RemoteEntry],
    allow_list: &AllowList,
) -> DeletionPlan {
    let root_lower = root.lower();

    let mut candidates: Vec<&RemoteEntry> = entries
        .iter()
        .filter(|entry| entry.is_below(&root_lower))
        .collect();
    candidates.sort_by(|a, b| a.path_lower.cmp(&b.path_lower));
    candidates.dedup_by(|a, b| a.path_lower == b.path_lower);

    let protected: Vec<&str> = candidates
        .iter()
        .filter(|entry| allow_list.is_protected(&entry.name))
        .map(|entry| entry.path_lower.as_str())
        .collect();

    let mut plan = DeletionPlan::default();
    let mut deleted_folders: Vec<&str> = Vec::new();

    for entry in candidates {
        if allow_list.is_protected(&entry.name) {
            plan.keep.push(entry.clone());
            continue;
        }

        if deleted_folders
            .iter()
            .any(|folder| entry.is_below(folder))
        {
            plan.covered.push(entry.clone());
            continue;
        }

        if entry.is_folder() {
            let holds_protected = protected.iter().any(|path| {
                path.len() > entry.path_lower.len() + 1
                    && path.starts_with(entry.path_lower.as_str())
                    && path.as_bytes()[entry.path_lower.len()] == b'/'
            });
            if holds_protected {
                plan.keep.push(entry.clone());
                continue;
            }
            deleted_folders.push(entry.path_lower.as_str());
        }

        plan.delete.push(entry.clone());
    }

    plan
}

/// List `root` recursively and delete everything the allow-list does not
/// protect. Stops at the first failed delete.
pub async fn run<S>(store: &mut S, root: &RemotePath, allow_list: &AllowList) -> SyncResult<DeletionPlan>
where
    S: RemoteStore + ?Sized,
{
    info!("🧹 Cleaning up remote folder {}", root);

    let entries = store.list_folder(root, true).await?;
    let plan = plan_deletions(root, &entries, allow_list);

    info!(
        "Cleanup plan: {} to delete, {} kept, {} removed with their folder",
        plan.delete.len(),
        plan.keep.len(),
        plan.covered.len()
    );

    for entry in &plan.keep {
        debug!("Keeping {}", entry.path_display);
    }

    for entry in &plan.delete {
        store.delete(&entry.remote_path()?).await?;
        info!("🗑️  Deleted {}", entry.path_display);
    }

    Ok(plan)
}
