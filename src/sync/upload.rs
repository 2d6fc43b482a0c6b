use super::error::{SyncError, SyncResult};
use super::local_tree::{top_level_files, walk_files};
use super::remote_path::RemotePath;
use super::remote_store::RemoteStore;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What an upload run sent to the remote store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    /// Remote destinations in upload order
    pub uploaded: Vec<RemotePath>,
    /// Set when the optional subdirectory was not found locally
    pub skipped_subdir: Option<PathBuf>,
}

/// Upload the files directly inside `local_base` to `remote_base`, then the
/// `subdir` tree (if given and present) to `remote_base/<subdir>`.
pub async fn run<S>(
    store: &mut S,
    local_base: &Path,
    remote_base: &RemotePath,
    subdir: Option<&str>,
) -> SyncResult<UploadReport>
where
    S: RemoteStore + ?Sized,
{
    if !local_base.is_dir() {
        return Err(SyncError::directory_not_found(local_base));
    }

    info!("📤 Uploading files from {} to {}", local_base.display(), remote_base);
    let mut report = UploadReport::default();

    for file in top_level_files(local_base)? {
        let destination = remote_base.join(&file.relative)?;
        upload_file(store, &file.path, destination, &mut report).await?;
    }

    if let Some(name) = subdir {
        let local_dir = local_base.join(name);
        if local_dir.is_dir() {
            let remote_dir = remote_base.join(name)?;
            info!("📤 Uploading directory {} to {}", local_dir.display(), remote_dir);
            upload_tree(store, &local_dir, &remote_dir, &mut report).await?;
        } else {
            warn!(
                "⚠️  Directory {} not found, skipping its upload",
                local_dir.display()
            );
            report.skipped_subdir = Some(local_dir);
        }
    }

    info!("Uploaded {} file(s)", report.uploaded.len());
    Ok(report)
}

/// Upload a single file or a whole directory.
///
/// A file goes to `destination` verbatim, or to `destination/<file name>`
/// when `destination` ends with `/`. A directory is uploaded recursively
/// beneath `destination`.
pub async fn upload_path<S>(store: &mut S, local: &Path, destination: &str) -> SyncResult<UploadReport>
where
    S: RemoteStore + ?Sized,
{
    let mut report = UploadReport::default();

    if local.is_file() {
        let remote = if destination.ends_with('/') {
            let file_name = local
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| {
                    SyncError::invalid_path(
                        "local_path",
                        local.display().to_string(),
                        "Invalid file name",
                    )
                })?;
            RemotePath::parse(destination)?.join(file_name)?
        } else {
            RemotePath::parse(destination)?
        };
        info!("Attempting to upload single file: {} to {}", local.display(), remote);
        upload_file(store, local, remote, &mut report).await?;
    } else if local.is_dir() {
        let remote = RemotePath::parse(destination)?;
        info!(
            "Attempting to upload directory: {} to Dropbox base path: {}",
            local.display(),
            remote
        );
        upload_tree(store, local, &remote, &mut report).await?;
    } else if local.exists() {
        return Err(SyncError::invalid_path(
            "local_path",
            local.display().to_string(),
            format!("'{}' is neither a file nor a directory", local.display()),
        ));
    } else {
        return Err(SyncError::io(
            local,
            std::io::Error::new(std::io::ErrorKind::NotFound, "local path was not found"),
        ));
    }

    Ok(report)
}

async fn upload_tree<S>(
    store: &mut S,
    local_dir: &Path,
    remote_dir: &RemotePath,
    report: &mut UploadReport,
) -> SyncResult<()>
where
    S: RemoteStore + ?Sized,
{
    for file in walk_files(local_dir)? {
        let destination = remote_dir.join(&file.relative)?;
        upload_file(store, &file.path, destination, report).await?;
    }
    Ok(())
}

async fn upload_file<S>(
    store: &mut S,
    local: &Path,
    destination: RemotePath,
    report: &mut UploadReport,
) -> SyncResult<()>
where
    S: RemoteStore + ?Sized,
{
    if destination.is_root() {
        return Err(SyncError::upload_failed(format!(
            "No remote file name for {}",
            local.display()
        )));
    }

    store.upload(&destination, local).await?;
    info!("✅ Successfully uploaded {} to {}", local.display(), destination);
    report.uploaded.push(destination);
    Ok(())
}
