use super::cleanup::{self, DeletionPlan};
use super::download;
use super::dropbox_service::DropboxService;
use super::error::{SyncError, SyncResult};
use super::oauth_client::Credentials;
use super::remote_path::RemotePath;
use super::remote_store::RemoteStore;
use super::sync_config::SyncSettings;
use super::upload::{self, UploadReport};
use chrono::Utc;
use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Result of a cleanup-and-download run.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub plan: DeletionPlan,
    pub downloaded: usize,
    pub local_entries: usize,
}

/// Console front end for the relay workflows.
pub struct SyncCommand<S: RemoteStore = DropboxService> {
    store: S,
    settings: SyncSettings,
    term: Term,
}

impl SyncCommand<DropboxService> {
    pub fn new(credentials: Credentials, settings: SyncSettings) -> SyncResult<Self> {
        let store = DropboxService::new(credentials, &settings)?;
        Ok(Self::with_store(store, settings))
    }
}

impl<S: RemoteStore> SyncCommand<S> {
    pub fn with_store(store: S, settings: SyncSettings) -> Self {
        Self {
            store,
            settings,
            term: Term::stdout(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Delete everything under `remote` that the allow-list does not protect
    pub async fn execute_delete(&mut self, remote: &RemotePath) -> SyncResult<DeletionPlan> {
        let allow_list = self.settings.allow_list();
        self.line(&format!("🧹 Cleaning up Dropbox folder {remote}"))?;
        self.line(&format!(
            "   Keeping names ending in: {}",
            allow_list.suffixes().join(", ")
        ))?;

        let spinner = spinner("Deleting unprotected entries...");
        let result = cleanup::run(&mut self.store, remote, &allow_list).await;
        spinner.finish_and_clear();
        let plan = result?;

        self.line(&format!(
            "✅ Cleanup finished: {} deleted, {} kept",
            plan.delete.len() + plan.covered.len(),
            plan.keep.len()
        ))?;
        Ok(plan)
    }

    /// Download `remote` into `local` and require a non-empty result
    pub async fn execute_download(&mut self, remote: &RemotePath, local: &Path) -> SyncResult<usize> {
        let (downloaded, _) = self.download_and_verify(remote, local).await?;
        Ok(downloaded)
    }

    /// Cleanup, download, verify
    pub async fn execute_fetch(&mut self, remote: &RemotePath, local: &Path) -> SyncResult<FetchReport> {
        let started = Utc::now();
        let plan = self.execute_delete(remote).await?;
        let (downloaded, local_entries) = self.download_and_verify(remote, local).await?;

        self.line(&format!(
            "🏁 Fetch completed in {}s",
            (Utc::now() - started).num_seconds()
        ))?;
        Ok(FetchReport {
            plan,
            downloaded,
            local_entries,
        })
    }

    async fn download_and_verify(&mut self, remote: &RemotePath, local: &Path) -> SyncResult<(usize, usize)> {
        self.line(&format!(
            "📥 Downloading Dropbox folder {remote} into {}",
            local.display()
        ))?;

        let spinner = spinner("Downloading files...");
        let result = download::run(&mut self.store, remote, local).await;
        spinner.finish_and_clear();
        let downloaded = result?;

        let local_entries = download::verify_not_empty(local)?;
        self.line(&format!("✅ Downloaded {} file(s)", downloaded.len()))?;
        Ok((downloaded.len(), local_entries))
    }

    /// Single file or directory upload
    pub async fn execute_upload(&mut self, local: &Path, destination: &str) -> SyncResult<UploadReport> {
        let spinner = spinner("Uploading...");
        let result = upload::upload_path(&mut self.store, local, destination).await;
        spinner.finish_and_clear();
        let report = result?;

        self.line(&format!("✅ Uploaded {} file(s)", report.uploaded.len()))?;
        Ok(report)
    }

    /// Top-level files of `local`, then the configured subdirectory
    pub async fn execute_publish(
        &mut self,
        local: &Path,
        remote: &RemotePath,
        subdir: Option<&str>,
    ) -> SyncResult<UploadReport> {
        self.line(&format!(
            "📤 Publishing {} to Dropbox folder {remote}",
            local.display()
        ))?;

        let spinner = spinner("Uploading files...");
        let result = upload::run(&mut self.store, local, remote, subdir).await;
        spinner.finish_and_clear();
        let report = result?;

        if let Some(missing) = &report.skipped_subdir {
            self.line(&format!(
                "⚠️  {} not found, skipped",
                missing.display()
            ))?;
        }
        self.line(&format!("✅ Uploaded {} file(s)", report.uploaded.len()))?;
        Ok(report)
    }

    fn line(&self, text: &str) -> SyncResult<()> {
        self.term
            .write_line(text)
            .map_err(|e| SyncError::io(Path::new("<stdout>"), e))
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        progress.set_style(style);
    }
    progress.set_message(message);
    progress.enable_steady_tick(Duration::from_millis(120));
    progress
}
