#![allow(dead_code)]

use async_trait::async_trait;
use flowbox::sync::error::{SyncError, SyncResult};
use flowbox::{RemoteEntry, RemotePath, RemoteStore};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Delete(String),
    Download(String),
    Upload(String),
}

/// In-memory stand-in for Dropbox. Paths are stored with display casing and
/// compared case-insensitively, like the real service.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub files: BTreeMap<String, Vec<u8>>,
    pub folders: BTreeSet<String>,
    pub calls: Vec<Call>,
    /// Any operation on this path (lowercase) fails
    pub fail_on: Option<String>,
}

impl MemoryStore {
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let mut store = Self::default();
        for (path, content) in files {
            store.insert(path, content.as_bytes().to_vec());
        }
        store
    }

    pub fn failing_on(mut self, path: &str) -> Self {
        self.fail_on = Some(path.to_lowercase());
        self
    }

    pub fn insert(&mut self, path: &str, content: Vec<u8>) {
        self.add_parents(path);
        self.files.insert(path.to_string(), content);
    }

    pub fn add_folder(&mut self, path: &str) {
        self.add_parents(path);
        self.folders.insert(path.to_string());
    }

    fn add_parents(&mut self, path: &str) {
        let mut current = String::new();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        for segment in &segments[..segments.len().saturating_sub(1)] {
            current.push('/');
            current.push_str(segment);
            if !self.folders.iter().any(|f| f.to_lowercase() == current.to_lowercase()) {
                self.folders.insert(current.clone());
            }
        }
    }

    pub fn file_paths(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Upload(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Delete(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    fn check_failure(&self, endpoint: &str, path: &RemotePath) -> SyncResult<()> {
        if self.fail_on.as_deref() == Some(path.lower().as_str()) {
            return Err(SyncError::remote(endpoint, 500, "injected failure"));
        }
        Ok(())
    }

    fn not_found(endpoint: &str) -> flowbox::FlowboxError {
        SyncError::remote(endpoint, 409, "path_lookup/not_found/")
    }
}

fn is_below(path: &str, folder_lower: &str) -> bool {
    let lower = path.to_lowercase();
    lower.len() > folder_lower.len() + 1
        && lower.starts_with(folder_lower)
        && lower.as_bytes()[folder_lower.len()] == b'/'
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn list_folder(
        &mut self,
        path: &RemotePath,
        recursive: bool,
    ) -> SyncResult<Vec<RemoteEntry>> {
        self.calls.push(Call::List(path.to_string()));
        self.check_failure("files/list_folder", path)?;

        let root = path.lower();
        let depth = root.matches('/').count() + 1;
        let in_scope = |p: &str| is_below(p, &root) && (recursive || p.matches('/').count() == depth);

        let mut entries = Vec::new();
        if let Some(folder) = self.folders.iter().find(|f| f.to_lowercase() == root) {
            entries.push(RemoteEntry::folder(folder));
        } else if !path.is_root() {
            return Ok(entries);
        }

        entries.extend(
            self.folders
                .iter()
                .filter(|f| in_scope(f))
                .map(|f| RemoteEntry::folder(f)),
        );
        entries.extend(
            self.files
                .iter()
                .filter(|(p, _)| in_scope(p))
                .map(|(p, content)| RemoteEntry::file(p, content.len() as u64)),
        );
        Ok(entries)
    }

    async fn delete(&mut self, path: &RemotePath) -> SyncResult<()> {
        self.calls.push(Call::Delete(path.to_string()));
        self.check_failure("files/delete_v2", path)?;

        let target = path.lower();
        let before = self.files.len() + self.folders.len();
        self.files
            .retain(|p, _| p.to_lowercase() != target && !is_below(p, &target));
        self.folders
            .retain(|p| p.to_lowercase() != target && !is_below(p, &target));

        if self.files.len() + self.folders.len() == before {
            return Err(Self::not_found("files/delete_v2"));
        }
        Ok(())
    }

    async fn download(&mut self, path: &RemotePath, target: &Path) -> SyncResult<u64> {
        self.calls.push(Call::Download(path.to_string()));
        self.check_failure("files/download", path)?;

        let target_lower = path.lower();
        let content = self
            .files
            .iter()
            .find(|(p, _)| p.to_lowercase() == target_lower)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| Self::not_found("files/download"))?;

        fs::write(target, &content).map_err(|e| SyncError::io(target, e))?;
        Ok(content.len() as u64)
    }

    async fn upload(&mut self, path: &RemotePath, source: &Path) -> SyncResult<()> {
        self.calls.push(Call::Upload(path.to_string()));
        self.check_failure("files/upload", path)?;

        let content = fs::read(source).map_err(|e| SyncError::io(source, e))?;
        self.insert(path.as_api_path(), content);
        Ok(())
    }
}
