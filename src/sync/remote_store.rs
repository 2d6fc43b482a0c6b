use super::error::SyncResult;
use super::remote_path::RemotePath;
use async_trait::async_trait;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Folder,
}

/// One object reported by a remote listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub kind: EntryKind,
    pub name: String,
    pub path_lower: String,
    pub path_display: String,
    pub size: Option<u64>,
}

impl RemoteEntry {
    pub fn file(path_display: &str, size: u64) -> Self {
        Self::new(EntryKind::File, path_display, Some(size))
    }

    pub fn folder(path_display: &str) -> Self {
        Self::new(EntryKind::Folder, path_display, None)
    }

    fn new(kind: EntryKind, path_display: &str, size: Option<u64>) -> Self {
        let name = path_display
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            kind,
            name,
            path_lower: path_display.to_lowercase(),
            path_display: path_display.to_string(),
            size,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    /// True if this entry lives strictly below the folder whose lowercased
    /// path is `folder_lower` (`""` for the account root).
    pub fn is_below(&self, folder_lower: &str) -> bool {
        self.path_lower.len() > folder_lower.len() + 1
            && self.path_lower.starts_with(folder_lower)
            && self.path_lower.as_bytes()[folder_lower.len()] == b'/'
    }

    /// Path of this entry relative to `root`. Only the last component of
    /// `path_display` is reliably cased, so parent segments come from
    /// `path_lower` and the leaf from the entry name.
    /// `None` for the root itself and for entries outside of it.
    pub fn relative_to(&self, root: &RemotePath) -> Option<String> {
        let root_lower = root.lower();
        if !self.is_below(&root_lower) {
            return None;
        }

        let relative_lower = self.path_lower.get(root_lower.len() + 1..)?;
        let (parent, leaf_lower) = match relative_lower.rsplit_once('/') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, relative_lower),
        };
        let leaf = if self.name.to_lowercase() == leaf_lower {
            self.name.as_str()
        } else {
            leaf_lower
        };

        Some(match parent {
            Some(parent) => format!("{parent}/{leaf}"),
            None => leaf.to_string(),
        })
    }

    pub fn remote_path(&self) -> SyncResult<RemotePath> {
        RemotePath::parse(&self.path_display)
    }
}

/// Operations the workflow drivers need from a remote file store.
#[async_trait]
pub trait RemoteStore: Send {
    /// List the entries below `path`. The folder itself may be included.
    async fn list_folder(
        &mut self,
        path: &RemotePath,
        recursive: bool,
    ) -> SyncResult<Vec<RemoteEntry>>;

    /// Delete a file or a folder with everything inside it.
    async fn delete(&mut self, path: &RemotePath) -> SyncResult<()>;

    /// Stream the file at `path` into `target`. Returns the bytes written.
    async fn download(&mut self, path: &RemotePath, target: &Path) -> SyncResult<u64>;

    /// Upload the local file `source` to `path`, replacing an existing file.
    async fn upload(&mut self, path: &RemotePath, source: &Path) -> SyncResult<()>;
}
