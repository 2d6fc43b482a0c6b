use super::error::{SyncError, SyncResult};
use std::fmt;

/// Normalized Dropbox path.
///
/// Stored the way the API expects it: the account root is the empty string,
/// everything else is `/segment/segment` without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RemotePath(String);

impl RemotePath {
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Parse a user or API supplied path. Backslashes are treated as
    /// separators, empty and `.` segments are dropped, `..` is rejected.
    pub fn parse(raw: &str) -> SyncResult<Self> {
        let segments = split_segments(raw)?;
        Ok(Self::from_segments(&segments))
    }

    /// Append a relative path below this one.
    pub fn join(&self, relative: &str) -> SyncResult<Self> {
        let extra = split_segments(relative)?;
        let mut path = self.0.clone();
        for segment in extra {
            path.push('/');
            path.push_str(segment);
        }
        Ok(Self(path))
    }

    fn from_segments(segments: &[&str]) -> Self {
        let mut path = String::new();
        for segment in segments {
            path.push('/');
            path.push_str(segment);
        }
        Self(path)
    }

    /// The value sent in the `path` field of API requests.
    pub fn as_api_path(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Dropbox compares paths case-insensitively; listings report `path_lower`.
    pub fn lower(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("/")
        } else {
            f.write_str(&self.0)
        }
    }
}

fn split_segments(raw: &str) -> SyncResult<Vec<&str>> {
    let mut segments = Vec::new();
    for segment in raw.trim().split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(SyncError::invalid_path(
                    "remote_path",
                    raw,
                    format!("Remote path must not contain '..': {raw}"),
                ))
            }
            other => segments.push(other),
        }
    }
    Ok(segments)
}
