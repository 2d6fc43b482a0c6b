use crate::config::{
    CONFIG_ENV, DEFAULT_API_BASE, DEFAULT_CONTENT_BASE, DEFAULT_PROTECTED_SUFFIXES,
    DEFAULT_TOKEN_URL, DEFAULT_UPLOAD_SUBDIR, REQUEST_TIMEOUT, SINGLE_UPLOAD_LIMIT,
    UPLOAD_CHUNK_SIZE,
};
use crate::sync::allow_list::AllowList;
use crate::sync::error::{SyncError, SyncResult};
use crate::utils::config_paths::default_config_file;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Dropbox endpoints. Overridable so the client can talk to a mock server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub token_url: String,
    pub api_base: String,
    pub content_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            content_base: DEFAULT_CONTENT_BASE.to_string(),
        }
    }
}

impl Endpoints {
    /// All three endpoints on one base URL, laid out like the real service.
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            token_url: format!("{base}/oauth2/token"),
            api_base: format!("{base}/2"),
            content_base: format!("{base}/2"),
        }
    }
}

/// Settings for one relay run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    pub endpoints: Endpoints,
    /// Name suffixes that the cleanup pass keeps
    pub protected_suffixes: Vec<String>,
    /// Local subdirectory that `publish` uploads recursively
    pub upload_subdir: String,
    pub single_upload_limit: u64,
    pub upload_chunk_size: usize,
    pub request_timeout_secs: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            protected_suffixes: DEFAULT_PROTECTED_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            upload_subdir: DEFAULT_UPLOAD_SUBDIR.to_string(),
            single_upload_limit: SINGLE_UPLOAD_LIMIT,
            upload_chunk_size: UPLOAD_CHUNK_SIZE,
            request_timeout_secs: REQUEST_TIMEOUT.as_secs(),
        }
    }
}

impl SyncSettings {
    /// Read settings from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> SyncResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| SyncError::io(path, e))?;
        let settings: Self =
            toml::from_str(&content).map_err(|e| SyncError::config_file(path, e))?;
        settings.validate()?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Resolve the settings file: an explicit path must exist, then
    /// `FLOWBOX_CONFIG`, then the per-user config file if present.
    pub fn load_or_default(explicit: Option<&Path>) -> SyncResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) {
            return Self::load(&path);
        }

        match default_config_file() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> SyncResult<()> {
        if self.upload_chunk_size == 0 {
            return Err(SyncError::config("upload_chunk_size must be greater than zero"));
        }

        if self.upload_chunk_size as u64 > SINGLE_UPLOAD_LIMIT {
            return Err(SyncError::config(format!(
                "upload_chunk_size must not exceed {} bytes",
                SINGLE_UPLOAD_LIMIT
            )));
        }

        if self.single_upload_limit > SINGLE_UPLOAD_LIMIT {
            return Err(SyncError::config(format!(
                "single_upload_limit must not exceed {} bytes",
                SINGLE_UPLOAD_LIMIT
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(SyncError::config("request_timeout_secs must be greater than zero"));
        }

        if self.upload_subdir.trim().is_empty() || self.upload_subdir.contains(['/', '\\']) {
            return Err(SyncError::config(format!(
                "upload_subdir must be a single directory name, got '{}'",
                self.upload_subdir
            )));
        }

        Ok(())
    }

    pub fn allow_list(&self) -> AllowList {
        AllowList::new(self.protected_suffixes.iter().cloned())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let settings = SyncSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.upload_subdir, "VTK");
        assert!(settings.allow_list().is_protected("a.step"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
protected_suffixes = [".step", ".stl"]

[endpoints]
api_base = "http://127.0.0.1:9000/2"
"#,
        )
        .unwrap();

        let settings = SyncSettings::load(&path).unwrap();
        assert_eq!(settings.protected_suffixes, vec![".step", ".stl"]);
        assert_eq!(settings.endpoints.api_base, "http://127.0.0.1:9000/2");
        assert_eq!(settings.endpoints.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(settings.upload_chunk_size, UPLOAD_CHUNK_SIZE);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "upload_chunk_size = 0\n").unwrap();
        assert!(SyncSettings::load(&path).is_err());

        fs::write(&path, "upload_subdir = \"a/b\"\n").unwrap();
        assert!(SyncSettings::load(&path).is_err());

        fs::write(&path, "protected_suffixes = \"not-a-list\"\n").unwrap();
        assert!(SyncSettings::load(&path).is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let result = SyncSettings::load_or_default(Some(Path::new("/nonexistent/flowbox.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_endpoints_with_base_url() {
        let endpoints = Endpoints::with_base_url("http://localhost:8080/");
        assert_eq!(endpoints.token_url, "http://localhost:8080/oauth2/token");
        assert_eq!(endpoints.api_base, "http://localhost:8080/2");
        assert_eq!(endpoints.content_base, "http://localhost:8080/2");
    }
}
