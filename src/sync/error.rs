use crate::error::{FlowboxError, FlowboxResult, SyncOperation};
use reqwest::Error as ReqwestError;
use serde_json::Error as SerdeError;
use std::io;
use std::path::Path;

pub type SyncResult<T> = FlowboxResult<T>;

const PROVIDER: &str = "dropbox";

/// Helper namespace that converts sync failures into FlowboxError instances.
pub struct SyncError;

impl SyncError {
    pub fn token_refresh(reason: impl Into<String>) -> FlowboxError {
        let message = reason.into();
        if message.contains("invalid_grant") || message.contains("invalid_client") {
            return FlowboxError::Auth {
                message: format!("Dropbox rejected the app key, secret or refresh token: {message}"),
                provider: PROVIDER.to_string(),
                source: None,
            };
        }
        Self::sync(SyncOperation::TokenRefresh, message)
    }

    pub fn sync(operation: SyncOperation, reason: impl Into<String>) -> FlowboxError {
        FlowboxError::Sync {
            message: reason.into(),
            operation,
            source: None,
        }
    }

    pub fn config(reason: impl Into<String>) -> FlowboxError {
        FlowboxError::Config {
            message: reason.into(),
            source: None,
        }
    }

    pub fn config_file(path: &Path, err: toml::de::Error) -> FlowboxError {
        FlowboxError::Config {
            message: format!("Invalid settings file {}: {err}", path.display()),
            source: Some(Box::new(err)),
        }
    }

    pub fn io(path: &Path, err: io::Error) -> FlowboxError {
        FlowboxError::Filesystem {
            message: format!("{err}"),
            path: path.display().to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub fn walk(root: &Path, err: walkdir::Error) -> FlowboxError {
        let path = err
            .path()
            .unwrap_or(root)
            .display()
            .to_string();
        FlowboxError::Filesystem {
            message: format!("Failed to traverse directory: {err}"),
            path,
            source: Some(Box::new(err)),
        }
    }

    pub fn json(err: SerdeError) -> FlowboxError {
        FlowboxError::Network {
            message: format!("Unexpected response body from Dropbox: {err}"),
            url: None,
            source: Some(Box::new(err)),
        }
    }

    pub fn http(err: ReqwestError) -> FlowboxError {
        FlowboxError::Network {
            message: format!("Request to Dropbox failed: {err}"),
            url: err.url().map(|u| u.to_string()),
            source: Some(Box::new(err)),
        }
    }

    pub fn remote(endpoint: impl Into<String>, status: u16, summary: impl Into<String>) -> FlowboxError {
        FlowboxError::Remote {
            endpoint: endpoint.into(),
            status,
            summary: summary.into(),
        }
    }

    pub fn directory_not_found(path: &Path) -> FlowboxError {
        FlowboxError::Filesystem {
            message: format!("Directory not found: {}", path.display()),
            path: path.display().to_string(),
            source: None,
        }
    }

    pub fn invalid_path(field: &str, value: impl Into<String>, reason: impl Into<String>) -> FlowboxError {
        FlowboxError::Validation {
            message: reason.into(),
            field: Some(field.to_string()),
            value: Some(value.into()),
        }
    }

    pub fn empty_download(path: &Path) -> FlowboxError {
        Self::sync(
            SyncOperation::Verification,
            format!("No files were downloaded into {}", path.display()),
        )
    }

    pub fn upload_failed(reason: impl Into<String>) -> FlowboxError {
        Self::sync(SyncOperation::Upload, reason)
    }
}
