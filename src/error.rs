//! Unified error handling for flowbox
//!
//! Every failure in the relay is fatal for the current run, so the error type
//! only has to classify the problem and render a message for the CI log.

use std::fmt;
use thiserror::Error;

pub type FlowboxResult<T> = Result<T, FlowboxError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum FlowboxError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        source: Option<BoxedSource>,
    },

    /// Authentication errors
    #[error("Authentication error: {message}")]
    Auth {
        message: String,
        provider: String,
        source: Option<BoxedSource>,
    },

    /// Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        url: Option<String>,
        source: Option<BoxedSource>,
    },

    /// Dropbox answered with a non-success status
    #[error("Remote API error ({endpoint}, HTTP {status}): {summary}")]
    Remote {
        endpoint: String,
        status: u16,
        summary: String,
    },

    /// Filesystem errors
    #[error("Filesystem error: {message} (path: {path})")]
    Filesystem {
        message: String,
        path: String,
        source: Option<BoxedSource>,
    },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        value: Option<String>,
    },

    /// Synchronization errors
    #[error("Sync error ({operation}): {message}")]
    Sync {
        message: String,
        operation: SyncOperation,
        source: Option<BoxedSource>,
    },
}

/// High-level sync operation categories used for user messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOperation {
    TokenRefresh,
    Listing,
    Cleanup,
    Download,
    Upload,
    Verification,
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SyncOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOperation::TokenRefresh => "token_refresh",
            SyncOperation::Listing => "listing",
            SyncOperation::Cleanup => "cleanup",
            SyncOperation::Download => "download",
            SyncOperation::Upload => "upload",
            SyncOperation::Verification => "verification",
        }
    }
}

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Config,
    Auth,
    Network,
    Remote,
    Filesystem,
    Validation,
    Sync,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Config => "config",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Network => "network",
            ErrorCategory::Remote => "remote",
            ErrorCategory::Filesystem => "filesystem",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Sync => "sync",
        };
        f.write_str(name)
    }
}

impl FlowboxError {
    /// Get error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            FlowboxError::Config { .. } => ErrorCategory::Config,
            FlowboxError::Auth { .. } => ErrorCategory::Auth,
            FlowboxError::Network { .. } => ErrorCategory::Network,
            FlowboxError::Remote { .. } => ErrorCategory::Remote,
            FlowboxError::Filesystem { .. } => ErrorCategory::Filesystem,
            FlowboxError::Validation { .. } => ErrorCategory::Validation,
            FlowboxError::Sync { .. } => ErrorCategory::Sync,
        }
    }

    /// Returns the sync operation associated with the error, if any.
    pub fn sync_operation(&self) -> Option<SyncOperation> {
        if let FlowboxError::Sync { operation, .. } = self {
            Some(*operation)
        } else {
            None
        }
    }

    /// True when Dropbox reported that the requested path does not exist.
    pub fn is_remote_not_found(&self) -> bool {
        matches!(
            self,
            FlowboxError::Remote { status: 409, summary, .. } if summary.contains("not_found")
        )
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            FlowboxError::Config { message, .. } => {
                format!("Configuration problem: {}", message)
            }
            FlowboxError::Auth {
                message, provider, ..
            } => {
                format!("Authentication with {} failed: {}", provider, message)
            }
            FlowboxError::Network { message, .. } => {
                format!("Network issue: {}", message)
            }
            FlowboxError::Remote {
                endpoint, summary, ..
            } => {
                format!("Dropbox rejected {}: {}", endpoint, summary)
            }
            FlowboxError::Filesystem { message, .. } => {
                format!("File system problem: {}", message)
            }
            FlowboxError::Validation { message, .. } => {
                format!("Input validation failed: {}", message)
            }
            FlowboxError::Sync {
                message, operation, ..
            } => match operation {
                SyncOperation::TokenRefresh => {
                    format!("Could not obtain a Dropbox access token: {}", message)
                }
                SyncOperation::Listing => format!("Listing failed: {}", message),
                SyncOperation::Cleanup => format!("Cleanup failed: {}", message),
                SyncOperation::Download => format!("Download failed: {}", message),
                SyncOperation::Upload => format!("Upload failed: {}", message),
                SyncOperation::Verification => {
                    format!(
                        "{}. Check the Dropbox credentials and the remote folder path",
                        message
                    )
                }
            },
        }
    }
}
