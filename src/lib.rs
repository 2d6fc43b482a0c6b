//! Flowbox Library
//!
//! Relays simulation input/output files between scheduled CI jobs and Dropbox:
//! allow-list cleanup of a remote folder, recursive download, and upload of a
//! results directory.

pub mod commands;
pub mod config;
pub mod error;
pub mod sync;
pub mod utils;

// Re-export commonly used types for convenience
pub use error::{ErrorCategory, FlowboxError, FlowboxResult, SyncOperation};
pub use sync::{
    AllowList, Credentials, DropboxService, RemoteEntry, RemotePath, RemoteStore, SyncCommand,
    SyncSettings,
};
