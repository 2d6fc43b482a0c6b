pub mod allow_list;
pub mod cleanup;
pub mod download;
pub mod dropbox_service;
pub mod error;
pub mod local_tree;
pub mod oauth_client;
pub mod remote_path;
pub mod remote_store;
pub mod sync_command;
pub mod sync_config;
pub mod upload;

pub use allow_list::AllowList;
pub use dropbox_service::DropboxService;
pub use oauth_client::{Credentials, OAuthClient};
pub use remote_path::RemotePath;
pub use remote_store::{EntryKind, RemoteEntry, RemoteStore};
pub use sync_command::SyncCommand;
pub use sync_config::{Endpoints, SyncSettings};
