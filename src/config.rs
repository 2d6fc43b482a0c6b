use std::time::Duration;

pub const DEFAULT_TOKEN_URL: &str = "https://api.dropbox.com/oauth2/token";
pub const DEFAULT_API_BASE: &str = "https://api.dropboxapi.com/2";
pub const DEFAULT_CONTENT_BASE: &str = "https://content.dropboxapi.com/2";

// Names ending with one of these survive the cleanup pass
pub const DEFAULT_PROTECTED_SUFFIXES: &[&str] = &[".step", "flow_data.json"];
pub const DEFAULT_UPLOAD_SUBDIR: &str = "VTK";

// files/upload rejects bodies above 150 MiB
pub const SINGLE_UPLOAD_LIMIT: u64 = 150 * 1024 * 1024;
pub const UPLOAD_CHUNK_SIZE: usize = 8 * 1024 * 1024;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
pub const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

pub const APP_KEY_ENV: &str = "APP_KEY";
pub const APP_SECRET_ENV: &str = "APP_SECRET";
pub const REFRESH_TOKEN_ENV: &str = "REFRESH_TOKEN";
pub const WORKSPACE_ENV: &str = "GITHUB_WORKSPACE";
pub const CONFIG_ENV: &str = "FLOWBOX_CONFIG";
pub const LOG_FILE_ENV: &str = "FLOWBOX_LOG_FILE";

pub const CONFIG_DIRECTORY: &str = "flowbox";
pub const CONFIG_FILE_NAME: &str = "config.toml";
