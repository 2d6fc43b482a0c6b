//! CLI 命令行参数解析
//!
//! 使用 clap 定义命令行接口。Credentials come from flags or from the
//! `APP_KEY` / `APP_SECRET` / `REFRESH_TOKEN` environment of the CI job.

use crate::config::{APP_KEY_ENV, APP_SECRET_ENV, CONFIG_ENV, LOG_FILE_ENV, REFRESH_TOKEN_ENV};
use crate::sync::Credentials;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Dropbox app credentials
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CredentialArgs {
    /// Long-lived OAuth refresh token
    #[arg(long, env = REFRESH_TOKEN_ENV, hide_env_values = true)]
    pub refresh_token: String,
    /// Dropbox app key (OAuth client id)
    #[arg(long, env = APP_KEY_ENV, hide_env_values = true)]
    pub app_key: String,
    /// Dropbox app secret (OAuth client secret)
    #[arg(long, env = APP_SECRET_ENV, hide_env_values = true)]
    pub app_secret: String,
}

impl From<&CredentialArgs> for Credentials {
    fn from(args: &CredentialArgs) -> Self {
        Credentials::new(
            args.app_key.clone(),
            args.app_secret.clone(),
            args.refresh_token.clone(),
        )
    }
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Settings file (TOML)
    #[arg(long, global = true, env = CONFIG_ENV, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Append log output to this file
    #[arg(long, global = true, env = LOG_FILE_ENV, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
    /// Log filter, e.g. `info` or `flowbox=debug` (defaults to RUST_LOG)
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,
}

const LEGACY_ARGUMENTS_HELP: &str = "\
Scripts that passed `<refresh-token> <app-key> <app-secret> <log-file>` as positional
arguments should use --refresh-token, --app-key, --app-secret and --log-file instead,
or set REFRESH_TOKEN, APP_KEY, APP_SECRET and FLOWBOX_LOG_FILE in the job environment.";

/// Flowbox - move simulation inputs and results between CI and Dropbox
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flowbox",
    about = "Relay simulation input/output files between CI jobs and Dropbox",
    version,
    disable_help_subcommand = true,
    after_help = LEGACY_ARGUMENTS_HELP
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Delete everything in a Dropbox folder except allow-listed files
    Delete {
        /// Dropbox folder to clean up
        #[arg(value_name = "REMOTE_FOLDER")]
        remote_folder: String,
        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Download a Dropbox folder recursively
    Download {
        #[arg(value_name = "REMOTE_FOLDER")]
        remote_folder: String,
        /// Local destination (relative paths resolve against GITHUB_WORKSPACE)
        #[arg(value_name = "LOCAL_FOLDER")]
        local_folder: PathBuf,
        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Clean up a Dropbox folder, then download what is left
    Fetch {
        #[arg(value_name = "REMOTE_FOLDER")]
        remote_folder: String,
        #[arg(value_name = "LOCAL_FOLDER")]
        local_folder: PathBuf,
        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Upload one file or one directory
    Upload {
        /// File or directory to upload
        #[arg(value_name = "LOCAL_PATH")]
        local_path: PathBuf,
        /// Destination file path, or folder when it ends with '/'
        #[arg(value_name = "REMOTE_PATH")]
        remote_path: String,
        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Upload the files of a results directory plus its VTK subdirectory
    Publish {
        #[arg(value_name = "LOCAL_DIR")]
        local_dir: PathBuf,
        #[arg(value_name = "REMOTE_FOLDER")]
        remote_folder: String,
        /// Subdirectory uploaded recursively (defaults to the configured one)
        #[arg(long, value_name = "NAME")]
        subdir: Option<String>,
        /// Only upload the top-level files
        #[arg(long, conflicts_with = "subdir")]
        no_subdir: bool,
        #[command(flatten)]
        credentials: CredentialArgs,
    },
}

impl Commands {
    pub fn credentials(&self) -> &CredentialArgs {
        match self {
            Commands::Delete { credentials, .. }
            | Commands::Download { credentials, .. }
            | Commands::Fetch { credentials, .. }
            | Commands::Upload { credentials, .. }
            | Commands::Publish { credentials, .. } => credentials,
        }
    }
}

impl Cli {
    /// 解析命令行参数（失败时由 clap 处理错误输出和退出）
    pub fn parse_command() -> Cli {
        Self::parse_command_from(std::env::args_os())
    }

    /// 尝试解析命令行参数（用于测试或自定义 argv）
    pub fn try_parse_command_from<I, T>(iter: I) -> Result<Cli, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Cli::try_parse_from(iter)
    }

    pub fn parse_command_from<I, T>(iter: I) -> Cli
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_command_from(iter) {
            Ok(cli) => cli,
            Err(err) => err.exit(),
        }
    }
}
