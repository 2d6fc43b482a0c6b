//! CLI 命令处理模块
//!
//! 处理所有命令行接口的解析和路由

pub mod parser;

// Re-exports (used by main.rs)
pub use parser::*;

use crate::error::FlowboxResult;
use crate::sync::{Credentials, RemotePath, SyncCommand, SyncSettings};
use crate::utils::config_paths::resolve_local_path;
use tracing::info;

/// Run one parsed command to completion.
pub async fn execute(cli: Cli) -> FlowboxResult<()> {
    let settings = SyncSettings::load_or_default(cli.global.config.as_deref())?;
    let credentials = Credentials::from(cli.command.credentials());
    let upload_subdir = settings.upload_subdir.clone();
    let mut sync_cmd = SyncCommand::new(credentials, settings)?;

    match cli.command {
        Commands::Delete { remote_folder, .. } => {
            let remote = RemotePath::parse(&remote_folder)?;
            sync_cmd.execute_delete(&remote).await?;
        }
        Commands::Download {
            remote_folder,
            local_folder,
            ..
        } => {
            let remote = RemotePath::parse(&remote_folder)?;
            let local = resolve_local_path(&local_folder);
            sync_cmd.execute_download(&remote, &local).await?;
        }
        Commands::Fetch {
            remote_folder,
            local_folder,
            ..
        } => {
            let remote = RemotePath::parse(&remote_folder)?;
            let local = resolve_local_path(&local_folder);
            let report = sync_cmd.execute_fetch(&remote, &local).await?;
            info!(
                "Fetch finished: {} deleted, {} downloaded",
                report.plan.delete.len(),
                report.downloaded
            );
        }
        Commands::Upload {
            local_path,
            remote_path,
            ..
        } => {
            let local = resolve_local_path(&local_path);
            sync_cmd.execute_upload(&local, &remote_path).await?;
        }
        Commands::Publish {
            local_dir,
            remote_folder,
            subdir,
            no_subdir,
            ..
        } => {
            let remote = RemotePath::parse(&remote_folder)?;
            let local = resolve_local_path(&local_dir);
            let subdir = if no_subdir {
                None
            } else {
                Some(subdir.unwrap_or(upload_subdir))
            };
            sync_cmd
                .execute_publish(&local, &remote, subdir.as_deref())
                .await?;
        }
    }

    Ok(())
}
