use flowbox::commands::{self, Cli};
use flowbox::utils::logger::init_logger;
use std::process::ExitCode;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_command();

    // 初始化日志系统
    if let Err(err) = init_logger(cli.global.log_level.as_deref(), cli.global.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {err}");
        return ExitCode::from(1);
    }

    match commands::execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(category = %err.category(), "{}", err);
            eprintln!("❌ {}", err.user_message());
            ExitCode::from(1)
        }
    }
}
