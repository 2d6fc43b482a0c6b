pub mod config_paths;
pub mod logger;
