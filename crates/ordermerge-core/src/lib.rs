pub mod app_config;
pub mod config;
pub mod orders;
pub mod snapshot;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env, log_level_from_env};
pub use orders::{Address, LineItem, OrderRecord, OrderTotals};
pub use snapshot::{SnapshotEntry, SnapshotTable};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
