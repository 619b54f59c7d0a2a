pub mod app_config;
pub mod columns;
pub mod config;
pub mod deals;
pub mod documents;
pub mod record;
pub mod tracked;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use columns::{load_columns, BoardLayout, ColumnConfig, ColumnsFile};
pub use config::{load_app_config, load_app_config_from_env};
pub use deals::{BoardItem, Column, Deal};
pub use documents::DocumentList;
pub use record::RecordError;
pub use tracked::TrackedProduct;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read columns file {path}: {source}")]
    ColumnsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse columns file: {0}")]
    ColumnsFileParse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}
