mod app_config;
mod catalog;
mod config;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use catalog::{
    CategoryRecord, PriceMap, ProductRecord, StockMap, SyncEntity, VariantRecord, WarehouseRecord,
};
pub use config::{load_app_config, load_app_config_from_env};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown sync entity: {0}")]
    UnknownEntity(String),
}
