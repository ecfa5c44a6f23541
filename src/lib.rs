pub mod config;
pub mod core;
pub mod domain;
pub mod ml;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use core::{
    etl::{ForecastEngine, ForecastRun},
    pipeline::ForecastPipeline,
};
pub use utils::error::{ForecastError, Result};
