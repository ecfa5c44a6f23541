pub mod backtest;
pub mod etl;
pub mod features;
pub mod pipeline;
pub mod predict;
pub mod results;
pub mod standings;

pub use crate::domain::model::{ForecastResult, LeagueTable, Prediction, SeasonMatches};
pub use crate::domain::ports::{ConfigProvider, ModelConfig, Pipeline, Storage};
pub use crate::utils::error::Result;
