use crate::domain::model::{ForecastResult, SeasonMatches};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Destination of the forecast bundle.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Model hyper-parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub random_state: u64,
    pub balanced_class_weight: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 8,
            min_samples_split: 2,
            random_state: 42,
            balanced_class_weight: true,
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    /// Season sources in chronological order.
    fn seasons(&self) -> &[String];
    fn promoted(&self) -> &[String];
    fn relegated(&self) -> &[String];
    fn output_path(&self) -> &str;
    fn bundle_name(&self) -> &str;
    fn table_size(&self) -> usize;
    fn backtest(&self) -> bool;
    fn model(&self) -> ModelConfig;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<SeasonMatches>>;
    async fn transform(&self, seasons: Vec<SeasonMatches>) -> Result<ForecastResult>;
    async fn load(&self, result: &ForecastResult) -> Result<String>;
}
