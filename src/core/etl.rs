use crate::core::Pipeline;
use crate::domain::model::ForecastResult;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Outcome of a full run: where the bundle went and what it contains.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub output_path: String,
    pub result: ForecastResult,
}

pub struct ForecastEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ForecastEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<ForecastRun> {
        tracing::info!("Starting forecast run...");
        self.monitor.log_stats("Start");

        tracing::info!("Reading season results...");
        let seasons = self.pipeline.extract().await?;
        let matches: usize = seasons.iter().map(|s| s.matches.len()).sum();
        tracing::info!("Read {} seasons ({} matches)", seasons.len(), matches);
        self.monitor.log_stats("Extract");

        tracing::info!("Building tables and training model...");
        let result = self.pipeline.transform(seasons).await?;
        tracing::info!(
            "Forecast {} teams from {} training rows",
            result.predictions.len(),
            result.training_rows
        );
        self.monitor.log_stats("Transform");

        tracing::info!("Writing forecast bundle...");
        let output_path = self.pipeline.load(&result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(ForecastRun {
            output_path,
            result,
        })
    }
}
