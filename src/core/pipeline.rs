use crate::core::backtest::backtest_last_season;
use crate::core::features::{forecast_field, prepare_training_data};
use crate::core::predict::predict_league_table;
use crate::core::results::{parse_match_results, season_label};
use crate::core::standings::summarise_season;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{ForecastResult, LeagueTable, Prediction, SeasonMatches};
use crate::ml::ForecastModel;
use crate::utils::error::{ForecastError, Result};
use crate::utils::validation::is_remote_source;
use reqwest::Client;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const PREDICTIONS_CSV: &str = "predictions.csv";
pub const PREDICTIONS_TSV: &str = "predictions.tsv";
pub const FORECAST_JSON: &str = "forecast.json";

/// Reads season results, trains the position model and writes the forecast bundle.
pub struct ForecastPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> ForecastPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    async fn fetch(&self, source: &str) -> Result<Vec<u8>> {
        if is_remote_source(source) {
            tracing::debug!("Downloading season from: {}", source);
            let response = self.client.get(source).send().await?;
            let status = response.status();
            tracing::debug!("Season response status: {}", status);
            if !status.is_success() {
                return Err(ForecastError::HttpStatus {
                    source_ref: source.to_string(),
                    status: status.as_u16(),
                });
            }
            Ok(response.bytes().await?.to_vec())
        } else {
            tracing::debug!("Reading season file: {}", source);
            Ok(tokio::fs::read(source).await?)
        }
    }
}

/// Runs forest training on tokio's blocking pool.
async fn run_blocking<T, F>(job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| ForecastError::ModelError {
            message: format!("training task did not complete: {}", e),
        })?
}

fn delimited(predictions: &[Prediction], delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    for prediction in predictions {
        writer.serialize(prediction)?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| ForecastError::ProcessingError {
            message: format!("failed to finish predictions table: {}", e),
        })
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ForecastPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<SeasonMatches>> {
        let mut seasons = Vec::with_capacity(self.config.seasons().len());
        for source in self.config.seasons() {
            let data = self.fetch(source).await?;
            let season = parse_match_results(&season_label(source), &data)?;
            tracing::info!("📥 {}: {} matches", season.label, season.matches.len());
            seasons.push(season);
        }
        Ok(seasons)
    }

    async fn transform(&self, seasons: Vec<SeasonMatches>) -> Result<ForecastResult> {
        let tables: Vec<LeagueTable> = seasons.iter().map(summarise_season).collect();
        for table in &tables {
            if let Some(champion) = table.rows.first() {
                tracing::debug!(
                    "{}: {} teams, champion {} ({} pts)",
                    table.season,
                    table.len(),
                    champion.team,
                    champion.points
                );
            }
        }

        let model_config = self.config.model();
        let training = prepare_training_data(&tables)?;
        let training_rows = training.len();

        let fit_config = model_config.clone();
        let model = run_blocking(move || ForecastModel::fit(&training, &fit_config)).await?;

        // prepare_training_data guarantees at least two tables
        let last = &tables[tables.len() - 1];
        let field = forecast_field(last, self.config.promoted(), self.config.relegated())?;
        let predictions = predict_league_table(&model, &field, self.config.table_size());

        let backtest = if self.config.backtest() {
            let history = tables.clone();
            run_blocking(move || backtest_last_season(&history, &model_config)).await?
        } else {
            None
        };

        Ok(ForecastResult {
            training_rows,
            tables,
            predictions,
            backtest,
            generated_at: chrono::Utc::now(),
        })
    }

    async fn load(&self, result: &ForecastResult) -> Result<String> {
        let bundle = self.config.bundle_name();
        let output_path = format!("{}/{}", self.config.output_path(), bundle);

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>(PREDICTIONS_CSV, FileOptions::default())?;
            zip.write_all(&delimited(&result.predictions, b',')?)?;

            zip.start_file::<_, ()>(PREDICTIONS_TSV, FileOptions::default())?;
            zip.write_all(&delimited(&result.predictions, b'\t')?)?;

            zip.start_file::<_, ()>(FORECAST_JSON, FileOptions::default())?;
            zip.write_all(serde_json::to_string_pretty(result)?.as_bytes())?;

            zip.finish()?.into_inner()
        };

        tracing::debug!("Writing forecast bundle ({} bytes) to storage", zip_data.len());
        self.storage.write_file(bundle, &zip_data).await?;

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TrainingSet;
    use crate::domain::ports::ModelConfig;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        seasons: Vec<String>,
        promoted: Vec<String>,
        relegated: Vec<String>,
        backtest: bool,
    }

    impl ConfigProvider for MockConfig {
        fn seasons(&self) -> &[String] {
            &self.seasons
        }

        fn promoted(&self) -> &[String] {
            &self.promoted
        }

        fn relegated(&self) -> &[String] {
            &self.relegated
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn bundle_name(&self) -> &str {
            "forecast_output.zip"
        }

        fn table_size(&self) -> usize {
            4
        }

        fn backtest(&self) -> bool {
            self.backtest
        }

        fn model(&self) -> ModelConfig {
            ModelConfig {
                n_estimators: 15,
                ..ModelConfig::default()
            }
        }
    }

    /// Double round robin where earlier teams in `order` beat later ones.
    fn season_csv(order: &[&str]) -> String {
        let mut csv = String::from("Round,Date,Team 1,FT,Team 2\n");
        for (i, home) in order.iter().enumerate() {
            for (j, away) in order.iter().enumerate() {
                if i == j {
                    continue;
                }
                let score = if i < j { "2-0" } else { "0-1" };
                csv.push_str(&format!("1,2020-08-01,{},{},{}\n", home, score, away));
            }
        }
        csv
    }

    fn write_seasons(dir: &std::path::Path, seasons: &[(&str, Vec<&str>)]) -> Vec<String> {
        seasons
            .iter()
            .map(|(name, order)| {
                let path = dir.join(format!("{}.csv", name));
                std::fs::write(&path, season_csv(order)).unwrap();
                path.to_str().unwrap().to_string()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_extract_reads_local_seasons() {
        let dir = tempfile::tempdir().unwrap();
        let seasons = write_seasons(
            dir.path(),
            &[
                ("eng1_2019-20", vec!["A", "B", "C"]),
                ("eng1_2020-21", vec!["B", "A", "C"]),
            ],
        );
        let pipeline = ForecastPipeline::new(
            MockStorage::new(),
            MockConfig {
                seasons,
                promoted: vec![],
                relegated: vec![],
                backtest: false,
            },
        );

        let extracted = pipeline.extract().await.unwrap();
        assert_eq!(extracted.len(), 2);
        assert_eq!(extracted[0].label, "eng1_2019-20");
        assert_eq!(extracted[1].matches.len(), 6);
    }

    #[tokio::test]
    async fn test_extract_missing_file_is_io_error() {
        let pipeline = ForecastPipeline::new(
            MockStorage::new(),
            MockConfig {
                seasons: vec![
                    "/nonexistent/a.csv".to_string(),
                    "/nonexistent/b.csv".to_string(),
                ],
                promoted: vec![],
                relegated: vec![],
                backtest: false,
            },
        );
        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, ForecastError::IoError(_)));
    }

    #[tokio::test]
    async fn test_transform_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let seasons = write_seasons(
            dir.path(),
            &[
                ("s1", vec!["A", "B", "C", "D"]),
                ("s2", vec!["A", "C", "B", "E"]),
                ("s3", vec!["A", "B", "C", "D"]),
            ],
        );
        let storage = MockStorage::new();
        let pipeline = ForecastPipeline::new(
            storage.clone(),
            MockConfig {
                seasons,
                promoted: vec!["F".to_string()],
                relegated: vec!["D".to_string()],
                backtest: true,
            },
        );

        let extracted = pipeline.extract().await.unwrap();
        let result = pipeline.transform(extracted).await.unwrap();

        assert_eq!(result.tables.len(), 3);
        assert_eq!(result.tables[0].rows[0].team, "A");
        assert_eq!(result.tables[0].rows[0].points, 18);
        assert_eq!(result.training_rows, 8);
        assert_eq!(result.predictions.len(), 4);
        let teams: Vec<&str> = result.predictions.iter().map(|p| p.team.as_str()).collect();
        assert!(teams.contains(&"F"));
        assert!(!teams.contains(&"D"));
        assert!(result.backtest.is_some());

        let output_path = pipeline.load(&result).await.unwrap();
        assert_eq!(output_path, "test_output/forecast_output.zip");

        let data = storage.get_file("forecast_output.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();
        let mut csv_content = String::new();
        std::io::Read::read_to_string(
            &mut archive.by_name(PREDICTIONS_CSV).unwrap(),
            &mut csv_content,
        )
        .unwrap();
        assert!(csv_content.starts_with("predicted_rank,team,expected_position"));
        assert_eq!(csv_content.lines().count(), 5);
        assert!(archive.by_name(PREDICTIONS_TSV).is_ok());
        assert!(archive.by_name(FORECAST_JSON).is_ok());
    }

    #[tokio::test]
    async fn test_blocking_training_reports_errors() {
        let empty = TrainingSet::default();
        let config = ModelConfig::default();
        let fitted = run_blocking(move || ForecastModel::fit(&empty, &config)).await;
        assert!(matches!(fitted, Err(ForecastError::ModelError { .. })));

        let panicked = run_blocking(|| -> Result<()> { panic!("worker died") }).await;
        match panicked {
            Err(ForecastError::ModelError { message }) => {
                assert!(message.contains("did not complete"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
