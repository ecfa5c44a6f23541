//! Position classifier: standardisation followed by a random forest.

pub mod forest;
pub mod scaler;
pub mod tree;

pub use forest::RandomForestClassifier;
pub use scaler::StandardScaler;

use crate::domain::model::{FeatureVector, TrainingSet};
use crate::domain::ports::ModelConfig;
use crate::utils::error::{ForecastError, Result};

#[derive(Debug, Clone)]
pub struct ForecastModel {
    scaler: StandardScaler,
    forest: RandomForestClassifier,
}

fn to_rows(features: &[FeatureVector]) -> Vec<Vec<f64>> {
    features.iter().map(|f| f.as_slice().to_vec()).collect()
}

impl ForecastModel {
    pub fn fit(training: &TrainingSet, config: &ModelConfig) -> Result<Self> {
        let rows = to_rows(&training.features);
        let scaler = StandardScaler::fit(&rows).ok_or_else(|| ForecastError::ModelError {
            message: "cannot fit on an empty training set".to_string(),
        })?;
        let scaled = scaler.transform(&rows);
        let forest = RandomForestClassifier::fit(&scaled, &training.targets, config)?;

        tracing::info!(
            "Trained {} trees on {} rows ({} distinct positions)",
            forest.n_estimators(),
            training.len(),
            forest.classes().len()
        );

        Ok(Self { scaler, forest })
    }

    pub fn classes(&self) -> &[u32] {
        self.forest.classes()
    }

    pub fn predict_proba(&self, features: &[FeatureVector]) -> Vec<Vec<f64>> {
        let scaled = self.scaler.transform(&to_rows(features));
        self.forest.predict_proba(&scaled)
    }
}
