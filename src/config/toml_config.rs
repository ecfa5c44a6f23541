use crate::config::validate_model;
use crate::core::{ConfigProvider, ModelConfig};
use crate::utils::error::{ForecastError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub forecast: ForecastSection,
    pub data: DataConfig,
    pub model: Option<ModelSection>,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSection {
    pub name: String,
    pub description: Option<String>,
    pub table_size: Option<usize>,
    pub backtest: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub seasons: Vec<String>,
    #[serde(default)]
    pub promoted: Vec<String>,
    #[serde(default)]
    pub relegated: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSection {
    pub n_estimators: Option<usize>,
    pub max_depth: Option<usize>,
    pub min_samples_split: Option<usize>,
    pub random_state: Option<u64>,
    pub class_weight: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub output_path: String,
    pub bundle_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

const DEFAULT_BUNDLE: &str = "forecast_output.zip";
const DEFAULT_TABLE_SIZE: usize = 20;

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ForecastError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ForecastError::ConfigError {
            message: format!("bad substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("forecast.name", &self.forecast.name)?;
        validation::validate_season_sources("data.seasons", &self.data.seasons)?;
        validation::validate_team_names("data.promoted", &self.data.promoted)?;
        validation::validate_team_names("data.relegated", &self.data.relegated)?;
        validation::validate_promotion_lists(&self.data.promoted, &self.data.relegated)?;
        validation::validate_path("output.output_path", &self.output.output_path)?;
        validation::validate_file_extensions(
            "output.bundle_name",
            self.output.bundle_name.as_slice(),
            &["zip"],
        )?;
        validation::validate_positive_number("forecast.table_size", self.table_size(), 2)?;

        if let Some(weight) = self.model.as_ref().and_then(|m| m.class_weight.as_deref()) {
            let valid = ["balanced", "none"];
            if !valid.contains(&weight) {
                return Err(ForecastError::InvalidConfigValueError {
                    field: "model.class_weight".to_string(),
                    value: weight.to_string(),
                    reason: format!(
                        "Unsupported class weight. Valid values: {}",
                        valid.join(", ")
                    ),
                });
            }
        }

        validate_model(&self.model_config())
    }

    pub fn model_config(&self) -> ModelConfig {
        let defaults = ModelConfig::default();
        match &self.model {
            None => defaults,
            Some(m) => ModelConfig {
                n_estimators: m.n_estimators.unwrap_or(defaults.n_estimators),
                max_depth: m.max_depth.unwrap_or(defaults.max_depth),
                min_samples_split: m.min_samples_split.unwrap_or(defaults.min_samples_split),
                random_state: m.random_state.unwrap_or(defaults.random_state),
                balanced_class_weight: m
                    .class_weight
                    .as_deref()
                    .map_or(defaults.balanced_class_weight, |w| w == "balanced"),
            },
        }
    }

    pub fn table_size(&self) -> usize {
        self.forecast.table_size.unwrap_or(DEFAULT_TABLE_SIZE)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn seasons(&self) -> &[String] {
        &self.data.seasons
    }

    fn promoted(&self) -> &[String] {
        &self.data.promoted
    }

    fn relegated(&self) -> &[String] {
        &self.data.relegated
    }

    fn output_path(&self) -> &str {
        &self.output.output_path
    }

    fn bundle_name(&self) -> &str {
        self.output.bundle_name.as_deref().unwrap_or(DEFAULT_BUNDLE)
    }

    fn table_size(&self) -> usize {
        TomlConfig::table_size(self)
    }

    fn backtest(&self) -> bool {
        self.forecast.backtest.unwrap_or(false)
    }

    fn model(&self) -> ModelConfig {
        self.model_config()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
