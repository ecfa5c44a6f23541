pub mod cli;
pub mod toml_config;

use crate::core::ModelConfig;
use crate::utils::error::Result;
use crate::utils::validation;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "league-forecast")]
#[command(about = "Forecast the next league table from past season results")]
pub struct CliConfig {
    /// Season result files or URLs, oldest first
    #[arg(long, value_delimiter = ',', required = true)]
    pub seasons: Vec<String>,

    /// Teams promoted into the forecast season
    #[arg(long, value_delimiter = ',')]
    pub promoted: Vec<String>,

    /// Teams of the last season that will not take part
    #[arg(long, value_delimiter = ',')]
    pub relegated: Vec<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "forecast_output.zip")]
    pub bundle_name: String,

    /// Number of clubs in the forecast table
    #[arg(long, default_value = "20")]
    pub table_size: usize,

    #[arg(long, default_value = "100")]
    pub n_estimators: usize,

    #[arg(long, default_value = "8")]
    pub max_depth: usize,

    #[arg(long, default_value = "2")]
    pub min_samples_split: usize,

    #[arg(long, default_value = "42")]
    pub random_state: u64,

    /// Weight every position equally instead of balancing class frequencies
    #[arg(long)]
    pub unweighted: bool,

    /// Also score the model on the last observed season
    #[arg(long)]
    pub backtest: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage between phases")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
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
        &self.output_path
    }

    fn bundle_name(&self) -> &str {
        &self.bundle_name
    }

    fn table_size(&self) -> usize {
        self.table_size
    }

    fn backtest(&self) -> bool {
        self.backtest
    }

    fn model(&self) -> ModelConfig {
        ModelConfig {
            n_estimators: self.n_estimators,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            random_state: self.random_state,
            balanced_class_weight: !self.unweighted,
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_season_sources("seasons", &self.seasons)?;
        validation::validate_team_names("promoted", &self.promoted)?;
        validation::validate_team_names("relegated", &self.relegated)?;
        validation::validate_promotion_lists(&self.promoted, &self.relegated)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_file_extensions(
            "bundle_name",
            std::slice::from_ref(&self.bundle_name),
            &["zip"],
        )?;
        validation::validate_positive_number("table_size", self.table_size, 2)?;
        validate_model(&self.model())
    }
}

/// Shared by the CLI and TOML front ends.
pub fn validate_model(model: &ModelConfig) -> Result<()> {
    validation::validate_positive_number("n_estimators", model.n_estimators, 1)?;
    validation::validate_range("max_depth", model.max_depth, 1, 64)?;
    validation::validate_positive_number("min_samples_split", model.min_samples_split, 2)?;
    Ok(())
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["league-forecast"];
        argv.extend_from_slice(args);
        CliConfig::parse_from(argv)
    }

    #[test]
    fn test_defaults_follow_reference_model() {
        let config = parse(&["--seasons", "a.csv,b.csv"]);
        assert_eq!(config.seasons, vec!["a.csv", "b.csv"]);
        assert_eq!(config.table_size, 20);
        assert_eq!(config.model(), ModelConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_promoted_list_and_overrides() {
        let config = parse(&[
            "--seasons",
            "a.csv,b.csv,c.csv",
            "--promoted",
            "Leeds United,Burnley,Sunderland",
            "--n-estimators",
            "10",
            "--unweighted",
        ]);
        assert_eq!(config.promoted.len(), 3);
        assert_eq!(config.promoted[0], "Leeds United");
        assert_eq!(config.model().n_estimators, 10);
        assert!(!config.model().balanced_class_weight);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let single = parse(&["--seasons", "a.csv"]);
        assert!(single.validate().is_err());

        let zero_trees = parse(&["--seasons", "a.csv,b.csv", "--n-estimators", "0"]);
        assert!(zero_trees.validate().is_err());

        let bad_bundle = parse(&["--seasons", "a.csv,b.csv", "--bundle-name", "out.tar"]);
        assert!(bad_bundle.validate().is_err());

        let both_ways = parse(&[
            "--seasons",
            "a.csv,b.csv",
            "--promoted",
            "Burnley",
            "--relegated",
            "Burnley",
        ]);
        assert!(both_ways.validate().is_err());
    }
}
