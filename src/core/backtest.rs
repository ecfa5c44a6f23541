use crate::core::features::{forecast_field, prepare_training_data};
use crate::core::predict::predict_league_table;
use crate::domain::model::{BacktestReport, LeagueTable};
use crate::domain::ports::ModelConfig;
use crate::ml::ForecastModel;
use crate::utils::error::Result;

/// Holds out the last observed season: trains on the earlier transitions and
/// forecasts the final table from the one before it.
///
/// Needs at least three seasons; returns `Ok(None)` otherwise.
pub fn backtest_last_season(
    tables: &[LeagueTable],
    config: &ModelConfig,
) -> Result<Option<BacktestReport>> {
    if tables.len() < 3 {
        tracing::warn!(
            "Backtest skipped: needs three seasons, got {}",
            tables.len()
        );
        return Ok(None);
    }

    let (history, held_out) = tables.split_at(tables.len() - 1);
    let actual = &held_out[0];
    let previous = &history[history.len() - 1];

    let training = prepare_training_data(history)?;
    let model = ForecastModel::fit(&training, config)?;

    // the actual membership of the held-out season is known
    let promoted: Vec<String> = actual
        .rows
        .iter()
        .filter(|row| !previous.contains(&row.team))
        .map(|row| row.team.clone())
        .collect();
    let relegated: Vec<String> = previous
        .rows
        .iter()
        .filter(|row| !actual.contains(&row.team))
        .map(|row| row.team.clone())
        .collect();

    let field = forecast_field(previous, &promoted, &relegated)?;
    let predictions = predict_league_table(&model, &field, actual.len());

    let mut total_error = 0.0;
    let mut exact_hits = 0;
    for prediction in &predictions {
        if let Some(row) = actual.get(&prediction.team) {
            total_error += (prediction.predicted_rank as f64 - row.position as f64).abs();
            if prediction.predicted_rank == row.position {
                exact_hits += 1;
            }
        }
    }

    let report = BacktestReport {
        season: actual.season.clone(),
        teams: predictions.len(),
        mean_absolute_error: total_error / predictions.len().max(1) as f64,
        exact_hits,
        training_rows: training.len(),
    };

    tracing::info!(
        "Backtest on {}: mean absolute rank error {:.2}, {} exact positions",
        report.season,
        report.mean_absolute_error,
        report.exact_hits
    );

    Ok(Some(report))
}

/// One-line summary printed by both binaries.
pub fn format_backtest(report: &BacktestReport) -> String {
    format!(
        "Backtest {}: mean rank error {:.2}, {}/{} exact",
        report.season, report.mean_absolute_error, report.exact_hits, report.teams
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TeamRecord;

    fn table(season: &str, order: &[&str]) -> LeagueTable {
        let rows = order
            .iter()
            .enumerate()
            .map(|(index, team)| {
                let strength = (order.len() - index) as u32;
                TeamRecord {
                    team: team.to_string(),
                    points: strength * 10,
                    wins: strength * 3,
                    draws: strength,
                    losses: 10 - strength,
                    goals_for: strength * 12,
                    goals_against: 40 - strength * 4,
                    goal_diff: (strength * 16) as i64 - 40,
                    position: index as u32 + 1,
                }
            })
            .collect();
        LeagueTable {
            season: season.to_string(),
            rows,
        }
    }

    fn config() -> ModelConfig {
        ModelConfig {
            n_estimators: 20,
            ..ModelConfig::default()
        }
    }

    #[test]
    fn test_backtest_needs_three_seasons() {
        let tables = vec![table("1", &["A", "B"]), table("2", &["B", "A"])];
        assert!(backtest_last_season(&tables, &config()).unwrap().is_none());
    }

    #[test]
    fn test_backtest_scores_held_out_season() {
        let tables = vec![
            table("2019", &["A", "B", "C", "D"]),
            table("2020", &["A", "B", "C", "E"]),
            table("2021", &["A", "B", "C", "D"]),
            table("2022", &["A", "B", "C", "F"]),
        ];
        let report = backtest_last_season(&tables, &config()).unwrap().unwrap();
        assert_eq!(report.season, "2022");
        assert_eq!(report.teams, 4);
        // 2019->2020 and 2020->2021 only
        assert_eq!(report.training_rows, 8);
    }

    #[test]
    fn test_backtest_of_repeated_order_is_exact() {
        let order = ["A", "B", "C", "D"];
        let tables = vec![
            table("2019", &order),
            table("2020", &order),
            table("2021", &order),
            table("2022", &order),
        ];
        let report = backtest_last_season(&tables, &config()).unwrap().unwrap();
        assert_eq!(report.training_rows, 8);
        assert_eq!(report.exact_hits, 4);
        assert_eq!(report.mean_absolute_error, 0.0);
        assert_eq!(format_backtest(&report), "Backtest 2022: mean rank error 0.00, 4/4 exact");
    }
}
