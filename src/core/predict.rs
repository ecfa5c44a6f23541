use crate::domain::model::{ForecastField, Prediction};
use crate::ml::ForecastModel;

/// Probability-weighted finishing position for each row.
pub fn expected_positions(probabilities: &[Vec<f64>], classes: &[u32]) -> Vec<f64> {
    probabilities
        .iter()
        .map(|row| {
            row.iter()
                .zip(classes)
                .map(|(p, &class)| p * class as f64)
                .sum()
        })
        .collect()
}

/// Ranks teams by expected position (lowest first) and keeps the first `table_size`.
pub fn rank_teams(teams: Vec<(String, f64)>, table_size: usize) -> Vec<Prediction> {
    let mut teams = teams;
    teams.sort_by(|(team_a, a), (team_b, b)| a.total_cmp(b).then_with(|| team_a.cmp(team_b)));

    teams
        .into_iter()
        .take(table_size)
        .enumerate()
        .map(|(index, (team, expected_position))| Prediction {
            predicted_rank: index as u32 + 1,
            team,
            expected_position,
        })
        .collect()
}

pub fn predict_league_table(
    model: &ForecastModel,
    field: &ForecastField,
    table_size: usize,
) -> Vec<Prediction> {
    let features: Vec<_> = field.entries.iter().map(|(_, f)| *f).collect();
    let probabilities = model.predict_proba(&features);
    let expected = expected_positions(&probabilities, model.classes());

    if field.entries.len() > table_size {
        tracing::warn!(
            "{} teams in the forecast field, keeping the best {}",
            field.entries.len(),
            table_size
        );
    }

    let teams = field
        .entries
        .iter()
        .map(|(team, _)| team.clone())
        .zip(expected)
        .collect();
    rank_teams(teams, table_size)
}

/// Console rendering, one line per team: `1. Arsenal (expected pos 2.35)`.
pub fn format_table(predictions: &[Prediction]) -> String {
    predictions
        .iter()
        .map(|p| {
            format!(
                "{}. {} (expected pos {:.2})",
                p.predicted_rank, p.team, p.expected_position
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
