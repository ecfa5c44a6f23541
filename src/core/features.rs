use crate::domain::model::{FeatureVector, ForecastField, LeagueTable, TrainingSet};
use crate::utils::error::{ForecastError, Result};

/// Teams coming up from the second tier have no top-flight record; they are
/// given the average of the bottom three of the previous table.
const PROMOTED_BASELINE_ROWS: usize = 3;

pub fn promoted_default(table: &LeagueTable) -> Result<FeatureVector> {
    let bottom: Vec<FeatureVector> = table
        .bottom(PROMOTED_BASELINE_ROWS)
        .iter()
        .map(|row| row.features())
        .collect();
    FeatureVector::mean(&bottom).ok_or_else(|| ForecastError::InsufficientData {
        message: format!("season {} has no teams", table.season),
    })
}

/// Rows for one season transition: every team of `curr`, described by its `prev` record.
pub fn transition_rows(prev: &LeagueTable, curr: &LeagueTable) -> Result<TrainingSet> {
    let default = promoted_default(prev)?;
    let mut set = TrainingSet::default();

    for row in &curr.rows {
        let features = match prev.get(&row.team) {
            Some(previous) => previous.features(),
            None => {
                tracing::debug!(
                    "{}: {} not in {}, using promoted baseline",
                    curr.season,
                    row.team,
                    prev.season
                );
                default
            }
        };
        set.features.push(features);
        set.targets.push(row.position);
    }

    Ok(set)
}

/// Training rows for every consecutive pair of seasons (input order is chronological).
pub fn prepare_training_data(tables: &[LeagueTable]) -> Result<TrainingSet> {
    ensure_usable(tables)?;

    let mut set = TrainingSet::default();
    for pair in tables.windows(2) {
        set.extend(transition_rows(&pair[0], &pair[1])?);
    }

    tracing::debug!(
        "Built {} training rows from {} season transitions",
        set.len(),
        tables.len() - 1
    );
    Ok(set)
}

/// The teams of the upcoming season: the last table minus `relegated`, plus any
/// `promoted` team not already in it.
pub fn forecast_field(
    last: &LeagueTable,
    promoted: &[String],
    relegated: &[String],
) -> Result<ForecastField> {
    let default = promoted_default(last)?;
    let mut field = ForecastField::default();

    for row in &last.rows {
        if relegated.iter().any(|team| team == &row.team) {
            continue;
        }
        field.entries.push((row.team.clone(), row.features()));
    }

    for team in promoted {
        if field.contains(team) {
            // still in the division; its own record is used
            continue;
        }
        field.entries.push((team.clone(), default));
    }

    for team in relegated {
        if !last.contains(team) {
            tracing::warn!("Relegated team {} is not in {}", team, last.season);
        }
    }

    Ok(field)
}

fn ensure_usable(tables: &[LeagueTable]) -> Result<()> {
    if tables.len() < 2 {
        return Err(ForecastError::InsufficientData {
            message: format!("need at least two seasons, got {}", tables.len()),
        });
    }
    if let Some(empty) = tables.iter().find(|t| t.is_empty()) {
        return Err(ForecastError::InsufficientData {
            message: format!("season {} has no played matches", empty.season),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TeamRecord;

    fn row(team: &str, points: u32, position: u32) -> TeamRecord {
        TeamRecord {
            team: team.to_string(),
            points,
            wins: points / 3,
            draws: points % 3,
            losses: 0,
            goals_for: points,
            goals_against: 10,
            goal_diff: points as i64 - 10,
            position,
        }
    }

    fn table(season: &str, rows: Vec<TeamRecord>) -> LeagueTable {
        LeagueTable {
            season: season.to_string(),
            rows,
        }
    }

    #[test]
    fn test_transition_uses_previous_record_and_promoted_default() {
        let prev = table(
            "2022",
            vec![
                row("A", 90, 1),
                row("B", 60, 2),
                row("C", 30, 3),
                row("D", 24, 4),
                row("E", 18, 5),
            ],
        );
        let curr = table(
            "2023",
            vec![row("B", 70, 1), row("New", 50, 2), row("A", 40, 3)],
        );

        let set = transition_rows(&prev, &curr).unwrap();
        assert_eq!(set.targets, vec![1, 2, 3]);
        assert_eq!(set.features[0].0[0], 60.0);
        assert_eq!(set.features[2].0[0], 90.0);
        // mean of C, D, E
        assert_eq!(set.features[1].0[0], 24.0);
        assert_eq!(set.features[1].0[6], 14.0);
    }

    #[test]
    fn test_prepare_training_data_requires_two_seasons() {
        let only = vec![table("2022", vec![row("A", 3, 1)])];
        assert!(matches!(
            prepare_training_data(&only),
            Err(ForecastError::InsufficientData { .. })
        ));

        let with_empty = vec![table("2022", vec![row("A", 3, 1)]), table("2023", vec![])];
        assert!(prepare_training_data(&with_empty).is_err());
    }

    #[test]
    fn test_prepare_training_data_concatenates_transitions() {
        let tables = vec![
            table("1", vec![row("A", 9, 1), row("B", 3, 2)]),
            table("2", vec![row("B", 9, 1), row("A", 3, 2)]),
            table("3", vec![row("A", 9, 1), row("C", 3, 2)]),
        ];
        let set = prepare_training_data(&tables).unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(set.targets, vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_forecast_field_swaps_relegated_for_promoted() {
        let last = table(
            "2024",
            vec![
                row("A", 90, 1),
                row("B", 60, 2),
                row("C", 30, 3),
                row("D", 24, 4),
                row("E", 18, 5),
            ],
        );
        let promoted = vec!["X".to_string(), "B".to_string()];
        let relegated = vec!["E".to_string()];

        let field = forecast_field(&last, &promoted, &relegated).unwrap();
        let teams: Vec<&str> = field.teams().collect();
        assert_eq!(teams, vec!["A", "B", "C", "D", "X"]);
        // X gets the bottom-three baseline of the full last table
        assert_eq!(field.entries[4].1 .0[0], 24.0);
    }

    #[test]
    fn test_forecast_field_keeps_relegated_team_that_is_promoted_back() {
        let last = table(
            "2024",
            vec![row("A", 90, 1), row("B", 60, 2), row("C", 30, 3), row("D", 24, 4)],
        );
        let both = vec!["D".to_string()];

        let field = forecast_field(&last, &both, &both).unwrap();
        let teams: Vec<&str> = field.teams().collect();
        assert_eq!(teams, vec!["A", "B", "C", "D"]);
        // mean of B, C, D rather than D's own record
        assert_eq!(field.entries[3].1 .0[0], 38.0);
    }
}
