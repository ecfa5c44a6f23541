use crate::domain::model::{LeagueTable, SeasonMatches, TeamRecord};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Builds the final league table of a season: 3 points for a win, 1 for a draw.
///
/// Ranking is points, then goal difference, then goals scored (all descending),
/// with the team name as a last, deterministic tie-break.
pub fn summarise_season(season: &SeasonMatches) -> LeagueTable {
    let mut teams: HashMap<&str, TeamRecord> = HashMap::new();

    for m in &season.matches {
        let home = teams
            .entry(m.home_team.as_str())
            .or_insert_with(|| TeamRecord::new(m.home_team.as_str()));
        home.goals_for += m.home_goals;
        home.goals_against += m.away_goals;
        match m.home_goals.cmp(&m.away_goals) {
            Ordering::Greater => {
                home.points += 3;
                home.wins += 1;
            }
            Ordering::Less => home.losses += 1,
            Ordering::Equal => {
                home.points += 1;
                home.draws += 1;
            }
        }

        let away = teams
            .entry(m.away_team.as_str())
            .or_insert_with(|| TeamRecord::new(m.away_team.as_str()));
        away.goals_for += m.away_goals;
        away.goals_against += m.home_goals;
        match m.away_goals.cmp(&m.home_goals) {
            Ordering::Greater => {
                away.points += 3;
                away.wins += 1;
            }
            Ordering::Less => away.losses += 1,
            Ordering::Equal => {
                away.points += 1;
                away.draws += 1;
            }
        }
    }

    let mut rows: Vec<TeamRecord> = teams
        .into_values()
        .map(|mut row| {
            row.goal_diff = row.goals_for as i64 - row.goals_against as i64;
            row
        })
        .collect();

    rows.sort_by(compare_standing);
    for (index, row) in rows.iter_mut().enumerate() {
        row.position = index as u32 + 1;
    }

    LeagueTable {
        season: season.label.clone(),
        rows,
    }
}

fn compare_standing(a: &TeamRecord, b: &TeamRecord) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_diff.cmp(&a.goal_diff))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
        .then_with(|| a.team.cmp(&b.team))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::MatchResult;

    fn result(home: &str, hg: u32, ag: u32, away: &str) -> MatchResult {
        MatchResult {
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_goals: hg,
            away_goals: ag,
        }
    }

    fn season(matches: Vec<MatchResult>) -> SeasonMatches {
        SeasonMatches {
            label: "test".to_string(),
            matches,
        }
    }

    #[test]
    fn test_points_and_ordering() {
        let table = summarise_season(&season(vec![
            result("Arsenal", 2, 0, "Chelsea"),
            result("Chelsea", 1, 1, "Everton"),
            result("Everton", 0, 3, "Arsenal"),
        ]));

        let arsenal = table.get("Arsenal").unwrap();
        assert_eq!(arsenal.points, 6);
        assert_eq!(arsenal.wins, 2);
        assert_eq!(arsenal.goals_for, 5);
        assert_eq!(arsenal.goal_diff, 5);
        assert_eq!(arsenal.position, 1);

        let chelsea = table.get("Chelsea").unwrap();
        let everton = table.get("Everton").unwrap();
        assert_eq!(chelsea.points, 1);
        assert_eq!(everton.points, 1);
        // equal points, Chelsea -2 vs Everton -3
        assert_eq!(chelsea.position, 2);
        assert_eq!(everton.position, 3);
        assert_eq!(everton.losses, 1);
        assert_eq!(everton.draws, 1);
    }

    #[test]
    fn test_goals_for_breaks_goal_difference_tie() {
        let table = summarise_season(&season(vec![
            result("A", 3, 3, "B"),
            result("C", 0, 0, "D"),
        ]));
        let order: Vec<&str> = table.rows.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_table_invariants() {
        let matches = vec![
            result("A", 2, 1, "B"),
            result("B", 0, 0, "C"),
            result("C", 4, 2, "A"),
            result("A", 1, 1, "C"),
            result("B", 3, 0, "A"),
        ];
        let decisive = matches
            .iter()
            .filter(|m| m.home_goals != m.away_goals)
            .count() as u32;
        let draws = matches.len() as u32 - decisive;
        let table = summarise_season(&season(matches));

        let points: u32 = table.rows.iter().map(|r| r.points).sum();
        assert_eq!(points, 3 * decisive + 2 * draws);
        let goal_diff: i64 = table.rows.iter().map(|r| r.goal_diff).sum();
        assert_eq!(goal_diff, 0);
        let played: u32 = table.rows.iter().map(|r| r.played()).sum();
        assert_eq!(played, 10);
        let positions: Vec<u32> = table.rows.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_season() {
        let table = summarise_season(&season(vec![]));
        assert!(table.is_empty());
    }
}
