use crate::domain::model::{MatchResult, SeasonMatches};
use crate::utils::error::{ForecastError, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawMatch {
    #[serde(rename = "Team 1")]
    home_team: String,
    #[serde(rename = "FT")]
    full_time: Option<String>,
    #[serde(rename = "Team 2")]
    away_team: String,
}

/// Parses a full-time score of the form `"2-1"` into `(home, away)` goals.
pub fn parse_score(score: &str) -> Option<(u32, u32)> {
    let (home, away) = score.trim().split_once('-')?;
    let home = home.trim().parse().ok()?;
    let away = away.trim().parse().ok()?;
    Some((home, away))
}

/// Reads one season of results.
///
/// Only the `Team 1`, `FT` and `Team 2` columns are used. Rows with an empty
/// `FT` are fixtures that have not been played yet and are skipped.
pub fn parse_match_results(label: &str, data: &[u8]) -> Result<SeasonMatches> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let mut matches = Vec::new();
    let mut skipped = 0usize;

    for (index, row) in reader.deserialize::<RawMatch>().enumerate() {
        let raw = row?;
        // header is line 1
        let line = index + 2;

        let score = match raw.full_time.as_deref().map(str::trim) {
            None | Some("") => {
                skipped += 1;
                continue;
            }
            Some(score) => score,
        };

        let (home_goals, away_goals) =
            parse_score(score).ok_or_else(|| ForecastError::InvalidScore {
                season: label.to_string(),
                row: line,
                value: score.to_string(),
            })?;

        matches.push(MatchResult {
            home_team: raw.home_team,
            away_team: raw.away_team,
            home_goals,
            away_goals,
        });
    }

    if skipped > 0 {
        tracing::debug!("{}: skipped {} unplayed fixtures", label, skipped);
    }
    tracing::debug!("{}: parsed {} results", label, matches.len());

    Ok(SeasonMatches {
        label: label.to_string(),
        matches,
    })
}

/// Season label derived from a source path or URL: the file stem.
pub fn season_label(source: &str) -> String {
    let name = source
        .trim_end_matches('/')
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(source);
    let name = name.split(['?', '#']).next().unwrap_or(name);
    name.strip_suffix(".csv").unwrap_or(name).to_string()
}
