use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of per-team statistics fed to the model.
pub const FEATURE_COUNT: usize = 7;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "points",
    "wins",
    "draws",
    "losses",
    "goals_for",
    "goals_against",
    "goal_diff",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub home_team: String,
    pub away_team: String,
    pub home_goals: u32,
    pub away_goals: u32,
}

/// All played matches of one season, labelled by the source file stem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonMatches {
    pub label: String,
    pub matches: Vec<MatchResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub team: String,
    pub points: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_diff: i64,
    pub position: u32,
}

impl TeamRecord {
    pub fn new(team: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            points: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
            goal_diff: 0,
            position: 0,
        }
    }

    pub fn played(&self) -> u32 {
        self.wins + self.draws + self.losses
    }

    pub fn features(&self) -> FeatureVector {
        FeatureVector([
            self.points as f64,
            self.wins as f64,
            self.draws as f64,
            self.losses as f64,
            self.goals_for as f64,
            self.goals_against as f64,
            self.goal_diff as f64,
        ])
    }
}

/// Final standings of a season, ordered by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueTable {
    pub season: String,
    pub rows: Vec<TeamRecord>,
}

impl LeagueTable {
    pub fn get(&self, team: &str) -> Option<&TeamRecord> {
        self.rows.iter().find(|row| row.team == team)
    }

    pub fn contains(&self, team: &str) -> bool {
        self.get(team).is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The last `n` rows of the table (fewer when the table is shorter).
    pub fn bottom(&self, n: usize) -> &[TeamRecord] {
        let start = self.rows.len().saturating_sub(n);
        &self.rows[start..]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Component-wise mean. `None` for an empty input.
    pub fn mean<'a>(vectors: impl IntoIterator<Item = &'a FeatureVector>) -> Option<Self> {
        let mut sum = [0.0; FEATURE_COUNT];
        let mut count = 0usize;
        for vector in vectors {
            for (acc, value) in sum.iter_mut().zip(vector.0.iter()) {
                *acc += value;
            }
            count += 1;
        }
        if count == 0 {
            return None;
        }
        for acc in sum.iter_mut() {
            *acc /= count as f64;
        }
        Some(Self(sum))
    }
}

/// Season n statistics paired with the same team's season n+1 finishing position.
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    pub features: Vec<FeatureVector>,
    pub targets: Vec<u32>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn extend(&mut self, other: TrainingSet) {
        self.features.extend(other.features);
        self.targets.extend(other.targets);
    }
}

/// Teams to forecast together with the statistics they carry into the new season.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastField {
    pub entries: Vec<(String, FeatureVector)>,
}

impl ForecastField {
    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(team, _)| team.as_str())
    }

    pub fn contains(&self, team: &str) -> bool {
        self.teams().any(|t| t == team)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_rank: u32,
    pub team: String,
    pub expected_position: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    pub season: String,
    pub teams: usize,
    pub mean_absolute_error: f64,
    pub exact_hits: usize,
    /// Rows the held-out model was trained on.
    pub training_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    pub tables: Vec<LeagueTable>,
    pub predictions: Vec<Prediction>,
    pub backtest: Option<BacktestReport>,
    pub training_rows: usize,
    pub generated_at: DateTime<Utc>,
}
