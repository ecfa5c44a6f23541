use crate::utils::error::{ForecastError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// True when the season source should be fetched over HTTP instead of read from disk.
pub fn is_remote_source(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ForecastError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// Seasons are either local CSV paths or http(s) URLs to CSV files.
pub fn validate_season_sources(field_name: &str, sources: &[String]) -> Result<()> {
    if sources.len() < 2 {
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: sources.join(","),
            reason: "At least two seasons are required to learn season-to-season movement"
                .to_string(),
        });
    }

    let mut local = Vec::new();
    for source in sources {
        if is_remote_source(source) {
            validate_url(field_name, source)?;
        } else {
            validate_path(field_name, source)?;
            local.push(source.clone());
        }
    }

    validate_file_extensions(field_name, &local, &["csv"])
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        if let Some(extension) = std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            if !allowed_set.contains(extension) {
                return Err(ForecastError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
        } else {
            return Err(ForecastError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: file.clone(),
                reason: "File has no extension or invalid filename".to_string(),
            });
        }
    }

    Ok(())
}

pub fn validate_team_names(field_name: &str, teams: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for team in teams {
        if team.trim().is_empty() {
            return Err(ForecastError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: team.clone(),
                reason: "Team name cannot be empty or whitespace-only".to_string(),
            });
        }
        if !seen.insert(team.as_str()) {
            return Err(ForecastError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: team.clone(),
                reason: "Team listed more than once".to_string(),
            });
        }
    }
    Ok(())
}

/// A club cannot both leave and join the division in the same close season.
pub fn validate_promotion_lists(promoted: &[String], relegated: &[String]) -> Result<()> {
    if let Some(team) = promoted.iter().find(|team| relegated.contains(team)) {
        return Err(ForecastError::InvalidConfigValueError {
            field: "promoted".to_string(),
            value: team.clone(),
            reason: "Team is listed as both promoted and relegated".to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("seasons", "https://example.com/eng1.csv").is_ok());
        assert!(validate_url("seasons", "http://example.com/eng1.csv").is_ok());
        assert!(validate_url("seasons", "").is_err());
        assert!(validate_url("seasons", "invalid-url").is_err());
        assert!(validate_url("seasons", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_season_sources() {
        let seasons = vec![
            "data/eng1_2022-23.csv".to_string(),
            "https://example.com/eng1_2023-24.csv".to_string(),
        ];
        assert!(validate_season_sources("seasons", &seasons).is_ok());

        let single = vec!["data/eng1_2022-23.csv".to_string()];
        assert!(validate_season_sources("seasons", &single).is_err());

        let wrong_ext = vec!["a.csv".to_string(), "b.xlsx".to_string()];
        assert!(validate_season_sources("seasons", &wrong_ext).is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("n_estimators", 5, 1).is_ok());
        assert!(validate_positive_number("n_estimators", 0, 1).is_err());
    }

    #[test]
    fn test_validate_team_names() {
        let teams = vec!["Burnley".to_string(), "Sunderland".to_string()];
        assert!(validate_team_names("promoted", &teams).is_ok());

        let duplicate = vec!["Burnley".to_string(), "Burnley".to_string()];
        assert!(validate_team_names("promoted", &duplicate).is_err());

        let blank = vec!["  ".to_string()];
        assert!(validate_team_names("promoted", &blank).is_err());
    }

    #[test]
    fn test_validate_promotion_lists() {
        let promoted = vec!["Leeds United".to_string(), "Sunderland".to_string()];
        let relegated = vec!["Southampton".to_string()];
        assert!(validate_promotion_lists(&promoted, &relegated).is_ok());

        let overlap = vec!["Sunderland".to_string()];
        match validate_promotion_lists(&promoted, &overlap) {
            Err(ForecastError::InvalidConfigValueError { value, .. }) => {
                assert_eq!(value, "Sunderland")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("max_depth", 8, 1, 64).is_ok());
        assert!(validate_range("max_depth", 0, 1, 64).is_err());
    }
}
