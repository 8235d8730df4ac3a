use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Weekday;
use chrono_tz::Tz;

use crate::error::OffdayError;
use crate::models::offday::DEFAULT_DATA_LOCATION;
use crate::service::shared_days::DEFAULT_SHARED_THRESHOLD;

pub const DEFAULT_WEEK_START: Weekday = Weekday::Sun;
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Seoul;

/// `KEY=VALUE` settings file. Blank lines, `#` comments, an `export ` prefix
/// and surrounding quotes are accepted.
#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self, OffdayError> {
        let content = fs::read_to_string(path).map_err(|source| OffdayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, OffdayError> {
        let mut values = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(OffdayError::Config(format!(
                    "invalid config line {}: {}",
                    idx + 1,
                    line
                )));
            };
            let key = key.trim();
            let mut value = value.trim().to_string();
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = value[1..value.len() - 1].to_string();
            }
            values.insert(key.to_string(), value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_location: PathBuf,
    pub week_start: Weekday,
    pub timezone: Tz,
    pub shared_threshold: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_location: PathBuf::from(DEFAULT_DATA_LOCATION),
            week_start: DEFAULT_WEEK_START,
            timezone: DEFAULT_TIMEZONE,
            shared_threshold: DEFAULT_SHARED_THRESHOLD,
        }
    }
}

impl Settings {
    /// Builds settings from `get_prop`, which the binary backs with the
    /// config file first and the environment second.
    pub fn resolve<F>(get_prop: F) -> Result<Self, OffdayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();
        if let Some(path) = get_prop("OFFDAY_DATA") {
            settings.data_location = PathBuf::from(path);
        } else if let Some(base) = get_prop("DB_LOCATION") {
            settings.data_location = Path::new(&base).join("offdays.json");
        }
        if let Some(value) = get_prop("WEEK_START") {
            settings.week_start = parse_week_start(&value).map_err(OffdayError::Config)?;
        }
        if let Some(value) = get_prop("TIMEZONE") {
            settings.timezone = parse_timezone(&value).map_err(OffdayError::Config)?;
        }
        if let Some(value) = get_prop("SHARED_THRESHOLD") {
            settings.shared_threshold = parse_threshold(&value).map_err(OffdayError::Config)?;
        }
        Ok(settings)
    }
}

pub fn parse_week_start(value: &str) -> Result<Weekday, String> {
    value
        .trim()
        .parse::<Weekday>()
        .map_err(|_| format!("unknown weekday {:?}", value))
}

pub fn parse_timezone(value: &str) -> Result<Tz, String> {
    value
        .trim()
        .parse::<Tz>()
        .map_err(|_| format!("unknown time zone {:?}", value))
}

pub fn parse_threshold(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(format!("threshold must be a positive integer, got {:?}", value)),
        Ok(n) => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comments_exports_and_quotes() {
        let config = AppConfig::parse(
            "# calendar\nexport WEEK_START=mon\nTIMEZONE=\"Europe/Berlin\"\n\nSHARED_THRESHOLD='3'\n",
        )
        .unwrap();
        assert_eq!(config.get("WEEK_START").as_deref(), Some("mon"));
        assert_eq!(config.get("TIMEZONE").as_deref(), Some("Europe/Berlin"));
        assert_eq!(config.get("SHARED_THRESHOLD").as_deref(), Some("3"));
    }

    #[test]
    fn rejects_lines_without_separator() {
        let err = AppConfig::parse("WEEK_START=sun\nnonsense\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn resolves_defaults_and_overrides() {
        let defaults = Settings::resolve(|_| None).unwrap();
        assert_eq!(defaults, Settings::default());

        let config = AppConfig::parse("WEEK_START=Monday\nTIMEZONE=UTC\nDB_LOCATION=/srv/cal\n").unwrap();
        let settings = Settings::resolve(|key| config.get(key)).unwrap();
        assert_eq!(settings.week_start, Weekday::Mon);
        assert_eq!(settings.timezone, Tz::UTC);
        assert_eq!(settings.data_location, PathBuf::from("/srv/cal/offdays.json"));
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let err = Settings::resolve(|key| (key == "SHARED_THRESHOLD").then(|| "0".to_string()))
            .unwrap_err();
        assert!(matches!(err, OffdayError::Config(_)));
        let err = Settings::resolve(|key| (key == "TIMEZONE").then(|| "Mars/Base".to_string()))
            .unwrap_err();
        assert!(matches!(err, OffdayError::Config(_)));
    }
}
