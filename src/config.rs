use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::Weekday;

const CONFIG_PATH_ENV_VAR: &str = "TRAINDAY_CONFIG_FILE";

const DEFAULT_WEEKDAY_LABELS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawConfig {
    week_start: Option<u8>,
    weekday_labels: Option<Vec<String>>,
    sessions_file: Option<PathBuf>,
}

/// Validated application configuration.  Grid math only ever sees
/// `week_start`; the labels are purely a display concern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Config {
    week_start: Weekday,
    weekday_labels: [String; 7],
    sessions_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            week_start: Weekday::Sunday,
            weekday_labels: DEFAULT_WEEKDAY_LABELS.map(str::to_owned),
            sessions_file: None,
        }
    }
}

impl Config {
    /// Loads the configuration from `path` if given, otherwise from the
    /// first default location that exists.  No file at all is fine; the
    /// defaults apply.
    pub(crate) fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        if let Some(path) = path {
            return Config::from_file(path);
        }
        match Config::default_location() {
            Some(path) if path.exists() => Config::from_file(&path),
            _ => Ok(Config::default()),
        }
    }

    fn default_location() -> Option<PathBuf> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR) {
            return Some(PathBuf::from(path));
        }
        if let Ok(dir) = env::var("XDG_CONFIG_HOME") {
            return Some(Path::new(&dir).join("trainday").join("config.toml"));
        }
        env::var("HOME").ok().map(|home| {
            Path::new(&home)
                .join(".config")
                .join("trainday")
                .join("config.toml")
        })
    }

    fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let raw = toml::from_str::<RawConfig>(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        Config::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Config, ConfigError> {
        let mut config = Config::default();
        if let Some(index) = raw.week_start {
            config.week_start = weekday_from_index(index)?;
        }
        if let Some(labels) = raw.weekday_labels {
            config.weekday_labels = <[String; 7]>::try_from(labels)
                .map_err(|labels| ConfigError::WeekdayLabelCount(labels.len()))?;
        }
        config.sessions_file = raw.sessions_file;
        Ok(config)
    }

    pub(crate) fn week_start(&self) -> Weekday {
        self.week_start
    }

    pub(crate) fn sessions_file(&self) -> Option<&Path> {
        self.sessions_file.as_deref()
    }

    /// Weekday labels for the grid header, rotated so that the configured
    /// week start comes first.  Stored Sunday-first, like the 0–6 indexing.
    pub(crate) fn header_labels(&self) -> [&str; 7] {
        let start = usize::from(self.week_start.number_days_from_sunday());
        std::array::from_fn(|i| self.weekday_labels[(start + i) % 7].as_str())
    }
}

/// Maps the configured 0–6 index (0 = Sunday) onto a weekday.  Anything out
/// of range is a configuration error, not something to guess around.
fn weekday_from_index(index: u8) -> Result<Weekday, ConfigError> {
    match index {
        0 => Ok(Weekday::Sunday),
        1 => Ok(Weekday::Monday),
        2 => Ok(Weekday::Tuesday),
        3 => Ok(Weekday::Wednesday),
        4 => Ok(Weekday::Thursday),
        5 => Ok(Weekday::Friday),
        6 => Ok(Weekday::Saturday),
        other => Err(ConfigError::WeekStartOutOfRange(other)),
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("week-start must be between 0 (Sunday) and 6 (Saturday); got {0}")]
    WeekStartOutOfRange(u8),
    #[error("weekday-labels must have exactly 7 entries; got {0}")]
    WeekdayLabelCount(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_raw(RawConfig::default()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.week_start(), Weekday::Sunday);
        assert_eq!(config.sessions_file(), None);
    }

    #[test]
    fn test_week_start_parsed() {
        let raw = toml::from_str::<RawConfig>("week-start = 1\n").unwrap();
        let config = Config::from_raw(raw).unwrap();
        assert_eq!(config.week_start(), Weekday::Monday);
    }

    #[test]
    fn test_week_start_out_of_range() {
        let raw = toml::from_str::<RawConfig>("week-start = 7\n").unwrap();
        let err = Config::from_raw(raw).unwrap_err();
        assert!(matches!(err, ConfigError::WeekStartOutOfRange(7)));
    }

    #[test]
    fn test_weekday_label_count_checked() {
        let raw =
            toml::from_str::<RawConfig>(r#"weekday-labels = ["Sun", "Mon", "Tue"]"#).unwrap();
        let err = Config::from_raw(raw).unwrap_err();
        assert!(matches!(err, ConfigError::WeekdayLabelCount(3)));
    }

    #[test]
    fn test_header_labels_sunday_start() {
        let config = Config::default();
        assert_eq!(
            config.header_labels(),
            ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"]
        );
    }

    #[test]
    fn test_header_labels_rotated_for_monday_start() {
        let raw = toml::from_str::<RawConfig>("week-start = 1\n").unwrap();
        let config = Config::from_raw(raw).unwrap();
        assert_eq!(
            config.header_labels(),
            ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"]
        );
    }

    #[test]
    fn test_full_config_file() {
        let raw = toml::from_str::<RawConfig>(
            r#"
            week-start = 6
            sessions-file = "/var/lib/trainday/roster.json"
            weekday-labels = ["S", "M", "T", "W", "T", "F", "S"]
            "#,
        )
        .unwrap();
        let config = Config::from_raw(raw).unwrap();
        assert_eq!(config.week_start(), Weekday::Saturday);
        assert_eq!(
            config.sessions_file(),
            Some(Path::new("/var/lib/trainday/roster.json"))
        );
        assert_eq!(config.header_labels(), ["S", "S", "M", "T", "W", "T", "F"]);
    }
}
