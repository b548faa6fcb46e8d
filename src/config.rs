use std::{
    env, fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use log::{debug, info};
use lure_core::{catalog, lifecycle, ledger::STARTING_GOLD, Catalog, Timings};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};

/// Overrides where the config file is read from.
pub const CONFIG_ENV: &str = "LURE_MASTER_CONFIG";

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum Error {
    #[error("could not determine the config directory")]
    #[diagnostic(code(config::no_config_dir))]
    NoConfigDir,

    #[error("could not read config file {path}")]
    #[diagnostic(code(config::read_file))]
    ReadFile {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("could not parse config file {path}")]
    #[diagnostic(code(config::parse))]
    Parse {
        path: String,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("invalid timings")]
    #[diagnostic(code(config::timings))]
    Timings(#[from] lifecycle::Error),

    #[error("could not load catalog")]
    #[diagnostic(code(config::catalog))]
    Catalog(#[from] catalog::Error),
}

/// Configuration for the game.
///
/// Every key is optional. Durations are written the way humans write them,
/// e.g. `"2s 500ms"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub starting_gold: u64,
    pub timings: TimingConfig,
    /// How long the level-up notice waits after the catch is shown.
    #[serde(with = "human_duration")]
    pub level_up_notice: Duration,
    /// RON catalog replacing the built-in species.
    pub catalog: Option<PathBuf>,
    /// Fixed seed for reproducible sessions.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            starting_gold: STARTING_GOLD,
            timings: TimingConfig::default(),
            level_up_notice: Duration::from_secs(1),
            catalog: None,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    #[serde(with = "human_duration")]
    pub cast: Duration,
    pub bite_window: Window,
    pub resolve_window: Window,
}

impl Default for TimingConfig {
    fn default() -> Self {
        let timings = Timings::default();
        Self {
            cast: timings.cast(),
            bite_window: Window::from(timings.bite_window().clone()),
            resolve_window: Window::from(timings.resolve_window().clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    #[serde(with = "human_duration")]
    pub from: Duration,
    #[serde(with = "human_duration")]
    pub to: Duration,
}

impl From<std::ops::Range<Duration>> for Window {
    fn from(range: std::ops::Range<Duration>) -> Self {
        Self {
            from: range.start,
            to: range.end,
        }
    }
}

impl Config {
    /// `$LURE_MASTER_CONFIG`, or `config.ron` in the platform config directory.
    pub fn path() -> Result<PathBuf, Error> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        ProjectDirs::from("com", "LureMaster", "lure-master")
            .map(|dirs| dirs.config_dir().join("config.ron"))
            .ok_or(Error::NoConfigDir)
    }

    pub fn load() -> Result<Self, Error> {
        Self::load_from(&Self::path()?)
    }

    /// Reads `path`, falling back to defaults if it does not exist. A relative
    /// catalog path is taken relative to the config file.
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(Error::ReadFile {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        debug!("Loading config from {}", path.display());
        let mut config = Self::from_ron(&text).map_err(|source| Error::Parse {
            path: path.display().to_string(),
            source,
        })?;

        if let (Some(catalog), Some(dir)) = (&config.catalog, path.parent()) {
            if catalog.is_relative() {
                config.catalog = Some(dir.join(catalog));
            }
        }

        Ok(config)
    }

    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    pub fn timings(&self) -> Result<Timings, Error> {
        let timings = &self.timings;
        Ok(Timings::new(
            timings.cast,
            timings.bite_window.from..timings.bite_window.to,
            timings.resolve_window.from..timings.resolve_window.to,
        )?)
    }

    pub fn catalog(&self) -> Result<Catalog, Error> {
        let catalog = match &self.catalog {
            Some(path) => Catalog::load(path)?,
            None => Catalog::builtin()?,
        };
        Ok(catalog)
    }
}

mod human_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(Config::from_ron("()").unwrap(), Config::default());
    }

    #[test]
    fn defaults_match_the_game() {
        let config = Config::default();
        assert_eq!(config.starting_gold, 100);
        assert_eq!(config.timings().unwrap(), Timings::default());
        assert_eq!(config.catalog().unwrap().len(), 8);
    }

    #[test]
    fn example_config_parses() {
        let config = Config::from_ron(include_str!("../config.example.ron")).unwrap();

        assert_eq!(config.starting_gold, 100);
        assert_eq!(config.timings.cast, Duration::from_secs(1));
        assert_eq!(
            config.timings.bite_window,
            Window {
                from: Duration::from_millis(2500),
                to: Duration::from_secs(4)
            }
        );
        assert_eq!(config.level_up_notice, Duration::from_secs(1));
        assert_eq!(config.timings().unwrap(), Timings::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config = Config::from_ron(
            r#"(
                starting_gold: 500,
                timings: (cast: "250ms"),
                seed: Some(7),
            )"#,
        )
        .unwrap();

        assert_eq!(config.starting_gold, 500);
        assert_eq!(config.timings.cast, Duration::from_millis(250));
        assert_eq!(config.timings.resolve_window, TimingConfig::default().resolve_window);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.catalog, None);
    }

    #[test_case("1m 30s", Duration::from_secs(90) ; "minutes and seconds")]
    #[test_case("750ms", Duration::from_millis(750) ; "milliseconds")]
    #[test_case("2s 500ms", Duration::from_millis(2500) ; "seconds and milliseconds")]
    fn human_durations(text: &str, expected: Duration) {
        let config = Config::from_ron(&format!(r#"(level_up_notice: "{text}")"#)).unwrap();
        assert_eq!(config.level_up_notice, expected);
    }

    #[test]
    fn rejects_malformed_duration() {
        assert!(Config::from_ron(r#"(level_up_notice: "soon")"#).is_err());
    }

    #[test]
    fn rejects_inverted_window() {
        let config = Config::from_ron(
            r#"(timings: (resolve_window: (from: "7s", to: "3s")))"#,
        )
        .unwrap();

        assert!(matches!(config.timings(), Err(Error::Timings(_))));
    }

    #[test]
    fn serialized_config_reads_back() {
        let config = Config {
            starting_gold: 42,
            seed: Some(1),
            ..Config::default()
        };

        let text = ron::to_string(&config).unwrap();
        assert_eq!(Config::from_ron(&text).unwrap(), config);
    }

    #[test]
    fn missing_file_means_defaults() {
        let path = env::temp_dir().join("lure-master-missing-config.ron");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn relative_catalog_is_resolved_next_to_config() {
        let dir = env::temp_dir().join("lure-master-config-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.ron");
        fs::write(&path, r#"(catalog: Some("fish.ron"))"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.catalog, Some(dir.join("fish.ron")));
    }

    #[test]
    fn missing_catalog_file_is_an_error() {
        let config = Config {
            catalog: Some(env::temp_dir().join("lure-master-missing-catalog.ron")),
            ..Config::default()
        };

        assert!(matches!(config.catalog(), Err(Error::Catalog(_))));
    }
}
