use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{cooldowns::CooldownDefaults, hangman::gallows, hangman::DEFAULT_MAX_GUESSES};

pub const CONFIG_ENV: &str = "HANGBOT_TOML";
pub const DEFAULT_CONFIG_FILE: &str = "./hangbot.toml";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub game: GameConfig,

    #[serde(default)]
    pub cooldowns: CooldownDefaults,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Config {
    /// Where to look for the config file: `explicit`, then `HANGBOT_TOML`, then the default.
    pub fn path(explicit: Option<PathBuf>) -> PathBuf {
        if let Some(path) = explicit {
            return path;
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            info!(%path, "using config file from {CONFIG_ENV}");
            PathBuf::from(path)
        } else {
            warn!(
                path = DEFAULT_CONFIG_FILE,
                "{CONFIG_ENV} env unset, using default path"
            );
            PathBuf::from(DEFAULT_CONFIG_FILE)
        }
    }

    /// Reads the TOML file at `path` (optional), then `HANGBOT__*` environment overrides.
    #[tracing::instrument(skip_all, name = "config", fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, Error> {
        let config: Self = ::config::Config::builder()
            .add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                ::config::Environment::with_prefix("HANGBOT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(Error::Read)?
            .try_deserialize()
            .map_err(Error::Parse)?;

        config.game.validate()?;

        info!("config loaded");

        Ok(config)
    }

    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            game: GameConfig::default(),
            cooldowns: CooldownDefaults::default(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    pub max_guesses: u32,
}

impl GameConfig {
    fn validate(&self) -> Result<(), Error> {
        if (1..=gallows::PARTS).contains(&self.max_guesses) {
            Ok(())
        } else {
            Err(Error::Invalid(format!(
                "game.max_guesses must be between 1 and {}, got {}",
                gallows::PARTS,
                self.max_guesses
            )))
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_guesses: DEFAULT_MAX_GUESSES,
        }
    }
}

#[derive(Debug, thiserror::Error, thisslime::TracingError)]
pub enum Error {
    #[error("file read error: {0}")]
    #[event(level = ERROR)]
    Read(::config::ConfigError),

    #[error("parsing error: {0}")]
    #[event(level = ERROR)]
    Parse(::config::ConfigError),

    #[error("invalid config: {0}")]
    #[event(level = ERROR)]
    Invalid(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("hangbot.toml")).unwrap();

        assert_eq!(config.game.max_guesses, DEFAULT_MAX_GUESSES);
        assert_eq!(config.cooldowns, CooldownDefaults::default());
    }

    #[test]
    fn file_values_and_partial_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hangbot.toml");
        std::fs::write(
            &path,
            r#"
data_dir = "/var/lib/hangbot"

[game]
max_guesses = 8

[cooldowns]
guess = 3
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/hangbot"));
        assert_eq!(config.game.max_guesses, 8);
        assert_eq!(config.cooldowns.guess, 3);
        assert_eq!(config.cooldowns.start, CooldownDefaults::default().start);
    }

    #[test]
    fn max_guesses_must_fit_the_drawing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hangbot.toml");
        std::fs::write(&path, "[game]\nmax_guesses = 11\n").unwrap();

        assert!(matches!(Config::load(&path), Err(Error::Invalid(_))));
    }

    #[test]
    fn data_dir_override() {
        let config = Config::default().with_data_dir(Some(PathBuf::from("elsewhere")));
        assert_eq!(config.data_dir, PathBuf::from("elsewhere"));
        assert_eq!(
            Config::default().with_data_dir(None).data_dir,
            default_data_dir()
        );
    }
}
