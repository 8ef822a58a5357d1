use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::game::GameSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub game: GameSettings,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            game: GameSettings::default(),
        }
    }
}

impl Config {
    /// Reads settings from the environment, after loading a `.env` file if
    /// one exists.
    ///
    /// - `TRIVIA_HOST` (default `0.0.0.0`)
    /// - `TRIVIA_PORT` (default `3000`)
    /// - `TRIVIA_QUESTION_SECONDS` (default `20`)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an explicit variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let host = lookup("TRIVIA_HOST").unwrap_or(defaults.server.host);
        let port = parse_var(&lookup, "TRIVIA_PORT", defaults.server.port)?;
        let question_seconds = parse_var(
            &lookup,
            "TRIVIA_QUESTION_SECONDS",
            defaults.game.question_budget.as_secs(),
        )?;
        if question_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "TRIVIA_QUESTION_SECONDS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            server: ServerConfig { host, port },
            game: GameSettings {
                question_budget: Duration::from_secs(question_seconds),
            },
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}
