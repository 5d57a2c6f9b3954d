//! Application-level configuration loading, including game tuning values.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "QWIZ_BACK_CONFIG_PATH";

/// Coins handed to every player on registration.
const DEFAULT_STARTING_COINS: u32 = 200;
/// Coins earned for a correct answer in a graded round.
const DEFAULT_CORRECT_ANSWER_COINS: u32 = 50;
/// Coins earned for an incorrect or missing answer in a graded round.
const DEFAULT_PARTICIPATION_COINS: u32 = 10;
/// Countdown applied to questions that do not declare their own time limit.
const DEFAULT_TIME_LIMIT_SECS: u64 = 20;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Coin balance a freshly registered player starts with.
    pub starting_coins: u32,
    /// Coin reward for a correct answer.
    pub correct_answer_coins: u32,
    /// Coin reward for participating without answering correctly.
    pub participation_coins: u32,
    /// Fallback time limit in seconds for questions without one.
    pub default_time_limit_secs: u64,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(path = %path.display(), "loaded game tuning from config");
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            starting_coins: DEFAULT_STARTING_COINS,
            correct_answer_coins: DEFAULT_CORRECT_ANSWER_COINS,
            participation_coins: DEFAULT_PARTICIPATION_COINS,
            default_time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
///
/// Every field is optional so a partial file only overrides what it names.
struct RawConfig {
    starting_coins: Option<u32>,
    correct_answer_coins: Option<u32>,
    participation_coins: Option<u32>,
    default_time_limit_secs: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            starting_coins: value.starting_coins.unwrap_or(defaults.starting_coins),
            correct_answer_coins: value
                .correct_answer_coins
                .unwrap_or(defaults.correct_answer_coins),
            participation_coins: value
                .participation_coins
                .unwrap_or(defaults.participation_coins),
            default_time_limit_secs: value
                .default_time_limit_secs
                .unwrap_or(defaults.default_time_limit_secs),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
