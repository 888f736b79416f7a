//! Environment-driven configuration.
//!
//! Values come from process environment variables, optionally seeded from a
//! `.env` file in the working directory. Every setting has a default so a
//! bare `cargo run` serves on localhost with an on-disk database under the
//! user's home directory.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::ai::AiConfig;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_STREAM_MAX_DURATION: Duration = Duration::from_secs(5);
pub const DEFAULT_STREAM_MAX_EVENTS: usize = 5;
pub const DEFAULT_STREAM_IDLE_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Budget of a single stream session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Caps wall-clock session length.
    pub max_duration: Duration,
    /// Caps event frames per session.
    pub max_events: usize,
    /// Back-off pause when a sweep finds nothing.
    pub idle_interval: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_duration: DEFAULT_STREAM_MAX_DURATION,
            max_events: DEFAULT_STREAM_MAX_EVENTS,
            idle_interval: DEFAULT_STREAM_IDLE_INTERVAL,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub stream: StreamConfig,
    pub ai: AiConfig,
}

impl AppConfig {
    /// Load from the process environment (after reading `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("ignoring unreadable .env file: {e}");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_addr = parse_or(
            "CRISIS_BIND_ADDR",
            get("CRISIS_BIND_ADDR"),
            DEFAULT_BIND_ADDR.parse().expect("valid default bind address"),
        )?;

        let database_path = match get("CRISIS_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => data_dir(get("CRISIS_DATA_DIR"), get("HOME")).join("crisisconnect.db"),
        };

        let defaults = StreamConfig::default();
        let stream = StreamConfig {
            max_duration: Duration::from_secs(parse_or(
                "CRISIS_STREAM_MAX_DURATION_SECS",
                get("CRISIS_STREAM_MAX_DURATION_SECS"),
                defaults.max_duration.as_secs(),
            )?),
            max_events: parse_or(
                "CRISIS_STREAM_MAX_EVENTS",
                get("CRISIS_STREAM_MAX_EVENTS"),
                defaults.max_events,
            )?,
            idle_interval: Duration::from_millis(parse_or(
                "CRISIS_STREAM_IDLE_INTERVAL_MS",
                get("CRISIS_STREAM_IDLE_INTERVAL_MS"),
                defaults.idle_interval.as_millis() as u64,
            )?),
        };
        validate_stream(&stream)?;

        let mut ai = AiConfig::default();
        ai.api_key = get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY"));
        if let Some(model) = get("CRISIS_AI_MODEL") {
            ai.model = model;
        }
        ai.base_url = get("CRISIS_AI_BASE_URL");
        ai.timeout_ms = parse_or("CRISIS_AI_TIMEOUT_MS", get("CRISIS_AI_TIMEOUT_MS"), ai.timeout_ms)?;

        Ok(Self {
            bind_addr,
            database_path,
            stream,
            ai,
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

fn validate_stream(stream: &StreamConfig) -> Result<(), ConfigError> {
    if stream.max_duration.is_zero() {
        return Err(ConfigError::Invalid {
            key: "CRISIS_STREAM_MAX_DURATION_SECS",
            value: "0".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }
    if stream.max_events == 0 {
        return Err(ConfigError::Invalid {
            key: "CRISIS_STREAM_MAX_EVENTS",
            value: "0".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }
    if stream.idle_interval.is_zero() {
        return Err(ConfigError::Invalid {
            key: "CRISIS_STREAM_IDLE_INTERVAL_MS",
            value: "0".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }
    Ok(())
}

fn data_dir(explicit: Option<String>, home: Option<String>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }
    match home {
        Some(home) => PathBuf::from(home).join(".crisisconnect"),
        None => PathBuf::from(".crisisconnect"),
    }
}
