use crate::errors::AppError;
use chrono::Duration;
use dotenv::dotenv;
use std::{env, path::PathBuf, time::Duration as StdDuration};

pub const DEFAULT_API_URL: &str = "http://localhost:8191";
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 120;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Upper bound for `ROLODEX_SESSION_TTL_MINUTES`, one year.
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365;

const SESSION_DIR: &str = "rolodex-web";
const SESSION_FILE: &str = "session.json";

/// Runtime settings, resolved from the process environment and `.env`.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub session_file: PathBuf,
    pub session_ttl: Duration,
    pub request_timeout: StdDuration,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let api_url = get_env_value_by_key("ROLODEX_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let session_file = get_env_value_by_key("ROLODEX_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_session_file());

        let ttl_minutes =
            parse_env_or("ROLODEX_SESSION_TTL_MINUTES", DEFAULT_SESSION_TTL_MINUTES)?;
        let timeout_secs = parse_env_or("ROLODEX_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        Ok(Self {
            api_url,
            session_file,
            session_ttl: session_ttl_from_minutes(ttl_minutes)?,
            request_timeout: request_timeout_from_secs(timeout_secs)?,
        })
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = path.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_file: default_session_file(),
            session_ttl: Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
            request_timeout: StdDuration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

pub fn get_env_value_by_key(key: &str) -> Result<String, AppError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(AppError::NotFound(format!("{} in env", key))),
    }
}

pub fn session_ttl_from_minutes(minutes: i64) -> Result<Duration, AppError> {
    if !(1..=MAX_SESSION_TTL_MINUTES).contains(&minutes) {
        return Err(AppError::Config(format!(
            "ROLODEX_SESSION_TTL_MINUTES must be between 1 and {}, got {}",
            MAX_SESSION_TTL_MINUTES, minutes
        )));
    }

    Duration::try_minutes(minutes).ok_or_else(|| {
        AppError::Config(format!("ROLODEX_SESSION_TTL_MINUTES is out of range: {}", minutes))
    })
}

pub fn request_timeout_from_secs(secs: u64) -> Result<StdDuration, AppError> {
    if secs == 0 {
        return Err(AppError::Config("ROLODEX_TIMEOUT_SECS must be positive".to_string()));
    }
    Ok(StdDuration::from_secs(secs))
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
{
    match get_env_value_by_key(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: '{}'", key, raw))),
        Err(_) => Ok(default),
    }
}

/// The runtime dir is wiped when the user's login session ends, which makes
/// it the closest thing to browser session storage. Fall back to temp.
pub fn default_session_file() -> PathBuf {
    let base = env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(env::temp_dir);

    base.join(SESSION_DIR).join(SESSION_FILE)
}
