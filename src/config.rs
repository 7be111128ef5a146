use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "https://imaginative-sharline-hellfire-16382f1c.koyeb.app";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub export_dir: PathBuf,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; invalid values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("FEEDBACK_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Self {
            api_base_url,
            session_file: lookup("FEEDBACK_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".feedback_session.json")),
            export_dir: lookup("FEEDBACK_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            http_timeout: Duration::from_secs(try_load(&lookup, "FEEDBACK_HTTP_TIMEOUT_SECS", 30)),
        }
    }
}

fn try_load<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        debug!("{key} not set, using default: {default}");
        return default;
    };
    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
        default
    })
}
