use std::path::Path;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_CHANNEL_NAME: &str = "zackrawrr";
pub const DEFAULT_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";
pub const DEFAULT_HELIX_URL: &str = "https://api.twitch.tv/helix";

const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("failed to load .env file: {0}")]
    EnvFile(#[from] dotenvy::Error),

    #[error("{0} must be set in the environment")]
    MissingVariable(&'static str),

    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub client_id: String,
    pub client_secret: String,
    pub channel_name: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub token_url: String,
    pub helix_url: String,
}

impl Configuration {
    /// Loads `.env` from the working directory, then reads the process environment.
    pub fn load() -> Result<Configuration, ConfigurationError> {
        Configuration::load_from(".env")
    }

    /// Only `path` is read; parent directories are not searched.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Configuration, ConfigurationError> {
        dotenvy::from_path(path.as_ref())?;
        Configuration::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Configuration, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let client_id = get("CLIENT_ID").ok_or(ConfigurationError::MissingVariable("CLIENT_ID"))?;
        let client_secret =
            get("CLIENT_SECRET").ok_or(ConfigurationError::MissingVariable("CLIENT_SECRET"))?;

        let seconds = |name: &'static str, default: u64| match get(name) {
            None => Ok(Duration::from_secs(default)),
            Some(value) => match value.trim().parse::<u64>() {
                Ok(parsed) if parsed > 0 => Ok(Duration::from_secs(parsed)),
                _ => Err(ConfigurationError::InvalidValue { name, value }),
            },
        };

        Ok(Configuration {
            client_id,
            client_secret,
            channel_name: get("CHANNEL_NAME").unwrap_or_else(|| DEFAULT_CHANNEL_NAME.to_string()),
            poll_interval: seconds("POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?,
            request_timeout: seconds("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            token_url: get("TWITCH_TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            helix_url: get("TWITCH_HELIX_URL").unwrap_or_else(|| DEFAULT_HELIX_URL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults_are_applied() {
        let config =
            Configuration::from_lookup(lookup(&[("CLIENT_ID", "id"), ("CLIENT_SECRET", "secret")]))
                .unwrap();

        assert_eq!(config.client_id, "id");
        assert_eq!(config.client_secret, "secret");
        assert_eq!(config.channel_name, DEFAULT_CHANNEL_NAME);
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.helix_url, DEFAULT_HELIX_URL);
    }

    #[test]
    fn overrides_are_read() {
        let config = Configuration::from_lookup(lookup(&[
            ("CLIENT_ID", "id"),
            ("CLIENT_SECRET", "secret"),
            ("CHANNEL_NAME", "examplechannel"),
            ("POLL_INTERVAL_SECS", "5"),
            ("TWITCH_HELIX_URL", "http://localhost:8080/helix"),
        ]))
        .unwrap();

        assert_eq!(config.channel_name, "examplechannel");
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.helix_url, "http://localhost:8080/helix");
    }

    #[test]
    fn missing_client_id_is_rejected() {
        let err = Configuration::from_lookup(lookup(&[("CLIENT_SECRET", "secret")])).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingVariable("CLIENT_ID")));
    }

    #[test]
    fn empty_client_secret_is_rejected() {
        let err =
            Configuration::from_lookup(lookup(&[("CLIENT_ID", "id"), ("CLIENT_SECRET", "")]))
                .unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingVariable("CLIENT_SECRET")));
    }

    #[test]
    fn missing_env_file_is_fatal() {
        let err = Configuration::load_from("does/not/exist/.env").unwrap_err();
        assert!(matches!(err, ConfigurationError::EnvFile(_)));
    }

    #[test]
    fn non_numeric_timeout_is_rejected() {
        let err = Configuration::from_lookup(lookup(&[
            ("CLIENT_ID", "id"),
            ("CLIENT_SECRET", "secret"),
            ("REQUEST_TIMEOUT_SECS", "abc"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidValue { name: "REQUEST_TIMEOUT_SECS", ref value } if value == "abc"
        ));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = Configuration::from_lookup(lookup(&[
            ("CLIENT_ID", "id"),
            ("CLIENT_SECRET", "secret"),
            ("POLL_INTERVAL_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidValue { name: "POLL_INTERVAL_SECS", .. }
        ));
    }
}
