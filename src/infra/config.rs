use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://www.findsgjobs.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("FINDSGJOBS_API_KEY is not set; the gateway cannot call the upstream API without it")]
    MissingApiKey,
    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Read configuration once at startup. A missing credential is a fatal
    /// error here rather than a silent failure on the first request.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("FINDSGJOBS_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let base_url = std::env::var("FINDSGJOBS_BASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());

        let timeout_secs = match std::env::var("FINDSGJOBS_TIMEOUT_SECS") {
            Err(_) => DEFAULT_TIMEOUT_SECS,
            Ok(raw) => raw.parse::<u64>().map_err(|_| ConfigError::Invalid {
                name: "FINDSGJOBS_TIMEOUT_SECS",
                value: raw,
            })?,
        };

        Ok(Self {
            api_key,
            base_url,
            timeout_secs,
        })
    }
}
