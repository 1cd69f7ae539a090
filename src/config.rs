use crate::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    /// Platform routing value for champion-mastery-v4 (e.g. `kr`, `na1`).
    pub platform: String,
    /// Regional routing value for account-v1 (e.g. `americas`, `asia`).
    pub account_region: String,
    pub data_dir: PathBuf,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_key = env::var("RIOT_API_KEY").map_err(|_| {
            AppError::ConfigError("RIOT_API_KEY not found in environment or .env file".to_string())
        })?;

        let platform = env::var("RIOT_PLATFORM").unwrap_or_else(|_| "kr".to_string());
        let account_region =
            env::var("RIOT_ACCOUNT_REGION").unwrap_or_else(|_| "americas".to_string());
        let data_dir = env::var("LEAGUE_COMPASS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let http_timeout = match env::var("RIOT_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map(Duration::from_secs).map_err(|_| {
                AppError::ConfigError(format!("RIOT_HTTP_TIMEOUT_SECS is not a number: {raw}"))
            })?,
            Err(_) => Duration::from_secs(10),
        };

        Ok(Config {
            api_key,
            platform,
            account_region,
            data_dir,
            http_timeout,
        })
    }
}
