use crate::data::champions::ChampionNames;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Champion id → name table saved between runs so Data Dragon is not hit
/// on every invocation.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChampionCache {
    pub fetched_at: DateTime<Utc>,
    pub names: ChampionNames,
}

impl ChampionCache {
    pub fn new(names: ChampionNames) -> Self {
        ChampionCache {
            fetched_at: Utc::now(),
            names,
        }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".league_compass")
            .join("champions.json")
    }

    /// `Ok(None)` when no cache file exists yet.
    pub fn load(path: &Path) -> Result<Option<Self>, AppError> {
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|e| AppError::JsonError(format!("Failed to parse champion cache: {}", e))),
            Err(_) => Ok(None),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| AppError::data_file(dir, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            AppError::JsonError(format!("Failed to serialize champion cache: {}", e))
        })?;
        fs::write(path, json).map_err(|e| AppError::data_file(path, e))
    }

    pub fn is_stale(&self, max_age_mins: u64) -> bool {
        let age = Utc::now().signed_duration_since(self.fetched_at);
        age.num_minutes() > max_age_mins as i64
    }
}
