use crate::error::AppError;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Z-score scale for the recommendation path's count tables.
pub const RECOMMEND_PENALTY_SCALE: f64 = 1.0;
/// Z-score scale for the clustering path.
pub const CLUSTER_PENALTY_SCALE: f64 = 0.4;

#[derive(Debug, Deserialize)]
struct CountRecord {
    #[serde(alias = "Champion")]
    champion: String,
    #[serde(alias = "Count")]
    count: f64,
}

/// Reads `[{"Champion": name, "Count": n}, ...]`.
pub fn load_counts(path: &Path) -> Result<BTreeMap<String, f64>, AppError> {
    let content = fs::read_to_string(path).map_err(|e| AppError::data_file(path, e))?;
    let records: Vec<CountRecord> =
        serde_json::from_str(&content).map_err(|e| AppError::data_file(path, e))?;
    Ok(records.into_iter().map(|r| (r.champion, r.count)).collect())
}

/// Multiplicative down-weighting of over-represented champions.
///
/// `weight = 1 / (1 + scale * max(z, 0))` where `z` is the champion's play
/// count z-score (sample standard deviation). Champions absent from the table
/// weigh 1.0.
#[derive(Debug, Clone, Default)]
pub struct PenaltyWeights {
    weights: HashMap<String, f64>,
}

impl PenaltyWeights {
    pub fn from_counts(counts: &BTreeMap<String, f64>, scale: f64) -> Self {
        let n = counts.len() as f64;
        let mean = counts.values().sum::<f64>() / n.max(1.0);
        let std = if counts.len() < 2 {
            0.0
        } else {
            let var = counts.values().map(|c| (c - mean).powi(2)).sum::<f64>() / (n - 1.0);
            var.sqrt()
        };

        let weights = counts
            .iter()
            .map(|(champ, &count)| {
                let weight = if std == 0.0 {
                    1.0
                } else {
                    let z = ((count - mean) / std).max(0.0);
                    1.0 / (1.0 + scale * z)
                };
                (champ.clone(), weight)
            })
            .collect();

        PenaltyWeights { weights }
    }

    pub fn get(&self, champion: &str) -> f64 {
        self.weights.get(champion).copied().unwrap_or(1.0)
    }
}
