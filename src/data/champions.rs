use crate::api::models::DataDragonChampions;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Numeric champion key → Data Dragon champion id (e.g. `266 → "Aatrox"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChampionNames {
    by_id: BTreeMap<i64, String>,
}

impl ChampionNames {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        ChampionNames {
            by_id: pairs.into_iter().map(|(id, name)| (id, name.into())).collect(),
        }
    }

    pub fn from_data_dragon(champions: &DataDragonChampions) -> Result<Self, AppError> {
        let mut by_id = BTreeMap::new();
        for info in champions.data.values() {
            let key = info.key.parse::<i64>().map_err(|_| {
                AppError::JsonError(format!("champion {} has non-numeric key {:?}", info.id, info.key))
            })?;
            by_id.insert(key, info.id.clone());
        }
        Ok(ChampionNames { by_id })
    }

    pub fn name(&self, champion_id: i64) -> Option<&str> {
        self.by_id.get(&champion_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
