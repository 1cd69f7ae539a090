use crate::error::AppError;
use ndarray::{Array2, Axis};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

/// Player rows × champion columns of log1p play frequencies.
///
/// Rows and columns are sorted by name so every derived table has a stable
/// order. Cells absent from the source file are 0.
#[derive(Debug, Clone)]
pub struct PopulationMatrix {
    players: Vec<String>,
    champions: Vec<String>,
    column_index: HashMap<String, usize>,
    values: Array2<f64>,
}

type RawRows = BTreeMap<String, BTreeMap<String, Option<f64>>>;

impl PopulationMatrix {
    /// Reads a `{player: {champion: value}}` JSON table.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).map_err(|e| AppError::data_file(path, e))?;
        let rows: RawRows =
            serde_json::from_str(&content).map_err(|e| AppError::data_file(path, e))?;
        Self::from_rows(rows).map_err(|e| AppError::data_file(path, e))
    }

    pub fn from_rows<P, C>(rows: BTreeMap<P, BTreeMap<C, Option<f64>>>) -> Result<Self, AppError>
    where
        P: Into<String> + Ord,
        C: Into<String> + Ord,
    {
        let rows: Vec<(String, Vec<(String, f64)>)> = rows
            .into_iter()
            .map(|(player, cells)| {
                let cells = cells
                    .into_iter()
                    .map(|(champ, value)| (champ.into(), value.unwrap_or(0.0)))
                    .collect();
                (player.into(), cells)
            })
            .collect();

        let champions: Vec<String> = rows
            .iter()
            .flat_map(|(_, cells)| cells.iter().map(|(champ, _)| champ.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let column_index: HashMap<String, usize> = champions
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();

        let mut values = Array2::zeros((rows.len(), champions.len()));
        let mut players = Vec::with_capacity(rows.len());
        for (r, (player, cells)) in rows.into_iter().enumerate() {
            for (champ, value) in cells {
                if !value.is_finite() || value < 0.0 {
                    return Err(AppError::Model(format!(
                        "player {} has invalid value {} for {}",
                        player, value, champ
                    )));
                }
                values[[r, column_index[&champ]]] = value;
            }
            players.push(player);
        }

        if players.is_empty() {
            return Err(AppError::Model("population table has no rows".to_string()));
        }

        Ok(PopulationMatrix {
            players,
            champions,
            column_index,
            values,
        })
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn champions(&self) -> &[String] {
        &self.champions
    }

    pub fn contains(&self, champion: &str) -> bool {
        self.column_index.contains_key(champion)
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Dense copy of the named columns in the given order; unknown names
    /// become all-zero columns.
    pub fn select_columns(&self, names: &[String]) -> Array2<f64> {
        let mut out = Array2::zeros((self.n_rows(), names.len()));
        for (j, name) in names.iter().enumerate() {
            if let Some(&src) = self.column_index.get(name) {
                out.column_mut(j).assign(&self.values.column(src));
            }
        }
        out
    }

    /// Number of rows in which each champion has a non-zero entry.
    pub fn nonzero_counts(&self) -> BTreeMap<String, f64> {
        self.champions
            .iter()
            .enumerate()
            .map(|(j, name)| {
                let count = self.values.column(j).iter().filter(|v| **v > 0.0).count();
                (name.clone(), count as f64)
            })
            .collect()
    }

    /// Column means over the given row indices.
    pub fn mean_of_rows(&self, rows: &[usize]) -> BTreeMap<String, f64> {
        if rows.is_empty() {
            return BTreeMap::new();
        }
        let subset = self.values.select(Axis(0), rows);
        let means = subset.mean_axis(Axis(0)).unwrap_or_default();
        self.champions
            .iter()
            .cloned()
            .zip(means.iter().copied())
            .collect()
    }
}

/// Champions present in both populations, sorted.
pub fn common_vocabulary(a: &PopulationMatrix, b: &PopulationMatrix) -> Vec<String> {
    a.champions()
        .iter()
        .filter(|c| b.contains(c))
        .cloned()
        .collect()
}
