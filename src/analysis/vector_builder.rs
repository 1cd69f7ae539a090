use crate::api::models::ChampionMasteryDto;
use crate::data::champions::ChampionNames;
use crate::data::penalty::PenaltyWeights;
use std::collections::BTreeMap;
use tracing::debug;

/// Champion name → non-negative usage score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChampionVector {
    values: BTreeMap<String, f64>,
}

impl ChampionVector {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        ChampionVector {
            values: pairs.into_iter().map(|(c, v)| (c.into(), v)).collect(),
        }
    }

    pub fn get(&self, champion: &str) -> f64 {
        self.values.get(champion).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(c, v)| (c.as_str(), *v))
    }

    pub fn sum(&self) -> f64 {
        self.values.values().sum()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Element-wise multiplication by penalty weights. The result is not
    /// re-normalized.
    pub fn penalized(&self, weights: &PenaltyWeights) -> Self {
        ChampionVector {
            values: self
                .values
                .iter()
                .map(|(c, v)| (c.clone(), v * weights.get(c)))
                .collect(),
        }
    }
}

/// No mastery record survived vocabulary filtering, or every kept record had
/// zero points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsufficientData;

/// Turns a mastery sample into a share-of-total log1p vector.
pub struct VectorBuilder<'a> {
    names: &'a ChampionNames,
}

impl<'a> VectorBuilder<'a> {
    pub fn new(names: &'a ChampionNames) -> Self {
        VectorBuilder { names }
    }

    /// Names of the sampled champions in mastery order. Ids without a name
    /// are skipped.
    pub fn input_champions(&self, sample: &[ChampionMasteryDto]) -> Vec<String> {
        sample
            .iter()
            .filter_map(|m| self.names.name(m.champion_id))
            .map(str::to_string)
            .collect()
    }

    /// `v[c] = log1p(points_c) / Σ log1p(points)` over records whose champion
    /// is named and belongs to `vocabulary`. Every other record contributes
    /// nothing, not even to the denominator.
    pub fn build(
        &self,
        sample: &[ChampionMasteryDto],
        vocabulary: &[String],
    ) -> Result<ChampionVector, InsufficientData> {
        let mut values: BTreeMap<String, f64> = BTreeMap::new();

        for mastery in sample {
            let Some(name) = self.names.name(mastery.champion_id) else {
                debug!(champion_id = mastery.champion_id, "unknown champion id dropped");
                continue;
            };
            if !vocabulary.iter().any(|c| c == name) {
                debug!(champion = name, "champion outside vocabulary dropped");
                continue;
            }
            let score = (mastery.champion_points.max(0) as f64).ln_1p();
            *values.entry(name.to_string()).or_insert(0.0) += score;
        }

        let total: f64 = values.values().sum();
        if total <= 0.0 {
            return Err(InsufficientData);
        }

        for value in values.values_mut() {
            *value /= total;
        }
        values.retain(|_, v| *v > 0.0);
        Ok(ChampionVector { values })
    }
}
