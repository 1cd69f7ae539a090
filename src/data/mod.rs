//! Static reference data: population tables, role tables and penalty weights.
//!
//! Everything here is loaded once and never mutated afterwards.

pub mod champions;
pub mod frequency;
pub mod penalty;
pub mod roles;

use crate::error::AppError;
use frequency::PopulationMatrix;
use penalty::{PenaltyWeights, RECOMMEND_PENALTY_SCALE};
use roles::{PositionLists, RoleMap};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub master: PopulationMatrix,
    pub user: PopulationMatrix,
    pub roles: RoleMap,
    pub positions: PositionLists,
    pub master_penalty: PenaltyWeights,
    pub user_penalty: PenaltyWeights,
    common_vocabulary: Vec<String>,
}

impl ReferenceData {
    pub fn new(
        master: PopulationMatrix,
        user: PopulationMatrix,
        roles: RoleMap,
        positions: PositionLists,
        master_penalty: PenaltyWeights,
        user_penalty: PenaltyWeights,
    ) -> Self {
        let common_vocabulary = frequency::common_vocabulary(&master, &user);
        ReferenceData {
            master,
            user,
            roles,
            positions,
            master_penalty,
            user_penalty,
            common_vocabulary,
        }
    }

    /// Loads every reference table from `data_dir`. Any missing or malformed
    /// file fails the whole load.
    pub fn load(data_dir: &Path) -> Result<Self, AppError> {
        let master = PopulationMatrix::load(&data_dir.join("frequency").join("master.json"))?;
        let user = PopulationMatrix::load(&data_dir.join("frequency").join("user.json"))?;
        let roles = RoleMap::load(&data_dir.join("champion_roles.json"))?;
        let positions = PositionLists::load(&data_dir.join("positions"))?;

        let master_counts = penalty::load_counts(&data_dir.join("counts").join("master.json"))?;
        let user_counts = penalty::load_counts(&data_dir.join("counts").join("user.json"))?;

        let data = Self::new(
            master,
            user,
            roles,
            positions,
            PenaltyWeights::from_counts(&master_counts, RECOMMEND_PENALTY_SCALE),
            PenaltyWeights::from_counts(&user_counts, RECOMMEND_PENALTY_SCALE),
        );

        if data.common_vocabulary.is_empty() {
            return Err(AppError::Model(
                "master and user populations share no champions".to_string(),
            ));
        }

        info!(
            master_rows = data.master.n_rows(),
            user_rows = data.user.n_rows(),
            common_champions = data.common_vocabulary.len(),
            "reference data loaded"
        );
        Ok(data)
    }

    /// Champions present in both populations.
    pub fn common_vocabulary(&self) -> &[String] {
        &self.common_vocabulary
    }
}
