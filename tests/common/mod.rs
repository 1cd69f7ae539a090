#![allow(dead_code)]

use league_compass::api::models::{ChampionMasteryDto, RiotId};
use league_compass::api::PlayerDataSource;
use league_compass::data::champions::ChampionNames;
use league_compass::data::frequency::PopulationMatrix;
use league_compass::data::penalty::{PenaltyWeights, RECOMMEND_PENALTY_SCALE};
use league_compass::data::roles::{ChampionRoles, PositionLists, Role, RoleMap};
use league_compass::data::ReferenceData;
use league_compass::engine::Engine;
use league_compass::error::{AppError, ResolveFailure};
use league_compass::model::cluster::ClusterFitParams;
use league_compass::model::projection::FittedModel;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

pub const UNKNOWN_CHAMPION_ID: i64 = 999;

/// (id, name, main role, sub role, positions)
pub const CHAMPIONS: &[(i64, &str, Role, Option<Role>, &[Role])] = &[
    (1, "Garen", Role::Top, None, &[Role::Top]),
    (2, "Darius", Role::Top, None, &[Role::Top]),
    (3, "Malphite", Role::Top, Some(Role::Support), &[Role::Top, Role::Support]),
    (4, "Teemo", Role::Top, None, &[Role::Top]),
    (5, "LeeSin", Role::Jungle, Some(Role::Top), &[Role::Jungle]),
    (6, "Graves", Role::Jungle, Some(Role::Top), &[Role::Jungle, Role::Top]),
    (7, "Amumu", Role::Jungle, None, &[Role::Jungle]),
    (8, "Ahri", Role::Mid, None, &[Role::Mid]),
    (9, "Syndra", Role::Mid, None, &[Role::Mid]),
    (10, "Zed", Role::Mid, None, &[Role::Mid]),
    (11, "Azir", Role::Mid, None, &[Role::Mid]),
    (12, "Jinx", Role::Bottom, None, &[Role::Bottom]),
    (13, "Ezreal", Role::Bottom, Some(Role::Mid), &[Role::Bottom]),
    (14, "Caitlyn", Role::Bottom, None, &[Role::Bottom]),
    (15, "Thresh", Role::Support, None, &[Role::Support]),
    (16, "Lulu", Role::Support, Some(Role::Mid), &[Role::Support]),
    (17, "Leona", Role::Support, None, &[Role::Support]),
];

/// Only in the master population.
pub const MASTER_ONLY: &str = "Azir";
/// Only in the user population.
pub const USER_ONLY: &str = "Teemo";

pub fn id_of(name: &str) -> i64 {
    CHAMPIONS
        .iter()
        .find(|c| c.1 == name)
        .map(|c| c.0)
        .expect("fixture champion")
}

pub fn champion_names() -> ChampionNames {
    ChampionNames::from_pairs(CHAMPIONS.iter().map(|c| (c.0, c.1)))
}

fn pool(role: Role, exclude: &str) -> Vec<&'static str> {
    CHAMPIONS
        .iter()
        .filter(|c| c.2 == role && c.1 != exclude)
        .map(|c| c.1)
        .collect()
}

/// Players favour one lane's champions plus one off-lane pick.
pub fn population(rows: usize, seed: u64, exclude: &str) -> BTreeMap<String, BTreeMap<String, Option<f64>>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let everyone: Vec<&str> = CHAMPIONS
        .iter()
        .map(|c| c.1)
        .filter(|c| *c != exclude)
        .collect();

    (0..rows)
        .map(|i| {
            let role = Role::ALL[i % Role::ALL.len()];
            let mut cells = BTreeMap::new();
            for champ in pool(role, exclude) {
                if rng.gen_bool(0.8) {
                    cells.insert(champ.to_string(), Some(rng.gen_range(2.0..9.0)));
                }
            }
            let extra = everyone[rng.gen_range(0..everyone.len())];
            cells
                .entry(extra.to_string())
                .or_insert(Some(rng.gen_range(0.5..3.0)));
            (format!("player-{:03}", i), cells)
        })
        .collect()
}

pub fn counts(matrix: &PopulationMatrix) -> BTreeMap<String, f64> {
    matrix.nonzero_counts()
}

pub fn roles() -> RoleMap {
    RoleMap::from_entries(CHAMPIONS.iter().map(|c| {
        (
            c.1,
            ChampionRoles {
                main_role: Some(c.2),
                sub_role: c.3,
            },
        )
    }))
}

pub fn positions() -> PositionLists {
    PositionLists::from_lists(Role::ALL.iter().map(|role| {
        let champions: Vec<&str> = CHAMPIONS
            .iter()
            .filter(|c| c.4.contains(role))
            .map(|c| c.1)
            .collect();
        (*role, champions)
    }))
}

pub fn reference_data() -> ReferenceData {
    let master = PopulationMatrix::from_rows(population(150, 11, USER_ONLY)).unwrap();
    let user = PopulationMatrix::from_rows(population(120, 23, MASTER_ONLY)).unwrap();
    let master_penalty = PenaltyWeights::from_counts(&counts(&master), RECOMMEND_PENALTY_SCALE);
    let user_penalty = PenaltyWeights::from_counts(&counts(&user), RECOMMEND_PENALTY_SCALE);
    ReferenceData::new(master, user, roles(), positions(), master_penalty, user_penalty)
}

/// The recommendation model fitted the way the offline job does it: over the
/// master population's common-vocabulary columns.
pub fn recommend_model(reference: &ReferenceData) -> FittedModel {
    let features = reference.common_vocabulary().to_vec();
    let x = reference.master.select_columns(&features);
    FittedModel::fit("recommend", "test", features, &x, 0.9).unwrap()
}

pub fn cluster_params() -> ClusterFitParams {
    ClusterFitParams {
        min_play_count: 20,
        ..ClusterFitParams::default()
    }
}

pub fn engine() -> Engine {
    let reference = reference_data();
    let model = recommend_model(&reference);
    Engine::new(reference, champion_names(), model, &cluster_params()).unwrap()
}

pub fn mastery(pairs: &[(&str, i64)]) -> Vec<ChampionMasteryDto> {
    pairs
        .iter()
        .map(|(name, points)| ChampionMasteryDto::new(id_of(name), *points))
        .collect()
}

/// In-memory stand-in for the Riot API.
pub struct FakeSource {
    pub accounts: BTreeMap<String, String>,
    pub masteries: BTreeMap<String, Result<Vec<ChampionMasteryDto>, String>>,
    pub unauthorized: bool,
}

impl FakeSource {
    pub fn new() -> Self {
        FakeSource {
            accounts: BTreeMap::new(),
            masteries: BTreeMap::new(),
            unauthorized: false,
        }
    }

    pub fn with_player(mut self, riot_id: &str, sample: Vec<ChampionMasteryDto>) -> Self {
        let puuid = format!("puuid-{}", self.accounts.len());
        self.accounts.insert(riot_id.to_string(), puuid.clone());
        self.masteries.insert(puuid, Ok(sample));
        self
    }

    pub fn with_broken_mastery(mut self, riot_id: &str) -> Self {
        let puuid = format!("puuid-{}", self.accounts.len());
        self.accounts.insert(riot_id.to_string(), puuid.clone());
        self.masteries
            .insert(puuid, Err("upstream returned status 503".to_string()));
        self
    }
}

impl PlayerDataSource for FakeSource {
    fn resolve_player(&self, riot_id: &RiotId) -> Result<String, AppError> {
        let key = riot_id.to_string();
        if self.unauthorized {
            return Err(AppError::Resolution {
                riot_id: key,
                reason: ResolveFailure::Unauthorized,
            });
        }
        self.accounts.get(&key).cloned().ok_or(AppError::Resolution {
            riot_id: key,
            reason: ResolveFailure::NotFound,
        })
    }

    fn top_mastery(&self, puuid: &str, limit: usize) -> Result<Vec<ChampionMasteryDto>, AppError> {
        match self.masteries.get(puuid) {
            Some(Ok(sample)) => Ok(sample.iter().take(limit).cloned().collect()),
            Some(Err(msg)) => Err(AppError::UpstreamData(msg.clone())),
            None => Ok(Vec::new()),
        }
    }
}
