pub mod client;
pub mod endpoints;
pub mod models;

use crate::error::AppError;
use models::{ChampionMasteryDto, RiotId};

/// Where live player data comes from.
///
/// `RiotApiClient` is the production implementation; tests substitute an
/// in-memory fake.
pub trait PlayerDataSource {
    /// Resolves a Riot ID to the account's PUUID.
    fn resolve_player(&self, riot_id: &RiotId) -> Result<String, AppError>;

    /// Returns at most `limit` mastery entries, highest points first.
    fn top_mastery(&self, puuid: &str, limit: usize) -> Result<Vec<ChampionMasteryDto>, AppError>;
}
