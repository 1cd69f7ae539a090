use crate::config::Config;
use crate::data::champions::ChampionNames;
use crate::error::{AppError, ResolveFailure};
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use super::endpoints;
use super::models::*;
use super::PlayerDataSource;

const REQUESTS_PER_SECOND: NonZeroU32 = match NonZeroU32::new(20) {
    Some(n) => n,
    None => panic!("quota must be non-zero"),
};
const MAX_RETRIES: u32 = 3;
const USER_AGENT: &str = "league_compass/0.1.0";

/// API key sent with every Riot request. Never mutated after construction.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Credentials {
            api_key: api_key.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credentials(***)")
    }
}

#[derive(Debug)]
enum RequestError {
    Status(u16),
    RateLimited,
    Transport(String),
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::Status(code) => write!(f, "upstream returned status {}", code),
            RequestError::RateLimited => f.write_str("rate limited after retries"),
            RequestError::Transport(msg) => f.write_str(msg),
        }
    }
}

fn resolve_failure(err: RequestError) -> ResolveFailure {
    match err {
        RequestError::Status(400 | 404) => ResolveFailure::NotFound,
        RequestError::Status(401 | 403) => ResolveFailure::Unauthorized,
        other => ResolveFailure::Transient(other.to_string()),
    }
}

pub struct RiotApiClient {
    credentials: Credentials,
    platform: String,
    account_region: String,
    agent: ureq::Agent,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl RiotApiClient {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.http_timeout)
            .user_agent(USER_AGENT)
            .build();
        RiotApiClient {
            credentials: Credentials::new(config.api_key.clone()),
            platform: config.platform.clone(),
            account_region: config.account_region.clone(),
            agent,
            rate_limiter: RateLimiter::direct(Quota::per_second(REQUESTS_PER_SECOND)),
        }
    }

    fn wait_for_quota(&self) {
        while let Err(not_until) = self.rate_limiter.check() {
            let wait = not_until.wait_time_from(DefaultClock::default().now());
            thread::sleep(wait);
        }
    }

    fn execute_request(&self, url: &str, authorized: bool) -> Result<String, RequestError> {
        let mut retry_count = 0;

        loop {
            self.wait_for_quota();

            let mut request = self.agent.get(url);
            if authorized {
                request = request.set("X-Riot-Token", &self.credentials.api_key);
            }

            match request.call() {
                Ok(resp) => {
                    return resp
                        .into_string()
                        .map_err(|e| RequestError::Transport(e.to_string()));
                }
                Err(ureq::Error::Status(429, _)) => {
                    if retry_count >= MAX_RETRIES {
                        return Err(RequestError::RateLimited);
                    }
                    let wait_ms = 2000 * (retry_count + 1) as u64;
                    warn!(wait_ms, "rate limited by Riot API, backing off");
                    thread::sleep(Duration::from_millis(wait_ms));
                    retry_count += 1;
                }
                Err(ureq::Error::Status(code, _)) => return Err(RequestError::Status(code)),
                Err(e) => return Err(RequestError::Transport(e.to_string())),
            }
        }
    }

    fn fetch_account(&self, riot_id: &RiotId) -> Result<AccountDto, AppError> {
        let url = endpoints::account_by_riot_id(&self.account_region, riot_id);
        let resolution = |reason| AppError::Resolution {
            riot_id: riot_id.to_string(),
            reason,
        };

        let body = self
            .execute_request(&url, true)
            .map_err(|e| resolution(resolve_failure(e)))?;

        serde_json::from_str(&body)
            .map_err(|e| resolution(ResolveFailure::MalformedResponse(e.to_string())))
    }

    /// Reports whether an account exists for `riot_id`.
    ///
    /// Only a definite "not found" maps to `Ok(false)`; auth and transport
    /// failures are returned as errors.
    pub fn player_exists(&self, riot_id: &RiotId) -> Result<bool, AppError> {
        match self.fetch_account(riot_id) {
            Ok(_) => Ok(true),
            Err(AppError::Resolution {
                reason: ResolveFailure::NotFound,
                ..
            }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Downloads the id → name table for the latest Data Dragon release.
    pub fn get_champion_mapping(&self) -> Result<ChampionNames, AppError> {
        let body = self
            .execute_request(endpoints::DATA_DRAGON_VERSIONS, false)
            .map_err(|e| AppError::HttpError(e.to_string()))?;
        let versions: Vec<String> =
            serde_json::from_str(&body).map_err(|e| AppError::JsonError(e.to_string()))?;
        let latest = versions
            .first()
            .ok_or_else(|| AppError::JsonError("Data Dragon returned no versions".to_string()))?;
        debug!(version = %latest, "fetching champion data");

        let body = self
            .execute_request(&endpoints::data_dragon_champions(latest), false)
            .map_err(|e| AppError::HttpError(e.to_string()))?;
        let champions: DataDragonChampions =
            serde_json::from_str(&body).map_err(|e| AppError::JsonError(e.to_string()))?;

        ChampionNames::from_data_dragon(&champions)
    }
}

impl PlayerDataSource for RiotApiClient {
    fn resolve_player(&self, riot_id: &RiotId) -> Result<String, AppError> {
        let account = self.fetch_account(riot_id)?;
        match account.puuid {
            Some(puuid) if !puuid.is_empty() => Ok(puuid),
            _ => Err(AppError::Resolution {
                riot_id: riot_id.to_string(),
                reason: ResolveFailure::MalformedResponse("missing 'puuid'".to_string()),
            }),
        }
    }

    fn top_mastery(&self, puuid: &str, limit: usize) -> Result<Vec<ChampionMasteryDto>, AppError> {
        let url = endpoints::champion_masteries_by_puuid(&self.platform, puuid);
        let body = self
            .execute_request(&url, true)
            .map_err(|e| AppError::UpstreamData(e.to_string()))?;

        let mut entries: Vec<ChampionMasteryDto> = serde_json::from_str(&body)
            .map_err(|e| AppError::UpstreamData(format!("undecodable mastery list: {}", e)))?;
        entries.sort_by(|a, b| b.champion_points.cmp(&a.champion_points));
        entries.truncate(limit);
        Ok(entries)
    }
}
