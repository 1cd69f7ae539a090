use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use league_compass::api::client::RiotApiClient;
use league_compass::api::models::RiotId;
use league_compass::cache::ChampionCache;
use league_compass::config::Config;
use league_compass::data::champions::ChampionNames;
use league_compass::display::output::{
    display_error, display_existence, display_info, display_profile, display_success,
    profile_json,
};
use league_compass::engine::Engine;
use league_compass::error::AppError;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const CHAMPION_CACHE_MAX_AGE_MINS: u64 = 24 * 60;

#[derive(Parser, Debug)]
#[command(name = "League Compass")]
#[command(about = "Find your play style and champions that fit it", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Platform for mastery lookups (default: kr)
    #[arg(short, long, global = true)]
    platform: Option<String>,

    /// Regional host for account lookups (default: americas)
    #[arg(long, global = true)]
    account_region: Option<String>,

    /// Directory holding reference tables and model artifacts
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play-style cluster and per-role champion recommendations
    Recommend {
        /// Riot ID, e.g. "Hide on bush#KR1"
        riot_id: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Re-download the champion table from Data Dragon (ignore cache)
        #[arg(long)]
        refresh: bool,
    },
    /// Check whether a Riot ID exists
    Check {
        /// Riot ID, e.g. "Hide on bush#KR1"
        riot_id: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        display_error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let mut config = Config::from_env()?;
    if let Some(platform) = args.platform {
        config.platform = platform;
    }
    if let Some(region) = args.account_region {
        config.account_region = region;
    }
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(secs) = args.timeout {
        config.http_timeout = Duration::from_secs(secs);
    }

    let client = RiotApiClient::new(&config);

    match args.command {
        Command::Check { riot_id } => {
            let riot_id: RiotId = riot_id.parse()?;
            let exists = client.player_exists(&riot_id)?;
            display_existence(&riot_id.to_string(), exists);
            Ok(())
        }
        Command::Recommend {
            riot_id,
            json,
            refresh,
        } => {
            let riot_id: RiotId = riot_id.parse()?;
            let names = champion_names(&client, refresh, !json)?;

            let spinner = ProgressBar::new_spinner();
            if !json {
                spinner.set_message("Loading reference data and fitting cluster model");
                spinner.enable_steady_tick(Duration::from_millis(100));
            }
            let engine = Engine::load(&config.data_dir, names);
            spinner.finish_and_clear();
            let engine = engine?;

            if !json {
                display_info(&format!(
                    "Fetching mastery for {} on {}",
                    riot_id, config.platform
                ));
            }
            let profile = engine.profile(&client, &riot_id)?;

            if json {
                let body = serde_json::to_string_pretty(&profile_json(&profile))
                    .map_err(|e| AppError::JsonError(e.to_string()))?;
                println!("{}", body);
            } else {
                display_profile(&profile);
            }
            Ok(())
        }
    }
}

/// Champion table from the local cache when fresh, otherwise Data Dragon.
fn champion_names(
    client: &RiotApiClient,
    refresh: bool,
    verbose: bool,
) -> Result<ChampionNames, AppError> {
    let path = ChampionCache::default_path();

    if !refresh {
        match ChampionCache::load(&path) {
            Ok(Some(cache)) if !cache.is_stale(CHAMPION_CACHE_MAX_AGE_MINS) => {
                debug!(path = %path.display(), "using cached champion table");
                return Ok(cache.names);
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "ignoring unreadable champion cache"),
        }
    }

    if verbose {
        display_info("Downloading champion table from Data Dragon...");
    }
    let names = client.get_champion_mapping()?;
    if verbose {
        display_success(&format!("Loaded {} champions", names.len()));
    }

    let cache = ChampionCache::new(names);
    if let Err(e) = cache.save(&path) {
        warn!(error = %e, "could not write champion cache");
    }
    Ok(cache.names)
}
