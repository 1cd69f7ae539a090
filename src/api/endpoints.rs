// URL builders for the Riot and Data Dragon endpoints the client calls.

use super::models::RiotId;

pub const DATA_DRAGON_VERSIONS: &str = "https://ddragon.leagueoflegends.com/api/versions.json";

pub fn account_by_riot_id(account_region: &str, riot_id: &RiotId) -> String {
    format!(
        "https://{}.api.riotgames.com/riot/account/v1/accounts/by-riot-id/{}/{}",
        account_region,
        urlencoding::encode(&riot_id.game_name),
        urlencoding::encode(&riot_id.tag_line)
    )
}

pub fn champion_masteries_by_puuid(platform: &str, puuid: &str) -> String {
    format!(
        "https://{}.api.riotgames.com/lol/champion-mastery/v4/champion-masteries/by-puuid/{}",
        platform,
        urlencoding::encode(puuid)
    )
}

pub fn data_dragon_champions(version: &str) -> String {
    format!(
        "https://ddragon.leagueoflegends.com/cdn/{}/data/en_US/champion.json",
        version
    )
}
