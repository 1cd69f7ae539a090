use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Top,
    Jungle,
    #[serde(alias = "Middle")]
    Mid,
    #[serde(alias = "Bot", alias = "ADC")]
    Bottom,
    #[serde(alias = "Utility")]
    Support,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Top, Role::Jungle, Role::Mid, Role::Bottom, Role::Support];

    /// File stem of this role's position list.
    pub fn file_stem(self) -> &'static str {
        match self {
            Role::Top => "top",
            Role::Jungle => "jungle",
            Role::Mid => "mid",
            Role::Bottom => "bottom",
            Role::Support => "support",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Top => "Top",
            Role::Jungle => "Jungle",
            Role::Mid => "Mid",
            Role::Bottom => "Bottom",
            Role::Support => "Support",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChampionRoles {
    #[serde(default)]
    pub main_role: Option<Role>,
    #[serde(default)]
    pub sub_role: Option<Role>,
}

/// Champion → main/sub role, from `champion_roles.json`.
#[derive(Debug, Clone, Default)]
pub struct RoleMap {
    roles: HashMap<String, ChampionRoles>,
}

impl RoleMap {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).map_err(|e| AppError::data_file(path, e))?;
        let roles = serde_json::from_str(&content).map_err(|e| AppError::data_file(path, e))?;
        Ok(RoleMap { roles })
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, ChampionRoles)>,
        S: Into<String>,
    {
        RoleMap {
            roles: entries.into_iter().map(|(c, r)| (c.into(), r)).collect(),
        }
    }

    pub fn get(&self, champion: &str) -> Option<&ChampionRoles> {
        self.roles.get(champion)
    }

    /// Union of main and sub roles over `champions`.
    pub fn roles_played<'a, I>(&self, champions: I) -> BTreeSet<Role>
    where
        I: IntoIterator<Item = &'a String>,
    {
        champions
            .into_iter()
            .filter_map(|c| self.roles.get(c))
            .flat_map(|r| r.main_role.into_iter().chain(r.sub_role))
            .collect()
    }
}

/// Champion → every lane it is listed under.
///
/// Unlike `RoleMap`, a champion may appear in several lists.
#[derive(Debug, Clone, Default)]
pub struct PositionLists {
    positions: BTreeMap<String, Vec<Role>>,
}

impl PositionLists {
    /// Reads `<dir>/<role>.json` for each of the five roles.
    pub fn load(dir: &Path) -> Result<Self, AppError> {
        let mut lists = Vec::with_capacity(Role::ALL.len());
        for role in Role::ALL {
            let path = dir.join(format!("{}.json", role.file_stem()));
            let content = fs::read_to_string(&path).map_err(|e| AppError::data_file(&path, e))?;
            let champions: Vec<String> =
                serde_json::from_str(&content).map_err(|e| AppError::data_file(&path, e))?;
            lists.push((role, champions));
        }
        Ok(Self::from_lists(lists))
    }

    pub fn from_lists<I, C, S>(lists: I) -> Self
    where
        I: IntoIterator<Item = (Role, C)>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut positions: BTreeMap<String, Vec<Role>> = BTreeMap::new();
        for (role, champions) in lists {
            for champion in champions {
                let entry = positions.entry(champion.into()).or_default();
                if !entry.contains(&role) {
                    entry.push(role);
                }
            }
        }
        PositionLists { positions }
    }

    pub fn positions_of(&self, champion: &str) -> &[Role] {
        self.positions.get(champion).map(Vec::as_slice).unwrap_or(&[])
    }
}
