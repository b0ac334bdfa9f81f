//! Server configuration loaded from a JSON file.
//!
//! Every key is optional; missing keys fall back to [`Config::default`].
//! Validation runs against the loaded catalog before the server starts.

use herowars_shared::{Catalog, CurveError, ExpCurve, SessionKey, DEFAULT_TICK_RATE};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file used when `HEROWARS_CONFIG` is not set
pub const DEFAULT_CONFIG_PATH: &str = "herowars.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading '{path:?}': {error}")]
    Io {
        error: std::io::Error,
        path: PathBuf,
    },
    #[error("Parse error in '{path:?}': {error}")]
    Parse {
        error: serde_json::Error,
        path: PathBuf,
    },
    #[error("no heroes are registered")]
    NoHeroes,
    #[error("no starting heroes are configured")]
    NoStartingHeroes,
    #[error("starting hero '{0}' is not registered")]
    UnknownStartingHero(String),
    #[error("invalid experience curve: {0}")]
    Curve(#[from] CurveError),
    #[error("item sell multiplier must be within 0..=1 (got {0})")]
    SellMultiplier(f32),
    #[error("tick rate must be positive")]
    TickRate,
}

/// Who receives the `_team` share of objective rewards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRewardPolicy {
    /// Teammates of the acting player
    #[default]
    ActorTeam,
    /// Every player on a playing team
    BothTeams,
}

/// How admin level grants outside a hero's range are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminLevelPolicy {
    #[default]
    Reject,
    Clamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_url: String,
    pub chat_command_prefix: String,
    pub admins: Vec<SessionKey>,
    /// Hero cids granted to every new player
    pub starting_heroes: Vec<String>,
    pub exp_values: HashMap<String, u64>,
    pub gold_values: HashMap<String, u64>,
    pub show_gold_messages: bool,
    pub exp_curve: ExpCurve,
    pub item_sell_value_multiplier: f32,
    pub default_hero_category: String,
    pub default_item_category: String,
    pub team_rewards: TeamRewardPolicy,
    pub admin_level_policy: AdminLevelPolicy,
    pub tick_rate: u32,
    /// Overrides for player-facing message templates
    pub messages: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let exp_values = [
            ("kill", 30),
            ("headshot", 15),
            ("assist", 15),
            ("weapon_knife", 30),
            ("round_win", 30),
            ("round_lose", 15),
            ("bomb_plant", 15),
            ("bomb_plant_team", 5),
            ("bomb_explode", 25),
            ("bomb_explode_team", 10),
            ("bomb_defuse", 30),
            ("bomb_defuse_team", 15),
            ("hostage_pick_up", 5),
            ("hostage_pick_up_team", 0),
            ("hostage_rescue", 25),
            ("hostage_rescue_team", 10),
        ];
        let gold_values = [("kill", 2), ("assist", 1), ("round_win", 3), ("round_lose", 2)];

        Self {
            database_url: "sqlite://herowars.db".into(),
            chat_command_prefix: "!".into(),
            admins: Vec::new(),
            starting_heroes: vec!["TestHero1".into()],
            exp_values: exp_values.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            gold_values: gold_values.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            show_gold_messages: true,
            exp_curve: ExpCurve::default(),
            item_sell_value_multiplier: 0.5,
            default_hero_category: "Others".into(),
            default_item_category: "Others".into(),
            team_rewards: TeamRewardPolicy::default(),
            admin_level_policy: AdminLevelPolicy::default(),
            tick_rate: DEFAULT_TICK_RATE,
            messages: HashMap::new(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
            error,
            path: path.to_path_buf(),
        })?;
        serde_json::from_str(&content).map_err(|error| ConfigError::Parse {
            error,
            path: path.to_path_buf(),
        })
    }

    /// Load `path`, or fall back to defaults if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            info!("Loading config from {:?}", path);
            Self::load(path)
        } else {
            info!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    pub fn validate(&self, catalog: &Catalog) -> Result<(), ConfigError> {
        if catalog.is_empty() {
            return Err(ConfigError::NoHeroes);
        }
        if self.starting_heroes.is_empty() {
            return Err(ConfigError::NoStartingHeroes);
        }
        if let Some(cid) = self
            .starting_heroes
            .iter()
            .find(|cid| catalog.find_hero(cid).is_none())
        {
            return Err(ConfigError::UnknownStartingHero(cid.clone()));
        }
        self.exp_curve.validate()?;
        if !(0.0..=1.0).contains(&self.item_sell_value_multiplier) {
            return Err(ConfigError::SellMultiplier(self.item_sell_value_multiplier));
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::TickRate);
        }
        Ok(())
    }

    pub fn exp_for(&self, key: &str) -> u64 {
        self.exp_values.get(key).copied().unwrap_or(0)
    }

    pub fn gold_for(&self, key: &str) -> u64 {
        self.gold_values.get(key).copied().unwrap_or(0)
    }

    pub fn is_admin(&self, steamid: &SessionKey) -> bool {
        self.admins.contains(steamid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herowars_shared::content;

    #[test]
    fn test_defaults_validate() {
        let catalog = content::default_catalog().unwrap();
        Config::default().validate(&catalog).unwrap();
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(
            r#"{
                "admins": ["STEAM_0:1:1"],
                "team_rewards": "both_teams",
                "exp_curve": { "kind": "table", "thresholds": [50, 75, 100] }
            }"#,
        )
        .unwrap();
        assert!(config.is_admin(&"STEAM_0:1:1".into()));
        assert_eq!(config.team_rewards, TeamRewardPolicy::BothTeams);
        assert_eq!(config.chat_command_prefix, "!");
        assert_eq!(config.exp_for("kill"), 30);
        assert_eq!(config.exp_curve.required(1), 75);
    }

    #[test]
    fn test_unknown_starting_hero_is_fatal() {
        let catalog = content::default_catalog().unwrap();
        let config = Config {
            starting_heroes: vec!["Nobody".into()],
            ..Config::default()
        };
        assert!(matches!(
            config.validate(&catalog),
            Err(ConfigError::UnknownStartingHero(cid)) if cid == "Nobody"
        ));
    }

    #[test]
    fn test_empty_catalog_is_fatal() {
        let catalog = Catalog::default();
        assert!(matches!(
            Config::default().validate(&catalog),
            Err(ConfigError::NoHeroes)
        ));
    }

    #[test]
    fn test_zero_curve_is_fatal() {
        let catalog = content::default_catalog().unwrap();
        let config = Config {
            exp_curve: ExpCurve::Linear {
                base: 0,
                per_level: 0,
            },
            ..Config::default()
        };
        assert!(matches!(config.validate(&catalog), Err(ConfigError::Curve(_))));
    }

    #[test]
    fn test_missing_keys_yield_zero() {
        let config = Config::default();
        assert_eq!(config.gold_for("headshot"), 0);
        assert_eq!(config.exp_for("weapon_deagle"), 0);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load_or_default(Path::new("/nonexistent/herowars.json")).unwrap();
        assert_eq!(config.tick_rate, DEFAULT_TICK_RATE);
    }
}
