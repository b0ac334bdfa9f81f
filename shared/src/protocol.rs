//! Identity types exchanged between the host engine and the game core.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of ticks per second driving cooldown timers
pub const DEFAULT_TICK_RATE: u32 = 20;

/// Stable per-player identifier (the player's steamid)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Team a player is currently on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Team {
    #[default]
    Unassigned = 0,
    Spectator = 1,
    Terrorist = 2,
    CounterTerrorist = 3,
}

impl Team {
    /// Whether players on this team take part in rounds
    pub fn is_playing(self) -> bool {
        matches!(self, Team::Terrorist | Team::CounterTerrorist)
    }
}

/// A participant of a game event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub steamid: SessionKey,
    #[serde(default)]
    pub team: Team,
}

impl Actor {
    pub fn new(steamid: impl Into<SessionKey>, team: Team) -> Self {
        Self {
            steamid: steamid.into(),
            team,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playing_teams() {
        assert!(Team::Terrorist.is_playing());
        assert!(Team::CounterTerrorist.is_playing());
        assert!(!Team::Spectator.is_playing());
        assert!(!Team::Unassigned.is_playing());
    }

    #[test]
    fn test_actor_team_defaults_when_missing() {
        let actor: Actor = serde_json::from_str(r#"{"steamid":"STEAM_0:1:2"}"#).unwrap();
        assert_eq!(actor.team, Team::Unassigned);
        assert_eq!(actor.steamid.as_str(), "STEAM_0:1:2");
    }
}
