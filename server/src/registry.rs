//! In-memory registry of connected players.
//!
//! Players are loaded from the database on first sight and written back
//! before they are dropped. Heroes are identified across the registry by
//! their [`HeroId`], which is how level-up notifications find their owner.

use crate::entities::{Player, PlayerError};
use crate::persistence::Database;
use herowars_shared::{Catalog, Entity, ExpCurve, Hero, HeroId, SessionKey, Team};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("player {0} is not registered")]
    NotFound(SessionKey),
    #[error("unknown hero '{0}'")]
    UnknownHero(String),
    #[error(transparent)]
    Player(#[from] PlayerError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct PlayerRegistry {
    players: HashMap<SessionKey, Player>,
    database: Database,
    catalog: Arc<Catalog>,
    curve: Arc<ExpCurve>,
    starting_heroes: Vec<String>,
}

impl PlayerRegistry {
    pub fn new(
        database: Database,
        catalog: Arc<Catalog>,
        curve: Arc<ExpCurve>,
        starting_heroes: Vec<String>,
    ) -> Self {
        Self {
            players: HashMap::new(),
            database,
            catalog,
            curve,
            starting_heroes,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn curve(&self) -> &Arc<ExpCurve> {
        &self.curve
    }

    pub fn get(&self, steamid: &SessionKey) -> Option<&Player> {
        self.players.get(steamid)
    }

    pub fn get_mut(&mut self, steamid: &SessionKey) -> Option<&mut Player> {
        self.players.get_mut(steamid)
    }

    pub fn contains(&self, steamid: &SessionKey) -> bool {
        self.players.contains_key(steamid)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.values_mut()
    }

    /// Session keys of every player currently on `team`
    pub fn team_members(&self, team: Team) -> Vec<SessionKey> {
        self.players
            .values()
            .filter(|player| player.team() == team)
            .map(|player| player.steamid().clone())
            .collect()
    }

    /// Session keys of every player on a playing team
    pub fn playing(&self) -> Vec<SessionKey> {
        self.players
            .values()
            .filter(|player| player.team().is_playing())
            .map(|player| player.steamid().clone())
            .collect()
    }

    /// Find the player owning the hero with `id`
    pub fn owner_of(&self, id: HeroId) -> Option<&SessionKey> {
        self.players
            .values()
            .find(|player| player.owns_hero_id(id))
            .map(Player::steamid)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Return the player, loading or creating them on first sight
    pub async fn create(&mut self, steamid: &SessionKey) -> Result<&mut Player, RegistryError> {
        if !self.players.contains_key(steamid) {
            let player = self.load(steamid).await?;
            info!(
                "Player {} joined with {} heroes, active {:?}",
                steamid,
                player.heroes().len(),
                player.active_cid()
            );
            self.players.insert(steamid.clone(), player);
        }
        self.players
            .get_mut(steamid)
            .ok_or_else(|| RegistryError::NotFound(steamid.clone()))
    }

    async fn load(&self, steamid: &SessionKey) -> Result<Player, RegistryError> {
        let stored = self
            .database
            .load_stored(steamid, &self.catalog, &self.curve)
            .await?;

        let mut player = Player::new(steamid.clone());
        player.give_gold(stored.gold);
        for hero in stored.heroes {
            player.add_hero(hero)?;
        }
        for cid in &self.starting_heroes {
            if player.owns(cid) {
                continue;
            }
            match self.catalog.find_hero(cid) {
                Some(def) => player.add_hero(Hero::new(def, Arc::clone(&self.curve)))?,
                None => warn!("Starting hero '{}' is not registered", cid),
            }
        }

        let active = stored
            .active_hero
            .filter(|cid| player.owns(cid))
            .or_else(|| {
                self.starting_heroes
                    .iter()
                    .find(|cid| player.owns(cid))
                    .cloned()
            })
            .or_else(|| player.heroes().first().map(|hero| hero.cid().to_string()));
        if let Some(cid) = active {
            player.switch_hero(&cid)?;
        }
        Ok(player)
    }

    /// Persist and drop a player
    pub async fn remove(&mut self, steamid: &SessionKey) -> Result<Option<Player>, RegistryError> {
        let Some(player) = self.players.get(steamid) else {
            return Ok(None);
        };
        self.database
            .save_all(steamid, player.gold(), player.active_cid(), player.heroes())
            .await?;
        info!("Player {} left, data saved", steamid);
        Ok(self.players.remove(steamid))
    }

    /// Persist the player row and the active hero
    pub async fn save(&self, steamid: &SessionKey) -> Result<(), RegistryError> {
        let player = self
            .players
            .get(steamid)
            .ok_or_else(|| RegistryError::NotFound(steamid.clone()))?;
        self.database
            .save_player(steamid, player.gold(), player.active_cid())
            .await?;
        if let Some(hero) = player.hero() {
            self.database.save_hero(steamid, hero).await?;
        }
        debug!("Saved {}", steamid);
        Ok(())
    }

    /// Persist every player and clear the registry
    pub async fn unload(&mut self) -> Result<usize, RegistryError> {
        for (steamid, player) in &self.players {
            self.database
                .save_all(steamid, player.gold(), player.active_cid(), player.heroes())
                .await?;
        }
        let count = self.players.len();
        self.players.clear();
        info!("Unloaded {} players", count);
        Ok(count)
    }

    // =========================================================================
    // Heroes
    // =========================================================================

    /// Switch the active hero, persisting the outgoing one first
    pub async fn set_active_hero(&mut self, steamid: &SessionKey, cid: &str) -> Result<(), RegistryError> {
        let player = self
            .players
            .get_mut(steamid)
            .ok_or_else(|| RegistryError::NotFound(steamid.clone()))?;
        if !player.owns(cid) {
            return Err(PlayerError::HeroNotOwned {
                steamid: steamid.clone(),
                cid: cid.to_string(),
            }
            .into());
        }
        if player.active_cid() == Some(cid) {
            return Ok(());
        }
        if let Some(outgoing) = player.hero() {
            self.database.save_hero(steamid, outgoing).await?;
        }
        self.database
            .save_player(steamid, player.gold(), Some(cid))
            .await?;
        player.switch_hero(cid)?;
        info!("Player {} switched to {}", steamid, cid);
        Ok(())
    }

    /// Buy a hero with gold and make it active
    pub async fn buy_hero(&mut self, steamid: &SessionKey, cid: &str) -> Result<(), RegistryError> {
        let def = self
            .catalog
            .find_hero(cid)
            .ok_or_else(|| RegistryError::UnknownHero(cid.to_string()))?;
        let player = self
            .players
            .get_mut(steamid)
            .ok_or_else(|| RegistryError::NotFound(steamid.clone()))?;
        if player.owns(cid) {
            return Err(PlayerError::HeroAlreadyOwned(cid.to_string()).into());
        }
        let cost = u64::from(def.cost);
        let Some(remaining) = player.gold().checked_sub(cost) else {
            return Err(PlayerError::NotEnoughGold {
                gold: player.gold(),
                cost,
            }
            .into());
        };

        // Nothing changes in memory until storage has accepted the purchase
        let hero = Hero::new(def, Arc::clone(&self.curve));
        if let Some(outgoing) = player.hero() {
            self.database.save_hero(steamid, outgoing).await?;
        }
        self.database.save_purchase(steamid, remaining, &hero).await?;

        player.spend_gold(cost)?;
        player.add_hero(hero)?;
        player.switch_hero(cid)?;
        info!("Player {} bought {} for {} gold", steamid, cid, def.cost);
        Ok(())
    }

    /// Advance every hero's cooldowns
    pub fn tick(&mut self, delta: f32) {
        for player in self.players.values_mut() {
            for hero in player.heroes_mut() {
                hero.tick(delta);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence;
    use herowars_shared::content::{self, EXP_BOOST, LUCKY_CHARM, TEST_HERO_2};
    use herowars_shared::Item;

    async fn registry() -> PlayerRegistry {
        let db = persistence::init("sqlite::memory:").await.unwrap();
        PlayerRegistry::new(
            db,
            Arc::new(content::default_catalog().unwrap()),
            Arc::new(ExpCurve::default()),
            vec!["TestHero1".into()],
        )
    }

    #[tokio::test]
    async fn test_new_player_gets_starting_hero() {
        let mut registry = registry().await;
        let steamid = SessionKey::new("STEAM_0:0:1");
        let player = registry.create(&steamid).await.unwrap();
        assert_eq!(player.active_cid(), Some("TestHero1"));
        assert_eq!(player.gold(), 0);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let mut registry = registry().await;
        let steamid = SessionKey::new("STEAM_0:0:1");
        registry.create(&steamid).await.unwrap().give_gold(9);
        let player = registry.create(&steamid).await.unwrap();
        assert_eq!(player.gold(), 9);
    }

    #[tokio::test]
    async fn test_remove_then_create_restores_state() {
        let mut registry = registry().await;
        let steamid = SessionKey::new("STEAM_0:1:42");
        {
            let player = registry.create(&steamid).await.unwrap();
            player.give_gold(30);
            let hero = player.hero_mut().unwrap();
            hero.set_level(4).unwrap();
            hero.set_exp(17).unwrap();
            hero.upgrade_skill("Ignite").unwrap();
            hero.upgrade_skill("Ignite").unwrap();
        }
        assert!(registry.remove(&steamid).await.unwrap().is_some());
        assert!(!registry.contains(&steamid));

        let player = registry.create(&steamid).await.unwrap();
        assert_eq!(player.gold(), 30);
        assert_eq!(player.cash(), 0);
        let hero = player.hero().unwrap();
        assert_eq!(hero.level(), 4);
        assert_eq!(hero.exp(), 17);
        assert_eq!(hero.skill("Ignite").map(|s| s.level()), Some(2));
    }

    #[tokio::test]
    async fn test_remove_persists_inactive_heroes() {
        let mut registry = registry().await;
        let steamid = SessionKey::new("STEAM_0:1:43");
        let curve = Arc::clone(registry.curve());
        {
            let player = registry.create(&steamid).await.unwrap();
            let mut second = Hero::new(&TEST_HERO_2, curve);
            second.set_level(3).unwrap();
            second.set_exp(25).unwrap();
            second.upgrade_skill("Vampirism").unwrap();
            player.add_hero(second).unwrap();
            assert_eq!(player.active_cid(), Some("TestHero1"));
        }
        registry.remove(&steamid).await.unwrap();

        let player = registry.create(&steamid).await.unwrap();
        assert_eq!(player.active_cid(), Some("TestHero1"));
        let second = player.hero_by_cid("TestHero2").unwrap();
        assert_eq!(second.level(), 3);
        assert_eq!(second.exp(), 25);
        assert_eq!(second.skill("Vampirism").map(|s| s.level()), Some(1));
    }

    #[tokio::test]
    async fn test_remove_unknown_player() {
        let mut registry = registry().await;
        assert!(registry.remove(&"ghost".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_switch_persists_outgoing_and_drops_items() {
        let mut registry = registry().await;
        let steamid = SessionKey::new("STEAM_0:0:3");
        let curve = Arc::clone(registry.curve());
        {
            let player = registry.create(&steamid).await.unwrap();
            let mut second = Hero::new(&TEST_HERO_2, curve);
            second.add_item(Item::new(&EXP_BOOST)).unwrap();
            player.add_hero(second).unwrap();

            let hero = player.hero_mut().unwrap();
            hero.set_level(3).unwrap();
            hero.set_exp(40).unwrap();
            hero.add_item(Item::new(&EXP_BOOST)).unwrap();
            hero.add_item(Item::new(&LUCKY_CHARM)).unwrap();
        }

        registry.set_active_hero(&steamid, "TestHero2").await.unwrap();

        let player = registry.get(&steamid).unwrap();
        assert_eq!(player.active_cid(), Some("TestHero2"));
        let outgoing = player.hero_by_cid("TestHero1").unwrap();
        let cids: Vec<&str> = outgoing.items().iter().map(|i| i.cid()).collect();
        assert_eq!(cids, vec!["LuckyCharm"]);
        assert_eq!(player.hero().unwrap().items().len(), 1);

        let rows = registry.database.load_hero_rows(&steamid).await.unwrap();
        let stored = rows.iter().find(|row| row.cid == "TestHero1").unwrap();
        assert_eq!((stored.level, stored.exp), (3, 40));
        let row = registry.database.load_player(&steamid).await.unwrap().unwrap();
        assert_eq!(row.hero_cid.as_deref(), Some("TestHero2"));
    }

    #[tokio::test]
    async fn test_switch_to_unowned_hero_fails() {
        let mut registry = registry().await;
        let steamid = SessionKey::new("STEAM_0:0:4");
        registry.create(&steamid).await.unwrap();
        assert!(matches!(
            registry.set_active_hero(&steamid, "TestHero2").await,
            Err(RegistryError::Player(PlayerError::HeroNotOwned { .. }))
        ));
    }

    #[tokio::test]
    async fn test_buy_hero_spends_gold_and_switches() {
        let mut registry = registry().await;
        let steamid = SessionKey::new("STEAM_0:0:5");
        registry.create(&steamid).await.unwrap().give_gold(49);
        assert!(matches!(
            registry.buy_hero(&steamid, "TestHero2").await,
            Err(RegistryError::Player(PlayerError::NotEnoughGold { gold: 49, cost: 50 }))
        ));

        registry.get_mut(&steamid).unwrap().give_gold(11);
        registry.buy_hero(&steamid, "TestHero2").await.unwrap();
        let player = registry.get(&steamid).unwrap();
        assert_eq!(player.gold(), 10);
        assert_eq!(player.active_cid(), Some("TestHero2"));
        let row = registry.database.load_player(&steamid).await.unwrap().unwrap();
        assert_eq!((row.gold, row.hero_cid.as_deref()), (10, Some("TestHero2")));
        let rows = registry.database.load_hero_rows(&steamid).await.unwrap();
        assert!(rows.iter().any(|row| row.cid == "TestHero2"));
        assert!(matches!(
            registry.buy_hero(&steamid, "TestHero2").await,
            Err(RegistryError::Player(PlayerError::HeroAlreadyOwned(_)))
        ));
    }

    #[tokio::test]
    async fn test_owner_of_and_teams() {
        let mut registry = registry().await;
        let a = SessionKey::new("a");
        let b = SessionKey::new("b");
        registry.create(&a).await.unwrap().set_team(Team::Terrorist);
        registry.create(&b).await.unwrap().set_team(Team::Spectator);

        let id = registry.get(&b).unwrap().hero().unwrap().id();
        assert_eq!(registry.owner_of(id), Some(&b));
        assert_eq!(registry.team_members(Team::Terrorist), vec![a.clone()]);
        assert_eq!(registry.playing(), vec![a]);
    }

    #[tokio::test]
    async fn test_unload_persists_everyone() {
        let mut registry = registry().await;
        let steamid = SessionKey::new("STEAM_0:0:6");
        registry.create(&steamid).await.unwrap().give_gold(5);
        assert_eq!(registry.unload().await.unwrap(), 1);
        assert!(registry.is_empty());
        let row = registry.database.load_player(&steamid).await.unwrap().unwrap();
        assert_eq!(row.gold, 5);
        assert_eq!(row.hero_cid.as_deref(), Some("TestHero1"));
    }
}
