//! Server-side player entity.

use herowars_shared::{Actor, Entity, Hero, HeroError, HeroId, Item, ItemDef, SessionKey, Team};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("gold cannot be negative ({0})")]
    NegativeGold(i64),
    #[error("cash cannot be negative ({0})")]
    NegativeCash(i64),
    #[error("not enough gold ({gold}/{cost})")]
    NotEnoughGold { gold: u64, cost: u64 },
    #[error("not enough cash ({cash}/{cost})")]
    NotEnoughCash { cash: u64, cost: u64 },
    #[error("{steamid} does not own hero '{cid}'")]
    HeroNotOwned { steamid: SessionKey, cid: String },
    #[error("hero '{0}' is already owned")]
    HeroAlreadyOwned(String),
    #[error("no active hero")]
    NoActiveHero,
    #[error("no item in slot {0}")]
    EmptySlot(usize),
    #[error(transparent)]
    Hero(#[from] HeroError),
}

/// Server-side player state
#[derive(Debug)]
pub struct Player {
    steamid: SessionKey,
    gold: u64,
    /// Round currency, never persisted
    cash: u64,
    team: Team,
    heroes: Vec<Hero>,
    active: Option<usize>,
}

impl Player {
    pub fn new(steamid: SessionKey) -> Self {
        Self {
            steamid,
            gold: 0,
            cash: 0,
            team: Team::Unassigned,
            heroes: Vec::new(),
            active: None,
        }
    }

    pub fn steamid(&self) -> &SessionKey {
        &self.steamid
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn set_team(&mut self, team: Team) {
        self.team = team;
    }

    pub fn actor(&self) -> Actor {
        Actor::new(self.steamid.clone(), self.team)
    }

    // =========================================================================
    // Currencies
    // =========================================================================

    pub fn gold(&self) -> u64 {
        self.gold
    }

    pub fn set_gold(&mut self, gold: i64) -> Result<(), PlayerError> {
        self.gold = u64::try_from(gold).map_err(|_| PlayerError::NegativeGold(gold))?;
        Ok(())
    }

    pub fn give_gold(&mut self, amount: u64) {
        self.gold = self.gold.saturating_add(amount);
    }

    pub fn spend_gold(&mut self, cost: u64) -> Result<(), PlayerError> {
        if self.gold < cost {
            return Err(PlayerError::NotEnoughGold {
                gold: self.gold,
                cost,
            });
        }
        self.gold -= cost;
        Ok(())
    }

    pub fn cash(&self) -> u64 {
        self.cash
    }

    pub fn set_cash(&mut self, cash: i64) -> Result<(), PlayerError> {
        self.cash = u64::try_from(cash).map_err(|_| PlayerError::NegativeCash(cash))?;
        Ok(())
    }

    pub fn give_cash(&mut self, amount: u64) {
        self.cash = self.cash.saturating_add(amount);
    }

    pub fn spend_cash(&mut self, cost: u64) -> Result<(), PlayerError> {
        if self.cash < cost {
            return Err(PlayerError::NotEnoughCash {
                cash: self.cash,
                cost,
            });
        }
        self.cash -= cost;
        Ok(())
    }

    // =========================================================================
    // Heroes
    // =========================================================================

    pub fn heroes(&self) -> &[Hero] {
        &self.heroes
    }

    pub fn heroes_mut(&mut self) -> &mut [Hero] {
        &mut self.heroes
    }

    pub fn owns(&self, cid: &str) -> bool {
        self.heroes.iter().any(|hero| hero.cid() == cid)
    }

    pub fn owns_hero_id(&self, id: HeroId) -> bool {
        self.heroes.iter().any(|hero| hero.id() == id)
    }

    pub fn hero_by_cid(&self, cid: &str) -> Option<&Hero> {
        self.heroes.iter().find(|hero| hero.cid() == cid)
    }

    pub fn hero_by_id(&self, id: HeroId) -> Option<&Hero> {
        self.heroes.iter().find(|hero| hero.id() == id)
    }

    pub fn add_hero(&mut self, hero: Hero) -> Result<(), PlayerError> {
        if self.owns(hero.cid()) {
            return Err(PlayerError::HeroAlreadyOwned(hero.cid().to_string()));
        }
        self.heroes.push(hero);
        Ok(())
    }

    /// The active hero, if one has been chosen
    pub fn hero(&self) -> Option<&Hero> {
        self.active.and_then(|index| self.heroes.get(index))
    }

    pub fn hero_mut(&mut self) -> Option<&mut Hero> {
        self.active.and_then(|index| self.heroes.get_mut(index))
    }

    pub fn active_cid(&self) -> Option<&'static str> {
        self.hero().map(|hero| hero.cid())
    }

    /// Make an owned hero active, dropping the outgoing hero's temporary items.
    ///
    /// The caller persists the outgoing hero first.
    pub fn switch_hero(&mut self, cid: &str) -> Result<(), PlayerError> {
        let index = self
            .heroes
            .iter()
            .position(|hero| hero.cid() == cid)
            .ok_or_else(|| PlayerError::HeroNotOwned {
                steamid: self.steamid.clone(),
                cid: cid.to_string(),
            })?;
        if let Some(outgoing) = self.hero_mut() {
            outgoing.drop_temporary_items();
        }
        self.active = Some(index);
        Ok(())
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Buy an item for the active hero with cash
    pub fn buy_item(&mut self, def: &'static ItemDef) -> Result<(), PlayerError> {
        let cost = u64::from(def.cost);
        if self.cash < cost {
            return Err(PlayerError::NotEnoughCash {
                cash: self.cash,
                cost,
            });
        }
        let hero = self.hero_mut().ok_or(PlayerError::NoActiveHero)?;
        hero.add_item(Item::new(def))?;
        self.cash -= cost;
        Ok(())
    }

    /// Sell the active hero's item in `slot`, returning the cash received
    pub fn sell_item(&mut self, slot: usize, multiplier: f32) -> Result<u32, PlayerError> {
        let hero = self.hero_mut().ok_or(PlayerError::NoActiveHero)?;
        let item = hero.remove_item(slot).ok_or(PlayerError::EmptySlot(slot))?;
        let value = item.def().sell_value(multiplier);
        self.give_cash(u64::from(value));
        Ok(value)
    }

    /// Drop the active hero's non-permanent items
    pub fn drop_temporary_items(&mut self) -> usize {
        self.hero_mut().map_or(0, Hero::drop_temporary_items)
    }
}
