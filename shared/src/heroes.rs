//! Hero definitions and the per-player hero instance.
//!
//! A [`Hero`] owns its skills, passives and items, runs the experience
//! cascade and queues [`LevelUp`] notifications for the owner to drain.

use crate::entities::{Entity, LevelError, Leveled};
use crate::hooks::{Hook, HookContext, Outcome};
use crate::items::{Item, ItemDef};
use crate::progression::{self, ExpCurve, HeroId, LevelUp};
use crate::skills::{Skill, SkillDef, SkillSnapshot};
use log::debug;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeroError {
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error("experience cannot be negative ({0})")]
    NegativeExp(i64),
    #[error("hero has no skill '{0}'")]
    UnknownSkill(String),
    #[error("'{cid}' requires hero level {required} (current {current})")]
    RequiredLevel {
        cid: String,
        required: u32,
        current: u32,
    },
    #[error("skill '{0}' is already at its maximum level")]
    SkillMaxed(String),
    #[error("not enough skill points ({available}/{cost})")]
    NotEnoughSkillPoints { available: i64, cost: u32 },
    #[error("item limit reached for '{cid}' ({limit})")]
    ItemLimit { cid: String, limit: u32 },
    #[error("unknown hook '{0}'")]
    UnknownHook(String),
}

/// Static description of a hero
#[derive(Debug)]
pub struct HeroDef {
    pub cid: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub authors: &'static [&'static str],
    pub category: Option<&'static str>,
    /// Price in gold
    pub cost: u32,
    pub max_level: Option<u32>,
    pub skills: &'static [&'static SkillDef],
    pub passives: &'static [&'static SkillDef],
}

impl HeroDef {
    pub fn category_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.category.unwrap_or(default)
    }

    pub fn listing(&self, default_category: &str) -> HeroListing {
        let skills = self
            .skills
            .iter()
            .map(|def| Skill::new(*def).snapshot(0))
            .collect();
        HeroListing {
            cid: self.cid,
            name: self.name,
            description: self.description,
            authors: self.authors.to_vec(),
            category: self.category_or(default_category).to_string(),
            cost: self.cost,
            max_level: self.max_level,
            skills,
        }
    }
}

/// A hero owned by one player
#[derive(Debug)]
pub struct Hero {
    def: &'static HeroDef,
    id: HeroId,
    level: Leveled,
    exp: u64,
    curve: Arc<ExpCurve>,
    skills: Vec<Skill>,
    passives: Vec<Skill>,
    items: Vec<Item>,
    level_ups: Vec<LevelUp>,
}

impl Hero {
    pub fn new(def: &'static HeroDef, curve: Arc<ExpCurve>) -> Self {
        Self {
            def,
            id: HeroId::next(),
            level: Leveled::new(def.max_level),
            exp: 0,
            curve,
            skills: def.skills.iter().copied().map(Skill::new).collect(),
            passives: def.passives.iter().copied().map(Skill::new).collect(),
            items: Vec::new(),
            level_ups: Vec::new(),
        }
    }

    /// Rebuild a hero from stored values without queueing notifications.
    ///
    /// Out-of-range levels are clamped and surplus experience cascades.
    pub fn restore(def: &'static HeroDef, curve: Arc<ExpCurve>, level: u32, exp: u64) -> Self {
        let mut hero = Self::new(def, curve);
        if hero.level.clamp(level) != level {
            debug!("Clamping stored level {} of {} to its max", level, def.cid);
        }
        hero.level.force(level);
        let progress =
            progression::cascade(&hero.curve, hero.level.max_level(), hero.level.level(), exp);
        hero.level.force(progress.level);
        hero.exp = progress.exp;
        hero
    }

    /// Set a skill's stored level, clamped to its range
    pub fn restore_skill(&mut self, cid: &str, level: u32) -> bool {
        match self.skills.iter_mut().find(|skill| skill.cid() == cid) {
            Some(skill) => {
                skill.force_level(level);
                true
            }
            None => false,
        }
    }

    pub fn def(&self) -> &'static HeroDef {
        self.def
    }

    pub fn id(&self) -> HeroId {
        self.id
    }

    pub fn exp(&self) -> u64 {
        self.exp
    }

    pub fn is_maxed(&self) -> bool {
        self.level.is_maxed()
    }

    /// Experience needed for the next level, zero at max level
    pub fn required_exp(&self) -> u64 {
        progression::required_exp(&self.curve, self.level.level(), self.level.max_level())
    }

    // ========================================================================
    // Progression
    // ========================================================================

    pub fn set_exp(&mut self, exp: i64) -> Result<(), HeroError> {
        let exp = u64::try_from(exp).map_err(|_| HeroError::NegativeExp(exp))?;
        let progress =
            progression::cascade(&self.curve, self.level.max_level(), self.level.level(), exp);
        let start = self.level.level();
        for level in start + 1..=progress.level {
            self.level.force(level);
            self.queue_level_up();
        }
        self.level.force(progress.level);
        self.exp = progress.exp;
        Ok(())
    }

    pub fn give_exp(&mut self, amount: u64) {
        let exp = i64::try_from(self.exp.saturating_add(amount)).unwrap_or(i64::MAX);
        if let Err(e) = self.set_exp(exp) {
            debug!("Ignoring exp grant for {}: {}", self.def.cid, e);
        }
    }

    /// Assign a level directly, resetting experience
    pub fn set_level(&mut self, level: i64) -> Result<(), HeroError> {
        self.level.set(level)?;
        self.exp = 0;
        self.queue_level_up();
        Ok(())
    }

    fn queue_level_up(&mut self) {
        self.level_ups.push(LevelUp {
            hero: self.id,
            cid: self.def.cid,
            level: self.level.level(),
        });
    }

    pub fn take_level_ups(&mut self) -> Vec<LevelUp> {
        std::mem::take(&mut self.level_ups)
    }

    pub fn has_level_ups(&self) -> bool {
        !self.level_ups.is_empty()
    }

    // ========================================================================
    // Skills
    // ========================================================================

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    pub fn passives(&self) -> &[Skill] {
        &self.passives
    }

    pub fn skill(&self, cid: &str) -> Option<&Skill> {
        self.skills.iter().find(|skill| skill.cid() == cid)
    }

    /// Level minus points invested; negative after admin level removal
    pub fn skill_points(&self) -> i64 {
        let spent: i64 = self
            .skills
            .iter()
            .map(|skill| i64::from(skill.level()) * i64::from(skill.cost()))
            .sum();
        i64::from(self.level.level()) - spent
    }

    /// Spend skill points to raise a skill by one level
    pub fn upgrade_skill(&mut self, cid: &str) -> Result<u32, HeroError> {
        let hero_level = self.level.level();
        let available = self.skill_points();
        let skill = self
            .skills
            .iter_mut()
            .find(|skill| skill.cid() == cid)
            .ok_or_else(|| HeroError::UnknownSkill(cid.to_string()))?;
        if hero_level < skill.required_level() {
            return Err(HeroError::RequiredLevel {
                cid: cid.to_string(),
                required: skill.required_level(),
                current: hero_level,
            });
        }
        if skill.is_maxed() {
            return Err(HeroError::SkillMaxed(cid.to_string()));
        }
        if available < i64::from(skill.cost()) {
            return Err(HeroError::NotEnoughSkillPoints {
                available,
                cost: skill.cost(),
            });
        }
        let level = skill.level() + 1;
        skill.set_level(i64::from(level))?;
        Ok(level)
    }

    /// Set a skill level ignoring skill points
    pub fn force_skill_level(&mut self, cid: &str, level: i64) -> Result<(), HeroError> {
        let skill = self
            .skills
            .iter_mut()
            .find(|skill| skill.cid() == cid)
            .ok_or_else(|| HeroError::UnknownSkill(cid.to_string()))?;
        skill.set_level(level)?;
        Ok(())
    }

    pub fn reset_skills(&mut self) {
        for skill in &mut self.skills {
            skill.force_level(0);
        }
    }

    // ========================================================================
    // Items
    // ========================================================================

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item_count(&self, cid: &str) -> usize {
        self.items.iter().filter(|item| item.cid() == cid).count()
    }

    /// Whether another copy of `def` may be carried
    pub fn check_item(&self, def: &ItemDef) -> Result<(), HeroError> {
        if self.level.level() < def.required_level {
            return Err(HeroError::RequiredLevel {
                cid: def.cid.to_string(),
                required: def.required_level,
                current: self.level.level(),
            });
        }
        // limit 0 means unlimited
        if def.limit > 0 && self.item_count(def.cid) >= def.limit as usize {
            return Err(HeroError::ItemLimit {
                cid: def.cid.to_string(),
                limit: def.limit,
            });
        }
        Ok(())
    }

    pub fn add_item(&mut self, item: Item) -> Result<(), HeroError> {
        self.check_item(item.def())?;
        self.items.push(item);
        Ok(())
    }

    pub fn remove_item(&mut self, index: usize) -> Option<Item> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Drop every non-permanent item, returning how many were removed
    pub fn drop_temporary_items(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(Item::is_permanent);
        before - self.items.len()
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Run `hook` on passives, then leveled skills, then items.
    ///
    /// Returns how many handlers fired.
    pub fn execute(&mut self, hook: Hook, ctx: &mut HookContext) -> usize {
        ctx.hero_level = self.level.level();
        let mut fired = 0;
        for passive in &mut self.passives {
            fired += count(passive.dispatch(hook, ctx));
        }
        for skill in self.skills.iter_mut().filter(|skill| skill.level() > 0) {
            fired += count(skill.dispatch(hook, ctx));
        }
        for item in &mut self.items {
            fired += count(item.dispatch(hook, ctx));
        }
        fired
    }

    pub fn execute_named(&mut self, name: &str, ctx: &mut HookContext) -> Result<usize, HeroError> {
        let hook = Hook::from_name(name).ok_or_else(|| HeroError::UnknownHook(name.to_string()))?;
        Ok(self.execute(hook, ctx))
    }

    /// Advance every cooldown this hero carries
    pub fn tick(&mut self, delta: f32) {
        for skill in self.passives.iter_mut().chain(self.skills.iter_mut()) {
            skill.tick(delta);
        }
        for item in &mut self.items {
            item.tick(delta);
        }
    }

    pub fn snapshot(&self) -> HeroSnapshot {
        let level = self.level.level();
        HeroSnapshot {
            cid: self.def.cid,
            name: self.def.name,
            description: self.def.description,
            level,
            max_level: self.level.max_level(),
            exp: self.exp,
            required_exp: self.required_exp(),
            skill_points: self.skill_points(),
            skills: self.skills.iter().map(|s| s.snapshot(level)).collect(),
            passives: self.passives.iter().map(|s| s.snapshot(level)).collect(),
            items: self.items.iter().map(|item| item.name()).collect(),
        }
    }
}

fn count(outcome: Option<Outcome>) -> usize {
    usize::from(outcome == Some(Outcome::Fired))
}

impl Entity for Hero {
    fn cid(&self) -> &'static str {
        self.def.cid
    }

    fn name(&self) -> &'static str {
        self.def.name
    }

    fn description(&self) -> &'static str {
        self.def.description
    }

    fn level(&self) -> u32 {
        self.level.level()
    }

    fn max_level(&self) -> Option<u32> {
        self.level.max_level()
    }

    fn set_level(&mut self, level: i64) -> Result<(), LevelError> {
        self.level.set(level)?;
        self.exp = 0;
        self.queue_level_up();
        Ok(())
    }
}

/// Menu-facing view of an owned hero
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeroSnapshot {
    pub cid: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub level: u32,
    pub max_level: Option<u32>,
    pub exp: u64,
    pub required_exp: u64,
    pub skill_points: i64,
    pub skills: Vec<SkillSnapshot>,
    pub passives: Vec<SkillSnapshot>,
    pub items: Vec<&'static str>,
}

/// Shop-facing view of a hero definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeroListing {
    pub cid: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub authors: Vec<&'static str>,
    pub category: String,
    pub cost: u32,
    pub max_level: Option<u32>,
    pub skills: Vec<SkillSnapshot>,
}
