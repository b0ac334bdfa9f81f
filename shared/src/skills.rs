//! Skill definitions and per-hero skill instances.

use crate::entities::{Entity, LevelError, Leveled};
use crate::hooks::{HandlerTable, Hook, HookContext, Outcome, SkillView};
use serde::Serialize;

/// Static description of a skill or passive
#[derive(Debug)]
pub struct SkillDef {
    pub cid: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Skill points spent per upgrade
    pub cost: u32,
    pub max_level: Option<u32>,
    /// Minimum hero level before points can be invested
    pub required_level: u32,
    pub handlers: fn() -> HandlerTable,
}

impl SkillDef {
    pub const DEFAULT_COST: u32 = 1;
    pub const DEFAULT_MAX_LEVEL: u32 = 6;
}

/// A skill owned by one hero
#[derive(Debug)]
pub struct Skill {
    def: &'static SkillDef,
    level: Leveled,
    handlers: HandlerTable,
}

impl Skill {
    pub fn new(def: &'static SkillDef) -> Self {
        Self {
            def,
            level: Leveled::new(def.max_level),
            handlers: (def.handlers)(),
        }
    }

    pub fn def(&self) -> &'static SkillDef {
        self.def
    }

    pub fn cost(&self) -> u32 {
        self.def.cost
    }

    pub fn required_level(&self) -> u32 {
        self.def.required_level
    }

    pub fn is_maxed(&self) -> bool {
        self.level.is_maxed()
    }

    pub fn view(&self) -> SkillView {
        SkillView {
            cid: self.def.cid,
            name: self.def.name,
            level: self.level.level(),
        }
    }

    pub fn handles(&self, hook: Hook) -> bool {
        self.handlers.handles(hook)
    }

    pub(crate) fn dispatch(&mut self, hook: Hook, ctx: &mut HookContext) -> Option<Outcome> {
        let view = self.view();
        self.handlers.dispatch(hook, &view, ctx)
    }

    pub(crate) fn force_level(&mut self, level: u32) {
        self.level.force(level);
    }

    pub fn tick(&mut self, delta: f32) {
        self.handlers.tick(delta);
    }

    pub fn snapshot(&self, hero_level: u32) -> SkillSnapshot {
        SkillSnapshot {
            cid: self.def.cid,
            name: self.def.name,
            description: self.def.description,
            level: self.level.level(),
            max_level: self.level.max_level(),
            cost: self.def.cost,
            required_level: self.def.required_level,
            unlocked: hero_level >= self.def.required_level,
        }
    }
}

impl Entity for Skill {
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
        self.level.set(level)
    }
}

/// Menu-facing view of a skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillSnapshot {
    pub cid: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub level: u32,
    pub max_level: Option<u32>,
    pub cost: u32,
    pub required_level: u32,
    pub unlocked: bool,
}
