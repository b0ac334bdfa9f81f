//! Item definitions and per-hero item instances.

use crate::entities::{Entity, LevelError, Leveled};
use crate::hooks::{HandlerTable, Hook, HookContext, Outcome, SkillView};
use serde::Serialize;

/// Static description of a purchasable item
#[derive(Debug)]
pub struct ItemDef {
    pub cid: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Shop category; `None` falls back to the configured default
    pub category: Option<&'static str>,
    /// Price in cash
    pub cost: u32,
    pub max_level: Option<u32>,
    pub required_level: u32,
    /// Permanent items survive death and hero switches
    pub permanent: bool,
    /// Maximum copies one hero may carry
    pub limit: u32,
    pub handlers: fn() -> HandlerTable,
}

impl ItemDef {
    pub fn sell_value(&self, multiplier: f32) -> u32 {
        (self.cost as f32 * multiplier).floor() as u32
    }

    pub fn category_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.category.unwrap_or(default)
    }

    pub fn snapshot(&self, sell_multiplier: f32, default_category: &str) -> ItemSnapshot {
        ItemSnapshot {
            cid: self.cid,
            name: self.name,
            description: self.description,
            category: self.category_or(default_category).to_string(),
            cost: self.cost,
            sell_value: self.sell_value(sell_multiplier),
            permanent: self.permanent,
            limit: self.limit,
        }
    }
}

/// An item carried by one hero
#[derive(Debug)]
pub struct Item {
    def: &'static ItemDef,
    level: Leveled,
    handlers: HandlerTable,
}

impl Item {
    pub fn new(def: &'static ItemDef) -> Self {
        Self {
            def,
            level: Leveled::new(def.max_level),
            handlers: (def.handlers)(),
        }
    }

    pub fn def(&self) -> &'static ItemDef {
        self.def
    }

    pub fn is_permanent(&self) -> bool {
        self.def.permanent
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

    pub fn tick(&mut self, delta: f32) {
        self.handlers.tick(delta);
    }
}

impl Entity for Item {
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

/// Shop-facing view of an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSnapshot {
    pub cid: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: String,
    pub cost: u32,
    pub sell_value: u32,
    pub permanent: bool,
    pub limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    static TRINKET: ItemDef = ItemDef {
        cid: "Trinket",
        name: "Trinket",
        description: "Does nothing.",
        category: None,
        cost: 15,
        max_level: None,
        required_level: 0,
        permanent: false,
        limit: 1,
        handlers: HandlerTable::new,
    };

    #[test]
    fn test_sell_value_rounds_down() {
        assert_eq!(TRINKET.sell_value(0.5), 7);
        assert_eq!(TRINKET.sell_value(1.0), 15);
        assert_eq!(TRINKET.sell_value(0.0), 0);
    }

    #[test]
    fn test_default_category() {
        let snapshot = TRINKET.snapshot(0.5, "Others");
        assert_eq!(snapshot.category, "Others");
        assert_eq!(snapshot.sell_value, 7);
    }
}
