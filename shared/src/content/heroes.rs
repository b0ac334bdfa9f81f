//! Bundled heroes.

use crate::heroes::HeroDef;
use crate::hooks::{ActorRequest, Effect, HandlerTable, Hook, HookContext, SkillView, Target};
use crate::modifiers::{Chance, Cooldown};
use crate::skills::SkillDef;

// ============================================================================
// Test Hero #1
// ============================================================================

pub static TEST_HERO_1: HeroDef = HeroDef {
    cid: "TestHero1",
    name: "Test Hero #1",
    description: "The first hero every player owns.",
    authors: &["Hero-Wars Team"],
    category: None,
    cost: 0,
    max_level: None,
    skills: &[&ENRAGE, &DAMAGE, &IGNITE, &NOCLIP],
    passives: &[&HEALTH],
};

static HEALTH: SkillDef = SkillDef {
    cid: "Health",
    name: "Health",
    description: "Gain 15 health on spawn and a chance to heal on attack.",
    cost: 0,
    max_level: Some(0),
    required_level: 0,
    handlers: health,
};

fn health() -> HandlerTable {
    HandlerTable::new()
        .on(Hook::Spawn, health_on_spawn)
        .on(Hook::Attack, Chance::fixed(33, health_on_attack))
}

fn health_on_spawn(skill: &SkillView, ctx: &mut HookContext) {
    let me = ctx.player.steamid.clone();
    ctx.request(ActorRequest::Heal {
        target: me.clone(),
        amount: 15,
    });
    ctx.tell(&me, format!("{}+15 health.", skill.prefix()));
}

fn health_on_attack(skill: &SkillView, ctx: &mut HookContext) {
    let me = ctx.player.steamid.clone();
    ctx.request(ActorRequest::Heal {
        target: me.clone(),
        amount: 5,
    });
    ctx.tell(&me, format!("{}+5 health.", skill.prefix()));
}

static ENRAGE: SkillDef = SkillDef {
    cid: "Enrage",
    name: "Enrage",
    description: "Gain a burst of speed when attacked.",
    cost: SkillDef::DEFAULT_COST,
    max_level: Some(3),
    required_level: 0,
    handlers: enrage,
};

fn enrage() -> HandlerTable {
    HandlerTable::new().on(Hook::Defend, enrage_on_defend)
}

fn enrage_on_defend(skill: &SkillView, ctx: &mut HookContext) {
    ctx.request(ActorRequest::Speed {
        target: ctx.player.steamid.clone(),
        multiplier: 1.0 + 0.1 * skill.level as f32,
        seconds: Some(1.0),
    });
}

static DAMAGE: SkillDef = SkillDef {
    cid: "Damage",
    name: "Damage",
    description: "Deal double damage.",
    cost: SkillDef::DEFAULT_COST,
    max_level: Some(1),
    required_level: 0,
    handlers: damage,
};

fn damage() -> HandlerTable {
    HandlerTable::new().on(Hook::Attack, damage_on_attack)
}

fn damage_on_attack(skill: &SkillView, ctx: &mut HookContext) {
    let Some(defender) = ctx.defender.clone() else {
        return;
    };
    let me = ctx.player.steamid.clone();
    ctx.request(ActorRequest::Damage {
        target: defender.steamid,
        attacker: Some(me.clone()),
        amount: ctx.damage,
    });
    ctx.tell(&me, format!("{}You dealt 2x damage!", skill.prefix()));
}

static IGNITE: SkillDef = SkillDef {
    cid: "Ignite",
    name: "Ignite",
    description: "Burn your enemies when you spawn.",
    cost: SkillDef::DEFAULT_COST,
    max_level: Some(2),
    required_level: 0,
    handlers: ignite,
};

fn ignite() -> HandlerTable {
    HandlerTable::new().on(Hook::Spawn, ignite_on_spawn)
}

fn ignite_on_spawn(skill: &SkillView, ctx: &mut HookContext) {
    if !ctx.player.team.is_playing() {
        return;
    }
    ctx.request(ActorRequest::Burn {
        target: Target::EnemiesOf(ctx.player.team),
        seconds: 2.0 + skill.level as f32,
    });
    let me = ctx.player.steamid.clone();
    ctx.tell(&me, format!("{}You burned your enemies!", skill.prefix()));
}

static NOCLIP: SkillDef = SkillDef {
    cid: "Noclip",
    name: "Noclip",
    description: "Ultimate: walk through walls for a moment.",
    cost: 2,
    max_level: Some(3),
    required_level: 5,
    handlers: noclip,
};

fn noclip() -> HandlerTable {
    HandlerTable::new().on(
        Hook::Ultimate,
        Cooldown::computed(noclip_cooldown, noclip_on_ultimate)
            .with_message("{name} is on cooldown ({cd}/{max_cd})."),
    )
}

fn noclip_cooldown(skill: &SkillView, _: &HookContext) -> f32 {
    20.0 - 2.0 * skill.level as f32
}

fn noclip_on_ultimate(skill: &SkillView, ctx: &mut HookContext) {
    let me = ctx.player.steamid.clone();
    ctx.request(ActorRequest::Noclip {
        target: me.clone(),
        seconds: 1.0 + skill.level as f32,
    });
    ctx.tell(&me, format!("{}Noclip enabled.", skill.prefix()));
}

// ============================================================================
// Test Hero #2
// ============================================================================

pub static TEST_HERO_2: HeroDef = HeroDef {
    cid: "TestHero2",
    name: "Test Hero #2",
    description: "A fast hero that feeds on the fight.",
    authors: &["Hero-Wars Team"],
    category: Some("Test Heroes"),
    cost: 50,
    max_level: Some(20),
    skills: &[&FROST_NOVA, &VAMPIRISM, &BOUNTY],
    passives: &[&SWIFTNESS],
};

static SWIFTNESS: SkillDef = SkillDef {
    cid: "Swiftness",
    name: "Swiftness",
    description: "Move 20% faster.",
    cost: 0,
    max_level: Some(0),
    required_level: 0,
    handlers: swiftness,
};

fn swiftness() -> HandlerTable {
    HandlerTable::new().on(Hook::Spawn, |_: &SkillView, ctx: &mut HookContext| {
        ctx.request(ActorRequest::Speed {
            target: ctx.player.steamid.clone(),
            multiplier: 1.2,
            seconds: None,
        });
    })
}

static FROST_NOVA: SkillDef = SkillDef {
    cid: "FrostNova",
    name: "Frost Nova",
    description: "Chance to freeze the enemy you hit.",
    cost: SkillDef::DEFAULT_COST,
    max_level: Some(5),
    required_level: 0,
    handlers: frost_nova,
};

fn frost_nova() -> HandlerTable {
    HandlerTable::new().on(
        Hook::Attack,
        Chance::computed(|skill, _| skill.level * 8, frost_nova_on_attack),
    )
}

fn frost_nova_on_attack(skill: &SkillView, ctx: &mut HookContext) {
    let Some(defender) = ctx.defender.clone() else {
        return;
    };
    ctx.request(ActorRequest::Freeze {
        target: Target::Player(defender.steamid.clone()),
        seconds: 1.0,
    });
    ctx.tell(&defender.steamid, format!("{}You have been frozen!", skill.prefix()));
}

static VAMPIRISM: SkillDef = SkillDef {
    cid: "Vampirism",
    name: "Vampirism",
    description: "Heal for part of the damage you deal.",
    cost: SkillDef::DEFAULT_COST,
    max_level: Some(4),
    required_level: 2,
    handlers: vampirism,
};

fn vampirism() -> HandlerTable {
    HandlerTable::new().on(Hook::Attack, vampirism_on_attack)
}

fn vampirism_on_attack(skill: &SkillView, ctx: &mut HookContext) {
    let amount = ctx.damage * skill.level / 10;
    if amount == 0 {
        return;
    }
    ctx.request(ActorRequest::Heal {
        target: ctx.player.steamid.clone(),
        amount,
    });
}

static BOUNTY: SkillDef = SkillDef {
    cid: "Bounty",
    name: "Bounty",
    description: "Earn extra gold and cash for every kill.",
    cost: 2,
    max_level: Some(2),
    required_level: 4,
    handlers: bounty,
};

fn bounty() -> HandlerTable {
    HandlerTable::new().on(Hook::Kill, bounty_on_kill)
}

fn bounty_on_kill(skill: &SkillView, ctx: &mut HookContext) {
    let me = ctx.player.steamid.clone();
    let amount = u64::from(skill.level);
    ctx.emit(Effect::GrantGold {
        to: me.clone(),
        amount,
    });
    ctx.emit(Effect::GrantCash {
        to: me.clone(),
        amount: 100 * amount,
    });
    ctx.tell(&me, format!("{}+{} gold, +${}.", skill.prefix(), amount, 100 * amount));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heroes::Hero;
    use crate::progression::ExpCurve;
    use crate::protocol::{Actor, Team};
    use std::sync::Arc;

    fn hero(def: &'static HeroDef) -> Hero {
        Hero::new(def, Arc::new(ExpCurve::default()))
    }

    #[test]
    fn test_health_passive_heals_on_spawn() {
        let mut hero = hero(&TEST_HERO_1);
        let mut ctx = HookContext::new(Actor::new("p", Team::Terrorist));
        assert_eq!(hero.execute(Hook::Spawn, &mut ctx), 1);
        assert!(ctx.effects().contains(&Effect::Actor(ActorRequest::Heal {
            target: "p".into(),
            amount: 15
        })));
    }

    #[test]
    fn test_ignite_targets_enemy_team() {
        let mut hero = hero(&TEST_HERO_1);
        hero.set_level(2).unwrap();
        hero.upgrade_skill("Ignite").unwrap();
        let mut ctx = HookContext::new(Actor::new("p", Team::CounterTerrorist));
        hero.execute(Hook::Spawn, &mut ctx);
        assert!(ctx.effects().contains(&Effect::Actor(ActorRequest::Burn {
            target: Target::EnemiesOf(Team::CounterTerrorist),
            seconds: 3.0
        })));
    }

    #[test]
    fn test_noclip_cooldown_shrinks_with_level() {
        let mut hero = hero(&TEST_HERO_1);
        hero.set_level(9).unwrap();
        hero.upgrade_skill("Noclip").unwrap();
        hero.upgrade_skill("Noclip").unwrap();
        let mut ctx = HookContext::new(Actor::new("p", Team::Terrorist));

        assert_eq!(hero.execute(Hook::Ultimate, &mut ctx), 1);
        assert_eq!(hero.execute(Hook::Ultimate, &mut ctx), 0);
        hero.tick(16.0);
        assert_eq!(hero.execute(Hook::Ultimate, &mut ctx), 1);
    }

    #[test]
    fn test_bounty_grants_gold_and_cash() {
        let mut hero = hero(&TEST_HERO_2);
        hero.set_level(4).unwrap();
        hero.upgrade_skill("Bounty").unwrap();
        let mut ctx = HookContext::new(Actor::new("p", Team::Terrorist));
        hero.execute(Hook::Kill, &mut ctx);
        assert!(ctx.effects().contains(&Effect::GrantGold {
            to: "p".into(),
            amount: 1
        }));
        assert!(ctx.effects().contains(&Effect::GrantCash {
            to: "p".into(),
            amount: 100
        }));
    }
}
