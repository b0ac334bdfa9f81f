//! Bundled shop items.

use crate::hooks::{ActorRequest, Effect, HandlerTable, Hook, HookContext, SkillView};
use crate::items::ItemDef;
use crate::modifiers::Chance;
use rand::Rng;

pub static EXP_BOOST: ItemDef = ItemDef {
    cid: "ExpBoost",
    name: "Experience Boost",
    description: "Gain 1-15 experience every time you spawn.",
    category: Some("Test Items"),
    cost: 10,
    max_level: None,
    required_level: 0,
    permanent: false,
    limit: 3,
    handlers: exp_boost,
};

fn exp_boost() -> HandlerTable {
    HandlerTable::new().on(Hook::Spawn, exp_boost_on_spawn)
}

fn exp_boost_on_spawn(item: &SkillView, ctx: &mut HookContext) {
    let me = ctx.player.steamid.clone();
    let amount = rand::thread_rng().gen_range(1..=15);
    ctx.emit(Effect::GrantExp {
        to: me.clone(),
        amount,
    });
    ctx.tell(&me, format!("{}+{} exp.", item.prefix(), amount));
}

pub static LONGJUMP_BOOTS: ItemDef = ItemDef {
    cid: "LongjumpBoots",
    name: "Longjump Boots",
    description: "Jump further.",
    category: Some("Test Items"),
    cost: 15,
    max_level: None,
    required_level: 0,
    permanent: false,
    limit: 1,
    handlers: longjump_boots,
};

fn longjump_boots() -> HandlerTable {
    HandlerTable::new().on(Hook::Jump, |_: &SkillView, ctx: &mut HookContext| {
        ctx.request(ActorRequest::BoostVelocity {
            target: ctx.player.steamid.clone(),
            horizontal: 1.5,
            vertical: 1.2,
        });
    })
}

pub static LUCKY_CHARM: ItemDef = ItemDef {
    cid: "LuckyCharm",
    name: "Lucky Charm",
    description: "Kept forever. 25% chance to find 2 gold at the end of a round.",
    category: None,
    cost: 40,
    max_level: None,
    required_level: 3,
    permanent: true,
    limit: 1,
    handlers: lucky_charm,
};

fn lucky_charm() -> HandlerTable {
    HandlerTable::new().on(Hook::RoundEnd, Chance::fixed(25, lucky_charm_on_round_end))
}

fn lucky_charm_on_round_end(item: &SkillView, ctx: &mut HookContext) {
    let me = ctx.player.steamid.clone();
    ctx.emit(Effect::GrantGold {
        to: me.clone(),
        amount: 2,
    });
    ctx.tell(&me, format!("{}You found 2 gold!", item.prefix()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::Item;
    use crate::protocol::{Actor, Team};

    #[test]
    fn test_exp_boost_grants_between_1_and_15() {
        let mut item = Item::new(&EXP_BOOST);
        for _ in 0..100 {
            let mut ctx = HookContext::new(Actor::new("p", Team::Terrorist));
            item.dispatch(Hook::Spawn, &mut ctx);
            let granted = ctx.effects().iter().find_map(|effect| match effect {
                Effect::GrantExp { amount, .. } => Some(*amount),
                _ => None,
            });
            assert!(matches!(granted, Some(1..=15)));
        }
    }

    #[test]
    fn test_longjump_boots_on_jump_only() {
        let item = Item::new(&LONGJUMP_BOOTS);
        assert!(item.handles(Hook::Jump));
        assert!(!item.handles(Hook::Spawn));
    }
}
