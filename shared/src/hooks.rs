//! Hook vocabulary, dispatch context and per-entity handler tables.
//!
//! Handlers never touch the game engine or player records directly. They
//! read the [`HookContext`] and queue [`Effect`]s, which the caller drains
//! after dispatch and applies in order.

use crate::protocol::{Actor, SessionKey, Team};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Hook vocabulary
// ============================================================================

/// Named event points a skill or item can react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Hook {
    Spawn,
    Attack,
    Defend,
    Kill,
    Death,
    Suicide,
    Assist,
    Jump,
    Say,
    Ultimate,
    RoundStart,
    RoundEnd,
    BombPlanted,
    BombExploded,
    BombDefused,
    HostageFollows,
    HostageRescued,
    LevelUp,
    WeaponPickup,
    WeaponPickupDenied,
}

impl Hook {
    pub const ALL: [Hook; 20] = [
        Hook::Spawn,
        Hook::Attack,
        Hook::Defend,
        Hook::Kill,
        Hook::Death,
        Hook::Suicide,
        Hook::Assist,
        Hook::Jump,
        Hook::Say,
        Hook::Ultimate,
        Hook::RoundStart,
        Hook::RoundEnd,
        Hook::BombPlanted,
        Hook::BombExploded,
        Hook::BombDefused,
        Hook::HostageFollows,
        Hook::HostageRescued,
        Hook::LevelUp,
        Hook::WeaponPickup,
        Hook::WeaponPickupDenied,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Hook::Spawn => "on_spawn",
            Hook::Attack => "on_attack",
            Hook::Defend => "on_defend",
            Hook::Kill => "on_kill",
            Hook::Death => "on_death",
            Hook::Suicide => "on_suicide",
            Hook::Assist => "on_assist",
            Hook::Jump => "on_jump",
            Hook::Say => "on_say",
            Hook::Ultimate => "on_ultimate",
            Hook::RoundStart => "on_round_start",
            Hook::RoundEnd => "on_round_end",
            Hook::BombPlanted => "on_bomb_planted",
            Hook::BombExploded => "on_bomb_exploded",
            Hook::BombDefused => "on_bomb_defused",
            Hook::HostageFollows => "on_hostage_follows",
            Hook::HostageRescued => "on_hostage_rescued",
            Hook::LevelUp => "on_level_up",
            Hook::WeaponPickup => "on_weapon_pickup",
            Hook::WeaponPickupDenied => "on_weapon_pickup_denied",
        }
    }

    pub fn from_name(name: &str) -> Option<Hook> {
        Hook::ALL.iter().copied().find(|hook| hook.name() == name)
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Effects
// ============================================================================

/// Who an actor request applies to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Player(SessionKey),
    /// Every living player on the team opposing the given one
    EnemiesOf(Team),
}

/// Requests forwarded to the host engine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum ActorRequest {
    Heal {
        target: SessionKey,
        amount: u32,
    },
    Damage {
        target: SessionKey,
        attacker: Option<SessionKey>,
        amount: u32,
    },
    Burn {
        target: Target,
        seconds: f32,
    },
    Freeze {
        target: Target,
        seconds: f32,
    },
    Noclip {
        target: SessionKey,
        seconds: f32,
    },
    Speed {
        target: SessionKey,
        multiplier: f32,
        seconds: Option<f32>,
    },
    BoostVelocity {
        target: SessionKey,
        horizontal: f32,
        vertical: f32,
    },
    /// Mirror the core's view of a player's cash
    SetCash {
        target: SessionKey,
        cash: u64,
    },
}

/// Side effect queued by a handler
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Message { to: SessionKey, text: String },
    GrantExp { to: SessionKey, amount: u64 },
    GrantGold { to: SessionKey, amount: u64 },
    GrantCash { to: SessionKey, amount: u64 },
    Actor(ActorRequest),
}

// ============================================================================
// Dispatch context
// ============================================================================

/// Event data handed to every handler of a single dispatch
#[derive(Debug, Clone)]
pub struct HookContext {
    /// The player whose hero is executing the hook
    pub player: Actor,
    pub attacker: Option<Actor>,
    pub defender: Option<Actor>,
    pub assister: Option<Actor>,
    pub headshot: bool,
    pub weapon: Option<String>,
    pub damage: u32,
    pub damage_armor: u32,
    pub text: Option<String>,
    pub winner: Option<Team>,
    /// Level of the executing hero, filled in at dispatch
    pub hero_level: u32,
    effects: Vec<Effect>,
}

impl HookContext {
    pub fn new(player: Actor) -> Self {
        Self {
            player,
            attacker: None,
            defender: None,
            assister: None,
            headshot: false,
            weapon: None,
            damage: 0,
            damage_armor: 0,
            text: None,
            winner: None,
            hero_level: 0,
            effects: Vec::new(),
        }
    }

    pub fn with_attacker(mut self, attacker: Option<Actor>) -> Self {
        self.attacker = attacker;
        self
    }

    pub fn with_defender(mut self, defender: Option<Actor>) -> Self {
        self.defender = defender;
        self
    }

    pub fn with_assister(mut self, assister: Option<Actor>) -> Self {
        self.assister = assister;
        self
    }

    pub fn with_headshot(mut self, headshot: bool) -> Self {
        self.headshot = headshot;
        self
    }

    pub fn with_weapon(mut self, weapon: Option<String>) -> Self {
        self.weapon = weapon;
        self
    }

    pub fn with_damage(mut self, damage: u32, damage_armor: u32) -> Self {
        self.damage = damage;
        self.damage_armor = damage_armor;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_winner(mut self, winner: Team) -> Self {
        self.winner = Some(winner);
        self
    }

    pub fn emit(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn tell(&mut self, to: &SessionKey, text: impl Into<String>) {
        self.emit(Effect::Message {
            to: to.clone(),
            text: text.into(),
        });
    }

    pub fn request(&mut self, request: ActorRequest) {
        self.emit(Effect::Actor(request));
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Read-only view of the entity whose handler is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillView {
    pub cid: &'static str,
    pub name: &'static str,
    pub level: u32,
}

impl SkillView {
    pub fn prefix(&self) -> String {
        format!("[{}] ", self.name)
    }
}

/// Result of invoking a single handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Fired,
    /// A chance gate rolled against the handler
    Missed,
    OnCooldown,
}

pub trait HookHandler {
    fn call(&mut self, skill: &SkillView, ctx: &mut HookContext) -> Outcome;

    /// Advance any timers by `delta` seconds
    fn tick(&mut self, _delta: f32) {}
}

impl<F> HookHandler for F
where
    F: FnMut(&SkillView, &mut HookContext),
{
    fn call(&mut self, skill: &SkillView, ctx: &mut HookContext) -> Outcome {
        self(skill, ctx);
        Outcome::Fired
    }
}

/// Hook handlers owned by one skill or item instance
#[derive(Default)]
pub struct HandlerTable {
    handlers: BTreeMap<Hook, Box<dyn HookHandler + Send>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `hook`, replacing any previous one
    pub fn on(mut self, hook: Hook, handler: impl HookHandler + Send + 'static) -> Self {
        self.handlers.insert(hook, Box::new(handler));
        self
    }

    pub fn handles(&self, hook: Hook) -> bool {
        self.handlers.contains_key(&hook)
    }

    pub fn dispatch(
        &mut self,
        hook: Hook,
        skill: &SkillView,
        ctx: &mut HookContext,
    ) -> Option<Outcome> {
        self.handlers
            .get_mut(&hook)
            .map(|handler| handler.call(skill, ctx))
    }

    pub fn tick(&mut self, delta: f32) {
        for handler in self.handlers.values_mut() {
            handler.tick(delta);
        }
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shout(skill: &SkillView, ctx: &mut HookContext) {
        let me = ctx.player.steamid.clone();
        ctx.tell(&me, format!("{}lvl {}", skill.prefix(), skill.level));
    }

    fn view() -> SkillView {
        SkillView {
            cid: "Shout",
            name: "Shout",
            level: 2,
        }
    }

    #[test]
    fn test_hook_names_roundtrip() {
        for hook in Hook::ALL {
            assert_eq!(Hook::from_name(hook.name()), Some(hook));
        }
        assert_eq!(Hook::from_name("on_nothing"), None);
    }

    #[test]
    fn test_dispatch_only_registered_hooks() {
        let mut table = HandlerTable::new().on(Hook::Spawn, shout);
        let mut ctx = HookContext::new(Actor::new("a", Team::Terrorist));

        assert_eq!(table.dispatch(Hook::Jump, &view(), &mut ctx), None);
        assert_eq!(
            table.dispatch(Hook::Spawn, &view(), &mut ctx),
            Some(Outcome::Fired)
        );
        assert_eq!(
            ctx.take_effects(),
            vec![Effect::Message {
                to: SessionKey::new("a"),
                text: "[Shout] lvl 2".into()
            }]
        );
        assert!(ctx.effects().is_empty());
    }

    #[test]
    fn test_closure_handlers_keep_state() {
        let mut calls = 0u32;
        let mut table = HandlerTable::new().on(Hook::Jump, move |_: &SkillView, ctx: &mut HookContext| {
            calls += 1;
            ctx.damage = calls;
        });
        let mut ctx = HookContext::new(Actor::new("a", Team::Terrorist));
        table.dispatch(Hook::Jump, &view(), &mut ctx);
        table.dispatch(Hook::Jump, &view(), &mut ctx);
        assert_eq!(ctx.damage, 2);
    }
}
