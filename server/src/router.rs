//! Event router.
//!
//! Translates host [`GameEvent`]s into registry, progression and dispatch
//! calls, hands out objective rewards and applies the effects queued by
//! hook handlers. Level-up notifications are drained once per event, after
//! every other effect of that event has been applied.

use crate::commands::{self, ChatCommand};
use crate::config::{AdminLevelPolicy, Config, TeamRewardPolicy};
use crate::entities::{Player, PlayerError};
use crate::menus::{self, AdminAttribute, MenuChoice, MenuKind, MenuView};
use crate::messages::{Messages, Messenger};
use crate::registry::{PlayerRegistry, RegistryError};
use herowars_shared::{
    Actor, ActorRequest, Effect, Entity, Hero, HeroError, Hook, HookContext, LevelUp, SessionKey,
    Team,
};
use log::{debug, info, warn};
use serde::Deserialize;

/// Upper bound on level-up drain passes per event
const MAX_LEVEL_UP_PASSES: usize = 16;

/// Host-side actions the core asks for
pub trait Engine {
    fn apply(&mut self, request: ActorRequest);
    fn open_menu(&mut self, to: &SessionKey, view: MenuView);
}

/// Events reported by the host engine
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    PlayerSpawn {
        player: Actor,
    },
    PlayerDisconnect {
        player: Actor,
    },
    PlayerDeath {
        victim: Actor,
        attacker: Option<Actor>,
        assister: Option<Actor>,
        #[serde(default)]
        headshot: bool,
        weapon: Option<String>,
    },
    PlayerHurt {
        victim: Actor,
        attacker: Option<Actor>,
        #[serde(default)]
        damage: u32,
        #[serde(default)]
        damage_armor: u32,
        weapon: Option<String>,
    },
    PlayerJump {
        player: Actor,
    },
    PlayerSay {
        player: Actor,
        text: String,
    },
    PlayerUltimate {
        player: Actor,
    },
    /// The host's current cash for a player
    PlayerCash {
        player: Actor,
        cash: i64,
    },
    RoundStart,
    RoundEnd {
        winner: Team,
    },
    BombPlanted {
        player: Actor,
    },
    BombExploded {
        player: Actor,
    },
    BombDefused {
        player: Actor,
    },
    HostageFollows {
        player: Actor,
    },
    HostageRescued {
        player: Actor,
    },
    WeaponPickup {
        player: Actor,
        weapon: String,
        #[serde(default = "default_true")]
        allowed: bool,
    },
    MenuSelect {
        player: SessionKey,
        choice: MenuChoice,
    },
}

fn default_true() -> bool {
    true
}

pub struct Router<E, M> {
    registry: PlayerRegistry,
    config: Config,
    messages: Messages,
    engine: E,
    messenger: M,
}

impl<E: Engine, M: Messenger> Router<E, M> {
    pub fn new(registry: PlayerRegistry, config: Config, engine: E, messenger: M) -> Self {
        let messages = Messages::new(&config.messages);
        Self {
            registry,
            config,
            messages,
            engine,
            messenger,
        }
    }

    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PlayerRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    pub fn announce_loaded(&mut self) {
        let text = self.messages.get("other.plugin_loaded");
        self.messenger.broadcast(&text);
    }

    /// Advance cooldowns by `delta` seconds
    pub fn tick(&mut self, delta: f32) {
        self.registry.tick(delta);
    }

    /// Flush every player to storage
    pub async fn unload(&mut self) -> Result<usize, RegistryError> {
        let text = self.messages.get("other.plugin_unloaded");
        self.messenger.broadcast(&text);
        self.registry.unload().await
    }

    /// Process one host event.
    ///
    /// Only storage failures and unknown sessions surface as errors; rejected
    /// player actions are reported to the player instead.
    pub async fn handle(&mut self, event: GameEvent) -> Result<(), RegistryError> {
        match event {
            GameEvent::PlayerSpawn { player } => self.handle_spawn(player).await?,
            GameEvent::PlayerDisconnect { player } => {
                self.registry.remove(&player.steamid).await?;
            }
            GameEvent::PlayerDeath {
                victim,
                attacker,
                assister,
                headshot,
                weapon,
            } => {
                self.handle_death(victim, attacker, assister, headshot, weapon)
                    .await?
            }
            GameEvent::PlayerHurt {
                victim,
                attacker,
                damage,
                damage_armor,
                weapon,
            } => {
                self.handle_hurt(victim, attacker, damage, damage_armor, weapon)
                    .await?
            }
            GameEvent::PlayerJump { player } => {
                self.join(&player).await?;
                self.execute_for(&player.steamid, Hook::Jump);
            }
            GameEvent::PlayerSay { player, text } => self.handle_say(player, text).await?,
            GameEvent::PlayerUltimate { player } => {
                self.join(&player).await?;
                self.execute_for(&player.steamid, Hook::Ultimate);
            }
            GameEvent::PlayerCash { player, cash } => {
                self.join(&player).await?;
                if let Some(record) = self.registry.get_mut(&player.steamid) {
                    if let Err(e) = record.set_cash(cash) {
                        warn!("Ignoring cash update for {}: {}", player.steamid, e);
                    }
                }
            }
            GameEvent::RoundStart => {
                let everyone: Vec<SessionKey> =
                    self.registry.iter().map(|p| p.steamid().clone()).collect();
                for steamid in everyone {
                    self.execute_for(&steamid, Hook::RoundStart);
                }
            }
            GameEvent::RoundEnd { winner } => self.handle_round_end(winner),
            GameEvent::BombPlanted { player } => {
                self.handle_objective(player, "bomb_plant", Hook::BombPlanted)
                    .await?
            }
            GameEvent::BombExploded { player } => {
                self.handle_objective(player, "bomb_explode", Hook::BombExploded)
                    .await?
            }
            GameEvent::BombDefused { player } => {
                self.handle_objective(player, "bomb_defuse", Hook::BombDefused)
                    .await?
            }
            GameEvent::HostageFollows { player } => {
                self.handle_objective(player, "hostage_pick_up", Hook::HostageFollows)
                    .await?
            }
            GameEvent::HostageRescued { player } => {
                self.handle_objective(player, "hostage_rescue", Hook::HostageRescued)
                    .await?
            }
            GameEvent::WeaponPickup {
                player,
                weapon,
                allowed,
            } => {
                self.join(&player).await?;
                let hook = if allowed {
                    Hook::WeaponPickup
                } else {
                    Hook::WeaponPickupDenied
                };
                if let Some(ctx) = self.context(&player.steamid) {
                    self.execute(hook, ctx.with_weapon(Some(weapon)));
                }
            }
            GameEvent::MenuSelect { player, choice } => {
                self.registry.create(&player).await?;
                self.handle_choice(&player, choice).await?
            }
        }
        self.process_level_ups();
        Ok(())
    }

    // =========================================================================
    // Game events
    // =========================================================================

    async fn join(&mut self, actor: &Actor) -> Result<(), RegistryError> {
        let player = self.registry.create(&actor.steamid).await?;
        player.set_team(actor.team);
        Ok(())
    }

    async fn handle_spawn(&mut self, actor: Actor) -> Result<(), RegistryError> {
        let known = self.registry.contains(&actor.steamid);
        self.join(&actor).await?;
        if known {
            self.registry.save(&actor.steamid).await?;
        }
        self.send_status(&actor.steamid);
        if actor.team.is_playing() {
            self.execute_for(&actor.steamid, Hook::Spawn);
        }
        Ok(())
    }

    async fn handle_death(
        &mut self,
        victim: Actor,
        attacker: Option<Actor>,
        assister: Option<Actor>,
        headshot: bool,
        weapon: Option<String>,
    ) -> Result<(), RegistryError> {
        self.join(&victim).await?;
        for other in attacker.iter().chain(assister.iter()) {
            self.join(other).await?;
        }

        let killer = attacker
            .clone()
            .filter(|attacker| attacker.steamid != victim.steamid);
        let Some(killer) = killer else {
            if let Some(ctx) = self.context(&victim.steamid) {
                let ctx = ctx
                    .with_attacker(attacker)
                    .with_defender(Some(victim.clone()))
                    .with_weapon(weapon);
                self.execute(Hook::Suicide, ctx);
            }
            self.drop_items(&victim.steamid);
            return Ok(());
        };

        let event = |player: Actor| {
            HookContext::new(player)
                .with_attacker(Some(killer.clone()))
                .with_defender(Some(victim.clone()))
                .with_assister(assister.clone())
                .with_headshot(headshot)
                .with_weapon(weapon.clone())
        };
        let killer_ctx = self.actor_of(&killer.steamid).map(event);
        let victim_ctx = self.actor_of(&victim.steamid).map(event);
        let assister_ctx = assister
            .as_ref()
            .filter(|a| a.steamid != victim.steamid && a.steamid != killer.steamid)
            .and_then(|a| self.actor_of(&a.steamid))
            .map(event);

        if let Some(ctx) = killer_ctx {
            self.execute(Hook::Kill, ctx);
        }
        if let Some(ctx) = victim_ctx {
            self.execute(Hook::Death, ctx);
        }

        self.reward_exp(&killer.steamid, "kill");
        if headshot {
            self.reward_exp(&killer.steamid, "headshot");
        }
        if let Some(weapon) = &weapon {
            self.reward_weapon_exp(&killer.steamid, weapon);
        }
        self.reward_gold(&killer.steamid, "kill");

        if let Some(ctx) = assister_ctx {
            let steamid = ctx.player.steamid.clone();
            self.reward_exp(&steamid, "assist");
            self.reward_gold(&steamid, "assist");
            self.execute(Hook::Assist, ctx);
        }

        self.drop_items(&victim.steamid);
        Ok(())
    }

    async fn handle_hurt(
        &mut self,
        victim: Actor,
        attacker: Option<Actor>,
        damage: u32,
        damage_armor: u32,
        weapon: Option<String>,
    ) -> Result<(), RegistryError> {
        self.join(&victim).await?;
        if let Some(attacker) = &attacker {
            self.join(attacker).await?;
        }

        let event = |player: Actor| {
            HookContext::new(player)
                .with_attacker(attacker.clone())
                .with_defender(Some(victim.clone()))
                .with_damage(damage, damage_armor)
                .with_weapon(weapon.clone())
        };
        // world damage has no attacker but still reaches the victim
        let attack = attacker.as_ref().and_then(|a| self.actor_of(&a.steamid)).map(event);
        let defend = self.actor_of(&victim.steamid).map(event);
        if let Some(ctx) = attack {
            self.execute(Hook::Attack, ctx);
        }
        if let Some(ctx) = defend {
            self.execute(Hook::Defend, ctx);
        }
        Ok(())
    }

    async fn handle_say(&mut self, actor: Actor, text: String) -> Result<(), RegistryError> {
        self.join(&actor).await?;
        let steamid = actor.steamid;
        match commands::parse(&self.config.chat_command_prefix, &text) {
            Some(ChatCommand::Ultimate) => {
                self.execute_for(&steamid, Hook::Ultimate);
            }
            Some(ChatCommand::Menu) => self.open(&steamid, MenuKind::Main),
            Some(ChatCommand::Admin) => self.open(&steamid, MenuKind::Admin),
            Some(ChatCommand::Unknown(command)) => debug!("{} used unknown command '{}'", steamid, command),
            None => {}
        }
        if let Some(ctx) = self.context(&steamid) {
            self.execute(Hook::Say, ctx.with_text(text));
        }
        Ok(())
    }

    fn handle_round_end(&mut self, winner: Team) {
        for steamid in self.registry.playing() {
            let won = self.registry.get(&steamid).map(Player::team) == Some(winner);
            let key = if won { "round_win" } else { "round_lose" };
            self.reward_exp(&steamid, key);
            self.reward_gold(&steamid, key);
            if let Some(ctx) = self.context(&steamid) {
                self.execute(Hook::RoundEnd, ctx.with_winner(winner));
            }
        }
    }

    async fn handle_objective(&mut self, actor: Actor, key: &str, hook: Hook) -> Result<(), RegistryError> {
        self.join(&actor).await?;
        self.reward_exp(&actor.steamid, key);
        self.reward_team_exp(&actor, key);
        self.execute_for(&actor.steamid, hook);
        Ok(())
    }

    // =========================================================================
    // Dispatch and effects
    // =========================================================================

    fn actor_of(&self, steamid: &SessionKey) -> Option<Actor> {
        self.registry.get(steamid).map(Player::actor)
    }

    fn context(&self, steamid: &SessionKey) -> Option<HookContext> {
        self.actor_of(steamid).map(HookContext::new)
    }

    fn execute_for(&mut self, steamid: &SessionKey, hook: Hook) -> usize {
        match self.context(steamid) {
            Some(ctx) => self.execute(hook, ctx),
            None => 0,
        }
    }

    /// Run `hook` on the context player's active hero and apply its effects
    fn execute(&mut self, hook: Hook, mut ctx: HookContext) -> usize {
        let steamid = ctx.player.steamid.clone();
        let Some(hero) = self.registry.get_mut(&steamid).and_then(Player::hero_mut) else {
            return 0;
        };
        let fired = hero.execute(hook, &mut ctx);
        if fired > 0 {
            debug!("{} fired {} handlers for {}", steamid, fired, hook);
        }
        self.apply_effects(ctx.take_effects());
        fired
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Message { to, text } => self.messenger.tell(&to, &text),
                Effect::GrantExp { to, amount } => {
                    if let Some(hero) = self.registry.get_mut(&to).and_then(Player::hero_mut) {
                        hero.give_exp(amount);
                    }
                }
                Effect::GrantGold { to, amount } => {
                    if let Some(player) = self.registry.get_mut(&to) {
                        player.give_gold(amount);
                    }
                }
                Effect::GrantCash { to, amount } => {
                    if let Some(player) = self.registry.get_mut(&to) {
                        player.give_cash(amount);
                    }
                    self.sync_cash(&to);
                }
                Effect::Actor(request) => self.engine.apply(request),
            }
        }
    }

    fn sync_cash(&mut self, steamid: &SessionKey) {
        if let Some(player) = self.registry.get(steamid) {
            self.engine.apply(ActorRequest::SetCash {
                target: steamid.clone(),
                cash: player.cash(),
            });
        }
    }

    fn drop_items(&mut self, steamid: &SessionKey) {
        if let Some(player) = self.registry.get_mut(steamid) {
            let dropped = player.drop_temporary_items();
            if dropped > 0 {
                debug!("{} lost {} items on death", steamid, dropped);
            }
        }
    }

    /// Announce queued level-ups until no hero has any left
    fn process_level_ups(&mut self) {
        for _ in 0..MAX_LEVEL_UP_PASSES {
            let mut pending: Vec<LevelUp> = Vec::new();
            for player in self.registry.iter_mut() {
                for hero in player.heroes_mut() {
                    pending.extend(hero.take_level_ups());
                }
            }
            if pending.is_empty() {
                return;
            }
            for level_up in pending {
                self.announce_level_up(level_up);
            }
        }
        warn!(
            "Level-ups still pending after {} passes, deferring to the next event",
            MAX_LEVEL_UP_PASSES
        );
    }

    fn announce_level_up(&mut self, level_up: LevelUp) {
        let Some(steamid) = self.registry.owner_of(level_up.hero).cloned() else {
            return;
        };
        let Some(player) = self.registry.get(&steamid) else {
            return;
        };
        let Some(hero) = player.hero_by_id(level_up.hero) else {
            return;
        };
        info!("{}'s {} reached level {}", steamid, level_up.cid, level_up.level);
        let status = self.status_text(hero);
        let menu = menus::current_hero(player)
            .filter(|_| player.hero().map(Hero::id) == Some(level_up.hero));

        self.messenger.tell(&steamid, &status);
        if let Some(menu) = menu {
            self.engine.open_menu(&steamid, menu);
            self.execute_for(&steamid, Hook::LevelUp);
        }
    }

    // =========================================================================
    // Rewards
    // =========================================================================

    fn reward_exp(&mut self, steamid: &SessionKey, key: &str) {
        let amount = self.config.exp_for(key);
        if amount == 0 {
            return;
        }
        let Some(hero) = self.registry.get_mut(steamid).and_then(Player::hero_mut) else {
            return;
        };
        hero.give_exp(amount);
        let text = self
            .messages
            .format(&format!("exp.{}", key), &[("exp", &amount)]);
        self.messenger.tell(steamid, &text);
    }

    /// Weapon kill bonus, keyed by the weapon name without its `weapon_` prefix
    fn reward_weapon_exp(&mut self, steamid: &SessionKey, weapon: &str) {
        let name = weapon.strip_prefix("weapon_").unwrap_or(weapon);
        let key = format!("weapon_{}", name);
        let amount = self.config.exp_for(&key);
        if amount == 0 {
            return;
        }
        let Some(hero) = self.registry.get_mut(steamid).and_then(Player::hero_mut) else {
            return;
        };
        hero.give_exp(amount);
        let specific = format!("exp.{}", key);
        let template = if self.messages.contains(&specific) {
            specific.as_str()
        } else {
            "exp.weapon"
        };
        let text = self
            .messages
            .format(template, &[("exp", &amount), ("weapon", &name)]);
        self.messenger.tell(steamid, &text);
    }

    fn reward_gold(&mut self, steamid: &SessionKey, key: &str) {
        let amount = self.config.gold_for(key);
        if amount == 0 {
            return;
        }
        let Some(player) = self.registry.get_mut(steamid) else {
            return;
        };
        player.give_gold(amount);
        if self.config.show_gold_messages {
            let text = self
                .messages
                .format(&format!("gold.{}", key), &[("gold", &amount)]);
            self.messenger.tell(steamid, &text);
        }
    }

    /// The `_team` share of an objective, never paid to the actor
    fn reward_team_exp(&mut self, actor: &Actor, key: &str) {
        let team_key = format!("{}_team", key);
        if self.config.exp_for(&team_key) == 0 {
            return;
        }
        let receivers = match self.config.team_rewards {
            TeamRewardPolicy::ActorTeam if actor.team.is_playing() => {
                self.registry.team_members(actor.team)
            }
            TeamRewardPolicy::ActorTeam => Vec::new(),
            TeamRewardPolicy::BothTeams => self.registry.playing(),
        };
        for steamid in receivers.iter().filter(|s| **s != actor.steamid) {
            self.reward_exp(steamid, &team_key);
        }
    }

    // =========================================================================
    // Messages and menus
    // =========================================================================

    fn status_text(&self, hero: &Hero) -> String {
        self.messages.format(
            "other.hero_status",
            &[
                ("name", &hero.name()),
                ("level", &hero.level()),
                ("exp", &hero.exp()),
                ("max_exp", &hero.required_exp()),
            ],
        )
    }

    fn send_status(&mut self, steamid: &SessionKey) {
        let Some(hero) = self.registry.get(steamid).and_then(Player::hero) else {
            return;
        };
        let text = self.status_text(hero);
        self.messenger.tell(steamid, &text);
    }

    fn tell_key(&mut self, steamid: &SessionKey, key: &str, args: &[(&str, &dyn std::fmt::Display)]) {
        let text = self.messages.format(key, args);
        self.messenger.tell(steamid, &text);
    }

    fn open(&mut self, steamid: &SessionKey, kind: MenuKind) {
        let Some(player) = self.registry.get(steamid) else {
            return;
        };
        let catalog = self.registry.catalog();
        let view = match kind {
            MenuKind::Main => Ok(menus::main_menu(player)),
            MenuKind::BuyHeroes => match menus::buy_heroes(catalog, player, &self.config) {
                MenuView::BuyHeroes { heroes, .. } if heroes.is_empty() => Err("menu.no_heroes_to_buy"),
                view => Ok(view),
            },
            MenuKind::OwnedHeroes => Ok(menus::owned_heroes(player)),
            MenuKind::CurrentHero => menus::current_hero(player).ok_or("menu.no_active_hero"),
            MenuKind::ItemCategories if catalog.items().is_empty() => Err("menu.no_items_to_buy"),
            MenuKind::ItemCategories => Ok(menus::item_categories(catalog, &self.config)),
            MenuKind::BuyItems { category } => {
                match menus::buy_items(catalog, player, &self.config, &category) {
                    MenuView::BuyItems { items, .. } if items.is_empty() => Err("menu.no_items_to_buy"),
                    view => Ok(view),
                }
            }
            MenuKind::SellItems => match menus::sell_items(player, &self.config) {
                MenuView::SellItems { items, .. } if items.is_empty() => Err("menu.no_owned_items"),
                view => Ok(view),
            },
            MenuKind::Admin if !self.config.is_admin(steamid) => Err("menu.not_admin"),
            MenuKind::Admin => Ok(menus::admin(&self.registry)),
        };
        match view {
            Ok(view) => self.engine.open_menu(steamid, view),
            Err(key) => self.tell_key(steamid, key, &[]),
        }
    }

    // =========================================================================
    // Menu choices
    // =========================================================================

    async fn handle_choice(&mut self, steamid: &SessionKey, choice: MenuChoice) -> Result<(), RegistryError> {
        match choice {
            MenuChoice::Open { menu } => self.open(steamid, menu),
            MenuChoice::BuyHero { cid } => match self.registry.buy_hero(steamid, &cid).await {
                Ok(()) => {
                    if let Some(def) = self.registry.catalog().find_hero(&cid) {
                        self.tell_key(
                            steamid,
                            "menu.bought_hero",
                            &[("name", &def.name), ("cost", &def.cost)],
                        );
                    }
                    self.send_status(steamid);
                }
                Err(e) => self.report(steamid, e)?,
            },
            MenuChoice::ChangeHero { cid } => {
                match self.registry.set_active_hero(steamid, &cid).await {
                    Ok(()) => {
                        let name = self.hero_name(&cid);
                        self.tell_key(steamid, "menu.changed_hero", &[("name", &name)]);
                        self.send_status(steamid);
                    }
                    Err(e) => self.report(steamid, e)?,
                }
            }
            MenuChoice::UpgradeSkill { cid } => {
                let result = self
                    .registry
                    .get_mut(steamid)
                    .and_then(Player::hero_mut)
                    .ok_or(PlayerError::NoActiveHero)
                    .and_then(|hero| {
                        let level = hero.upgrade_skill(&cid)?;
                        let name = hero.skill(&cid).map_or(cid.as_str(), |s| s.name());
                        Ok((name.to_string(), level))
                    });
                match result {
                    Ok((name, level)) => {
                        self.tell_key(
                            steamid,
                            "menu.skill_leveled",
                            &[("name", &name), ("level", &level)],
                        );
                        self.open(steamid, MenuKind::CurrentHero);
                    }
                    Err(e) => self.report(steamid, e.into())?,
                }
            }
            MenuChoice::ResetSkills => {
                match self.registry.get_mut(steamid).and_then(Player::hero_mut) {
                    Some(hero) => {
                        hero.reset_skills();
                        self.tell_key(steamid, "menu.skill_points_reset", &[]);
                        self.open(steamid, MenuKind::CurrentHero);
                    }
                    None => self.report(steamid, PlayerError::NoActiveHero.into())?,
                }
            }
            MenuChoice::BuyItem { cid } => {
                let Some(def) = self.registry.catalog().find_item(&cid) else {
                    warn!("{} tried to buy unknown item '{}'", steamid, cid);
                    return Ok(());
                };
                let result = self
                    .registry
                    .get_mut(steamid)
                    .ok_or_else(|| RegistryError::NotFound(steamid.clone()))?
                    .buy_item(def);
                match result {
                    Ok(()) => {
                        self.tell_key(
                            steamid,
                            "menu.bought_item",
                            &[("name", &def.name), ("cost", &def.cost)],
                        );
                        self.sync_cash(steamid);
                    }
                    Err(e) => self.report(steamid, e.into())?,
                }
            }
            MenuChoice::SellItem { slot } => {
                let multiplier = self.config.item_sell_value_multiplier;
                let player = self
                    .registry
                    .get_mut(steamid)
                    .ok_or_else(|| RegistryError::NotFound(steamid.clone()))?;
                let name = player
                    .hero()
                    .and_then(|hero| hero.items().get(slot))
                    .map(|item| item.name());
                match player.sell_item(slot, multiplier) {
                    Ok(value) => {
                        let name = name.unwrap_or_default();
                        self.tell_key(steamid, "menu.sold_item", &[("name", &name), ("cost", &value)]);
                        self.sync_cash(steamid);
                    }
                    Err(e) => self.report(steamid, e.into())?,
                }
            }
            MenuChoice::AdminGive {
                target,
                attribute,
                amount,
            } => self.admin_give(steamid, &target, attribute, amount),
        }
        Ok(())
    }

    fn admin_give(&mut self, admin: &SessionKey, target: &SessionKey, attribute: AdminAttribute, amount: i64) {
        if !self.config.is_admin(admin) {
            warn!("{} used an admin menu without permission", admin);
            self.tell_key(admin, "menu.not_admin", &[]);
            return;
        }
        let policy = self.config.admin_level_policy;
        let Some(player) = self.registry.get_mut(target) else {
            self.tell_key(admin, "menu.player_not_found", &[("steamid", target)]);
            return;
        };

        let result = match attribute {
            AdminAttribute::Gold => {
                let gold = i64::try_from(player.gold()).unwrap_or(i64::MAX);
                player.set_gold(gold.saturating_add(amount))
            }
            AdminAttribute::Exp => match player.hero_mut() {
                Some(hero) => {
                    let exp = i64::try_from(hero.exp()).unwrap_or(i64::MAX);
                    hero.set_exp(exp.saturating_add(amount)).map_err(PlayerError::from)
                }
                None => Err(PlayerError::NoActiveHero),
            },
            AdminAttribute::Level => match player.hero_mut() {
                Some(hero) => {
                    let level = i64::from(hero.level()).saturating_add(amount);
                    let level = match policy {
                        AdminLevelPolicy::Reject => level,
                        AdminLevelPolicy::Clamp => {
                            level.clamp(0, hero.max_level().map_or(i64::MAX, i64::from))
                        }
                    };
                    hero.set_level(level).map_err(PlayerError::from)
                }
                None => Err(PlayerError::NoActiveHero),
            },
        };

        match result {
            Ok(()) => {
                info!("Admin {} gave {} {} to {}", admin, amount, attribute.name(), target);
                self.tell_key(
                    admin,
                    "menu.admin_gave",
                    &[("amount", &amount), ("attribute", &attribute.name()), ("steamid", target)],
                );
                self.send_status(target);
            }
            Err(e) => {
                warn!("Admin {} could not give {} to {}: {}", admin, attribute.name(), target, e);
                self.tell_key(
                    admin,
                    "menu.admin_rejected",
                    &[("attribute", &attribute.name()), ("reason", &e)],
                );
            }
        }
    }

    // =========================================================================
    // Rejections
    // =========================================================================

    /// Turn a rejected player action into a message; storage errors propagate
    fn report(&mut self, steamid: &SessionKey, error: RegistryError) -> Result<(), RegistryError> {
        match error {
            RegistryError::Player(e) => {
                warn!("Rejected action from {}: {}", steamid, e);
                let text = self.describe(&e);
                self.messenger.tell(steamid, &text);
                Ok(())
            }
            RegistryError::UnknownHero(cid) => {
                warn!("{} picked unknown hero '{}'", steamid, cid);
                Ok(())
            }
            other => Err(other),
        }
    }

    fn describe(&self, error: &PlayerError) -> String {
        let m = &self.messages;
        match error {
            PlayerError::NotEnoughGold { gold, cost } => {
                m.format("menu.not_enough_gold", &[("gold", gold), ("cost", cost)])
            }
            PlayerError::NotEnoughCash { cash, cost } => {
                m.format("menu.not_enough_cash", &[("cash", cash), ("cost", cost)])
            }
            PlayerError::HeroNotOwned { cid, .. } => {
                m.format("menu.hero_not_owned", &[("name", &self.hero_name(cid))])
            }
            PlayerError::HeroAlreadyOwned(cid) => {
                m.format("menu.hero_owned", &[("name", &self.hero_name(cid))])
            }
            PlayerError::NoActiveHero => m.get("menu.no_active_hero"),
            PlayerError::EmptySlot(_) => m.get("menu.no_owned_items"),
            PlayerError::Hero(HeroError::RequiredLevel { required, current, .. }) => m.format(
                "menu.not_required_level",
                &[("current_level", current), ("required_level", required)],
            ),
            PlayerError::Hero(HeroError::NotEnoughSkillPoints { available, cost }) => m.format(
                "menu.not_enough_skill_points",
                &[("skill_points", available), ("cost", cost)],
            ),
            PlayerError::Hero(HeroError::SkillMaxed(_)) => m.get("menu.skill_maxed_out"),
            PlayerError::Hero(HeroError::ItemLimit { cid, limit }) => {
                let name = self
                    .registry
                    .catalog()
                    .find_item(cid)
                    .map_or(cid.as_str(), |def| def.name);
                m.format("menu.item_limit", &[("limit", limit), ("name", &name)])
            }
            other => other.to_string(),
        }
    }

    fn hero_name(&self, cid: &str) -> String {
        self.registry
            .catalog()
            .find_hero(cid)
            .map_or(cid, |def| def.name)
            .to_string()
    }
}
