//! Chance and cooldown wrappers around hook handlers.
//!
//! Both wrappers are themselves [`HookHandler`]s, so they stack:
//! `Cooldown::fixed(10.0, Chance::fixed(50, handler))` starts the cooldown
//! even when the chance roll fails.

use crate::hooks::{HookContext, HookHandler, Outcome, SkillView};
use crate::template;
use log::debug;
use rand::Rng;

/// Computes a percentage or duration from the skill and event
pub type ComputeFn<T> = fn(&SkillView, &HookContext) -> T;

enum Value<T> {
    Fixed(T),
    Computed(ComputeFn<T>),
}

impl<T: Copy> Value<T> {
    fn resolve(&self, skill: &SkillView, ctx: &HookContext) -> T {
        match self {
            Value::Fixed(value) => *value,
            Value::Computed(compute) => compute(skill, ctx),
        }
    }
}

/// Roll a percentage; 0 never succeeds and 100 or more always does
pub fn roll<R: Rng + ?Sized>(rng: &mut R, percent: u32) -> bool {
    rng.gen_range(1..=100) <= percent
}

// ============================================================================
// Chance
// ============================================================================

/// Runs the wrapped handler only when a percentage roll succeeds
pub struct Chance<H> {
    percent: Value<u32>,
    inner: H,
}

impl<H: HookHandler> Chance<H> {
    pub fn fixed(percent: u32, inner: H) -> Self {
        Self {
            percent: Value::Fixed(percent),
            inner,
        }
    }

    pub fn computed(percent: ComputeFn<u32>, inner: H) -> Self {
        Self {
            percent: Value::Computed(percent),
            inner,
        }
    }

    pub fn percent(&self, skill: &SkillView, ctx: &HookContext) -> u32 {
        self.percent.resolve(skill, ctx)
    }
}

impl<H: HookHandler> HookHandler for Chance<H> {
    fn call(&mut self, skill: &SkillView, ctx: &mut HookContext) -> Outcome {
        let percent = self.percent(skill, ctx);
        if roll(&mut rand::thread_rng(), percent) {
            self.inner.call(skill, ctx)
        } else {
            debug!("{} missed its {}% roll", skill.cid, percent);
            Outcome::Missed
        }
    }

    fn tick(&mut self, delta: f32) {
        self.inner.tick(delta);
    }
}

// ============================================================================
// Cooldown
// ============================================================================

/// Blocks the wrapped handler until its cooldown has elapsed.
///
/// Message templates may use `{name}`, `{cd}` and `{max_cd}`.
pub struct Cooldown<H> {
    duration: Value<f32>,
    message: Option<&'static str>,
    remaining: f32,
    limit: f32,
    inner: H,
}

impl<H: HookHandler> Cooldown<H> {
    pub fn fixed(seconds: f32, inner: H) -> Self {
        Self::with_duration(Value::Fixed(seconds), inner)
    }

    pub fn computed(seconds: ComputeFn<f32>, inner: H) -> Self {
        Self::with_duration(Value::Computed(seconds), inner)
    }

    fn with_duration(duration: Value<f32>, inner: H) -> Self {
        Self {
            duration,
            message: None,
            remaining: 0.0,
            limit: 0.0,
            inner,
        }
    }

    pub fn with_message(mut self, template: &'static str) -> Self {
        self.message = Some(template);
        self
    }

    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0)
    }

    pub fn limit(&self) -> f32 {
        self.limit
    }

    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }
}

impl<H: HookHandler> HookHandler for Cooldown<H> {
    fn call(&mut self, skill: &SkillView, ctx: &mut HookContext) -> Outcome {
        if self.is_ready() {
            self.limit = self.duration.resolve(skill, ctx);
            self.remaining = self.limit;
            return self.inner.call(skill, ctx);
        }
        if let Some(message) = self.message {
            let text = template::fill(
                message,
                &[
                    ("name", &skill.name),
                    ("cd", &self.remaining.ceil()),
                    ("max_cd", &self.limit),
                ],
            );
            let player = ctx.player.steamid.clone();
            ctx.tell(&player, text);
        }
        Outcome::OnCooldown
    }

    fn tick(&mut self, delta: f32) {
        if self.remaining > 0.0 {
            self.remaining -= delta;
        }
        self.inner.tick(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::Effect;
    use crate::protocol::{Actor, Team};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn view(level: u32) -> SkillView {
        SkillView {
            cid: "Blink",
            name: "Blink",
            level,
        }
    }

    fn ctx() -> HookContext {
        HookContext::new(Actor::new("p", Team::Terrorist))
    }

    fn mark(_: &SkillView, ctx: &mut HookContext) {
        ctx.damage += 1;
    }

    fn scaled(skill: &SkillView, _: &HookContext) -> f32 {
        10.0 - skill.level as f32
    }

    #[test]
    fn test_roll_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            assert!(!roll(&mut rng, 0));
            assert!(roll(&mut rng, 100));
        }
    }

    #[test]
    fn test_roll_roughly_matches_percentage() {
        let mut rng = StdRng::seed_from_u64(42);
        let hits = (0..10_000).filter(|_| roll(&mut rng, 30)).count();
        assert!((2_700..3_300).contains(&hits), "hits = {}", hits);
    }

    #[test]
    fn test_chance_never_and_always() {
        let mut never = Chance::fixed(0, mark);
        let mut always = Chance::fixed(100, mark);
        let mut ctx = ctx();
        for _ in 0..50 {
            assert_eq!(never.call(&view(1), &mut ctx), Outcome::Missed);
            assert_eq!(always.call(&view(1), &mut ctx), Outcome::Fired);
        }
        assert_eq!(ctx.damage, 50);
    }

    #[test]
    fn test_chance_extremes_over_many_trials() {
        let mut never = Chance::fixed(0, mark);
        let mut always = Chance::fixed(100, mark);
        let mut ctx = ctx();
        for _ in 0..10_000 {
            never.call(&view(1), &mut ctx);
        }
        assert_eq!(ctx.damage, 0);
        for _ in 0..10_000 {
            always.call(&view(1), &mut ctx);
        }
        assert_eq!(ctx.damage, 10_000);
    }

    #[test]
    fn test_cooldown_invoked_at_0_3_6() {
        let mut cooldown = Cooldown::fixed(5.0, mark);
        let mut ctx = ctx();
        let mut fired = 0;
        for step in 0..=6 {
            if step % 3 == 0 && cooldown.call(&view(1), &mut ctx) == Outcome::Fired {
                fired += 1;
            }
            cooldown.tick(1.0);
        }
        assert_eq!(fired, 2);
    }

    #[test]
    fn test_chance_computed_from_level() {
        let chance = Chance::computed(|skill, _| skill.level * 10, mark);
        assert_eq!(chance.percent(&view(4), &ctx()), 40);
    }

    #[test]
    fn test_cooldown_blocks_until_elapsed() {
        let mut cooldown = Cooldown::fixed(10.0, mark);
        let mut ctx = ctx();

        assert_eq!(cooldown.call(&view(1), &mut ctx), Outcome::Fired);
        cooldown.tick(9.0);
        assert_eq!(cooldown.call(&view(1), &mut ctx), Outcome::OnCooldown);
        cooldown.tick(1.0);
        assert_eq!(cooldown.call(&view(1), &mut ctx), Outcome::Fired);
        assert_eq!(ctx.damage, 2);
    }

    #[test]
    fn test_cooldown_duration_reevaluated_on_each_fire() {
        let mut cooldown = Cooldown::computed(scaled, mark);
        let mut ctx = ctx();

        cooldown.call(&view(2), &mut ctx);
        assert_eq!(cooldown.limit(), 8.0);
        cooldown.tick(8.0);
        cooldown.call(&view(5), &mut ctx);
        assert_eq!(cooldown.limit(), 5.0);
        assert_eq!(cooldown.remaining(), 5.0);
    }

    #[test]
    fn test_cooldown_message() {
        let mut cooldown =
            Cooldown::fixed(20.0, mark).with_message("{name} ready in {cd}/{max_cd}s");
        let mut ctx = ctx();
        cooldown.call(&view(1), &mut ctx);
        cooldown.tick(4.5);
        cooldown.call(&view(1), &mut ctx);
        assert_eq!(
            ctx.take_effects(),
            vec![Effect::Message {
                to: "p".into(),
                text: "Blink ready in 16/20s".into()
            }]
        );
    }

    #[test]
    fn test_cooldown_outside_chance_consumes_on_miss() {
        let mut stacked = Cooldown::fixed(5.0, Chance::fixed(0, mark));
        let mut ctx = ctx();
        assert_eq!(stacked.call(&view(1), &mut ctx), Outcome::Missed);
        assert_eq!(stacked.call(&view(1), &mut ctx), Outcome::OnCooldown);
        stacked.tick(5.0);
        assert!(stacked.is_ready());
    }
}
