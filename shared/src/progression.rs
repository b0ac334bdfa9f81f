//! Experience curves, the level-up cascade and level-up notifications.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Experience required to advance from a given level to the next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpCurve {
    /// `base + per_level * level`
    Linear { base: u64, per_level: u64 },
    /// Explicit thresholds indexed by level; the last entry repeats
    Table { thresholds: Vec<u64> },
}

impl Default for ExpCurve {
    fn default() -> Self {
        ExpCurve::Linear {
            base: 100,
            per_level: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurveError {
    #[error("experience table is empty")]
    Empty,
    #[error("experience threshold for level {0} is zero")]
    ZeroThreshold(u32),
    #[error("experience threshold for level {0} is lower than the previous one")]
    Decreasing(u32),
}

impl ExpCurve {
    pub fn required(&self, level: u32) -> u64 {
        match self {
            ExpCurve::Linear { base, per_level } => {
                base.saturating_add(per_level.saturating_mul(u64::from(level)))
            }
            ExpCurve::Table { thresholds } => thresholds
                .get(level as usize)
                .or_else(|| thresholds.last())
                .copied()
                .unwrap_or(0),
        }
    }

    /// Reject curves that would let the cascade loop forever or that
    /// get cheaper with level
    pub fn validate(&self) -> Result<(), CurveError> {
        match self {
            ExpCurve::Linear { base, .. } if *base == 0 => Err(CurveError::ZeroThreshold(0)),
            ExpCurve::Linear { .. } => Ok(()),
            ExpCurve::Table { thresholds } if thresholds.is_empty() => Err(CurveError::Empty),
            ExpCurve::Table { thresholds } => {
                if let Some(level) = thresholds.iter().position(|t| *t == 0) {
                    return Err(CurveError::ZeroThreshold(level as u32));
                }
                match thresholds.windows(2).position(|w| w[1] < w[0]) {
                    Some(index) => Err(CurveError::Decreasing(index as u32 + 1)),
                    None => Ok(()),
                }
            }
        }
    }
}

/// Level and experience after applying the cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub level: u32,
    pub exp: u64,
    pub gained: u32,
}

/// Experience needed for the next level, zero at max level
pub fn required_exp(curve: &ExpCurve, level: u32, max_level: Option<u32>) -> u64 {
    if max_level.is_some_and(|max| level >= max) {
        0
    } else {
        curve.required(level)
    }
}

/// Convert surplus experience into levels.
///
/// Each step subtracts the current requirement and increments the level.
/// Reaching `max_level` stops the cascade and discards leftover experience.
pub fn cascade(curve: &ExpCurve, max_level: Option<u32>, level: u32, exp: u64) -> Progress {
    let mut progress = Progress {
        level,
        exp,
        gained: 0,
    };
    loop {
        if max_level.is_some_and(|max| progress.level >= max) {
            break;
        }
        let required = curve.required(progress.level);
        if required == 0 || progress.exp < required {
            break;
        }
        progress.exp -= required;
        progress.level += 1;
        progress.gained += 1;
    }
    if let Some(max) = max_level {
        if progress.level >= max {
            progress.level = max;
            progress.exp = 0;
        }
    }
    progress
}

/// Process-unique hero identity used to route level-up notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HeroId(u64);

impl HeroId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for HeroId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hero#{}", self.0)
    }
}

/// Queued whenever a hero's level changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub hero: HeroId,
    pub cid: &'static str,
    pub level: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_curve() {
        let curve = ExpCurve::default();
        assert_eq!(curve.required(0), 100);
        assert_eq!(curve.required(3), 160);
    }

    #[test]
    fn test_table_curve_repeats_last() {
        let curve = ExpCurve::Table {
            thresholds: vec![10, 20, 30],
        };
        assert_eq!(curve.required(1), 20);
        assert_eq!(curve.required(7), 30);
    }

    #[test]
    fn test_validate_rejects_zero_thresholds() {
        assert_eq!(
            ExpCurve::Linear { base: 0, per_level: 5 }.validate(),
            Err(CurveError::ZeroThreshold(0))
        );
        assert_eq!(
            ExpCurve::Table { thresholds: vec![] }.validate(),
            Err(CurveError::Empty)
        );
        assert_eq!(
            ExpCurve::Table { thresholds: vec![5, 0] }.validate(),
            Err(CurveError::ZeroThreshold(1))
        );
        assert!(ExpCurve::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_decreasing_table() {
        assert_eq!(
            ExpCurve::Table { thresholds: vec![10, 30, 20] }.validate(),
            Err(CurveError::Decreasing(2))
        );
        assert!(ExpCurve::Table { thresholds: vec![10, 10, 20] }.validate().is_ok());
    }

    #[test]
    fn test_cascade_multiple_levels() {
        // 100 + 120 = 220, leaving 30 toward level 2's 140
        let progress = cascade(&ExpCurve::default(), None, 0, 250);
        assert_eq!(
            progress,
            Progress {
                level: 2,
                exp: 30,
                gained: 2
            }
        );
    }

    #[test]
    fn test_cascade_stops_at_max_level() {
        let progress = cascade(&ExpCurve::default(), Some(1), 0, 10_000);
        assert_eq!(progress.level, 1);
        assert_eq!(progress.exp, 0);
        assert_eq!(progress.gained, 1);
    }

    #[test]
    fn test_cascade_zero_threshold_terminates() {
        let curve = ExpCurve::Table { thresholds: vec![0] };
        let progress = cascade(&curve, None, 0, 50);
        assert_eq!(progress.level, 0);
        assert_eq!(progress.exp, 50);
    }

    #[test]
    fn test_required_exp_zero_at_max() {
        assert_eq!(required_exp(&ExpCurve::default(), 5, Some(5)), 0);
        assert_eq!(required_exp(&ExpCurve::default(), 4, Some(5)), 180);
    }

    #[test]
    fn test_hero_ids_unique() {
        let a = HeroId::next();
        let b = HeroId::next();
        assert_ne!(a, b);
    }

    proptest! {
        #[test]
        fn cascade_keeps_exp_below_requirement(
            base in 1u64..500,
            per_level in 0u64..100,
            level in 0u32..50,
            exp in 0u64..100_000,
            max in proptest::option::of(0u32..80),
        ) {
            let curve = ExpCurve::Linear { base, per_level };
            let start = max.map_or(level, |m| level.min(m));
            let progress = cascade(&curve, max, start, exp);
            prop_assert!(progress.level >= start);
            if let Some(max) = max {
                prop_assert!(progress.level <= max);
            }
            let required = required_exp(&curve, progress.level, max);
            if required == 0 {
                prop_assert_eq!(progress.exp, 0);
            } else {
                prop_assert!(progress.exp < required);
            }
        }

        #[test]
        fn cascade_conserves_experience_below_max(
            base in 1u64..500,
            per_level in 0u64..100,
            exp in 0u64..50_000,
        ) {
            let curve = ExpCurve::Linear { base, per_level };
            let progress = cascade(&curve, None, 0, exp);
            let spent: u64 = (0..progress.level).map(|l| curve.required(l)).sum();
            prop_assert_eq!(spent + progress.exp, exp);
        }
    }
}
