//! Base leveled-entity model shared by heroes, skills and items.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a level assignment falls outside an entity's range
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    #[error("level {level} is out of range 0..={max}")]
    AboveMax { level: i64, max: u32 },
    #[error("level {0} is negative")]
    Negative(i64),
}

/// A level bounded by an optional maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leveled {
    level: u32,
    max_level: Option<u32>,
}

impl Leveled {
    pub fn new(max_level: Option<u32>) -> Self {
        Self {
            level: 0,
            max_level,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn max_level(&self) -> Option<u32> {
        self.max_level
    }

    pub fn is_maxed(&self) -> bool {
        matches!(self.max_level, Some(max) if self.level >= max)
    }

    /// Validate a candidate level without applying it
    pub fn check(&self, level: i64) -> Result<u32, LevelError> {
        if level < 0 {
            return Err(LevelError::Negative(level));
        }
        let level = u32::try_from(level).map_err(|_| LevelError::AboveMax {
            level,
            max: self.max_level.unwrap_or(u32::MAX),
        })?;
        match self.max_level {
            Some(max) if level > max => Err(LevelError::AboveMax {
                level: i64::from(level),
                max,
            }),
            _ => Ok(level),
        }
    }

    pub fn set(&mut self, level: i64) -> Result<(), LevelError> {
        self.level = self.check(level)?;
        Ok(())
    }

    /// Clamp a level into this entity's range
    pub fn clamp(&self, level: u32) -> u32 {
        self.max_level.map_or(level, |max| level.min(max))
    }

    pub(crate) fn force(&mut self, level: u32) {
        self.level = self.clamp(level);
    }
}

/// Common surface of every leveled game entity
pub trait Entity {
    fn cid(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn level(&self) -> u32;
    fn max_level(&self) -> Option<u32>;
    fn set_level(&mut self, level: i64) -> Result<(), LevelError>;
}
