//! Budget sources.
//!
//! The engine only ever sees a number of unspent points. A [`BudgetSource`]
//! turns whatever the host tracks (a fixed grant, a player level) into that
//! number, given how many points the scope already holds.

use crate::config::BudgetConfig;
use crate::core::Scope;

pub trait BudgetSource {
    /// Unspent points for `scope` once `spent` points are already invested.
    fn available(&self, scope: &Scope, spent: u32) -> u32;
}

/// A fixed number of earned points, the same for every scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBudget(pub u32);

impl BudgetSource for FixedBudget {
    fn available(&self, _scope: &Scope, spent: u32) -> u32 {
        self.0.saturating_sub(spent)
    }
}

/// Points earned by levelling: `starting_points + level * points_per_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelBudget {
    pub points_per_level: u32,
    pub starting_points: u32,
    pub level: u32,
}

impl LevelBudget {
    pub const fn new(points_per_level: u32, starting_points: u32) -> Self {
        Self {
            points_per_level,
            starting_points,
            level: 0,
        }
    }

    pub fn from_config(config: &BudgetConfig) -> Self {
        Self::new(config.points_per_level, config.starting_points)
    }

    #[must_use]
    pub const fn at_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub const fn earned(&self) -> u32 {
        self.starting_points
            .saturating_add(self.level.saturating_mul(self.points_per_level))
    }
}

impl BudgetSource for LevelBudget {
    fn available(&self, _scope: &Scope, spent: u32) -> u32 {
        self.earned().saturating_sub(spent)
    }
}
