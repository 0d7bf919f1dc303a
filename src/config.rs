//! Configuration passed explicitly into the kernel entry points.

use crate::algo::quality::EPSD;
use crate::error::{MeshError, Result};

/// Sizing of the point and element arenas.
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaConfig {
    /// Minimum number of point slots allocated up front.
    pub initial_points: usize,

    /// Minimum number of element slots allocated up front.
    pub initial_elements: usize,

    /// Hard limit on the number of point slots.
    pub max_points: usize,

    /// Hard limit on the number of element slots.
    pub max_elements: usize,

    /// Fraction of the current capacity added on each growth.
    pub growth: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            initial_points: 64,
            initial_elements: 128,
            max_points: 50_000_000,
            max_elements: 100_000_000,
            growth: 0.2,
        }
    }
}

impl ArenaConfig {
    /// Set the initial capacities.
    pub fn with_initial(mut self, points: usize, elements: usize) -> Self {
        self.initial_points = points;
        self.initial_elements = elements;
        self
    }

    /// Set the hard limits.
    pub fn with_limits(mut self, points: usize, elements: usize) -> Self {
        self.max_points = points;
        self.max_elements = elements;
        self
    }

    /// Set the growth fraction.
    pub fn with_growth(mut self, growth: f64) -> Self {
        self.growth = growth;
        self
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.growth.is_finite() && self.growth > 0.0) {
            return Err(MeshError::invalid_param(
                "growth",
                self.growth,
                "must be positive",
            ));
        }
        if self.max_points == 0 || self.max_elements == 0 {
            return Err(MeshError::invalid_param(
                "max_points/max_elements",
                self.max_points.min(self.max_elements),
                "limits must be non-zero",
            ));
        }
        Ok(())
    }
}

/// Options of the modification kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptConfig {
    /// Sub-elements scoring at or below this value are rejected.
    pub quality_epsilon: f64,

    /// Run the consistency check at the end of the compaction pass.
    pub debug: bool,

    /// Arena sizing.
    pub arena: ArenaConfig,
}

impl Default for AdaptConfig {
    fn default() -> Self {
        Self {
            quality_epsilon: EPSD,
            debug: false,
            arena: ArenaConfig::default(),
        }
    }
}

impl AdaptConfig {
    /// Set the quality threshold.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.quality_epsilon = epsilon;
        self
    }

    /// Enable or disable the post-compaction self-check.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the arena sizing.
    pub fn with_arena(mut self, arena: ArenaConfig) -> Self {
        self.arena = arena;
        self
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.quality_epsilon.is_finite() && self.quality_epsilon >= 0.0) {
            return Err(MeshError::invalid_param(
                "quality_epsilon",
                self.quality_epsilon,
                "must be finite and non-negative",
            ));
        }
        self.arena.validate()
    }
}
