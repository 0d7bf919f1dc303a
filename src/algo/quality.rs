//! Element quality scoring.
//!
//! Split operators never decide on their own whether a candidate
//! configuration is acceptable: they build each sub-triangle in a scratch
//! copy and hand its vertex positions to a [`QualityOracle`]. A
//! [`QualityGate`] pairs an oracle with the threshold below which a
//! sub-triangle vetoes the whole operation.

use nalgebra::Point3;

use crate::config::AdaptConfig;

/// Normalization making the equilateral triangle score exactly 1.
pub const ALPHAD: f64 = 3.464_101_615_137_754_6;

/// Default quality threshold.
pub const EPSD: f64 = 1e-30;

/// Scores a candidate triangle; larger is better, zero or less is degenerate
/// or inverted.
pub trait QualityOracle {
    /// Score the triangle `(a, b, c)`.
    fn score(&self, a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64;
}

impl<F> QualityOracle for F
where
    F: Fn(&Point3<f64>, &Point3<f64>, &Point3<f64>) -> f64,
{
    #[inline]
    fn score(&self, a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
        self(a, b, c)
    }
}

/// Isotropic shape quality of a planar triangle.
///
/// `ALPHAD * area2 / (|ab|² + |ac|² + |bc|²)`, where `area2` is twice the
/// signed area. Clockwise and flat triangles score 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoQuality;

impl QualityOracle for IsoQuality {
    fn score(&self, a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
        let ab = (b - a).xy();
        let ac = (c - a).xy();
        let bc = (c - b).xy();

        let area = ab.perp(&ac);
        if area <= 0.0 {
            return 0.0;
        }

        let sum = ab.norm_squared() + ac.norm_squared() + bc.norm_squared();
        if sum > EPSD {
            ALPHAD * area / sum
        } else {
            0.0
        }
    }
}

/// An oracle together with its acceptance threshold.
#[derive(Debug, Clone, Copy)]
pub struct QualityGate<Q = IsoQuality> {
    /// The scoring function.
    pub oracle: Q,
    /// Scores at or below this value are rejected.
    pub epsilon: f64,
}

impl QualityGate<IsoQuality> {
    /// Isotropic gate with the configured threshold.
    pub fn iso(config: &AdaptConfig) -> Self {
        Self::new(IsoQuality, config.quality_epsilon)
    }
}

impl Default for QualityGate<IsoQuality> {
    fn default() -> Self {
        Self::new(IsoQuality, EPSD)
    }
}

impl<Q: QualityOracle> QualityGate<Q> {
    /// Create a gate.
    pub fn new(oracle: Q, epsilon: f64) -> Self {
        Self { oracle, epsilon }
    }

    /// Whether a single score passes.
    #[inline]
    pub fn passes(&self, score: f64) -> bool {
        score > self.epsilon
    }

    /// Score a triangle given by its vertex positions.
    #[inline]
    pub fn score(&self, [a, b, c]: &[Point3<f64>; 3]) -> f64 {
        self.oracle.score(a, b, c)
    }

    /// Whether a triangle given by its vertex positions passes.
    #[inline]
    pub fn accepts(&self, triangle: &[Point3<f64>; 3]) -> bool {
        self.passes(self.score(triangle))
    }

    /// Whether every triangle passes. Stops at the first rejection.
    pub fn accepts_all<'a, I>(&self, triangles: I) -> bool
    where
        I: IntoIterator<Item = &'a [Point3<f64>; 3]>,
    {
        triangles.into_iter().all(|t| self.accepts(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point3<f64> {
        Point3::new(x, y, 0.0)
    }

    #[test]
    fn test_equilateral_scores_one() {
        let h = 3.0_f64.sqrt() / 2.0;
        let q = IsoQuality.score(&p(0.0, 0.0), &p(1.0, 0.0), &p(0.5, h));
        assert!((q - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverted_and_flat_score_zero() {
        assert_eq!(IsoQuality.score(&p(0.0, 0.0), &p(0.5, 1.0), &p(1.0, 0.0)), 0.0);
        assert_eq!(IsoQuality.score(&p(0.0, 0.0), &p(1.0, 0.0), &p(2.0, 0.0)), 0.0);
    }

    #[test]
    fn test_sliver_scores_low() {
        let q = IsoQuality.score(&p(0.0, 0.0), &p(1.0, 0.0), &p(0.5, 0.05));
        assert!(q > 0.0 && q < 0.2);
    }

    #[test]
    fn test_gate_threshold_is_strict() {
        let gate = QualityGate::new(|_: &Point3<f64>, _: &Point3<f64>, _: &Point3<f64>| 0.5, 0.5);
        assert!(!gate.accepts(&[p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0)]));

        let gate = QualityGate::default();
        let good = [p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0)];
        let bad = [p(0.0, 0.0), p(0.0, 1.0), p(1.0, 0.0)];
        assert!(gate.accepts_all([&good]));
        assert!(!gate.accepts_all([&good, &bad]));
    }
}
