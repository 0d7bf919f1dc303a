//! Isotropic sizing field attached to mesh points.
//!
//! The kernel only needs three things from a metric: a value for every point
//! it inserts, and the ability to follow points when compaction renumbers
//! them. [`MetricField`] captures that; [`NoMetric`] stands in when no field
//! is attached.

use crate::error::{MeshError, Result};
use crate::mesh::{Element, PointId, SimplexMesh};

/// A per-point field carried along by mesh modifications.
pub trait MetricField {
    /// Whether a field is actually attached.
    fn is_attached(&self) -> bool {
        true
    }

    /// Set the value at `target` by interpolating between `a` and `b` at
    /// parameter `s` (0 gives `a`, 1 gives `b`).
    fn interpolate(&mut self, a: PointId, b: PointId, target: PointId, s: f64);

    /// Move the value of `from` to `to` during compaction. `to <= from`.
    fn relocate(&mut self, from: PointId, to: PointId);

    /// Drop every value above `count` once compaction is done.
    fn truncate(&mut self, count: usize);
}

/// The absent metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetric;

impl MetricField for NoMetric {
    fn is_attached(&self) -> bool {
        false
    }

    fn interpolate(&mut self, _a: PointId, _b: PointId, _target: PointId, _s: f64) {}

    fn relocate(&mut self, _from: PointId, _to: PointId) {}

    fn truncate(&mut self, _count: usize) {}
}

/// Scalar (isotropic) size prescribed at each point.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    /// Indexed by point slot; slot 0 is unused. `None` marks a slot without
    /// a size.
    values: Vec<Option<f64>>,
}

impl Metric {
    /// Build a metric from one size per point, in point order.
    ///
    /// # Errors
    /// [`MeshError::InvalidParameter`] if a size is not positive and finite.
    pub fn from_values(values: &[f64]) -> Result<Self> {
        if let Some(&bad) = values.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
            return Err(MeshError::invalid_param("size", bad, "must be positive"));
        }
        let mut slots = Vec::with_capacity(values.len() + 1);
        slots.push(None);
        slots.extend(values.iter().copied().map(Some));
        Ok(Self { values: slots })
    }

    /// Build a metric from raw solution data with `size` components per
    /// point. Only scalar fields are supported.
    ///
    /// # Errors
    /// [`MeshError::AnisotropicMetric`] if `size != 1`.
    pub fn from_components(data: &[f64], size: usize) -> Result<Self> {
        if size != 1 {
            return Err(MeshError::AnisotropicMetric { size });
        }
        Self::from_values(data)
    }

    /// Build a metric for `mesh`, checking that there is one size per point
    /// slot in use.
    ///
    /// # Errors
    /// [`MeshError::MetricSizeMismatch`] on a count mismatch.
    pub fn for_mesh<E: Element>(mesh: &SimplexMesh<E>, values: &[f64]) -> Result<Self> {
        let expected = mesh.points().count();
        if values.len() != expected {
            return Err(MeshError::MetricSizeMismatch {
                expected,
                actual: values.len(),
            });
        }
        Self::from_values(values)
    }

    /// Uniform size on `count` points.
    pub fn uniform(count: usize, size: f64) -> Result<Self> {
        Self::from_values(&vec![size; count])
    }

    /// Size at a point.
    #[inline]
    pub fn get(&self, p: PointId) -> Option<f64> {
        self.values.get(p.index()).copied().flatten()
    }

    /// Set the size at a point, extending the field if needed. Slots skipped
    /// over by the extension stay without a size.
    pub fn set(&mut self, p: PointId, size: f64) {
        self.store(p, Some(size));
    }

    fn store(&mut self, p: PointId, size: Option<f64>) {
        if p.index() >= self.values.len() {
            if size.is_none() {
                return;
            }
            self.values.resize(p.index() + 1, None);
        }
        self.values[p.index()] = size;
    }

    /// Number of point slots covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len() - 1
    }

    /// Whether no point is covered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetricField for Metric {
    fn interpolate(&mut self, a: PointId, b: PointId, target: PointId, s: f64) {
        let (Some(ma), Some(mb)) = (self.get(a), self.get(b)) else {
            log::warn!("no size at {a:?} or {b:?}, {target:?} left without one");
            return;
        };
        self.set(target, (1.0 - s) * ma + s * mb);
    }

    fn relocate(&mut self, from: PointId, to: PointId) {
        let value = self.get(from);
        self.store(to, value);
    }

    fn truncate(&mut self, count: usize) {
        self.values.truncate(count + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(i: usize) -> PointId {
        PointId::new(i)
    }

    #[test]
    fn test_interpolate_midpoint() {
        let mut metric = Metric::from_values(&[1.0, 3.0]).unwrap();
        metric.interpolate(p(1), p(2), p(5), 0.5);
        assert_eq!(metric.get(p(5)), Some(2.0));
        assert_eq!(metric.len(), 5);
    }

    #[test]
    fn test_relocate_and_truncate() {
        let mut metric = Metric::from_values(&[1.0, 2.0, 3.0]).unwrap();
        metric.relocate(p(3), p(2));
        metric.truncate(2);
        assert_eq!(metric.get(p(2)), Some(3.0));
        assert_eq!(metric.get(p(3)), None);
    }

    #[test]
    fn test_missing_endpoint_is_not_interpolated() {
        let mut metric = Metric::from_values(&[1.0, 3.0]).unwrap();
        metric.interpolate(p(1), p(4), p(6), 0.5);
        assert_eq!(metric.get(p(6)), None);
        assert_eq!(metric.len(), 2);

        metric.set(p(5), 2.0);
        // The gap left by the extension has no size.
        assert_eq!(metric.get(p(3)), None);
        metric.interpolate(p(3), p(5), p(6), 0.5);
        assert_eq!(metric.get(p(6)), None);
        metric.interpolate(p(2), p(5), p(6), 0.5);
        assert_eq!(metric.get(p(6)), Some(2.5));
    }

    #[test]
    fn test_relocate_from_a_gap_clears_the_target() {
        let mut metric = Metric::from_values(&[1.0, 2.0]).unwrap();
        metric.set(p(4), 4.0);
        metric.relocate(p(3), p(2));
        metric.relocate(p(4), p(3));
        metric.truncate(3);
        assert_eq!(metric.get(p(2)), None);
        assert_eq!(metric.get(p(3)), Some(4.0));
    }

    #[test]
    fn test_rejects_anisotropic_and_invalid() {
        assert_eq!(
            Metric::from_components(&[1.0, 0.0, 1.0], 3).unwrap_err(),
            MeshError::AnisotropicMetric { size: 3 }
        );
        assert!(Metric::from_values(&[1.0, -2.0]).is_err());
        assert!(Metric::from_components(&[0.5], 1).is_ok());
    }

    #[test]
    fn test_no_metric_is_detached() {
        let mut none = NoMetric;
        assert!(!none.is_attached());
        none.interpolate(p(1), p(2), p(3), 0.5);
    }
}
