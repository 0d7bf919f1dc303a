//! Mesh points.

use nalgebra::{Point3, Vector3};

use super::tag::Tag;

/// A point of the mesh.
///
/// Planar meshes keep `position.z == 0` and use the x/y components of
/// `normal`.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Coordinates.
    pub position: Point3<f64>,

    /// Outward unit normal for boundary points, zero elsewhere.
    pub normal: Vector3<f64>,

    /// Feature tag.
    pub tag: Tag,

    /// Boundary patch reference.
    pub reference: i32,

    /// Scratch slot, used as the new index during compaction.
    pub tmp: u32,
}

impl Point {
    /// Create a point at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: Vector3::zeros(),
            tag: Tag::empty(),
            reference: 0,
            tmp: 0,
        }
    }

    /// Create a planar point.
    pub fn planar(x: f64, y: f64) -> Self {
        Self::new(Point3::new(x, y, 0.0))
    }

    /// Set the tag.
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = tag;
        self
    }

    /// Whether the point is part of the live mesh.
    #[inline]
    pub fn is_used(&self) -> bool {
        !self.tag.contains(Tag::UNUSED)
    }
}
