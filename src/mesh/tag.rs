//! Feature tags carried by points and element edges.

use bitflags::bitflags;

bitflags! {
    /// Bitmask describing the geometric role of a point or an edge.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Tag: u16 {
        /// Carries a boundary reference.
        const REFERENCE = 1 << 0;
        /// Lies on a ridge (sharp feature line).
        const RIDGE = 1 << 1;
        /// Must not be modified.
        const REQUIRED = 1 << 2;
        /// Non-manifold edge or point.
        const NON_MANIFOLD = 1 << 3;
        /// Lies on the domain boundary.
        const BOUNDARY = 1 << 4;
        /// Corner point.
        const CORNER = 1 << 5;
        /// Slot holds no live entity.
        const UNUSED = 1 << 6;
    }
}

impl Tag {
    /// Whether an edge with this tag follows a curve rather than a straight
    /// segment (ridge or referenced boundary).
    #[inline]
    pub fn is_geometric(self) -> bool {
        self.intersects(Tag::RIDGE | Tag::REFERENCE)
    }

    /// Whether the position of a point with this tag is pinned, so curve
    /// tangents at it are taken from the chord.
    #[inline]
    pub fn is_singular(self) -> bool {
        self.intersects(Tag::CORNER | Tag::REQUIRED | Tag::NON_MANIFOLD)
    }
}
