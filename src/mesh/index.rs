//! Index types for mesh entities.
//!
//! Points and elements live in dense arenas whose slot 0 is reserved, so every
//! id wraps a [`NonZeroU32`]. "No entity" is spelled `Option<PointId>` and
//! costs nothing extra thanks to the niche.

use std::fmt::{self, Debug};
use std::num::NonZeroU32;

/// Conversion between typed ids and raw arena slots.
pub trait ArenaId: Copy + Eq + Ord + Debug {
    /// Build an id from a non-zero slot.
    ///
    /// # Panics
    /// Panics if `index` is zero or does not fit in 32 bits.
    fn from_index(index: usize) -> Self;

    /// The arena slot of this id (always `>= 1`).
    fn index(self) -> usize;
}

/// A type-safe point index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct PointId(NonZeroU32);

/// A type-safe element (triangle or tetrahedron) index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ElementId(NonZeroU32);

/// A type-safe index into the extended boundary data of tetrahedra.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct XTetraId(NonZeroU32);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl $name {
            /// Create a new index from a raw slot.
            ///
            /// # Panics
            /// Panics if `index` is zero.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self::try_new(index).expect(concat!($display, " index must be in 1..=u32::MAX"))
            }

            /// Create an index, or `None` for the reserved slot 0.
            #[inline]
            pub fn try_new(index: usize) -> Option<Self> {
                u32::try_from(index).ok().and_then(NonZeroU32::new).map(Self)
            }

            /// Get the raw slot.
            #[inline]
            pub fn index(self) -> usize {
                self.0.get() as usize
            }

            /// Get the raw value.
            #[inline]
            pub fn raw(self) -> u32 {
                self.0.get()
            }
        }

        impl ArenaId for $name {
            #[inline]
            fn from_index(index: usize) -> Self {
                Self::new(index)
            }

            #[inline]
            fn index(self) -> usize {
                self.0.get() as usize
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $display, self.index())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.index())
            }
        }
    };
}

impl_index_type!(PointId, "P");
impl_index_type!(ElementId, "E");
impl_index_type!(XTetraId, "XT");

/// Order-independent key of an edge.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct EdgeKey(PointId, PointId);

impl EdgeKey {
    /// Build the key of the edge `(a, b)`, in either orientation.
    #[inline]
    pub fn new(a: PointId, b: PointId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    /// The smaller endpoint.
    #[inline]
    pub fn min(self) -> PointId {
        self.0
    }

    /// The larger endpoint.
    #[inline]
    pub fn max(self) -> PointId {
        self.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_id() {
        let p = PointId::new(42);
        assert_eq!(p.index(), 42);
        assert_eq!(p.raw(), 42);
        assert!(PointId::try_new(0).is_none());
    }

    #[test]
    fn test_option_is_free() {
        assert_eq!(
            std::mem::size_of::<Option<ElementId>>(),
            std::mem::size_of::<u32>()
        );
    }

    #[test]
    #[should_panic]
    fn test_zero_panics() {
        let _ = ElementId::new(0);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", PointId::new(7)), "P(7)");
        assert_eq!(format!("{:?}", ElementId::new(3)), "E(3)");
    }

    #[test]
    fn test_edge_key_is_unordered() {
        let a = PointId::new(5);
        let b = PointId::new(2);
        assert_eq!(EdgeKey::new(a, b), EdgeKey::new(b, a));
        assert_eq!(EdgeKey::new(a, b).min(), b);
        assert_eq!(EdgeKey::new(a, b).max(), a);
    }
}
