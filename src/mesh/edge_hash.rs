//! Hash of geometric edges keyed by their unordered endpoint pair.
//!
//! The table holds the edges that carry boundary information (a reference, a
//! ridge, a required flag). It is filled during analysis and rebuilt from
//! scratch by the compaction pass, which then materializes the persisted edge
//! list in insertion order.

use indexmap::IndexMap;

use super::index::{EdgeKey, PointId};
use super::tag::Tag;

/// A geometric edge record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeomEdge {
    /// First endpoint, as first inserted.
    pub a: PointId,
    /// Second endpoint.
    pub b: PointId,
    /// Feature tag.
    pub tag: Tag,
    /// Boundary reference.
    pub reference: i32,
}

/// Geometric edge table with at most one record per endpoint pair.
#[derive(Debug, Clone, Default)]
pub struct EdgeHash {
    edges: IndexMap<EdgeKey, GeomEdge>,
}

impl EdgeHash {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table sized for `capacity` edges.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            edges: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert the edge `(a, b)`, merging with an existing record.
    ///
    /// Tags are or-ed together; the first non-zero reference wins. Returns
    /// `true` if a new record was created.
    pub fn insert(&mut self, a: PointId, b: PointId, tag: Tag, reference: i32) -> bool {
        let mut created = false;
        let edge = self.edges.entry(EdgeKey::new(a, b)).or_insert_with(|| {
            created = true;
            GeomEdge {
                a,
                b,
                tag: Tag::empty(),
                reference: 0,
            }
        });
        edge.tag |= tag;
        if edge.reference == 0 {
            edge.reference = reference;
        }
        created
    }

    /// Look up the edge `(a, b)` in either orientation.
    #[inline]
    pub fn get(&self, a: PointId, b: PointId) -> Option<&GeomEdge> {
        self.edges.get(&EdgeKey::new(a, b))
    }

    /// Remove the edge `(a, b)`.
    pub fn remove(&mut self, a: PointId, b: PointId) -> Option<GeomEdge> {
        self.edges.shift_remove(&EdgeKey::new(a, b))
    }

    /// Number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.edges.clear();
    }

    /// Iterate over records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &GeomEdge> + '_ {
        self.edges.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(i: usize) -> PointId {
        PointId::new(i)
    }

    #[test]
    fn test_one_record_per_pair() {
        let mut hash = EdgeHash::new();
        assert!(hash.insert(p(1), p(2), Tag::RIDGE, 0));
        assert!(!hash.insert(p(2), p(1), Tag::REQUIRED, 5));
        assert_eq!(hash.len(), 1);

        let edge = hash.get(p(1), p(2)).unwrap();
        assert_eq!(edge.tag, Tag::RIDGE | Tag::REQUIRED);
        assert_eq!(edge.reference, 5);
        assert_eq!((edge.a, edge.b), (p(1), p(2)));
    }

    #[test]
    fn test_first_reference_wins() {
        let mut hash = EdgeHash::new();
        hash.insert(p(3), p(4), Tag::REFERENCE, 7);
        hash.insert(p(4), p(3), Tag::REFERENCE, 9);
        assert_eq!(hash.get(p(4), p(3)).unwrap().reference, 7);
    }

    #[test]
    fn test_iteration_keeps_insertion_order() {
        let mut hash = EdgeHash::with_capacity(4);
        hash.insert(p(5), p(6), Tag::RIDGE, 0);
        hash.insert(p(1), p(2), Tag::RIDGE, 0);
        hash.insert(p(3), p(4), Tag::RIDGE, 0);
        hash.remove(p(1), p(2));

        let order: Vec<_> = hash.iter().map(|e| e.a).collect();
        assert_eq!(order, vec![p(5), p(3)]);
    }
}
