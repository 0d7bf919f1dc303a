//! Face-to-face adjacency of simplex elements.
//!
//! Every `(element, face)` pair owns one slot. A slot stores the opposite
//! `(neighbour, face)` pair encoded as `arity * neighbour + face`, where
//! `arity` is the number of faces per element (3 for triangles, 4 for
//! tetrahedra). Element ids start at 1, so the encoded value is never zero and
//! an empty slot (boundary or non-manifold face) is `None` at no extra cost.
//!
//! The table is kept symmetric: if `(e, f)` points to `(e', f')` then `(e', f')`
//! points back to `(e, f)`. [`Adjacency::link`] and [`Adjacency::unlink`] edit
//! both sides at once.

use std::collections::HashMap;
use std::num::NonZeroU32;

use super::element::Element;
use super::index::{ElementId, PointId};

/// One side of a face: an element and a local face index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceRef {
    /// The element.
    pub element: ElementId,
    /// Local face index in `0..arity`.
    pub face: usize,
}

impl FaceRef {
    /// Create a face reference.
    #[inline]
    pub fn new(element: ElementId, face: usize) -> Self {
        Self { element, face }
    }
}

/// Flat adjacency table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacency {
    slots: Vec<Option<NonZeroU32>>,
    arity: usize,
}

impl Adjacency {
    /// Create an empty table for elements with `arity` faces and ids up to
    /// `capacity`.
    pub fn new(arity: usize, capacity: usize) -> Self {
        Self {
            slots: vec![None; arity * (capacity + 1)],
            arity,
        }
    }

    /// Number of faces per element.
    #[inline]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Make room for element ids up to `capacity`.
    pub fn resize(&mut self, capacity: usize) {
        let len = self.arity * (capacity + 1);
        if len > self.slots.len() {
            self.slots.resize(len, None);
        }
    }

    /// The face opposite to `(element, face)`, or `None` on the boundary.
    #[inline]
    pub fn get(&self, element: ElementId, face: usize) -> Option<FaceRef> {
        self.slots
            .get(self.slot(element, face))
            .copied()
            .flatten()
            .map(|code| self.decode(code))
    }

    /// Set one side of a face without touching the other side.
    #[inline]
    pub fn set(&mut self, element: ElementId, face: usize, opposite: Option<FaceRef>) {
        let slot = self.slot(element, face);
        self.slots[slot] = opposite.map(|r| self.encode(r));
    }

    /// Link two faces symmetrically.
    pub fn link(&mut self, a: FaceRef, b: FaceRef) {
        self.set(a.element, a.face, Some(b));
        self.set(b.element, b.face, Some(a));
    }

    /// Clear `(element, face)` and the opposite slot if it points back.
    ///
    /// Returns the former neighbour.
    pub fn unlink(&mut self, element: ElementId, face: usize) -> Option<FaceRef> {
        let opposite = self.get(element, face)?;
        if self.get(opposite.element, opposite.face) == Some(FaceRef::new(element, face)) {
            self.set(opposite.element, opposite.face, None);
        }
        self.set(element, face, None);
        Some(opposite)
    }

    /// Copy every slot of `from` into `to`. Neighbours are not updated.
    pub fn copy_row(&mut self, from: ElementId, to: ElementId) {
        let src = self.slot(from, 0);
        let dst = self.slot(to, 0);
        self.slots.copy_within(src..src + self.arity, dst);
    }

    /// Clear every slot of `element`. Neighbours are not updated.
    pub fn clear_row(&mut self, element: ElementId) {
        let start = self.slot(element, 0);
        self.slots[start..start + self.arity].fill(None);
    }

    /// Iterate over the slots of `element`.
    pub fn row(&self, element: ElementId) -> impl Iterator<Item = Option<FaceRef>> + '_ {
        (0..self.arity).map(move |face| self.get(element, face))
    }

    /// Move the row of `from` to `to` and repoint every neighbour at `to`.
    ///
    /// A face of `from` linked to `from` itself cannot occur in a valid
    /// simplex mesh.
    pub fn relocate(&mut self, from: ElementId, to: ElementId) {
        if from == to {
            return;
        }
        self.copy_row(from, to);
        self.clear_row(from);
        for face in 0..self.arity {
            if let Some(opposite) = self.get(to, face) {
                self.set(opposite.element, opposite.face, Some(FaceRef::new(to, face)));
            }
        }
    }

    /// Rebuild the whole table by matching element faces on their vertex sets.
    ///
    /// Faces shared by more than two elements are non-manifold and stay
    /// unlinked. Returns the number of such faces.
    pub fn rebuild<'a, E, I>(&mut self, elements: I) -> usize
    where
        E: Element + 'a,
        I: IntoIterator<Item = (ElementId, &'a E)>,
    {
        self.slots.fill(None);

        let mut faces: HashMap<Vec<PointId>, Vec<FaceRef>> = HashMap::new();
        for (id, element) in elements {
            for face in 0..E::FACES {
                faces
                    .entry(element.face_key(face))
                    .or_default()
                    .push(FaceRef::new(id, face));
            }
        }

        let mut non_manifold = 0;
        for sides in faces.values() {
            match sides.as_slice() {
                [a, b] => self.link(*a, *b),
                [_] => {}
                _ => non_manifold += 1,
            }
        }
        if non_manifold > 0 {
            log::warn!("{non_manifold} non-manifold faces left without neighbour");
        }
        non_manifold
    }

    // ==================== Encoding ====================

    #[inline]
    fn slot(&self, element: ElementId, face: usize) -> usize {
        debug_assert!(face < self.arity);
        self.arity * element.index() + face
    }

    #[inline]
    fn encode(&self, r: FaceRef) -> NonZeroU32 {
        let code = (self.arity * r.element.index() + r.face) as u32;
        NonZeroU32::new(code).unwrap_or(NonZeroU32::MIN)
    }

    #[inline]
    fn decode(&self, code: NonZeroU32) -> FaceRef {
        let code = code.get() as usize;
        FaceRef::new(ElementId::new(code / self.arity), code % self.arity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::element::Triangle;

    fn tri(a: usize, b: usize, c: usize) -> Triangle {
        Triangle::new([PointId::new(a), PointId::new(b), PointId::new(c)])
    }

    fn e(i: usize) -> ElementId {
        ElementId::new(i)
    }

    #[test]
    fn test_encoding_roundtrip() {
        let mut adj = Adjacency::new(3, 8);
        adj.set(e(2), 1, Some(FaceRef::new(e(7), 2)));
        assert_eq!(adj.get(e(2), 1), Some(FaceRef::new(e(7), 2)));
        assert_eq!(adj.get(e(2), 0), None);
    }

    #[test]
    fn test_link_and_unlink_are_symmetric() {
        let mut adj = Adjacency::new(3, 4);
        adj.link(FaceRef::new(e(1), 0), FaceRef::new(e(3), 2));
        assert_eq!(adj.get(e(3), 2), Some(FaceRef::new(e(1), 0)));

        assert_eq!(adj.unlink(e(3), 2), Some(FaceRef::new(e(1), 0)));
        assert_eq!(adj.get(e(1), 0), None);
        assert_eq!(adj.get(e(3), 2), None);
    }

    #[test]
    fn test_rebuild_two_triangles() {
        // (1,2,3) and (2,1,4) share edge 1-2: face 2 of the first, face 2 of
        // the second.
        let elements = [(e(1), tri(1, 2, 3)), (e(2), tri(2, 1, 4))];
        let mut adj = Adjacency::new(3, 2);
        let non_manifold = adj.rebuild(elements.iter().map(|(id, t)| (*id, t)));

        assert_eq!(non_manifold, 0);
        assert_eq!(adj.get(e(1), 2), Some(FaceRef::new(e(2), 2)));
        assert_eq!(adj.get(e(2), 2), Some(FaceRef::new(e(1), 2)));
        assert_eq!(adj.row(e(1)).flatten().count(), 1);
    }

    #[test]
    fn test_rebuild_skips_non_manifold_faces() {
        let elements = [
            (e(1), tri(1, 2, 3)),
            (e(2), tri(2, 1, 4)),
            (e(3), tri(1, 2, 5)),
        ];
        let mut adj = Adjacency::new(3, 3);
        let non_manifold = adj.rebuild(elements.iter().map(|(id, t)| (*id, t)));

        assert_eq!(non_manifold, 1);
        for id in 1..=3 {
            assert_eq!(adj.get(e(id), 2), None);
        }
    }

    #[test]
    fn test_relocate_repoints_neighbours() {
        let mut adj = Adjacency::new(3, 6);
        adj.link(FaceRef::new(e(5), 1), FaceRef::new(e(1), 0));
        adj.link(FaceRef::new(e(5), 2), FaceRef::new(e(3), 1));

        adj.relocate(e(5), e(2));

        assert_eq!(adj.row(e(5)).flatten().count(), 0);
        assert_eq!(adj.get(e(1), 0), Some(FaceRef::new(e(2), 1)));
        assert_eq!(adj.get(e(3), 1), Some(FaceRef::new(e(2), 2)));
        assert_eq!(adj.get(e(2), 2), Some(FaceRef::new(e(3), 1)));
    }

    #[test]
    fn test_resize_keeps_entries() {
        let mut adj = Adjacency::new(4, 1);
        adj.link(FaceRef::new(e(1), 3), FaceRef::new(e(1), 0));
        adj.resize(10);
        assert_eq!(adj.get(e(1), 3), Some(FaceRef::new(e(1), 0)));
        assert_eq!(adj.get(e(10), 3), None);
    }
}
