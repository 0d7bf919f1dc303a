//! Structural consistency checks.
//!
//! These walk the whole mesh and are meant for tests and debug runs. A
//! failure is a programming error in a mesh operator, reported as
//! [`MeshError::Invariant`](crate::error::MeshError::Invariant).

use std::collections::HashSet;

use super::adjacency::FaceRef;
use super::element::Element;
use super::index::EdgeKey;
use super::simplex::SimplexMesh;
use crate::error::{InvariantViolation, Result};

impl<E: Element> SimplexMesh<E> {
    /// Verify that every adjacency slot of a live element points to a live
    /// element whose matching slot points back, across a face with the same
    /// vertices.
    pub fn check_adjacency(&self) -> Result<()> {
        for (k, element) in self.elements.iter() {
            for face in 0..E::FACES {
                let Some(opposite) = self.adjacency.get(k, face) else {
                    continue;
                };
                let Some(neighbor) = self.elements.get(opposite.element) else {
                    return Err(InvariantViolation::DanglingNeighbor {
                        element: k.index(),
                        face,
                        neighbor: opposite.element.index(),
                    }
                    .into());
                };
                if self.adjacency.get(opposite.element, opposite.face) != Some(FaceRef::new(k, face)) {
                    return Err(InvariantViolation::AsymmetricAdjacency {
                        element: k.index(),
                        face,
                    }
                    .into());
                }
                if element.face_key(face) != neighbor.face_key(opposite.face) {
                    return Err(InvariantViolation::FaceMismatch {
                        element: k.index(),
                        face,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Run every structural check: adjacency, point references, uniqueness
    /// of the persisted geometric edges, the absence of hanging edges, and
    /// agreement of the adjacency with one recomputed from scratch.
    pub fn check(&self) -> Result<()> {
        self.check_adjacency()?;

        for (k, element) in self.elements.iter() {
            for &p in element.vertices() {
                if !self.points.get(p).is_some_and(|point| point.is_used()) {
                    return Err(InvariantViolation::DanglingPoint {
                        element: k.index(),
                        point: p.index(),
                    }
                    .into());
                }
            }
        }

        let mut seen = HashSet::with_capacity(self.edges.len());
        for edge in &self.edges {
            if !seen.insert(EdgeKey::new(edge.a, edge.b)) {
                return Err(InvariantViolation::DuplicateEdge {
                    a: edge.a.index(),
                    b: edge.b.index(),
                }
                .into());
            }
        }

        if !self.hanging.is_empty() {
            return Err(InvariantViolation::HangingEdges {
                count: self.hanging.len(),
            }
            .into());
        }

        let mut fresh = self.adjacency.clone();
        fresh.rebuild(self.elements.iter());
        for k in self.elements.ids() {
            for face in 0..E::FACES {
                if fresh.get(k, face) != self.adjacency.get(k, face) {
                    return Err(InvariantViolation::StaleAdjacency {
                        element: k.index(),
                        face,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use crate::error::{InvariantViolation, MeshError};
    use crate::mesh::adjacency::FaceRef;
    use crate::mesh::builder::build_from_triangles;
    use crate::mesh::edge_hash::GeomEdge;
    use crate::mesh::index::{EdgeKey, ElementId, PointId};
    use crate::mesh::simplex::TriMesh;
    use crate::mesh::tag::Tag;

    fn square() -> TriMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap()
    }

    #[test]
    fn test_valid_mesh_passes() {
        let mesh = square();
        assert!(mesh.check().is_ok());
    }

    #[test]
    fn test_asymmetric_adjacency() {
        let mut mesh = square();
        let k = ElementId::new(1);
        let l = ElementId::new(2);
        // Point a boundary face of k at l without the way back.
        mesh.adjacency.set(k, 0, Some(FaceRef::new(l, 0)));
        assert!(matches!(
            mesh.check_adjacency(),
            Err(MeshError::Invariant(InvariantViolation::AsymmetricAdjacency { element: 1, face: 0 }))
        ));
    }

    #[test]
    fn test_face_mismatch() {
        let mut mesh = square();
        let k = ElementId::new(1);
        let l = ElementId::new(2);
        mesh.adjacency.link(FaceRef::new(k, 0), FaceRef::new(l, 0));
        assert!(matches!(
            mesh.check_adjacency(),
            Err(MeshError::Invariant(InvariantViolation::FaceMismatch { .. }))
        ));
    }

    #[test]
    fn test_missing_link_is_stale() {
        let mut mesh = square();
        // Shared diagonal: face 1 of the first triangle, face 2 of the second.
        mesh.adjacency.unlink(ElementId::new(1), 1);
        assert!(mesh.check_adjacency().is_ok());
        assert_eq!(
            mesh.check().unwrap_err(),
            MeshError::Invariant(InvariantViolation::StaleAdjacency { element: 1, face: 1 })
        );
    }

    #[test]
    fn test_dangling_point() {
        let mut mesh = square();
        mesh.remove_point(PointId::new(4));
        assert_eq!(
            mesh.check().unwrap_err(),
            MeshError::Invariant(InvariantViolation::DanglingPoint { element: 2, point: 4 })
        );
    }

    #[test]
    fn test_duplicate_edge() {
        let mut mesh = square();
        let edge = GeomEdge {
            a: PointId::new(1),
            b: PointId::new(2),
            tag: Tag::RIDGE,
            reference: 0,
        };
        mesh.edges = vec![edge, GeomEdge { a: edge.b, b: edge.a, ..edge }];
        assert!(matches!(
            mesh.check(),
            Err(MeshError::Invariant(InvariantViolation::DuplicateEdge { .. }))
        ));
    }

    #[test]
    fn test_hanging_edges() {
        let mut mesh = square();
        mesh.hanging.insert(
            EdgeKey::new(PointId::new(1), PointId::new(2)),
            FaceRef::new(ElementId::new(1), 2),
        );
        assert_eq!(
            mesh.check().unwrap_err(),
            MeshError::Invariant(InvariantViolation::HangingEdges { count: 1 })
        );
    }
}
