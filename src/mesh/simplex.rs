//! The simplex mesh container.
//!
//! A [`SimplexMesh`] owns the point and element arenas together with the
//! structures derived from them: the adjacency table, the geometric edge hash
//! and the persisted edge and boundary-facet lists rebuilt by compaction.

use std::collections::HashMap;

use nalgebra::Point3;

use super::adjacency::{Adjacency, FaceRef};
use super::arena::Arena;
use super::edge_hash::{EdgeHash, GeomEdge};
use super::element::{BoundaryFacet, Element, Tetrahedron, Triangle, XTetra};
use super::index::{EdgeKey, ElementId, PointId, XTetraId};
use super::point::Point;
use crate::config::ArenaConfig;
use crate::error::Result;

/// A planar triangle mesh.
pub type TriMesh = SimplexMesh<Triangle>;

/// A tetrahedral mesh.
pub type TetMesh = SimplexMesh<Tetrahedron>;

/// Mesh made of simplices of kind `E`.
#[derive(Debug, Clone)]
pub struct SimplexMesh<E: Element> {
    pub(crate) points: Arena<PointId, Point>,
    pub(crate) elements: Arena<ElementId, E>,
    pub(crate) adjacency: Adjacency,
    pub(crate) xtetra: Vec<XTetra>,
    pub(crate) edge_hash: EdgeHash,
    pub(crate) edges: Vec<GeomEdge>,
    pub(crate) boundary: Vec<BoundaryFacet>,
    /// Halves of split edges waiting for the element across to be split.
    pub(crate) hanging: HashMap<EdgeKey, FaceRef>,
    pub(crate) base: i32,
}

impl<E: Element> SimplexMesh<E> {
    /// Create an empty mesh with room for `points` points and `elements`
    /// elements, or the configured minimums if larger.
    pub fn with_capacity(config: &ArenaConfig, points: usize, elements: usize) -> Self {
        let point_capacity = points.max(config.initial_points);
        let element_capacity = elements.max(config.initial_elements);
        Self {
            points: Arena::new("point", point_capacity, config.max_points, config.growth),
            elements: Arena::new(E::KIND, element_capacity, config.max_elements, config.growth),
            adjacency: Adjacency::new(E::FACES, element_capacity),
            xtetra: Vec::new(),
            edge_hash: EdgeHash::new(),
            edges: Vec::new(),
            boundary: Vec::new(),
            hanging: HashMap::new(),
            base: 0,
        }
    }

    // ==================== Accessors ====================

    /// Number of live points.
    #[inline]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Number of live elements.
    #[inline]
    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    /// The point arena.
    #[inline]
    pub fn points(&self) -> &Arena<PointId, Point> {
        &self.points
    }

    /// The element arena.
    #[inline]
    pub fn elements(&self) -> &Arena<ElementId, E> {
        &self.elements
    }

    /// The adjacency table.
    #[inline]
    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    /// Get a point.
    ///
    /// # Panics
    /// Panics if the point is not live.
    #[inline]
    pub fn point(&self, id: PointId) -> &Point {
        &self.points[id]
    }

    /// Get a point mutably.
    #[inline]
    pub fn point_mut(&mut self, id: PointId) -> &mut Point {
        &mut self.points[id]
    }

    /// Position of a point.
    #[inline]
    pub fn position(&self, id: PointId) -> &Point3<f64> {
        &self.points[id].position
    }

    /// Get an element.
    ///
    /// # Panics
    /// Panics if the element is not live.
    #[inline]
    pub fn element(&self, id: ElementId) -> &E {
        &self.elements[id]
    }

    /// Get an element mutably.
    #[inline]
    pub fn element_mut(&mut self, id: ElementId) -> &mut E {
        &mut self.elements[id]
    }

    /// The face across `(element, face)`, if any.
    #[inline]
    pub fn neighbor(&self, element: ElementId, face: usize) -> Option<FaceRef> {
        self.adjacency.get(element, face)
    }

    /// Geometric edge table.
    #[inline]
    pub fn edge_hash(&self) -> &EdgeHash {
        &self.edge_hash
    }

    /// Geometric edge table, mutably.
    #[inline]
    pub fn edge_hash_mut(&mut self) -> &mut EdgeHash {
        &mut self.edge_hash
    }

    /// Geometric edges materialized by the last compaction.
    #[inline]
    pub fn edges(&self) -> &[GeomEdge] {
        &self.edges
    }

    /// Boundary facets derived by the last compaction.
    #[inline]
    pub fn boundary(&self) -> &[BoundaryFacet] {
        &self.boundary
    }

    /// Extended boundary data of tetrahedra.
    #[inline]
    pub fn xtetra(&self) -> &[XTetra] {
        &self.xtetra
    }

    /// Number of split half-edges still waiting for their neighbour.
    #[inline]
    pub fn hanging_edges(&self) -> usize {
        self.hanging.len()
    }

    /// Current generation marker.
    #[inline]
    pub fn base(&self) -> i32 {
        self.base
    }

    /// Start a new generation and return its marker.
    pub fn next_base(&mut self) -> i32 {
        self.base += 1;
        self.base
    }

    // ==================== Mutation ====================

    /// Add a point, growing the arena if needed.
    ///
    /// # Errors
    /// [`MeshError::ArenaExhausted`](crate::error::MeshError::ArenaExhausted)
    /// if the point limit is reached.
    pub fn add_point(&mut self, point: Point) -> Result<PointId> {
        self.points.alloc_or_grow(point)
    }

    /// Add an element with no neighbours, growing the arena if needed.
    ///
    /// # Errors
    /// [`MeshError::ArenaExhausted`](crate::error::MeshError::ArenaExhausted)
    /// if the element limit is reached.
    pub fn add_element(&mut self, element: E) -> Result<ElementId> {
        let id = self.elements.alloc_or_grow(element)?;
        self.adjacency.resize(self.elements.capacity());
        self.adjacency.clear_row(id);
        Ok(id)
    }

    /// Add extended boundary data and return its id.
    pub fn add_xtetra(&mut self, xtetra: XTetra) -> XTetraId {
        self.xtetra.push(xtetra);
        XTetraId::new(self.xtetra.len())
    }

    /// Remove an element, detaching it from its neighbours.
    pub fn remove_element(&mut self, id: ElementId) -> Option<E> {
        if !self.elements.contains(id) {
            return None;
        }
        for face in 0..E::FACES {
            self.adjacency.unlink(id, face);
        }
        self.hanging.retain(|_, side| side.element != id);
        self.elements.free(id)
    }

    /// Remove a point. Elements still referencing it become dangling.
    pub fn remove_point(&mut self, id: PointId) -> Option<Point> {
        self.points.free(id)
    }
}

impl TriMesh {
    /// Positions of the vertices of a triangle.
    pub fn triangle_positions(&self, id: ElementId) -> [Point3<f64>; 3] {
        self.elements[id].v.map(|p| self.points[p].position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::adjacency::FaceRef;

    fn tiny() -> ArenaConfig {
        ArenaConfig::default().with_initial(2, 1).with_limits(8, 8)
    }

    fn triangle(mesh: &mut TriMesh) -> ElementId {
        let a = mesh.add_point(Point::planar(0.0, 0.0)).unwrap();
        let b = mesh.add_point(Point::planar(1.0, 0.0)).unwrap();
        let c = mesh.add_point(Point::planar(0.0, 1.0)).unwrap();
        mesh.add_element(Triangle::new([a, b, c])).unwrap()
    }

    #[test]
    fn test_add_grows_arenas() {
        let mut mesh = TriMesh::with_capacity(&tiny(), 0, 0);
        let k = triangle(&mut mesh);
        let l = mesh.add_element(*mesh.element(k)).unwrap();

        assert_eq!(mesh.num_points(), 3);
        assert_eq!(mesh.num_elements(), 2);
        assert!(mesh.points().capacity() >= 3);
        assert_eq!(mesh.neighbor(l, 0), None);
        assert_eq!(mesh.triangle_positions(k)[1], Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_remove_element_detaches_neighbours() {
        let mut mesh = TriMesh::with_capacity(&tiny(), 0, 0);
        let k = triangle(&mut mesh);
        let l = mesh.add_element(*mesh.element(k)).unwrap();
        mesh.adjacency.link(FaceRef::new(k, 1), FaceRef::new(l, 1));

        assert!(mesh.remove_element(l).is_some());
        assert_eq!(mesh.neighbor(k, 1), None);
        assert_eq!(mesh.num_elements(), 1);
        assert!(mesh.remove_element(l).is_none());
    }

    #[test]
    fn test_next_base() {
        let mut mesh = TriMesh::with_capacity(&tiny(), 0, 0);
        assert_eq!(mesh.base(), 0);
        assert_eq!(mesh.next_base(), 1);
        assert_eq!(mesh.base(), 1);
    }
}
