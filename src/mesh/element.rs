//! Simplex elements: triangles and tetrahedra.
//!
//! Local numbering follows the usual simplex conventions. For a triangle,
//! face (edge) `i` is opposite vertex `i` and joins `v[NEXT[i]]` to
//! `v[PREV[i]]`. For a tetrahedron, face `i` is opposite vertex `i` and the six
//! edges are listed in [`TET_EDGES`].

use super::index::{PointId, XTetraId};
use super::tag::Tag;

/// Next local vertex in a triangle (counter-clockwise).
pub const NEXT: [usize; 3] = [1, 2, 0];

/// Previous local vertex in a triangle.
pub const PREV: [usize; 3] = [2, 0, 1];

/// Local vertices of each tetrahedron edge.
pub const TET_EDGES: [[usize; 2]; 6] = [[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]];

/// Local vertices of each tetrahedron face, oriented outward.
pub const TET_FACES: [[usize; 3]; 4] = [[1, 2, 3], [0, 3, 2], [0, 1, 3], [0, 2, 1]];

/// Local vertices of each triangle face (edge).
const TRI_FACES: [[usize; 2]; 3] = [[1, 2], [2, 0], [0, 1]];

/// A boundary facet derived from the element set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryFacet {
    /// Vertices, oriented outward.
    pub v: [PointId; 3],
    /// Boundary reference.
    pub reference: i32,
}

/// Behaviour shared by the element kinds stored in a
/// [`SimplexMesh`](super::SimplexMesh).
pub trait Element: Clone + std::fmt::Debug {
    /// Number of vertices.
    const VERTICES: usize;
    /// Number of faces, i.e. adjacency slots per element.
    const FACES: usize;
    /// Number of edges.
    const EDGES: usize;
    /// Name used in messages.
    const KIND: &'static str;

    /// Vertex ids.
    fn vertices(&self) -> &[PointId];

    /// Vertex ids, mutably.
    fn vertices_mut(&mut self) -> &mut [PointId];

    /// Local vertices of face `face`.
    fn face_local(face: usize) -> &'static [usize];

    /// Local vertices of edge `edge`.
    fn edge_local(edge: usize) -> [usize; 2];

    /// Tag and reference of edge `edge`, looking into the extended boundary
    /// table when the element keeps its features there.
    fn edge_feature(&self, edge: usize, xtetra: &[XTetra]) -> (Tag, i32);

    /// Generation marker.
    fn base(&self) -> i32;

    /// Element reference.
    fn reference(&self) -> i32;

    /// Append the boundary facets contributed by this element.
    ///
    /// `is_open(face)` tells whether a face has no neighbour.
    fn boundary_facets(&self, is_open: &dyn Fn(usize) -> bool, xtetra: &[XTetra], out: &mut Vec<BoundaryFacet>);

    /// Sorted vertex ids of face `face`, used to match faces of neighbours.
    fn face_key(&self, face: usize) -> Vec<PointId> {
        let v = self.vertices();
        let mut key: Vec<PointId> = Self::face_local(face).iter().map(|&i| v[i]).collect();
        key.sort_unstable();
        key
    }

    /// Vertex ids of edge `edge`.
    fn edge_points(&self, edge: usize) -> [PointId; 2] {
        let [a, b] = Self::edge_local(edge);
        let v = self.vertices();
        [v[a], v[b]]
    }
}

// ==================== Triangle ====================

/// A triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Vertices, counter-clockwise.
    pub v: [PointId; 3],

    /// Element reference.
    pub reference: i32,

    /// Tag of each edge.
    pub edge_tags: [Tag; 3],

    /// Boundary reference of each edge.
    pub edge_refs: [i32; 3],

    /// Edges marked for splitting in the current pass (bit `i` = edge `i`).
    pub flag: u8,

    /// Generation marker.
    pub base: i32,

    /// Cached quality.
    pub quality: f64,
}

impl Triangle {
    /// Create an untagged triangle.
    pub fn new(v: [PointId; 3]) -> Self {
        Self {
            v,
            reference: 0,
            edge_tags: [Tag::empty(); 3],
            edge_refs: [0; 3],
            flag: 0,
            base: 0,
            quality: 0.0,
        }
    }

    /// Mark edge `edge` as interior: no tag, no reference.
    #[inline]
    pub fn clear_edge(&mut self, edge: usize) {
        self.edge_tags[edge] = Tag::empty();
        self.edge_refs[edge] = 0;
    }

    /// Local index of the point `p`, if it is a vertex.
    pub fn local_of(&self, p: PointId) -> Option<usize> {
        self.v.iter().position(|&q| q == p)
    }
}

impl Element for Triangle {
    const VERTICES: usize = 3;
    const FACES: usize = 3;
    const EDGES: usize = 3;
    const KIND: &'static str = "triangle";

    #[inline]
    fn vertices(&self) -> &[PointId] {
        &self.v
    }

    #[inline]
    fn vertices_mut(&mut self) -> &mut [PointId] {
        &mut self.v
    }

    #[inline]
    fn face_local(face: usize) -> &'static [usize] {
        &TRI_FACES[face]
    }

    #[inline]
    fn edge_local(edge: usize) -> [usize; 2] {
        [NEXT[edge], PREV[edge]]
    }

    #[inline]
    fn edge_feature(&self, edge: usize, _xtetra: &[XTetra]) -> (Tag, i32) {
        (self.edge_tags[edge], self.edge_refs[edge])
    }

    #[inline]
    fn base(&self) -> i32 {
        self.base
    }

    #[inline]
    fn reference(&self) -> i32 {
        self.reference
    }

    /// In 2D the triangles are the boundary facets.
    fn boundary_facets(&self, _is_open: &dyn Fn(usize) -> bool, _xtetra: &[XTetra], out: &mut Vec<BoundaryFacet>) {
        out.push(BoundaryFacet {
            v: self.v,
            reference: self.reference,
        });
    }
}

// ==================== Tetrahedron ====================

/// Boundary data of a tetrahedron touching the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct XTetra {
    /// Reference of each face.
    pub face_refs: [i32; 4],
    /// Tag of each face.
    pub face_tags: [Tag; 4],
    /// Reference of each edge.
    pub edge_refs: [i32; 6],
    /// Tag of each edge.
    pub edge_tags: [Tag; 6],
}

/// A tetrahedron.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tetrahedron {
    /// Vertices, positively oriented.
    pub v: [PointId; 4],

    /// Element reference.
    pub reference: i32,

    /// Edges marked in the current pass (bit `i` = edge `i`).
    pub flag: u8,

    /// Generation marker.
    pub base: i32,

    /// Boundary data, when the tetrahedron touches the boundary.
    pub xt: Option<XTetraId>,

    /// Cached quality.
    pub quality: f64,
}

impl Tetrahedron {
    /// Create a tetrahedron without boundary data.
    pub fn new(v: [PointId; 4]) -> Self {
        Self {
            v,
            reference: 0,
            flag: 0,
            base: 0,
            xt: None,
            quality: 0.0,
        }
    }
}

impl Element for Tetrahedron {
    const VERTICES: usize = 4;
    const FACES: usize = 4;
    const EDGES: usize = 6;
    const KIND: &'static str = "tetrahedron";

    #[inline]
    fn vertices(&self) -> &[PointId] {
        &self.v
    }

    #[inline]
    fn vertices_mut(&mut self) -> &mut [PointId] {
        &mut self.v
    }

    #[inline]
    fn face_local(face: usize) -> &'static [usize] {
        &TET_FACES[face]
    }

    #[inline]
    fn edge_local(edge: usize) -> [usize; 2] {
        TET_EDGES[edge]
    }

    fn edge_feature(&self, edge: usize, xtetra: &[XTetra]) -> (Tag, i32) {
        self.xt
            .and_then(|xt| xtetra.get(xt.index() - 1))
            .map_or((Tag::empty(), 0), |x| (x.edge_tags[edge], x.edge_refs[edge]))
    }

    #[inline]
    fn base(&self) -> i32 {
        self.base
    }

    #[inline]
    fn reference(&self) -> i32 {
        self.reference
    }

    /// Faces without neighbour, and faces tagged as boundary in the extended
    /// data.
    fn boundary_facets(&self, is_open: &dyn Fn(usize) -> bool, xtetra: &[XTetra], out: &mut Vec<BoundaryFacet>) {
        let xt = self.xt.and_then(|xt| xtetra.get(xt.index() - 1));
        for (face, local) in TET_FACES.iter().enumerate() {
            let tagged = xt.is_some_and(|x| x.face_tags[face].contains(Tag::BOUNDARY));
            if is_open(face) || tagged {
                out.push(BoundaryFacet {
                    v: local.map(|i| self.v[i]),
                    reference: xt.map_or(0, |x| x.face_refs[face]),
                });
            }
        }
    }
}
