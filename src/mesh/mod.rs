//! Core mesh data structures.
//!
//! # Overview
//!
//! The primary type is [`SimplexMesh`], an array-of-structs mesh of triangles
//! ([`TriMesh`]) or tetrahedra ([`TetMesh`]). Points and elements live in
//! [`Arena`]s addressed by typed ids; deleted entities leave holes that are
//! reused by later allocations and removed by the compaction pass.
//!
//! Alongside the arenas, the mesh keeps:
//! - an [`Adjacency`] table linking each element face to the face across it;
//! - an [`EdgeHash`] of geometric edges (boundary, ridge, required) keyed by
//!   endpoint pair;
//! - the edge and boundary-facet lists materialized by compaction.
//!
//! # Index Types
//!
//! - [`PointId`] - Identifies a point
//! - [`ElementId`] - Identifies a triangle or tetrahedron
//! - [`XTetraId`] - Identifies the boundary data of a tetrahedron
//!
//! Ids wrap a non-zero integer: slot 0 of every arena is reserved and "no
//! entity" is spelled `Option<Id>`.
//!
//! # Construction
//!
//! ```
//! use tessel::mesh::build_from_triangles;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
//! assert!(mesh.check().is_ok());
//! ```

mod adjacency;
mod arena;
mod builder;
mod check;
mod edge_hash;
mod element;
mod index;
mod point;
mod simplex;
mod tag;

pub use adjacency::{Adjacency, FaceRef};
pub use arena::{Arena, FreeSlots, Slot};
pub use builder::{
    build_from_tetrahedra, build_from_triangles, build_from_triangles_with, set_edge_feature,
    tag_boundary_edges, to_face_vertex,
};
pub use edge_hash::{EdgeHash, GeomEdge};
pub use element::{BoundaryFacet, Element, Tetrahedron, Triangle, XTetra, NEXT, PREV, TET_EDGES, TET_FACES};
pub use index::{ArenaId, EdgeKey, ElementId, PointId, XTetraId};
pub use point::Point;
pub use simplex::{SimplexMesh, TetMesh, TriMesh};
pub use tag::Tag;
