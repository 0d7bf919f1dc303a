//! # Tessel
//!
//! An unstructured mesh adaptation kernel for planar triangle meshes, with
//! the tetrahedral storage needed to compact volume meshes.
//!
//! Tessel provides an arena-backed simplex mesh with a face adjacency table,
//! and the local operators that refine it: edge splits of one, two or three
//! edges of a triangle, the split of an edge shared by two triangles, and the
//! placement of new points on curved boundaries. A compaction pass renumbers
//! the mesh once adaptation is done.
//!
//! ## Features
//!
//! - **Typed arenas**: non-zero ids, intrusive free lists, bounded growth
//! - **All-or-nothing splits**: every split is simulated against a quality
//!   gate before the mesh is touched
//! - **Symmetric adjacency**: kept consistent after every single operator
//! - **Curved boundaries**: points on geometric edges follow a Bezier
//!   reconstruction of the boundary
//! - **Checks**: a full consistency check, always available
//!
//! ## Quick Start
//!
//! ```
//! use tessel::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 0.9, 0.0),
//! ];
//! let mut mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
//! assert_eq!(mesh.num_points(), 3);
//! assert_eq!(mesh.num_elements(), 1);
//!
//! // Split the first edge of the triangle, on a point found by placement.
//! let k = ElementId::new(1);
//! let gate = QualityGate::default();
//! let ip = split_point(&mut mesh, k, 0, &gate, &BezierCurve, &mut NoMetric)
//!     .unwrap()
//!     .expect("a well-shaped triangle can be split");
//! split1b(&mut mesh, k, 0, ip).unwrap();
//!
//! assert_eq!(mesh.num_elements(), 2);
//! mesh.check().unwrap();
//! ```
//!
//! ## Error Handling
//!
//! An infeasible split is a plain result value (`false` from a simulation,
//! `None` from placement). Errors are reserved for contract violations,
//! arena exhaustion and broken invariants; see [`error::MeshError`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod config;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use tessel::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::compact::{pack, PackReport};
    pub use crate::algo::curve::{BezierCurve, CurveEvaluator};
    pub use crate::algo::metric::{Metric, MetricField, NoMetric};
    pub use crate::algo::quality::{IsoQuality, QualityGate, QualityOracle};
    pub use crate::algo::split::{split1b, split_point};
    pub use crate::config::{AdaptConfig, ArenaConfig};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_tetrahedra, build_from_triangles, to_face_vertex, Element, ElementId, FaceRef, Point,
        PointId, Tag, TetMesh, Tetrahedron, TriMesh, Triangle,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_square_round_trip() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [0, 2, 3]];

        let mesh: TriMesh = build_from_triangles(&vertices, &faces).unwrap();
        assert_eq!(mesh.num_points(), 4);
        assert_eq!(mesh.num_elements(), 2);
        assert!(mesh.check().is_ok());

        let (out_vertices, out_faces) = to_face_vertex(&mesh);
        assert_eq!(out_vertices, vertices);
        assert_eq!(out_faces, faces);
    }
}
