//! Mesh adaptation algorithms.
//!
//! - **Quality**: the shape measure and acceptance gate every operator uses
//! - **Curve**: reconstruction of curved boundary edges
//! - **Metric**: the isotropic sizing field carried along by modifications
//! - **Split**: one-, two- and three-edge splits of a triangle, and the split
//!   of an edge shared by two triangles
//! - **Refine**: a pass splitting every marked edge that can be split
//! - **Compact**: dense renumbering after a pass
//!
//! # Example
//!
//! ```
//! use tessel::prelude::*;
//! use tessel::algo::{compact::pack, curve::BezierCurve, refine::split_marked};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mut mesh = build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap();
//! let config = AdaptConfig::default();
//! let mut metric = Metric::uniform(4, 0.5).unwrap();
//!
//! // Mark every edge of the first triangle.
//! mesh.element_mut(ElementId::new(1)).flag = 7;
//! split_marked(&mut mesh, &QualityGate::iso(&config), &BezierCurve, &mut metric).unwrap();
//!
//! let report = pack(&mut mesh, &mut metric, &config).unwrap();
//! assert_eq!(report.elements, 6);
//! ```

pub mod compact;
pub mod curve;
pub mod metric;
pub mod quality;
pub mod refine;
pub mod split;
