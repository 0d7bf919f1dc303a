//! Edge-split operators for triangle meshes.
//!
//! Splitting runs in two phases. A *simulation* (`split*_sim`) checks that
//! every triangle a split would produce passes the quality gate, without
//! touching the mesh. An *execution* (`split1`, `split2`, `split3`) then
//! rewrites the triangle in place and allocates its siblings, keeping
//! adjacency, edge tags and references consistent.
//!
//! Which edges of a triangle are split is given by its `flag`: bit `i` marks
//! edge `i`, the edge opposite vertex `i`, joining `v[NEXT[i]]` and
//! `v[PREV[i]]`.
//!
//! | flag      | operator | new elements |
//! |-----------|----------|--------------|
//! | 1, 2, 4   | `split1` | 1            |
//! | 3, 5, 6   | `split2` | 2            |
//! | 7         | `split3` | 3            |
//!
//! [`split1b`] splits a single edge together with the triangle across it,
//! with a point placed by [`split_point`].
//!
//! # Example
//!
//! ```
//! use tessel::prelude::*;
//! use tessel::algo::split::{split, split_sim};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 0.9, 0.0),
//! ];
//! let mut mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
//! let k = ElementId::new(1);
//!
//! // Mark edge 2, between the first two vertices, and insert its midpoint.
//! let m = mesh.add_point(Point::planar(0.5, 0.0)).unwrap();
//! mesh.element_mut(k).flag = 4;
//! let vx = [None, None, Some(m)];
//!
//! if split_sim(&mesh, k, &vx, &QualityGate::default()).unwrap() {
//!     split(&mut mesh, k, &vx, &mut NoMetric).unwrap();
//! }
//! assert_eq!(mesh.num_elements(), 2);
//! ```

mod exec;
mod pattern;
mod placement;
mod sim;

pub use exec::{split, split1, split1b, split2, split3};
pub use pattern::{EdgePoints, SplitPattern};
pub use placement::{dichotomy, split_point, DICHOTOMY_TRIALS};
pub(crate) use placement::curve_position;
pub use sim::{split1_sim, split2_sim, split3_sim, split_sim};
