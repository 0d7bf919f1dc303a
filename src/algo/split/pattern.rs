//! Marked-edge patterns and the sub-triangle layouts they produce.
//!
//! Each split case is written once, against a reference labeling of the
//! triangle. A pattern carries the permutation `tau` that maps the reference
//! labels onto the actual local indices: for one edge, `tau[0]` is the split
//! edge; for two edges, `tau[1]` and `tau[2]` are.

use crate::error::{MeshError, Result};
use crate::mesh::PointId;

/// Points inserted on each local edge of a triangle, `None` where the edge is
/// not split.
pub type EdgePoints = [Option<PointId>; 3];

/// One-edge flags and their permutations.
const TAU_ONE: [(u8, [usize; 3]); 3] = [(1, [0, 1, 2]), (2, [1, 2, 0]), (4, [2, 0, 1])];

/// Two-edge flags and their permutations.
const TAU_TWO: [(u8, [usize; 3]); 3] = [(6, [0, 1, 2]), (5, [1, 2, 0]), (3, [2, 0, 1])];

/// A legal marked-edge configuration of a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPattern {
    /// One edge, `tau[0]`, is split.
    One {
        /// Permutation from the reference labeling.
        tau: [usize; 3],
    },
    /// Edges `tau[1]` and `tau[2]` are split.
    Two {
        /// Permutation from the reference labeling.
        tau: [usize; 3],
    },
    /// All three edges are split.
    Three,
}

impl SplitPattern {
    /// Decode an element flag. Returns `None` for 0 and values above 7.
    pub fn from_flag(flag: u8) -> Option<Self> {
        if flag == 7 {
            return Some(Self::Three);
        }
        if let Some(&(_, tau)) = TAU_ONE.iter().find(|(f, _)| *f == flag) {
            return Some(Self::One { tau });
        }
        TAU_TWO
            .iter()
            .find(|(f, _)| *f == flag)
            .map(|&(_, tau)| Self::Two { tau })
    }

    /// Number of split edges.
    pub fn edges(self) -> usize {
        match self {
            Self::One { .. } => 1,
            Self::Two { .. } => 2,
            Self::Three => 3,
        }
    }
}

/// Permutation of a one-edge flag.
pub(crate) fn one_edge(flag: u8) -> Result<[usize; 3]> {
    match SplitPattern::from_flag(flag) {
        Some(SplitPattern::One { tau }) => Ok(tau),
        _ => Err(MeshError::InvalidSplitPattern { flag, edges: 1 }),
    }
}

/// Permutation of a two-edge flag.
pub(crate) fn two_edge(flag: u8) -> Result<[usize; 3]> {
    match SplitPattern::from_flag(flag) {
        Some(SplitPattern::Two { tau }) => Ok(tau),
        _ => Err(MeshError::InvalidSplitPattern { flag, edges: 2 }),
    }
}

/// Check a three-edge flag.
pub(crate) fn three_edge(flag: u8) -> Result<()> {
    match SplitPattern::from_flag(flag) {
        Some(SplitPattern::Three) => Ok(()),
        _ => Err(MeshError::InvalidSplitPattern { flag, edges: 3 }),
    }
}

/// The point inserted on local edge `edge`.
pub(crate) fn inserted(vx: &EdgePoints, edge: usize) -> Result<PointId> {
    vx[edge].ok_or_else(|| MeshError::invalid_param("vx", edge, "no point on a marked edge"))
}

// ==================== Layouts ====================
//
// The first layout entry replaces the parent, the others are new elements.

/// Split of edge `tau[0]` at `m`.
pub(crate) fn one_edge_layout(v: [PointId; 3], tau: [usize; 3], m: PointId) -> [[PointId; 3]; 2] {
    let mut k = v;
    k[tau[2]] = m;
    let mut iel = v;
    iel[tau[1]] = m;
    [k, iel]
}

/// Split of edges `tau[1]` at `m1` and `tau[2]` at `m2`.
pub(crate) fn two_edge_layout(
    v: [PointId; 3],
    tau: [usize; 3],
    m1: PointId,
    m2: PointId,
) -> [[PointId; 3]; 3] {
    let mut k = v;
    k[tau[1]] = m2;
    k[tau[2]] = m1;
    let mut iel = v;
    iel[tau[0]] = m2;
    let mut jel = v;
    jel[tau[0]] = m1;
    jel[tau[1]] = m2;
    [k, iel, jel]
}

/// Split of every edge, `m[i]` on edge `i`.
pub(crate) fn three_edge_layout(v: [PointId; 3], m: [PointId; 3]) -> [[PointId; 3]; 4] {
    [
        [v[0], m[2], m[1]],
        [m[2], v[1], m[0]],
        [m[1], m[0], v[2]],
        [m[1], m[2], m[0]],
    ]
}
