//! Error types for tessel.
//!
//! Geometric infeasibility (a quality veto, an exhausted dichotomy) is not an
//! error: operators report it as a plain `false` / `None`. The variants here
//! cover construction problems, caller contract violations, fatal resource
//! exhaustion and, as a separate kind, broken mesh invariants.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// The mesh has no elements.
    #[error("mesh has no elements")]
    EmptyMesh,

    /// An element references an invalid vertex index.
    #[error("element {element} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The element index.
        element: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// An element has duplicate vertex indices.
    #[error("element {element} is degenerate (has duplicate vertices)")]
    DegenerateElement {
        /// The element index.
        element: usize,
    },

    /// An arena could not grow past its configured limit.
    #[error("unable to allocate a new {kind}: arena limit of {limit} reached")]
    ArenaExhausted {
        /// What was being allocated ("point", "element").
        kind: &'static str,
        /// The hard limit of the arena.
        limit: usize,
    },

    /// A split operator was called with a flag it does not handle.
    #[error("flag {flag:#05b} is not a {edges}-edge split pattern")]
    InvalidSplitPattern {
        /// The element's edge flag.
        flag: u8,
        /// Number of edges the operator splits.
        edges: usize,
    },

    /// The metric has more than one component per point.
    #[error("anisotropic metric (size {size}) is not supported")]
    AnisotropicMetric {
        /// Number of components per point.
        size: usize,
    },

    /// The metric does not have one value per point.
    #[error("metric has {actual} values, mesh has {expected} points")]
    MetricSizeMismatch {
        /// Number of points in the mesh.
        expected: usize,
        /// Number of values in the metric.
        actual: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },

    /// A mesh invariant does not hold.
    #[error("invalid mesh: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Whether meshing cannot continue after this error.
    ///
    /// Arena exhaustion and invariant violations are fatal; the remaining
    /// kinds reject a request before anything was modified.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MeshError::ArenaExhausted { .. } | MeshError::Invariant(_)
        )
    }
}

/// A broken structural invariant, reported by the consistency checks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Face `(element, face)` points to a face that does not point back.
    #[error("adjacency of element {element} face {face} is not symmetric")]
    AsymmetricAdjacency {
        /// Element index.
        element: usize,
        /// Local face.
        face: usize,
    },

    /// Two faces are linked but do not share the same vertices.
    #[error("element {element} face {face} is linked to a face with different vertices")]
    FaceMismatch {
        /// Element index.
        element: usize,
        /// Local face.
        face: usize,
    },

    /// A face is linked to an inactive element.
    #[error("element {element} face {face} is linked to inactive element {neighbor}")]
    DanglingNeighbor {
        /// Element index.
        element: usize,
        /// Local face.
        face: usize,
        /// The inactive neighbour.
        neighbor: usize,
    },

    /// A face is linked differently from what matching face vertices gives.
    #[error("adjacency of element {element} face {face} differs from the recomputed one")]
    StaleAdjacency {
        /// Element index.
        element: usize,
        /// Local face.
        face: usize,
    },

    /// An element references an inactive point.
    #[error("element {element} references inactive point {point}")]
    DanglingPoint {
        /// Element index.
        element: usize,
        /// The inactive point.
        point: usize,
    },

    /// The edge list holds the same endpoint pair twice.
    #[error("geometric edge ({a}, {b}) is stored more than once")]
    DuplicateEdge {
        /// First endpoint.
        a: usize,
        /// Second endpoint.
        b: usize,
    },

    /// Split edges are still waiting for their neighbour to be split.
    #[error("{count} split edges are still hanging")]
    HangingEdges {
        /// Number of parked half-edges.
        count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_kinds() {
        let oom = MeshError::ArenaExhausted { kind: "point", limit: 8 };
        assert!(oom.is_fatal());

        let broken: MeshError = InvariantViolation::HangingEdges { count: 2 }.into();
        assert!(broken.is_fatal());

        let pattern = MeshError::InvalidSplitPattern { flag: 3, edges: 1 };
        assert!(!pattern.is_fatal());
    }

    #[test]
    fn test_messages() {
        let err = MeshError::InvalidSplitPattern { flag: 5, edges: 1 };
        assert_eq!(err.to_string(), "flag 0b101 is not a 1-edge split pattern");

        let err = MeshError::invalid_param("growth", -1.0, "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid parameter: growth = -1 (must be positive)"
        );
    }
}
