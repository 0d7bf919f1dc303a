//! Split simulation.
//!
//! Each predicate lays out the sub-triangles a split would produce in a
//! stack-local scratch copy, scores them, and accepts only if every one of
//! them passes the gate. The mesh is never touched.

use nalgebra::Point3;

use super::pattern::{self, EdgePoints, SplitPattern};
use crate::algo::quality::{QualityGate, QualityOracle};
use crate::error::{MeshError, Result};
use crate::mesh::{ElementId, PointId, TriMesh};

/// Whether splitting the single marked edge of `k` yields acceptable
/// triangles.
///
/// # Errors
/// [`MeshError::InvalidSplitPattern`]
/// if the flag of `k` is not a one-edge pattern.
pub fn split1_sim<Q: QualityOracle>(
    mesh: &TriMesh,
    k: ElementId,
    vx: &EdgePoints,
    gate: &QualityGate<Q>,
) -> Result<bool> {
    let tri = mesh.element(k);
    let tau = pattern::one_edge(tri.flag)?;
    let m = pattern::inserted(vx, tau[0])?;
    let layout = pattern::one_edge_layout(tri.v, tau, m);
    Ok(accepts_layout(mesh, k, &layout, gate))
}

/// Whether splitting the two marked edges of `k` yields acceptable
/// triangles.
///
/// # Errors
/// [`MeshError::InvalidSplitPattern`]
/// if the flag of `k` is not a two-edge pattern.
pub fn split2_sim<Q: QualityOracle>(
    mesh: &TriMesh,
    k: ElementId,
    vx: &EdgePoints,
    gate: &QualityGate<Q>,
) -> Result<bool> {
    let tri = mesh.element(k);
    let tau = pattern::two_edge(tri.flag)?;
    let m1 = pattern::inserted(vx, tau[1])?;
    let m2 = pattern::inserted(vx, tau[2])?;
    let layout = pattern::two_edge_layout(tri.v, tau, m1, m2);
    Ok(accepts_layout(mesh, k, &layout, gate))
}

/// Whether splitting all three edges of `k` yields acceptable triangles.
///
/// # Errors
/// [`MeshError::InvalidSplitPattern`]
/// if the flag of `k` is not 7.
pub fn split3_sim<Q: QualityOracle>(
    mesh: &TriMesh,
    k: ElementId,
    vx: &EdgePoints,
    gate: &QualityGate<Q>,
) -> Result<bool> {
    let tri = mesh.element(k);
    pattern::three_edge(tri.flag)?;
    let m = [
        pattern::inserted(vx, 0)?,
        pattern::inserted(vx, 1)?,
        pattern::inserted(vx, 2)?,
    ];
    let layout = pattern::three_edge_layout(tri.v, m);
    Ok(accepts_layout(mesh, k, &layout, gate))
}

/// Simulate the split of `k` according to its flag.
///
/// # Errors
/// [`MeshError::InvalidSplitPattern`] for a flag outside `1..=7`.
pub fn split_sim<Q: QualityOracle>(
    mesh: &TriMesh,
    k: ElementId,
    vx: &EdgePoints,
    gate: &QualityGate<Q>,
) -> Result<bool> {
    let flag = mesh.element(k).flag;
    match SplitPattern::from_flag(flag) {
        Some(SplitPattern::One { .. }) => split1_sim(mesh, k, vx, gate),
        Some(SplitPattern::Two { .. }) => split2_sim(mesh, k, vx, gate),
        Some(SplitPattern::Three) => split3_sim(mesh, k, vx, gate),
        None => Err(MeshError::InvalidSplitPattern {
            flag,
            edges: flag.count_ones() as usize,
        }),
    }
}

fn accepts_layout<Q: QualityOracle>(mesh: &TriMesh, k: ElementId, layout: &[[PointId; 3]], gate: &QualityGate<Q>) -> bool {
    for (child, scratch) in layout.iter().enumerate() {
        let positions: [Point3<f64>; 3] = scratch.map(|p| *mesh.position(p));
        let score = gate.score(&positions);
        if !gate.passes(score) {
            log::trace!("split of {k:?} vetoed: sub-triangle {child} scores {score:e}");
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_triangles, Point};

    fn equilateral() -> TriMesh {
        let h = 3.0_f64.sqrt() / 2.0;
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, h, 0.0),
        ];
        build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap()
    }

    fn midpoints(mesh: &mut TriMesh, k: ElementId) -> [PointId; 3] {
        let v = mesh.element(k).v;
        [0, 1, 2].map(|i| {
            let a = mesh.position(v[crate::mesh::NEXT[i]]);
            let b = mesh.position(v[crate::mesh::PREV[i]]);
            let mid = nalgebra::center(a, b);
            mesh.add_point(Point::new(mid)).unwrap()
        })
    }

    #[test]
    fn test_well_shaped_splits_pass() {
        let mut mesh = equilateral();
        let k = ElementId::new(1);
        let m = midpoints(&mut mesh, k);
        let gate = QualityGate::default();

        for flag in [1u8, 2, 4] {
            mesh.element_mut(k).flag = flag;
            let mut vx = [None; 3];
            vx[flag.trailing_zeros() as usize] = Some(m[flag.trailing_zeros() as usize]);
            assert!(split1_sim(&mesh, k, &vx, &gate).unwrap());
        }
        for flag in [3u8, 5, 6] {
            mesh.element_mut(k).flag = flag;
            let vx = [0, 1, 2].map(|i| (flag & (1 << i) != 0).then_some(m[i]));
            assert!(split2_sim(&mesh, k, &vx, &gate).unwrap());
        }
        mesh.element_mut(k).flag = 7;
        assert!(split3_sim(&mesh, k, &m.map(Some), &gate).unwrap());
    }

    #[test]
    fn test_single_bad_child_vetoes() {
        let mut mesh = equilateral();
        let k = ElementId::new(1);
        // A point on the extension of edge 2 inverts one of the children.
        let outside = mesh.add_point(Point::planar(2.0, 0.0)).unwrap();
        mesh.element_mut(k).flag = 4;
        let vx = [None, None, Some(outside)];
        assert!(!split1_sim(&mesh, k, &vx, &QualityGate::default()).unwrap());
    }

    #[test]
    fn test_sim_does_not_mutate() {
        let mut mesh = equilateral();
        let k = ElementId::new(1);
        let m = midpoints(&mut mesh, k);
        mesh.element_mut(k).flag = 7;
        let before = *mesh.element(k);
        split3_sim(&mesh, k, &m.map(Some), &QualityGate::default()).unwrap();
        assert_eq!(*mesh.element(k), before);
        assert_eq!(mesh.num_elements(), 1);
    }

    #[test]
    fn test_contract_violations() {
        let mut mesh = equilateral();
        let k = ElementId::new(1);
        let m = midpoints(&mut mesh, k);
        let gate = QualityGate::default();

        mesh.element_mut(k).flag = 3;
        assert!(split1_sim(&mesh, k, &m.map(Some), &gate).is_err());

        mesh.element_mut(k).flag = 1;
        assert!(split1_sim(&mesh, k, &[None, Some(m[1]), None], &gate).is_err());

        mesh.element_mut(k).flag = 0;
        assert_eq!(
            split_sim(&mesh, k, &m.map(Some), &gate).unwrap_err(),
            MeshError::InvalidSplitPattern { flag: 0, edges: 0 }
        );
        mesh.element_mut(k).flag = 5;
        assert!(split_sim(&mesh, k, &m.map(Some), &gate).unwrap());
    }
}
