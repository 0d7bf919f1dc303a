//! Split execution.
//!
//! The execute variants replay the layout used by the matching simulation,
//! so callers are expected to have run it first: no quality check is
//! repeated here.
//!
//! Every edge of every child is one of three kinds:
//! - a whole edge of the parent, which inherits the parent's tag, reference
//!   and neighbour;
//! - half of a split edge, which inherits the tag and reference of that
//!   edge;
//! - an interior edge, which is cleared and linked to the sibling sharing it.
//!
//! Halves cannot be linked until the element across the split edge is split
//! too. The first side to be split clears the neighbour's slot and parks its
//! halves in the mesh's hanging-edge table; the second side picks them up.
//! Adjacency stays symmetric after every call, and a pass that splits both
//! sides of every marked edge leaves the table empty.

use super::pattern::{self, EdgePoints, SplitPattern};
use crate::algo::metric::MetricField;
use crate::error::{MeshError, Result};
use crate::mesh::{EdgeKey, Element, ElementId, FaceRef, PointId, Tag, TriMesh, Triangle, NEXT, PREV};

/// Split the single marked edge of `k` at the point `vx[edge]`.
///
/// Creates one element and returns it. A positive reference on the split
/// edge is copied onto the inserted point, and the metric is interpolated
/// there.
///
/// # Errors
/// - [`MeshError::InvalidSplitPattern`] if the flag of `k` is not a one-edge
///   pattern (nothing is modified);
/// - [`MeshError::ArenaExhausted`] if the element arena cannot grow (fatal).
pub fn split1<M: MetricField + ?Sized>(
    mesh: &mut TriMesh,
    k: ElementId,
    vx: &EdgePoints,
    metric: &mut M,
) -> Result<Vec<ElementId>> {
    let tri = mesh.element(k);
    let tau = pattern::one_edge(tri.flag)?;
    let m = pattern::inserted(vx, tau[0])?;
    let layout = pattern::one_edge_layout(tri.v, tau, m);

    let mut mids = [None; 3];
    mids[tau[0]] = Some(m);
    apply(mesh, k, mids, &layout, metric)
}

/// Split the two marked edges of `k`. Creates two elements.
///
/// # Errors
/// As [`split1`], for two-edge patterns.
pub fn split2<M: MetricField + ?Sized>(
    mesh: &mut TriMesh,
    k: ElementId,
    vx: &EdgePoints,
    metric: &mut M,
) -> Result<Vec<ElementId>> {
    let tri = mesh.element(k);
    let tau = pattern::two_edge(tri.flag)?;
    let m1 = pattern::inserted(vx, tau[1])?;
    let m2 = pattern::inserted(vx, tau[2])?;
    let layout = pattern::two_edge_layout(tri.v, tau, m1, m2);

    let mut mids = [None; 3];
    mids[tau[1]] = Some(m1);
    mids[tau[2]] = Some(m2);
    apply(mesh, k, mids, &layout, metric)
}

/// Split all three edges of `k`. Creates three elements.
///
/// # Errors
/// As [`split1`], for flag 7.
pub fn split3<M: MetricField + ?Sized>(
    mesh: &mut TriMesh,
    k: ElementId,
    vx: &EdgePoints,
    metric: &mut M,
) -> Result<Vec<ElementId>> {
    let tri = mesh.element(k);
    pattern::three_edge(tri.flag)?;
    let m = [
        pattern::inserted(vx, 0)?,
        pattern::inserted(vx, 1)?,
        pattern::inserted(vx, 2)?,
    ];
    let layout = pattern::three_edge_layout(tri.v, m);
    apply(mesh, k, m.map(Some), &layout, metric)
}

/// Split `k` according to its flag.
///
/// # Errors
/// [`MeshError::InvalidSplitPattern`] for a flag outside `1..=7`, and the
/// errors of the dispatched operator.
pub fn split<M: MetricField + ?Sized>(
    mesh: &mut TriMesh,
    k: ElementId,
    vx: &EdgePoints,
    metric: &mut M,
) -> Result<Vec<ElementId>> {
    let flag = mesh.element(k).flag;
    match SplitPattern::from_flag(flag) {
        Some(SplitPattern::One { .. }) => split1(mesh, k, vx, metric),
        Some(SplitPattern::Two { .. }) => split2(mesh, k, vx, metric),
        Some(SplitPattern::Three) => split3(mesh, k, vx, metric),
        None => Err(MeshError::InvalidSplitPattern {
            flag,
            edges: flag.count_ones() as usize,
        }),
    }
}

/// Split edge `i` of `k` at `ip`, together with the triangle across it.
///
/// `k` keeps the half touching `v[NEXT[i]]` and the new element the half
/// touching `v[PREV[i]]`. Across the edge, the neighbour keeps the half
/// touching its `v[PREV[j]]`. Creates one element, or two when the edge has
/// a neighbour, and returns them. Both sides leave the current pass with
/// their flag cleared and the mesh's current generation.
///
/// # Errors
/// [`MeshError::ArenaExhausted`] if the element arena cannot grow (fatal).
pub fn split1b(mesh: &mut TriMesh, k: ElementId, i: usize, ip: PointId) -> Result<Vec<ElementId>> {
    let across = mesh.neighbor(k, i);
    let mut mids = [None; 3];
    mids[i] = Some(ip);
    let parent = Parent::capture(mesh, k, mids)?;
    if let Some(n) = across {
        let mut other = [None; 3];
        other[n.face] = Some(ip);
        Parent::capture(mesh, n.element, other)?;
    }

    let created = alloc_children(mesh, &parent.tri, 1 + usize::from(across.is_some()))?;
    let base = mesh.base;

    let [kept, new] = pattern::one_edge_layout(parent.tri.v, [i, NEXT[i], PREV[i]], ip);
    rewire(mesh, &parent, &[(k, kept), (created[0], new)], base);

    if let Some(n) = across {
        let j = n.face;
        let mut mids = [None; 3];
        mids[j] = Some(ip);
        let other = Parent::capture(mesh, n.element, mids)?;
        let [moved, kept] = pattern::one_edge_layout(other.tri.v, [j, NEXT[j], PREV[j]], ip);
        rewire(mesh, &other, &[(n.element, kept), (created[1], moved)], base);
    }
    Ok(created)
}

// ==================== Internals ====================

/// Snapshot of the element being split.
struct Parent {
    tri: Triangle,
    neighbors: [Option<FaceRef>; 3],
    parked: [Option<EdgeKey>; 3],
    mids: [Option<PointId>; 3],
}

enum Role {
    Whole(usize),
    Half(usize),
    Interior,
}

impl Parent {
    fn capture(mesh: &TriMesh, id: ElementId, mids: [Option<PointId>; 3]) -> Result<Self> {
        let tri = *mesh.element(id);
        let neighbors = [0, 1, 2].map(|i| mesh.adjacency.get(id, i));

        let mut parked = [None; 3];
        for (key, side) in &mesh.hanging {
            if side.element == id {
                parked[side.face] = Some(*key);
            }
        }
        if let Some(edge) = (0..3).find(|&i| mids[i].is_some() && parked[i].is_some()) {
            return Err(MeshError::invalid_param(
                "edge",
                edge,
                "half of a split edge cannot be split before its neighbour",
            ));
        }

        Ok(Self {
            tri,
            neighbors,
            parked,
            mids,
        })
    }

    fn role(&self, a: PointId, b: PointId) -> Role {
        let key = EdgeKey::new(a, b);
        for j in 0..3 {
            let [p, q] = self.tri.edge_points(j);
            if key == EdgeKey::new(p, q) {
                return Role::Whole(j);
            }
            if let Some(m) = self.mids[j] {
                if key == EdgeKey::new(m, p) || key == EdgeKey::new(m, q) {
                    return Role::Half(j);
                }
            }
        }
        Role::Interior
    }
}

fn apply<M: MetricField + ?Sized>(
    mesh: &mut TriMesh,
    k: ElementId,
    mids: [Option<PointId>; 3],
    layout: &[[PointId; 3]],
    metric: &mut M,
) -> Result<Vec<ElementId>> {
    let parent = Parent::capture(mesh, k, mids)?;
    let created = alloc_children(mesh, &parent.tri, layout.len() - 1)?;

    for (j, m) in mids.iter().enumerate() {
        let Some(m) = *m else { continue };
        let reference = parent.tri.edge_refs[j];
        if reference > 0 {
            mesh.point_mut(m).reference = reference;
        }
        let [a, b] = parent.tri.edge_points(j);
        metric.interpolate(a, b, m, 0.5);
    }

    let children: Vec<(ElementId, [PointId; 3])> = std::iter::once(k)
        .chain(created.iter().copied())
        .zip(layout.iter().copied())
        .collect();
    rewire(mesh, &parent, &children, parent.tri.base);
    Ok(created)
}

/// Allocate `count` copies of `template`, all or none.
fn alloc_children(mesh: &mut TriMesh, template: &Triangle, count: usize) -> Result<Vec<ElementId>> {
    let mut created = Vec::with_capacity(count);
    for _ in 0..count {
        match mesh.add_element(*template) {
            Ok(id) => created.push(id),
            Err(err) => {
                for id in created {
                    mesh.elements.free(id);
                }
                return Err(err);
            }
        }
    }
    Ok(created)
}

/// Give each child its vertices, edge features and adjacency. The first
/// child must be the parent itself.
fn rewire(mesh: &mut TriMesh, parent: &Parent, children: &[(ElementId, [PointId; 3])], base: i32) {
    for j in 0..3 {
        if parent.mids[j].is_some() {
            if let Some(n) = parent.neighbors[j] {
                mesh.adjacency.set(n.element, n.face, None);
            }
        } else if let Some(key) = parent.parked[j] {
            mesh.hanging.remove(&key);
        }
    }

    let mut interior: Vec<(EdgeKey, FaceRef)> = Vec::with_capacity(3);
    for &(c, v) in children {
        mesh.elements[c] = Triangle {
            v,
            flag: 0,
            base,
            ..parent.tri
        };

        for e in 0..3 {
            let (a, b) = (v[NEXT[e]], v[PREV[e]]);
            let key = EdgeKey::new(a, b);
            let side = FaceRef::new(c, e);
            mesh.adjacency.set(c, e, None);

            let (tag, reference) = match parent.role(a, b) {
                Role::Whole(j) => {
                    if let Some(n) = parent.neighbors[j] {
                        mesh.adjacency.link(side, n);
                    } else if let Some(parked) = parent.parked[j] {
                        mesh.hanging.insert(parked, side);
                    }
                    (parent.tri.edge_tags[j], parent.tri.edge_refs[j])
                }
                Role::Half(j) => {
                    if parent.neighbors[j].is_some() {
                        mesh.hanging.insert(key, side);
                    } else if let Some(partner) = mesh.hanging.remove(&key) {
                        mesh.adjacency.link(side, partner);
                    }
                    (parent.tri.edge_tags[j], parent.tri.edge_refs[j])
                }
                Role::Interior => {
                    match interior.iter().position(|(other, _)| *other == key) {
                        Some(pos) => {
                            let (_, sibling) = interior.swap_remove(pos);
                            mesh.adjacency.link(side, sibling);
                        }
                        None => interior.push((key, side)),
                    }
                    (Tag::empty(), 0)
                }
            };

            let tri = &mut mesh.elements[c];
            tri.edge_tags[e] = tag;
            tri.edge_refs[e] = reference;
        }
    }
    debug_assert!(interior.is_empty(), "unmatched interior edges {interior:?}");
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use super::*;
    use crate::algo::metric::{Metric, NoMetric};
    use crate::algo::quality::{IsoQuality, QualityOracle, EPSD};
    use crate::config::ArenaConfig;
    use crate::mesh::{build_from_triangles, build_from_triangles_with, Point};

    fn p(i: usize) -> PointId {
        PointId::new(i)
    }

    fn e(i: usize) -> ElementId {
        ElementId::new(i)
    }

    fn single() -> TriMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 0.9, 0.0),
        ];
        build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap()
    }

    fn square() -> TriMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap()
    }

    fn midpoint(mesh: &mut TriMesh, a: PointId, b: PointId) -> PointId {
        let mid = nalgebra::center(mesh.position(a), mesh.position(b));
        mesh.add_point(Point::new(mid)).unwrap()
    }

    fn quality(mesh: &TriMesh, k: ElementId) -> f64 {
        let [a, b, c] = mesh.triangle_positions(k);
        IsoQuality.score(&a, &b, &c)
    }

    #[test]
    fn test_single_edge_split() {
        let mut mesh = single();
        let k = e(1);
        // Edge (1, 2) is local edge 2.
        mesh.element_mut(k).edge_refs[2] = 5;
        mesh.element_mut(k).flag = 4;
        let m = midpoint(&mut mesh, p(1), p(2));

        let created = split1(&mut mesh, k, &[None, None, Some(m)], &mut NoMetric).unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(mesh.num_elements(), 2);
        assert_eq!(mesh.num_points(), 4);
        assert_eq!(*mesh.position(m), Point3::new(0.5, 0.0, 0.0));
        assert_eq!(mesh.point(m).reference, 5);

        let iel = created[0];
        let shared = mesh.neighbor(k, 0).unwrap();
        assert_eq!(shared.element, iel);
        assert_eq!(mesh.element(k).edge_tags[0], Tag::empty());
        assert_eq!(mesh.element(iel).edge_tags[shared.face], Tag::empty());
        assert_eq!(mesh.element(iel).edge_refs[shared.face], 0);

        // Both halves keep the boundary data of the split edge.
        assert_eq!(mesh.element(k).edge_refs[2], 5);
        assert_eq!(mesh.element(iel).edge_refs[2], 5);

        assert!(quality(&mesh, k) > EPSD);
        assert!(quality(&mesh, iel) > EPSD);
        assert_eq!(mesh.element(k).flag, 0);
        mesh.check().unwrap();
    }

    #[test]
    fn test_three_edge_split() {
        let mut mesh = single();
        let k = e(1);
        let original = mesh.element(k).v;
        let m = [0, 1, 2].map(|i| midpoint(&mut mesh, original[NEXT[i]], original[PREV[i]]));
        mesh.element_mut(k).flag = 7;

        let created = split3(&mut mesh, k, &m.map(Some), &mut NoMetric).unwrap();

        assert_eq!(created.len(), 3);
        assert_eq!(mesh.num_elements(), 4);
        assert_eq!(mesh.num_points(), 6);
        assert_ne!(mesh.element(k).v, original);

        // The central triangle is made of the three new points only.
        let center = created[2];
        assert_eq!(mesh.element(center).v, [m[1], m[2], m[0]]);
        assert_eq!(mesh.adjacency().row(center).flatten().count(), 3);
        for id in std::iter::once(k).chain(created) {
            assert!(quality(&mesh, id) > EPSD);
        }
        mesh.check().unwrap();
    }

    #[test]
    fn test_two_edge_split_conserves_counts() {
        for flag in [3u8, 5, 6] {
            let mut mesh = single();
            let k = e(1);
            let v = mesh.element(k).v;
            let vx = [0, 1, 2].map(|i| {
                (flag & (1 << i) != 0).then(|| midpoint(&mut mesh, v[NEXT[i]], v[PREV[i]]))
            });
            mesh.element_mut(k).flag = flag;

            let created = split2(&mut mesh, k, &vx, &mut NoMetric).unwrap();
            assert_eq!(created.len(), 2);
            assert_eq!(mesh.num_elements(), 3);
            assert_eq!(mesh.num_points(), 5);
            mesh.check().unwrap();
        }
    }

    #[test]
    fn test_shared_edge_split_from_both_sides() {
        let mut mesh = square();
        let (k, l) = (e(1), e(2));
        // The diagonal 1-3 is edge 1 of k and edge 2 of l.
        let m = midpoint(&mut mesh, p(1), p(3));

        mesh.element_mut(k).flag = 2;
        split1(&mut mesh, k, &[None, Some(m), None], &mut NoMetric).unwrap();
        assert_eq!(mesh.hanging_edges(), 2);
        assert_eq!(mesh.neighbor(l, 2), None);
        mesh.check_adjacency().unwrap();

        mesh.element_mut(l).flag = 4;
        split1(&mut mesh, l, &[None, None, Some(m)], &mut NoMetric).unwrap();
        assert_eq!(mesh.hanging_edges(), 0);
        assert_eq!(mesh.num_elements(), 4);
        mesh.check().unwrap();
    }

    #[test]
    fn test_split1b_interior_edge() {
        let mut mesh = square();
        let m = midpoint(&mut mesh, p(1), p(3));
        mesh.next_base();

        let created = split1b(&mut mesh, e(1), 1, m).unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(mesh.num_elements(), 4);
        for id in [e(1), e(2)].into_iter().chain(created.iter().copied()) {
            assert_eq!(mesh.element(id).base, 1);
            assert!(mesh.element(id).v.contains(&m));
        }
        // k keeps the half touching v[NEXT[1]] = point 3.
        assert!(mesh.element(e(1)).v.contains(&p(3)));
        mesh.check().unwrap();
    }

    #[test]
    fn test_split1b_boundary_edge() {
        let mut mesh = square();
        let m = midpoint(&mut mesh, p(1), p(2));
        let created = split1b(&mut mesh, e(1), 2, m).unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(mesh.num_elements(), 3);
        mesh.check().unwrap();
    }

    #[test]
    fn test_metric_is_interpolated() {
        let mut mesh = single();
        let mut metric = Metric::from_values(&[1.0, 3.0, 2.0]).unwrap();
        let m = midpoint(&mut mesh, p(1), p(2));
        mesh.element_mut(e(1)).flag = 4;

        split1(&mut mesh, e(1), &[None, None, Some(m)], &mut metric).unwrap();
        assert_eq!(metric.get(m), Some(2.0));
    }

    #[test]
    fn test_exhaustion_allocates_nothing() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 0.9, 0.0),
        ];
        let config = ArenaConfig::default().with_initial(3, 1).with_limits(16, 2);
        let mut mesh = build_from_triangles_with(&vertices, &[[0, 1, 2]], &config).unwrap();
        let k = e(1);
        let m = [0, 1, 2].map(|i| {
            let v = mesh.element(k).v;
            midpoint(&mut mesh, v[NEXT[i]], v[PREV[i]])
        });
        mesh.element_mut(k).flag = 7;
        let before = *mesh.element(k);

        let err = split3(&mut mesh, k, &m.map(Some), &mut NoMetric).unwrap_err();
        assert!(matches!(err, MeshError::ArenaExhausted { .. }));
        assert!(err.is_fatal());
        assert_eq!(mesh.num_elements(), 1);
        assert_eq!(*mesh.element(k), before);
    }

    #[test]
    fn test_invalid_flag() {
        let mut mesh = single();
        mesh.element_mut(e(1)).flag = 0;
        assert_eq!(
            split(&mut mesh, e(1), &[None; 3], &mut NoMetric).unwrap_err(),
            MeshError::InvalidSplitPattern { flag: 0, edges: 0 }
        );
        assert_eq!(mesh.num_elements(), 1);
    }
}
