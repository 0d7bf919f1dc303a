//! Refinement pass driven by element marks.
//!
//! An external marker sets bits in the `flag` of the triangles whose edges
//! should be split. [`split_marked`] makes the marks consistent across shared
//! edges, creates one point per marked edge, withdraws the marks of every
//! triangle whose split would be rejected by the quality gate, and executes
//! the remaining splits as one generation.
//!
//! Points on geometric edges go through the same search as
//! [`split_point`](crate::algo::split::split_point): the curve point is
//! pulled back towards the chord until both sides of the edge are
//! acceptable. An edge with no admissible position is withdrawn.

use indexmap::IndexMap;

use crate::algo::curve::CurveEvaluator;
use crate::algo::metric::MetricField;
use crate::algo::quality::{QualityGate, QualityOracle};
use crate::algo::split::{curve_position, split, split_sim, EdgePoints};
use crate::error::Result;
use crate::mesh::{EdgeKey, Element, ElementId, Point, PointId, TriMesh};

/// Counters of a refinement pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefineStats {
    /// Edges marked after propagation across neighbours.
    pub marked_edges: usize,
    /// Marked edges withdrawn because a split through them was rejected.
    pub vetoed_edges: usize,
    /// Edges actually split.
    pub split_edges: usize,
    /// Triangles created.
    pub new_elements: usize,
}

/// Split every marked edge that can be split without producing a triangle
/// rejected by `gate`.
///
/// Points on geometric edges are placed on the curve given by `curve`,
/// pulled back towards the chord as far as `gate` requires; others sit at the
/// edge midpoint. Every triangle created or rewritten by the
/// pass gets the new generation marker, and every flag is cleared on return.
///
/// # Errors
/// [`MeshError::ArenaExhausted`](crate::error::MeshError::ArenaExhausted) if
/// an arena cannot grow. Points created by the pass are released if this
/// happens before any triangle is split.
pub fn split_marked<Q, C, M>(
    mesh: &mut TriMesh,
    gate: &QualityGate<Q>,
    curve: &C,
    metric: &mut M,
) -> Result<RefineStats>
where
    Q: QualityOracle,
    C: CurveEvaluator + ?Sized,
    M: MetricField + ?Sized,
{
    let mut stats = RefineStats::default();
    let ids: Vec<ElementId> = mesh.elements().ids().collect();

    propagate_marks(mesh, &ids);
    let owners = marked_edges(mesh, &ids);
    stats.marked_edges = owners.len();
    if owners.is_empty() {
        return Ok(stats);
    }

    let mut inserted = create_points(mesh, &owners, gate, curve)?;
    stats.vetoed_edges = owners.len() - inserted.len();

    // Each withdrawal removes at least one edge, so this terminates.
    loop {
        let mut vetoed = Vec::new();
        for &k in &ids {
            if mesh.element(k).flag == 0 {
                continue;
            }
            let vx = edge_points(mesh, k, &inserted);
            if !split_sim(mesh, k, &vx, gate)? {
                vetoed.push(k);
            }
        }
        if vetoed.is_empty() {
            break;
        }
        for k in vetoed {
            stats.vetoed_edges += withdraw(mesh, k, &mut inserted);
        }
    }

    let base = mesh.next_base();
    for &k in &ids {
        if mesh.element(k).flag == 0 {
            continue;
        }
        let vx = edge_points(mesh, k, &inserted);
        let created = split(mesh, k, &vx, metric)?;
        mesh.element_mut(k).base = base;
        for &id in &created {
            mesh.element_mut(id).base = base;
        }
        stats.new_elements += created.len();
    }
    stats.split_edges = inserted.len();
    debug_assert_eq!(mesh.hanging_edges(), 0);

    log::debug!(
        "refinement: {} marked edges, {} vetoed, {} split, {} new elements",
        stats.marked_edges,
        stats.vetoed_edges,
        stats.split_edges,
        stats.new_elements
    );
    Ok(stats)
}

/// Mark each edge on both of its sides.
fn propagate_marks(mesh: &mut TriMesh, ids: &[ElementId]) {
    for &k in ids {
        let flag = mesh.element(k).flag;
        for i in (0..3).filter(|i| flag & (1 << i) != 0) {
            if let Some(across) = mesh.neighbor(k, i) {
                mesh.element_mut(across.element).flag |= 1 << across.face;
            }
        }
    }
}

/// Marked edges with one triangle and local index holding each.
fn marked_edges(mesh: &TriMesh, ids: &[ElementId]) -> IndexMap<EdgeKey, (ElementId, usize)> {
    let mut owners = IndexMap::new();
    for &k in ids {
        let tri = mesh.element(k);
        for i in (0..3).filter(|i| tri.flag & (1 << i) != 0) {
            let [a, b] = tri.edge_points(i);
            owners.entry(EdgeKey::new(a, b)).or_insert((k, i));
        }
    }
    owners
}

/// One point per marked edge. Geometric edges without an admissible position
/// are unmarked on both sides and get no point.
fn create_points<Q, C>(
    mesh: &mut TriMesh,
    owners: &IndexMap<EdgeKey, (ElementId, usize)>,
    gate: &QualityGate<Q>,
    curve: &C,
) -> Result<IndexMap<EdgeKey, PointId>>
where
    Q: QualityOracle,
    C: CurveEvaluator + ?Sized,
{
    let mut inserted = IndexMap::with_capacity(owners.len());
    for (&key, &(k, i)) in owners {
        let tri = *mesh.element(k);
        let [a, b] = tri.edge_points(i);
        let tag = tri.edge_tags[i];

        let mut point = Point::new(nalgebra::center(mesh.position(a), mesh.position(b))).with_tag(tag);
        point.reference = tri.edge_refs[i];
        if tag.is_geometric() {
            let Some((position, normal)) = curve_position(mesh, k, i, gate, curve) else {
                unmark(mesh, k, i);
                continue;
            };
            point.position = position;
            point.normal = normal;
        }

        match mesh.add_point(point) {
            Ok(p) => {
                inserted.insert(key, p);
            }
            Err(err) => {
                for &p in inserted.values() {
                    mesh.remove_point(p);
                }
                return Err(err);
            }
        }
    }
    Ok(inserted)
}

fn edge_points(mesh: &TriMesh, k: ElementId, inserted: &IndexMap<EdgeKey, PointId>) -> EdgePoints {
    let tri = mesh.element(k);
    [0, 1, 2].map(|i| {
        if tri.flag & (1 << i) == 0 {
            return None;
        }
        let [a, b] = tri.edge_points(i);
        inserted.get(&EdgeKey::new(a, b)).copied()
    })
}

/// Clear the mark of edge `i` of `k` on both of its sides.
fn unmark(mesh: &mut TriMesh, k: ElementId, i: usize) {
    if let Some(across) = mesh.neighbor(k, i) {
        mesh.element_mut(across.element).flag &= !(1 << across.face);
    }
    mesh.element_mut(k).flag &= !(1 << i);
}

/// Unmark every edge of `k` on both sides and drop their points. Returns the
/// number of edges withdrawn.
fn withdraw(mesh: &mut TriMesh, k: ElementId, inserted: &mut IndexMap<EdgeKey, PointId>) -> usize {
    let tri = *mesh.element(k);
    let mut count = 0;
    for i in (0..3).filter(|i| tri.flag & (1 << i) != 0) {
        unmark(mesh, k, i);
        let [a, b] = tri.edge_points(i);
        if let Some(p) = inserted.shift_remove(&EdgeKey::new(a, b)) {
            mesh.remove_point(p);
            count += 1;
        }
    }
    count
}
