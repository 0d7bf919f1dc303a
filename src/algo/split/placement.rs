//! Placement of the point inserted on a split edge.
//!
//! A straight edge is split at its midpoint. A geometric edge (ridge or
//! referenced boundary) is split on the curve it approximates, pulled back
//! towards the chord until the triangles on both sides of the edge are
//! acceptable.

use nalgebra::{Point3, Vector3};

use crate::algo::curve::CurveEvaluator;
use crate::algo::metric::MetricField;
use crate::algo::quality::{QualityGate, QualityOracle};
use crate::error::Result;
use crate::mesh::{Element, ElementId, Point, PointId, TriMesh, NEXT, PREV};

/// Number of positions tried along the segment from the midpoint to the
/// curve point.
pub const DICHOTOMY_TRIALS: usize = 5;

/// Search the largest `t` in `[0, 1]` for which `accept(t)` holds.
///
/// Starts at `t = 1` and bisects between the last accepted and the last
/// rejected value. If nothing has been accepted before the final trial, the
/// final trial is `t = 0`. Never calls `accept` more than
/// [`DICHOTOMY_TRIALS`] times; stops early as soon as the current upper
/// bound is accepted.
///
/// Returns the largest accepted value, or `None`.
#[allow(clippy::float_cmp)]
pub fn dichotomy<F: FnMut(f64) -> bool>(mut accept: F) -> Option<f64> {
    let mut upper = 1.0;
    let mut lower = 0.0;
    let mut t = 1.0;
    let mut best = None;

    for it in 0..DICHOTOMY_TRIALS {
        if accept(t) {
            best = Some(t);
            if t == upper {
                break;
            }
            lower = t;
        } else {
            upper = t;
        }

        t = if it == DICHOTOMY_TRIALS - 2 && best.is_none() {
            0.0
        } else {
            0.5 * (lower + upper)
        };
    }
    best
}

/// Create the point that splits edge `i` of `k`, or `None` if no acceptable
/// position exists.
///
/// The candidate is accepted when the two halves of `k`, and the two halves
/// of the neighbour across edge `i` if any, all pass `gate`. On success the
/// point carries the tag and reference of the edge (and the curve normal for
/// geometric edges) and the metric is interpolated at the edge midpoint. On
/// `None` the mesh and the metric are untouched.
///
/// # Errors
/// [`MeshError::ArenaExhausted`](crate::error::MeshError::ArenaExhausted) if
/// the point arena cannot grow.
pub fn split_point<Q, C, M>(
    mesh: &mut TriMesh,
    k: ElementId,
    i: usize,
    gate: &QualityGate<Q>,
    curve: &C,
    metric: &mut M,
) -> Result<Option<PointId>>
where
    Q: QualityOracle,
    C: CurveEvaluator + ?Sized,
    M: MetricField + ?Sized,
{
    let tri = *mesh.element(k);
    let [a, b] = tri.edge_points(i);
    let mid = nalgebra::center(mesh.position(a), mesh.position(b));
    let tag = tri.edge_tags[i];

    let mut point = Point::new(mid).with_tag(tag);
    point.reference = tri.edge_refs[i];

    if tag.is_geometric() {
        let Some((position, normal)) = curve_position(mesh, k, i, gate, curve) else {
            return Ok(None);
        };
        point.position = position;
        point.normal = normal;
    } else if !Sides::gather(mesh, k, i).accepts(gate, &mid) {
        log::trace!("midpoint of edge {i} of {k:?} rejected");
        return Ok(None);
    }

    let ip = mesh.add_point(point)?;
    metric.interpolate(a, b, ip, 0.5);
    Ok(Some(ip))
}

/// Position and normal of the point splitting geometric edge `i` of `k`:
/// the curve point pulled back towards the chord midpoint until the halves on
/// both sides of the edge pass `gate`. `None` if even the midpoint fails.
pub(crate) fn curve_position<Q, C>(
    mesh: &TriMesh,
    k: ElementId,
    i: usize,
    gate: &QualityGate<Q>,
    curve: &C,
) -> Option<(Point3<f64>, Vector3<f64>)>
where
    Q: QualityOracle,
    C: CurveEvaluator + ?Sized,
{
    let [a, b] = mesh.element(k).edge_points(i);
    let mid = nalgebra::center(mesh.position(a), mesh.position(b));
    let sides = Sides::gather(mesh, k, i);

    let (o, normal) = curve.evaluate(mesh, k, i, 0.5);
    let Some(t) = dichotomy(|t| sides.accepts(gate, &(mid + (o - mid) * t))) else {
        log::trace!("no admissible position on edge {i} of {k:?}");
        return None;
    };
    Some((mid + (o - mid) * t, normal))
}

/// Vertex positions of the triangles on both sides of an edge, with the slot
/// each half puts the candidate point in.
struct Sides {
    triangles: Vec<([Point3<f64>; 3], usize)>,
}

impl Sides {
    fn gather(mesh: &TriMesh, k: ElementId, i: usize) -> Self {
        let mut triangles = Vec::with_capacity(4);
        let positions = mesh.triangle_positions(k);
        triangles.push((positions, PREV[i]));
        triangles.push((positions, NEXT[i]));
        if let Some(across) = mesh.neighbor(k, i) {
            let positions = mesh.triangle_positions(across.element);
            triangles.push((positions, NEXT[across.face]));
            triangles.push((positions, PREV[across.face]));
        }
        Self { triangles }
    }

    fn accepts<Q: QualityOracle>(&self, gate: &QualityGate<Q>, candidate: &Point3<f64>) -> bool {
        self.triangles.iter().all(|(positions, slot)| {
            let mut half = *positions;
            half[*slot] = *candidate;
            gate.accepts(&half)
        })
    }
}
