//! Boundary curve reconstruction.
//!
//! Boundary edges of a planar mesh approximate a curved domain. The curve
//! through an edge is rebuilt from the edge endpoints and their normals as a
//! cubic Bezier segment, so inserted points can be placed on the curve rather
//! than on the chord.

use nalgebra::{Point3, Vector3};

use crate::mesh::{ElementId, Tag, TriMesh};

/// Evaluates the curve underlying a triangle edge.
pub trait CurveEvaluator {
    /// Position and unit normal of the curve through edge `edge` of
    /// `element`, at parameter `t` in `[0, 1]` from the first endpoint
    /// (`v[NEXT[edge]]`) to the second.
    fn evaluate(&self, mesh: &TriMesh, element: ElementId, edge: usize, t: f64) -> (Point3<f64>, Vector3<f64>);
}

impl<F> CurveEvaluator for F
where
    F: Fn(&TriMesh, ElementId, usize, f64) -> (Point3<f64>, Vector3<f64>),
{
    #[inline]
    fn evaluate(&self, mesh: &TriMesh, element: ElementId, edge: usize, t: f64) -> (Point3<f64>, Vector3<f64>) {
        self(mesh, element, edge, t)
    }
}

/// Cubic Bezier reconstruction from endpoint normals.
///
/// At an endpoint with a usable normal, the tangent is the chord projected
/// onto the line orthogonal to the normal. At singular endpoints (corner,
/// required, non-manifold) or without a normal, the tangent is the chord.
#[derive(Debug, Clone, Copy, Default)]
pub struct BezierCurve;

impl CurveEvaluator for BezierCurve {
    fn evaluate(&self, mesh: &TriMesh, element: ElementId, edge: usize, t: f64) -> (Point3<f64>, Vector3<f64>) {
        let tri = mesh.element(element);
        let [i1, i2] = [crate::mesh::NEXT[edge], crate::mesh::PREV[edge]];
        let p1 = mesh.point(tri.v[i1]);
        let p2 = mesh.point(tri.v[i2]);
        let chord = p2.position - p1.position;
        let outward = outward_normal(&chord);

        let n1 = usable_normal(p1.tag, &p1.normal);
        let n2 = usable_normal(p2.tag, &p2.normal);

        let t1 = n1.map_or(chord, |n| chord - n * chord.dot(&n));
        let t2 = n2.map_or(chord, |n| chord - n * chord.dot(&n));
        let b1 = p1.position + t1 / 3.0;
        let b2 = p2.position - t2 / 3.0;

        let s = 1.0 - t;
        let position = Point3::from(
            p1.position.coords * (s * s * s)
                + b1.coords * (3.0 * t * s * s)
                + b2.coords * (3.0 * t * t * s)
                + p2.position.coords * (t * t * t),
        );

        let blend = n1.unwrap_or(outward) * s + n2.unwrap_or(outward) * t;
        let normal = blend.try_normalize(f64::EPSILON).unwrap_or(outward);

        (position, normal)
    }
}

/// Compute outward unit normals at boundary points of a planar mesh.
///
/// Each boundary edge (an edge without neighbour) contributes its outward
/// normal, weighted by its length, to both endpoints. Singular points keep a
/// zero normal. Returns the number of points that received a normal.
pub fn compute_boundary_normals(mesh: &mut TriMesh) -> usize {
    let mut contributions = Vec::new();
    for (k, tri) in mesh.elements().iter() {
        for i in 0..3 {
            if mesh.neighbor(k, i).is_some() {
                continue;
            }
            let a = tri.v[crate::mesh::NEXT[i]];
            let b = tri.v[crate::mesh::PREV[i]];
            let chord = mesh.position(b) - mesh.position(a);
            let weighted = outward_normal(&chord) * chord.norm();
            contributions.push((a, weighted));
            contributions.push((b, weighted));
        }
    }

    for &(p, _) in &contributions {
        mesh.point_mut(p).normal = Vector3::zeros();
    }
    for (p, weighted) in contributions {
        mesh.point_mut(p).normal += weighted;
    }

    let ids: Vec<_> = mesh.points().ids().collect();
    let mut count = 0;
    for p in ids {
        let point = mesh.point_mut(p);
        if point.tag.is_singular() {
            point.normal = Vector3::zeros();
            continue;
        }
        match point.normal.try_normalize(f64::EPSILON) {
            Some(n) => {
                point.normal = n;
                count += 1;
            }
            None => point.normal = Vector3::zeros(),
        }
    }
    count
}

/// Outward unit normal of a counter-clockwise boundary edge.
fn outward_normal(chord: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(chord.y, -chord.x, 0.0)
        .try_normalize(f64::EPSILON)
        .unwrap_or_else(Vector3::zeros)
}

fn usable_normal(tag: Tag, normal: &Vector3<f64>) -> Option<Vector3<f64>> {
    if tag.is_singular() {
        return None;
    }
    normal.try_normalize(f64::EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_triangles, PointId};

    fn quarter_disc() -> TriMesh {
        // Edge 0 of the triangle joins (1, 0) and (0, 1) on the unit circle.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap()
    }

    #[test]
    fn test_singular_endpoints_give_the_chord() {
        let mut mesh = quarter_disc();
        mesh.point_mut(PointId::new(2)).tag |= Tag::CORNER;
        mesh.point_mut(PointId::new(3)).tag |= Tag::CORNER;

        let (o, n) = BezierCurve.evaluate(&mesh, ElementId::new(1), 0, 0.5);
        assert!((o - Point3::new(0.5, 0.5, 0.0)).norm() < 1e-12);
        let expected = Vector3::new(1.0, 1.0, 0.0).normalize();
        assert!((n - expected).norm() < 1e-12);
    }

    #[test]
    fn test_radial_normals_bend_towards_the_circle() {
        let mut mesh = quarter_disc();
        mesh.point_mut(PointId::new(2)).normal = Vector3::x();
        mesh.point_mut(PointId::new(3)).normal = Vector3::y();

        let (o, n) = BezierCurve.evaluate(&mesh, ElementId::new(1), 0, 0.5);
        assert!((o.x - 0.625).abs() < 1e-12);
        assert!((o.y - 0.625).abs() < 1e-12);
        assert!((n.norm() - 1.0).abs() < 1e-12);

        let (start, _) = BezierCurve.evaluate(&mesh, ElementId::new(1), 0, 0.0);
        assert!((start - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_boundary_normals_point_outward() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mut mesh = build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap();
        assert_eq!(compute_boundary_normals(&mut mesh), 4);

        let n = mesh.point(PointId::new(2)).normal;
        let expected = Vector3::new(1.0, -1.0, 0.0).normalize();
        assert!((n - expected).norm() < 1e-12);
    }
}
