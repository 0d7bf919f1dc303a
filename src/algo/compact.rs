//! Mesh compaction.
//!
//! Operators leave holes behind: freed points and elements, and points that
//! no element uses any more. [`pack`] renumbers the live entities densely,
//! carries the adjacency table, the metric and the pending hanging edges
//! along, and rebuilds the structures derived from the element set.
//!
//! This is the only place where ids change.

use crate::algo::metric::MetricField;
use crate::config::AdaptConfig;
use crate::error::{InvariantViolation, MeshError, Result};
use crate::mesh::{EdgeKey, Element, ElementId, GeomEdge, PointId, SimplexMesh, Tag};

/// Counts of a compacted mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackReport {
    /// Points kept.
    pub points: usize,
    /// Of which corners.
    pub corners: usize,
    /// Geometric edges.
    pub edges: usize,
    /// Of which ridges.
    pub ridges: usize,
    /// Boundary facets.
    pub facets: usize,
    /// Elements kept.
    pub elements: usize,
}

/// Compact `mesh` and `metric` in place.
///
/// Live points used by the mesh are renumbered `1..=points` in slot order and
/// live elements `1..=elements`; the free lists then thread every slot above
/// those counts. The boundary facets, the geometric edge hash and the edge
/// list are rebuilt. With `config.debug` set, the full consistency check
/// runs on the result.
///
/// # Errors
/// - [`InvariantViolation::DanglingPoint`] if an element references a point
///   that is not live (the mesh is left unchanged);
/// - any violation found by the debug check.
pub fn pack<E, M>(mesh: &mut SimplexMesh<E>, metric: &mut M, config: &AdaptConfig) -> Result<PackReport>
where
    E: Element,
    M: MetricField + ?Sized,
{
    for (k, element) in mesh.elements.iter() {
        for &p in element.vertices() {
            if !mesh.points.get(p).is_some_and(|point| point.is_used()) {
                return Err(MeshError::Invariant(InvariantViolation::DanglingPoint {
                    element: k.index(),
                    point: p.index(),
                }));
            }
        }
    }

    let mut report = PackReport::default();

    // Point numbering. Unused points are released.
    let point_ids: Vec<PointId> = mesh.points.ids().collect();
    for &p in &point_ids {
        let point = &mut mesh.points[p];
        if !point.is_used() {
            mesh.points.free(p);
            continue;
        }
        report.points += 1;
        point.tmp = report.points as u32;
        if point.tag.contains(Tag::CORNER) {
            report.corners += 1;
        }
    }

    // Elements.
    let element_ids: Vec<ElementId> = mesh.elements.ids().collect();
    for k in element_ids {
        report.elements += 1;
        let to = ElementId::new(report.elements);

        let points = &mesh.points;
        for v in mesh.elements[k].vertices_mut() {
            *v = PointId::new(points[*v].tmp as usize);
        }

        if to != k {
            mesh.elements.relocate(k.index(), to.index());
            mesh.adjacency.relocate(k, to);
            for side in mesh.hanging.values_mut().filter(|side| side.element == k) {
                side.element = to;
            }
        }
    }
    if !mesh.hanging.is_empty() {
        let points = &mesh.points;
        mesh.hanging = std::mem::take(&mut mesh.hanging)
            .into_iter()
            .map(|(key, side)| {
                let [a, b] = [key.min(), key.max()].map(|p| PointId::new(points[p].tmp as usize));
                (EdgeKey::new(a, b), side)
            })
            .collect();
    }

    // Metric then points, both in ascending order so moves never overwrite
    // a value still to be read.
    let attached = metric.is_attached();
    let point_ids: Vec<PointId> = mesh.points.ids().collect();
    for p in point_ids {
        let to = mesh.points[p].tmp as usize;
        if attached {
            metric.relocate(p, PointId::new(to));
        }
        mesh.points.relocate(p.index(), to);
    }
    if attached {
        metric.truncate(report.points);
    }

    mesh.points.reset_free_list(report.points);
    mesh.elements.reset_free_list(report.elements);

    rebuild_boundary(mesh);
    report.facets = mesh.boundary.len();
    rebuild_edges(mesh);
    report.edges = mesh.edges.len();
    report.ridges = mesh.edges.iter().filter(|e| e.tag.contains(Tag::RIDGE)).count();

    let ids: Vec<PointId> = mesh.points.ids().collect();
    for p in ids {
        mesh.points[p].tmp = 0;
    }

    log::info!(
        "compacted mesh: {} points ({} corners), {} edges ({} ridges), {} boundary facets, {} {}s",
        report.points,
        report.corners,
        report.edges,
        report.ridges,
        report.facets,
        report.elements,
        E::KIND
    );

    if config.debug {
        mesh.check()?;
    }
    Ok(report)
}

fn rebuild_boundary<E: Element>(mesh: &mut SimplexMesh<E>) {
    let mut boundary = Vec::with_capacity(mesh.boundary.len());
    for (k, element) in mesh.elements.iter() {
        let adjacency = &mesh.adjacency;
        element.boundary_facets(&|face| adjacency.get(k, face).is_none(), &mesh.xtetra, &mut boundary);
    }
    mesh.boundary = boundary;
}

fn rebuild_edges<E: Element>(mesh: &mut SimplexMesh<E>) {
    mesh.edge_hash.clear();
    for (_, element) in mesh.elements.iter() {
        for edge in 0..E::EDGES {
            let (tag, reference) = element.edge_feature(edge, &mesh.xtetra);
            if reference != 0 || tag.is_geometric() || tag.contains(Tag::REQUIRED) {
                let [a, b] = element.edge_points(edge);
                mesh.edge_hash.insert(a, b, tag, reference);
            }
        }
    }
    mesh.edges = mesh
        .edge_hash
        .iter()
        .map(|edge| GeomEdge {
            tag: edge.tag | Tag::REFERENCE,
            ..*edge
        })
        .collect();
}
