//! Mesh construction utilities.
//!
//! Meshes are built from plain vertex and element lists as found in mesh
//! files. Input vertex `i` becomes point `i + 1`; input element `j` becomes
//! element `j + 1`. The arenas are sized from the input and the configured
//! minimums, and their free lists thread the remaining slots.

use nalgebra::Point3;

use super::element::{Element, Tetrahedron, Triangle};
use super::index::{ElementId, PointId};
use super::point::Point;
use super::simplex::{SimplexMesh, TetMesh, TriMesh};
use super::tag::Tag;
use crate::config::ArenaConfig;
use crate::error::{MeshError, Result};

/// Build a planar triangle mesh from vertices and triangles.
///
/// Clockwise triangles are reoriented. Vertices not used by any triangle are
/// tagged [`Tag::UNUSED`]. Boundary edges are tagged by
/// [`tag_boundary_edges`].
///
/// # Example
/// ```
/// use tessel::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
/// assert_eq!(mesh.num_points(), 3);
/// assert_eq!(mesh.num_elements(), 1);
/// ```
pub fn build_from_triangles(vertices: &[Point3<f64>], faces: &[[usize; 3]]) -> Result<TriMesh> {
    build_from_triangles_with(vertices, faces, &ArenaConfig::default())
}

/// [`build_from_triangles`] with explicit arena sizing.
pub fn build_from_triangles_with(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
    config: &ArenaConfig,
) -> Result<TriMesh> {
    config.validate()?;
    validate_elements(vertices.len(), faces)?;

    let mut mesh = TriMesh::with_capacity(config, vertices.len(), faces.len());
    let ids = add_points(&mut mesh, vertices)?;

    let mut flipped = 0;
    for face in faces {
        let mut v = face.map(|i| ids[i]);
        let [a, b, c] = face.map(|i| vertices[i]);
        if (b - a).xy().perp(&(c - a).xy()) < 0.0 {
            v.swap(1, 2);
            flipped += 1;
        }
        mesh.add_element(Triangle::new(v))?;
    }
    if flipped > 0 {
        log::debug!("reoriented {flipped} clockwise triangles");
    }

    finish(&mut mesh);
    tag_boundary_edges(&mut mesh, 0);
    Ok(mesh)
}

/// Build a tetrahedral mesh from vertices and tetrahedra.
///
/// Negatively oriented tetrahedra are reoriented. Vertices not used by any
/// tetrahedron are tagged [`Tag::UNUSED`].
pub fn build_from_tetrahedra(vertices: &[Point3<f64>], cells: &[[usize; 4]]) -> Result<TetMesh> {
    let config = ArenaConfig::default();
    config.validate()?;
    validate_elements(vertices.len(), cells)?;

    let mut mesh = TetMesh::with_capacity(&config, vertices.len(), cells.len());
    let ids = add_points(&mut mesh, vertices)?;

    for cell in cells {
        let mut v = cell.map(|i| ids[i]);
        let [a, b, c, d] = cell.map(|i| vertices[i]);
        if (b - a).cross(&(c - a)).dot(&(d - a)) < 0.0 {
            v.swap(2, 3);
        }
        mesh.add_element(Tetrahedron::new(v))?;
    }

    finish(&mut mesh);
    Ok(mesh)
}

/// Tag every triangle edge without a neighbour as a referenced boundary edge
/// and its endpoints as boundary points.
///
/// Edges that already carry a reference keep it; the others get `reference`.
/// Each boundary edge is recorded in the geometric edge hash. Returns the
/// number of boundary edges.
pub fn tag_boundary_edges(mesh: &mut TriMesh, reference: i32) -> usize {
    let ids: Vec<ElementId> = mesh.elements.ids().collect();
    let mut count = 0;
    for k in ids {
        for i in 0..3 {
            if mesh.adjacency.get(k, i).is_some() {
                continue;
            }
            let tri = &mut mesh.elements[k];
            tri.edge_tags[i] |= Tag::BOUNDARY | Tag::REFERENCE;
            if tri.edge_refs[i] == 0 {
                tri.edge_refs[i] = reference;
            }
            let (tag, edge_ref) = (tri.edge_tags[i], tri.edge_refs[i]);
            let [a, b] = tri.edge_points(i);

            mesh.edge_hash.insert(a, b, tag, edge_ref);
            for p in [a, b] {
                mesh.points[p].tag |= Tag::BOUNDARY;
            }
            count += 1;
        }
    }
    count
}

/// Set the tag and reference of the edge `(a, b)` on every triangle holding it,
/// and record it in the geometric edge hash.
///
/// Returns the number of triangle edges updated.
pub fn set_edge_feature(mesh: &mut TriMesh, a: PointId, b: PointId, tag: Tag, reference: i32) -> usize {
    let ids: Vec<ElementId> = mesh.elements.ids().collect();
    let mut count = 0;
    for k in ids {
        let tri = &mut mesh.elements[k];
        for i in 0..3 {
            let [p, q] = tri.edge_points(i);
            if (p, q) == (a, b) || (p, q) == (b, a) {
                tri.edge_tags[i] |= tag;
                tri.edge_refs[i] = reference;
                count += 1;
            }
        }
    }
    if count > 0 {
        mesh.edge_hash.insert(a, b, tag, reference);
    }
    count
}

/// Convert a triangle mesh back to vertex and face lists.
///
/// Point ids are renumbered densely in slot order; unused points are dropped.
pub fn to_face_vertex(mesh: &TriMesh) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut remap = vec![usize::MAX; mesh.points.capacity() + 1];
    let mut vertices = Vec::with_capacity(mesh.num_points());
    for (id, point) in mesh.points.iter().filter(|(_, p)| p.is_used()) {
        remap[id.index()] = vertices.len();
        vertices.push(point.position);
    }

    let faces = mesh
        .elements
        .iter()
        .map(|(_, tri)| tri.v.map(|p| remap[p.index()]))
        .collect();

    (vertices, faces)
}

// ==================== Internals ====================

fn validate_elements<const N: usize>(num_vertices: usize, elements: &[[usize; N]]) -> Result<()> {
    if elements.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    for (ei, element) in elements.iter().enumerate() {
        for (j, &vi) in element.iter().enumerate() {
            if vi >= num_vertices {
                return Err(MeshError::InvalidVertexIndex {
                    element: ei,
                    vertex: vi,
                });
            }
            if element[..j].contains(&vi) {
                return Err(MeshError::DegenerateElement { element: ei });
            }
        }
    }
    Ok(())
}

fn add_points<E: Element>(mesh: &mut SimplexMesh<E>, vertices: &[Point3<f64>]) -> Result<Vec<PointId>> {
    vertices
        .iter()
        .map(|&position| mesh.add_point(Point::new(position).with_tag(Tag::UNUSED)))
        .collect()
}

/// Link adjacency and clear the unused tag of referenced points.
fn finish<E: Element>(mesh: &mut SimplexMesh<E>) {
    let SimplexMesh {
        points,
        elements,
        adjacency,
        ..
    } = mesh;

    for (_, element) in elements.iter() {
        for &p in element.vertices() {
            points[p].tag.remove(Tag::UNUSED);
        }
    }
    adjacency.rebuild(elements.iter());

    let unused = points.iter().filter(|(_, p)| !p.is_used()).count();
    if unused > 0 {
        log::debug!("{unused} input points are not referenced by any {}", E::KIND);
    }
}
