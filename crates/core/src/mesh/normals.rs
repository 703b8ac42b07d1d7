use crate::mesh::MeshBuffers;
use nalgebra::{Point3, Vector3};

/// Compute a normal for every vertex in the mesh. Each vertex's normal is the
/// sum of the face normals of every triangle that touches it, weighted by
/// triangle area, then normalized.
///
/// Index winding isn't reliable for every mesh mode (shared tiles sort their
/// indexes), so every face normal is flipped into the upper hemisphere before
/// it's added. Vertices that aren't part of any (non-degenerate) triangle
/// just point straight up.
pub fn compute_normals(mesh: &MeshBuffers) -> Vec<[f32; 3]> {
    let point = |index: u32| {
        let [x, y, z] = mesh.vertices[index as usize];
        Point3::new(x, y, z)
    };

    let mut sums = vec![Vector3::<f32>::zeros(); mesh.vertices.len()];
    for triangle in &mesh.triangles {
        let [a, b, c] = triangle.map(point);
        // Magnitude of the cross product is twice the area, so this is
        // already area-weighted
        let mut face_normal = (b - a).cross(&(c - a));
        if face_normal.y < 0.0 {
            face_normal = -face_normal;
        }
        for index in triangle {
            sums[*index as usize] += face_normal;
        }
    }

    sums.into_iter()
        .map(|sum| {
            let normal = sum
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vector3::y);
            [normal.x, normal.y, normal.z]
        })
        .collect()
}
