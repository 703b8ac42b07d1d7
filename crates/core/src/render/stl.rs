//! This module provides logic for exporting meshes as STL. Only available
//! with the "stl" feature enabled.

use crate::{ChunkMesh, MeshBuffers};
use nalgebra::{Point3, Vector3};
use stl_io::{Normal, Triangle, Vertex};

/// Convert a mesh into STL triangle soup, translating every vertex by the
/// given anchor. STL has no dominant convention for which axis is up, so
/// here (as everywhere else in this crate) **Y is up**.
pub fn mesh_to_triangles(mesh: &MeshBuffers, anchor: [f32; 3]) -> Vec<Triangle> {
    let [ax, ay, az] = anchor;
    let anchor = Vector3::new(ax, ay, az);
    let point = |index: u32| {
        let [x, y, z] = mesh.vertices()[index as usize];
        Point3::new(x, y, z) + anchor
    };

    mesh.triangles()
        .iter()
        .map(|triangle| {
            let [a, b, c] = triangle.map(point);
            // STL wants a unit face normal. Degenerate faces just get zero,
            // most programs ignore the stored normal anyway.
            let normal = (b - a)
                .cross(&(c - a))
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vector3::zeros);
            Triangle {
                normal: Normal::new([normal.x, normal.y, normal.z]),
                vertices: [a, b, c].map(|p| Vertex::new([p.x, p.y, p.z])),
            }
        })
        .collect()
}

/// Export one or more chunk meshes as a single binary STL model. Return value
/// is the STL binary data.
pub fn meshes_to_stl(meshes: &[ChunkMesh]) -> Vec<u8> {
    let triangles: Vec<Triangle> = meshes
        .iter()
        .flat_map(|chunk| mesh_to_triangles(&chunk.mesh, chunk.anchor))
        .collect();
    let mut buffer = Vec::<u8>::new();
    // Panic here indicates a bug in our STL mesh format
    stl_io::write_stl(&mut buffer, triangles.iter())
        .expect("error serializing STL");
    buffer
}
