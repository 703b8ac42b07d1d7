use crate::{mesh::MeshBuffers, util::position_key};
use fnv::FnvBuildHasher;
use indexmap::IndexSet;

/// Merge every group of vertices that share the exact same position into a
/// single vertex, and point all triangles at the merged vertices. The first
/// vertex of each group is the one that survives, and survivors keep their
/// relative order. Normals (if present) follow their vertex.
///
/// Returns, for each vertex in the welded mesh, the index that vertex had
/// **before** welding. Welding an already-welded mesh is a no-op.
pub fn weld(mesh: &mut MeshBuffers) -> Vec<usize> {
    // An ordered set, so each position's index in the set is the index of
    // its welded vertex
    let mut positions: IndexSet<[u32; 3], FnvBuildHasher> =
        IndexSet::with_capacity_and_hasher(
            mesh.vertices.len(),
            FnvBuildHasher::default(),
        );
    let mut kept = Vec::new();
    let remap: Vec<u32> = mesh
        .vertices
        .iter()
        .enumerate()
        .map(|(i, position)| {
            let (welded_index, is_new) =
                positions.insert_full(position_key(*position));
            if is_new {
                kept.push(i);
            }
            welded_index as u32
        })
        .collect();

    for triangle in &mut mesh.triangles {
        for index in triangle.iter_mut() {
            *index = remap[*index as usize];
        }
    }
    mesh.vertices = kept.iter().map(|&i| mesh.vertices[i]).collect();
    if let Some(normals) = mesh.normals.take() {
        mesh.normals = Some(kept.iter().map(|&i| normals[i]).collect());
    }

    kept
}
