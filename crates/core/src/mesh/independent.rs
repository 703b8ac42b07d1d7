use crate::{
    mesh::{
        weld, MeshBuffers, TileGeometry, TileMesher, VertexSlot,
        DIAMOND_TRIANGLES_A, DIAMOND_TRIANGLES_B, SIDE_TRIANGLES,
        TRIANGLES_PER_TILE,
    },
    world::grid::OccupancyGrid,
};
use log::debug;
use rand::Rng;

/// Meshes each tile on its own, then welds and bumps the whole thing. See
/// [MeshMode::Independent](crate::MeshMode::Independent).
///
/// Random draws happen in this order:
/// 1. One coin flip per solid tile (row-major) to pick the diamond diagonal
/// 2. One jitter offset per outer vertex, in welded vertex order
#[derive(Debug)]
pub struct IndependentMesher;

impl TileMesher for IndependentMesher {
    fn mesh<R: Rng>(
        &self,
        grid: &OccupancyGrid,
        geometry: &TileGeometry,
        rng: &mut R,
    ) -> MeshBuffers {
        let (mut mesh, outer) = emit_tiles(grid, geometry, rng);

        let unwelded_count = mesh.vertex_count();
        let kept = weld(&mut mesh);
        debug!(
            "Welded {} vertices down to {}",
            unwelded_count,
            mesh.vertex_count()
        );

        // Low-poly bumps. Only outer vertices move, so the inner diamond of
        // each tile stays flat.
        let bump_range = geometry.bump_range();
        if bump_range > 0.0 {
            for (vertex, original) in mesh.vertices.iter_mut().zip(kept) {
                if outer[original] {
                    vertex[1] += rng.gen_range(-bump_range..bump_range / 2.0);
                }
            }
        }

        mesh
    }
}

/// Create 8 vertices and 10 triangles for every solid tile, with no sharing
/// at all. Along with the mesh, returns a flag for each vertex indicating
/// whether it's on the tile's outer square.
fn emit_tiles<R: Rng>(
    grid: &OccupancyGrid,
    geometry: &TileGeometry,
    rng: &mut R,
) -> (MeshBuffers, Vec<bool>) {
    let tile_count = grid.solid_count();
    let mut mesh = MeshBuffers::with_capacity(
        tile_count * VertexSlot::ALL.len(),
        tile_count * TRIANGLES_PER_TILE,
    );
    let mut outer = Vec::with_capacity(tile_count * VertexSlot::ALL.len());

    for (x, y) in grid.solid_cells() {
        let base = mesh.vertices.len();
        for slot in VertexSlot::ALL {
            mesh.vertices.push(geometry.position(x, y, slot));
            outer.push(slot.is_outer());
        }

        let diamond = if rng.gen() {
            &DIAMOND_TRIANGLES_A
        } else {
            &DIAMOND_TRIANGLES_B
        };
        for triangle in SIDE_TRIANGLES.iter().chain(diamond) {
            mesh.triangles
                .push(triangle.map(|slot| (base + slot) as u32));
        }
    }

    (mesh, outer)
}
