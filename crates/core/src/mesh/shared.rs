use crate::{
    mesh::{
        compute_normals, MeshBuffers, TileGeometry, TileMesher, VertexSlot,
        DIAMOND_TRIANGLES_A, SIDE_TRIANGLES, TRIANGLES_PER_TILE,
    },
    world::grid::OccupancyGrid,
};
use fnv::FnvBuildHasher;
use rand::Rng;
use std::collections::HashMap;

/// The vertex index assigned to each slot of a tile
type TileVertices = [u32; 8];

/// Maps each meshed cell to the vertices of its tile, so later neighbors can
/// find shared edges. Only needed while a single chunk is being meshed.
type VertexMap = HashMap<(usize, usize), TileVertices, FnvBuildHasher>;

/// Slots shared with the tile directly above, as `(ours, theirs)`. Our top
/// edge is their bottom edge.
const TOP_SHARED_SLOTS: [(VertexSlot, VertexSlot); 2] = [
    (VertexSlot::OuterTopLeft, VertexSlot::OuterBottomLeft),
    (VertexSlot::OuterTopRight, VertexSlot::OuterBottomRight),
];

/// Slots shared with the tile directly to the left, as `(ours, theirs)`. Our
/// left edge is their right edge.
const LEFT_SHARED_SLOTS: [(VertexSlot, VertexSlot); 2] = [
    (VertexSlot::OuterTopLeft, VertexSlot::OuterTopRight),
    (VertexSlot::OuterBottomLeft, VertexSlot::OuterBottomRight),
];

/// Meshes tiles in row-major order, reusing vertices from neighbors that were
/// already meshed. See [MeshMode::Shared](crate::MeshMode::Shared).
///
/// Only the tiles above and to the left are checked, and only if they pass
/// [OccupancyGrid::is_interior]. Tiles in the first row/column never share
/// with anything above/left of them, and tiles that only touch diagonally
/// don't share their corner, so some duplicate positions can remain.
#[derive(Debug)]
pub struct SharedMesher;

impl TileMesher for SharedMesher {
    fn mesh<R: Rng>(
        &self,
        grid: &OccupancyGrid,
        geometry: &TileGeometry,
        _rng: &mut R,
    ) -> MeshBuffers {
        let (mut mesh, _) = mesh_with_vertex_map(grid, geometry);
        mesh.normals = Some(compute_normals(&mesh));
        mesh
    }
}

fn mesh_with_vertex_map(
    grid: &OccupancyGrid,
    geometry: &TileGeometry,
) -> (MeshBuffers, VertexMap) {
    let tile_count = grid.solid_count();
    let mut mesh = MeshBuffers::with_capacity(
        tile_count * VertexSlot::ALL.len(),
        tile_count * TRIANGLES_PER_TILE,
    );
    let mut vertex_map =
        VertexMap::with_capacity_and_hasher(tile_count, Default::default());

    for (x, y) in grid.solid_cells() {
        let mut slots: [Option<u32>; 8] = [None; 8];

        let neighbors = [
            (0, -1, &TOP_SHARED_SLOTS),
            (-1, 0, &LEFT_SHARED_SLOTS),
        ];
        for (dx, dy, shared_slots) in neighbors {
            let nx = x as isize + dx;
            let ny = y as isize + dy;
            if !(grid.is_interior(nx, ny)
                && grid.is_solid(nx as usize, ny as usize))
            {
                continue;
            }
            if let Some(neighbor) = vertex_map.get(&(nx as usize, ny as usize))
            {
                for (ours, theirs) in shared_slots {
                    // First neighbor to claim a slot wins
                    let slot = &mut slots[ours.index()];
                    if slot.is_none() {
                        *slot = Some(neighbor[theirs.index()]);
                    }
                }
            }
        }

        let vertices: TileVertices = {
            let mut vertices = [0; 8];
            for slot in VertexSlot::ALL {
                vertices[slot.index()] = match slots[slot.index()] {
                    Some(index) => index,
                    None => {
                        mesh.vertices.push(geometry.position(x, y, slot));
                        (mesh.vertices.len() - 1) as u32
                    }
                };
            }
            vertices
        };

        for (i, triangle) in
            SIDE_TRIANGLES.iter().chain(&DIAMOND_TRIANGLES_A).enumerate()
        {
            let mut triangle = triangle.map(|slot| vertices[slot]);
            // Sorting decides winding. The first triangle sorts descending so
            // its winding parity stays opposite to the rest, which backface
            // culling in existing consumers depends on.
            if i == 0 {
                triangle.sort_unstable_by(|a, b| b.cmp(a));
            } else {
                triangle.sort_unstable();
            }
            mesh.triangles.push(triangle);
        }

        vertex_map.insert((x, y), vertices);
    }

    (mesh, vertex_map)
}
