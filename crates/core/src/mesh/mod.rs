//! Conversion of occupancy grids into triangle meshes.
//!
//! Every solid cell becomes one beveled tile: an outer square, plus an inner
//! square (the "diamond") inset from it. Each tile has 8 vertex slots, laid
//! out like so when looking down at the tile (X is right, Z is down):
//!
//! ```text
//!  1-----------------4
//!  |\               /|
//!  | 3-------------5 |
//!  | |             | |
//!  | |             | |
//!  | 2-------------6 |
//!  |/               \|
//!  0-----------------7
//! ```
//!
//! The strip between the squares is made of 4 quads (2 triangles each) and
//! the diamond is filled with 2 more triangles. There are two ways of turning
//! a grid into tiles, see [MeshMode].

mod independent;
mod normals;
mod shared;
mod weld;

pub use crate::mesh::{normals::compute_normals, weld::weld};
use crate::{
    mesh::{independent::IndependentMesher, shared::SharedMesher},
    timed,
    world::{chunk::ChunkModel, grid::OccupancyGrid},
    GenError, TileConfig,
};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The strategy used to turn a grid into a mesh. These produce materially
/// different meshes, so it has to be chosen explicitly.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MeshMode {
    /// Every tile gets its own 8 vertices. Afterwards, vertices at identical
    /// positions are welded together, then the outer vertices get a random
    /// height jitter (the "low-poly bump"). Each tile's diamond is split
    /// along a randomly chosen diagonal. Normals are **not** computed, see
    /// [MeshBuffers::with_normals].
    #[default]
    Independent,
    /// Tiles reuse the edge vertices of the solid tiles directly above and
    /// to the left of them, so most seams are shared as the mesh is built.
    /// No randomness and no jitter. Normals are computed automatically.
    Shared,
}

/// One of the 8 vertex positions on a tile. The discriminant is the slot's
/// index within a tile, see the module-level diagram.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum VertexSlot {
    OuterBottomLeft = 0,
    OuterTopLeft = 1,
    InnerBottomLeft = 2,
    InnerTopLeft = 3,
    OuterTopRight = 4,
    InnerTopRight = 5,
    InnerBottomRight = 6,
    OuterBottomRight = 7,
}

impl VertexSlot {
    /// All slots, in index order
    pub const ALL: [Self; 8] = [
        Self::OuterBottomLeft,
        Self::OuterTopLeft,
        Self::InnerBottomLeft,
        Self::InnerTopLeft,
        Self::OuterTopRight,
        Self::InnerTopRight,
        Self::InnerBottomRight,
        Self::OuterBottomRight,
    ];

    /// Index of this slot within a tile's 8 vertices
    pub fn index(self) -> usize {
        self as usize
    }

    /// Is this slot on the outer square, i.e. on a tile grid line?
    pub fn is_outer(self) -> bool {
        matches!(
            self,
            Self::OuterBottomLeft
                | Self::OuterTopLeft
                | Self::OuterTopRight
                | Self::OuterBottomRight
        )
    }
}

/// Triangles for the bevel strip around a tile, as slot indexes. Order is
/// left, right, top, bottom, with 2 triangles each. All of these wind the
/// same way, facing +Y.
const SIDE_TRIANGLES: [[usize; 3]; 8] = [
    [1, 0, 2],
    [1, 2, 3],
    [4, 5, 7],
    [6, 7, 5],
    [3, 4, 1],
    [5, 4, 3],
    [6, 2, 0],
    [6, 0, 7],
];

/// Diamond fill split along the 3-6 diagonal
const DIAMOND_TRIANGLES_A: [[usize; 3]; 2] = [[6, 5, 3], [2, 6, 3]];
/// Diamond fill split along the 2-5 diagonal
const DIAMOND_TRIANGLES_B: [[usize; 3]; 2] = [[2, 5, 3], [2, 6, 5]];

/// Number of triangles that make up a single tile
const TRIANGLES_PER_TILE: usize =
    SIDE_TRIANGLES.len() + DIAMOND_TRIANGLES_A.len();

/// Computes where each vertex slot of a tile sits in chunk-local space. The
/// tile at column `x`, row `y` covers `[x * tile_width, (x+1) * tile_width]`
/// on the X axis and `[y * tile_height, (y+1) * tile_height]` on the Z axis.
/// Everything starts at Y=0.
#[derive(Copy, Clone, Debug)]
pub struct TileGeometry {
    config: TileConfig,
}

impl TileGeometry {
    pub fn new(config: TileConfig) -> Self {
        Self { config }
    }

    pub fn bump_range(&self) -> f32 {
        self.config.bump_range
    }

    /// Position of the given slot for the tile at `(x, y)`
    pub fn position(&self, x: usize, y: usize, slot: VertexSlot) -> [f32; 3] {
        let TileConfig {
            tile_width,
            tile_height,
            tile_ratio,
            ..
        } = self.config;
        let left = tile_width * x as f32;
        let right = tile_width * (x + 1) as f32;
        let top = tile_height * y as f32;
        let bottom = tile_height * (y + 1) as f32;
        let inset_x = (tile_width / 2.0) * tile_ratio;
        let inset_z = (tile_height / 2.0) * tile_ratio;

        match slot {
            VertexSlot::OuterBottomLeft => [left, 0.0, bottom],
            VertexSlot::OuterTopLeft => [left, 0.0, top],
            VertexSlot::InnerBottomLeft => {
                [left + inset_x, 0.0, bottom - inset_z]
            }
            VertexSlot::InnerTopLeft => [left + inset_x, 0.0, top + inset_z],
            VertexSlot::OuterTopRight => [right, 0.0, top],
            VertexSlot::InnerTopRight => [right - inset_x, 0.0, top + inset_z],
            VertexSlot::InnerBottomRight => {
                [right - inset_x, 0.0, bottom - inset_z]
            }
            VertexSlot::OuterBottomRight => [right, 0.0, bottom],
        }
    }
}

/// Vertex and triangle buffers for a single chunk. Vertex positions are
/// relative to the chunk's anchor. The index of each vertex is its position
/// in the vertex list, and every triangle index is guaranteed to be in
/// bounds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshBuffers {
    pub(crate) vertices: Vec<[f32; 3]>,
    pub(crate) triangles: Vec<[u32; 3]>,
    /// One normal per vertex, if they've been computed
    pub(crate) normals: Option<Vec<[f32; 3]>>,
}

impl MeshBuffers {
    /// Create a mesh from raw buffers. Returns an error if any triangle
    /// references a vertex that doesn't exist.
    pub fn new(
        vertices: Vec<[f32; 3]>,
        triangles: Vec<[u32; 3]>,
    ) -> Result<Self, GenError> {
        let mesh = Self {
            vertices,
            triangles,
            normals: None,
        };
        mesh.validate_indices()?;
        Ok(mesh)
    }

    pub(crate) fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            triangles: Vec::with_capacity(triangles),
            normals: None,
        }
    }

    pub fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    pub fn normals(&self) -> Option<&[[f32; 3]]> {
        self.normals.as_deref()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Is this mesh devoid of any geometry?
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.triangles.is_empty()
    }

    /// All triangle indexes, flattened into a single sequence. This is the
    /// format most GPU APIs want.
    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.triangles.iter().flatten().copied()
    }

    /// Make sure every triangle index refers to an existing vertex
    pub fn validate_indices(&self) -> Result<(), GenError> {
        let vertex_count = self.vertices.len();
        match self.indices().find(|i| *i as usize >= vertex_count) {
            Some(index) => Err(GenError::InvalidState(format!(
                "triangle index {} out of bounds for {} vertices",
                index, vertex_count
            ))),
            None => Ok(()),
        }
    }

    /// Compute vertex normals from the current geometry (if they haven't been
    /// already) and attach them to this mesh.
    pub fn with_normals(mut self) -> Self {
        if self.normals.is_none() {
            self.normals = Some(compute_normals(&self));
        }
        self
    }
}

/// A strategy for turning the solid cells of a grid into tiles. See
/// [MeshMode] for the implementations.
trait TileMesher {
    /// Build the mesh for the given grid. The grid is guaranteed to have at
    /// least one solid cell.
    fn mesh<R: Rng>(
        &self,
        grid: &OccupancyGrid,
        geometry: &TileGeometry,
        rng: &mut R,
    ) -> MeshBuffers;
}

/// Builds meshes for chunks. A builder is configured once with tile geometry
/// and a [MeshMode], and can then be used for any number of chunks.
#[derive(Copy, Clone, Debug)]
pub struct MeshBuilder {
    geometry: TileGeometry,
    mode: MeshMode,
}

impl MeshBuilder {
    pub fn new(tile: TileConfig, mode: MeshMode) -> Self {
        Self {
            geometry: TileGeometry::new(tile),
            mode,
        }
    }

    pub fn mode(&self) -> MeshMode {
        self.mode
    }

    /// Build the mesh for a chunk. Random draws (if the mode uses any) come
    /// from the given RNG. Returns an error if the chunk's grid doesn't match
    /// its dimensions, or if the tile config's bump range isn't finite. A
    /// chunk with no solid cells gets an empty mesh, and consumes no random
    /// draws.
    pub fn build(
        &self,
        chunk: &ChunkModel,
        rng: &mut impl Rng,
    ) -> Result<MeshBuffers, GenError> {
        chunk.ensure_consistent()?;
        // Jitter draws from a range derived from this, which can't be infinite
        if !self.geometry.bump_range().is_finite() {
            return Err(GenError::invalid_argument(
                "bump_range",
                "must be finite",
            ));
        }
        let grid = chunk.grid();
        if grid.solid_count() == 0 {
            debug!("Chunk at {:?} has no solid cells", chunk.anchor());
            return Ok(MeshBuffers::default());
        }

        let mesh = timed!(
            format!("{} meshing", self.mode),
            match self.mode {
                MeshMode::Independent => {
                    IndependentMesher.mesh(grid, &self.geometry, rng)
                }
                MeshMode::Shared => SharedMesher.mesh(grid, &self.geometry, rng),
            }
        );
        debug!(
            "Built {} mesh for chunk at {:?}: {} vertices, {} triangles",
            self.mode,
            chunk.anchor(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }
}
