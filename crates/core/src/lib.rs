//! Grotto generates cave-like terrain chunks with cellular automata, and
//! turns them into low-poly tile meshes. This crate contains all the core
//! generation logic. Presentation layers are implemented elsewhere, this
//! crate only hands back vertex and index buffers.
//!
//! ```
//! use grotto::{World, WorldConfig};
//!
//! let config = WorldConfig::default();
//! let world = World::generate(config).unwrap();
//! println!("{}", world.chunks()[0].grid());
//! // From here you can upload the meshes however you like.
//! println!("{} vertices", world.meshes()[0].mesh.vertex_count());
//! ```
//!
//! See [WorldConfig] for details on how the world generation can be
//! customized. The individual stages ([GridGenerator], [MeshBuilder]) can
//! also be used on their own.

mod config;
mod error;
mod mesh;
#[cfg(any(feature = "stl", feature = "svg"))]
pub mod render;
mod util;
mod world;

pub use crate::{
    config::{ChunkConfig, Seed, TileConfig, WorldConfig},
    error::GenError,
    mesh::{
        compute_normals, weld, MeshBuffers, MeshBuilder, MeshMode,
        TileGeometry, VertexSlot,
    },
    world::{
        chunk::ChunkModel,
        grid::{Cell, GridGenerator, OccupancyGrid},
        ChunkMesh, ReseedGuard, World, WorldAssembler,
    },
};
