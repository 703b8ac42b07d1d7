pub mod chunk;
pub mod grid;
mod rng;

pub use crate::world::rng::ReseedGuard;
use crate::{
    config::{ChunkConfig, Seed, TileConfig},
    mesh::{MeshBuffers, MeshBuilder, MeshMode},
    timed,
    world::{chunk::ChunkModel, grid::GridGenerator},
    GenError, WorldConfig,
};
use anyhow::Context;
use log::{debug, info};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A fully generated world: the config that defined it, plus a grid and a
/// mesh for every chunk.
///
/// ## Serialization
/// With the `json` feature, worlds can be serialized to and from JSON via
/// [World::to_json] and [World::from_json]. With the `stl` feature, the
/// meshes of every chunk can be exported together as a single STL model via
/// [World::to_stl].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct World {
    /// The config used to generate this world. Generation is deterministic
    /// based on the config, so this is enough to recreate the whole world.
    config: WorldConfig,

    /// One chunk per entry in the config, in the same order
    chunks: Vec<ChunkModel>,

    /// One mesh per chunk, in the same order
    meshes: Vec<ChunkMesh>,
}

/// A chunk's mesh, along with where it belongs in the world. The mesh's
/// vertices are relative to the anchor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkMesh {
    pub anchor: [f32; 3],
    pub mesh: MeshBuffers,
}

impl World {
    /// Generate a new world with the given config. Returns an error if the
    /// config is invalid. Any error from generation itself indicates a bug.
    pub fn generate(config: WorldConfig) -> anyhow::Result<Self> {
        info!("Generating world with config {:#?}", config);

        config.validate().context("invalid config")?;
        for (i, chunk) in config.chunks.iter().enumerate() {
            chunk
                .validate()
                .with_context(|| format!("invalid config for chunk {}", i))?;
        }

        // The assembler reseeds per chunk, so the starting state of this RNG
        // never shows up in the output
        let mut rng = Pcg64::seed_from_u64(config.seed.to_u64());
        let assembler = WorldAssembler::new(config.tile, config.mesh_mode);
        let (chunks, meshes) = timed!(
            "World generation",
            log::Level::Info,
            assembler.assemble(&mut rng, &config.seed, &config.chunks)
        )
        .context("error generating world")?
        .into_iter()
        .map(|(chunk, mesh)| {
            let mesh = ChunkMesh {
                anchor: chunk.anchor(),
                mesh,
            };
            (chunk, mesh)
        })
        .unzip();

        Ok(Self {
            config,
            chunks,
            meshes,
        })
    }

    /// Get a reference to the config that defines this world.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Get the chunks of this world, in config order.
    pub fn chunks(&self) -> &[ChunkModel] {
        &self.chunks
    }

    /// Get the mesh for each chunk, in config order.
    pub fn meshes(&self) -> &[ChunkMesh] {
        &self.meshes
    }

    /// Deserialize a world from JSON. A world can be serialized into JSON
    /// with [World::to_json]. Will fail if the input is malformed.
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("error deserializing world")
    }

    /// Serialize this world into JSON. This is a recoverable format, which
    /// can be loaded back into a [World] with [World::from_json].
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> String {
        // Panic here indicates an internal bug in the data format
        serde_json::to_string(self).expect("error serializing world")
    }

    /// Export every chunk's mesh as one binary STL model, with each chunk
    /// translated to its anchor.
    #[cfg(feature = "stl")]
    pub fn to_stl(&self) -> Vec<u8> {
        crate::render::stl::meshes_to_stl(&self.meshes)
    }
}

/// Runs the full pipeline for a set of chunks: grid generation, then meshing.
///
/// Every chunk borrows the caller's RNG, reseeded with the chunk's own seed
/// (see [Seed::chunk_seed]), through a [ReseedGuard]. The RNG is back in its
/// original state once each chunk is done, whether it succeeded or not.
/// Within a chunk, the grid takes all of its draws before meshing takes any.
#[derive(Copy, Clone, Debug)]
pub struct WorldAssembler {
    mesh_builder: MeshBuilder,
}

impl WorldAssembler {
    pub fn new(tile: TileConfig, mesh_mode: MeshMode) -> Self {
        Self {
            mesh_builder: MeshBuilder::new(tile, mesh_mode),
        }
    }

    /// Generate a mesh for each chunk config, in order.
    pub fn generate_world(
        &self,
        rng: &mut Pcg64,
        seed: &Seed,
        chunk_configs: &[ChunkConfig],
    ) -> Result<Vec<MeshBuffers>, GenError> {
        Ok(self
            .assemble(rng, seed, chunk_configs)?
            .into_iter()
            .map(|(_, mesh)| mesh)
            .collect())
    }

    /// Generate a chunk and a mesh for each chunk config, in order.
    pub fn assemble(
        &self,
        rng: &mut Pcg64,
        seed: &Seed,
        chunk_configs: &[ChunkConfig],
    ) -> Result<Vec<(ChunkModel, MeshBuffers)>, GenError> {
        info!("Assembling {} chunks", chunk_configs.len());
        chunk_configs
            .iter()
            .enumerate()
            .map(|(i, chunk_config)| {
                let mut rng = ReseedGuard::new(rng, seed.chunk_seed(i));
                self.generate_chunk(&mut rng, chunk_config)
            })
            .collect()
    }

    fn generate_chunk(
        &self,
        rng: &mut Pcg64,
        chunk_config: &ChunkConfig,
    ) -> Result<(ChunkModel, MeshBuffers), GenError> {
        let grid = GridGenerator::new(
            chunk_config.width.into(),
            chunk_config.height.into(),
            chunk_config.passes.into(),
        )?
        .generate(rng);
        debug!(
            "Generated {}x{} grid at {:?} with {} solid cells",
            grid.width(),
            grid.height(),
            chunk_config.anchor,
            grid.solid_count()
        );

        let chunk = ChunkModel::from_grid(chunk_config.anchor, grid);
        let mesh = self.mesh_builder.build(&chunk, rng)?;
        Ok((chunk, mesh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn chunk(width: u16, height: u16, passes: u16) -> ChunkConfig {
        ChunkConfig {
            anchor: [0.0; 3],
            width,
            height,
            passes,
        }
    }

    #[test]
    fn test_rng_restored() {
        let assembler =
            WorldAssembler::new(TileConfig::default(), MeshMode::Independent);
        let mut rng = Pcg64::seed_from_u64(1234);
        let untouched = rng.clone();

        assembler
            .generate_world(&mut rng, &Seed::Int(400), &[chunk(8, 8, 2)])
            .unwrap();
        assert_eq!(rng, untouched);

        // Error path restores too
        let err = assembler
            .generate_world(&mut rng, &Seed::Int(400), &[chunk(0, 8, 2)])
            .unwrap_err();
        assert!(matches!(err, GenError::InvalidArgument { name: "width", .. }));
        assert_eq!(rng.gen::<u64>(), untouched.clone().gen::<u64>());
    }

    /// The first chunk matches a grid generated directly from the world seed
    #[test]
    fn test_first_chunk_uses_world_seed() {
        let assembler =
            WorldAssembler::new(TileConfig::default(), MeshMode::Shared);
        let chunks = assembler
            .assemble(
                &mut Pcg64::seed_from_u64(0),
                &Seed::Int(400),
                &[chunk(20, 20, 0), chunk(20, 20, 0)],
            )
            .unwrap();
        let expected = GridGenerator::generate_seeded(20, 20, 0, 400).unwrap();
        assert_eq!(chunks[0].0.grid(), &expected);
        // Different sub-seed, different noise
        assert_ne!(chunks[1].0.grid(), &expected);
    }

    /// Grid draws all come before mesh draws, so meshing a chunk directly
    /// with the RNG left over from grid generation gives the same result
    #[test]
    fn test_draw_sequence() {
        let assembler =
            WorldAssembler::new(TileConfig::default(), MeshMode::Independent);
        let meshes = assembler
            .generate_world(
                &mut Pcg64::seed_from_u64(0),
                &Seed::Int(77),
                &[chunk(10, 6, 1)],
            )
            .unwrap();

        let mut rng = Pcg64::seed_from_u64(77);
        let grid = GridGenerator::new(10, 6, 1).unwrap().generate(&mut rng);
        let chunk = ChunkModel::from_grid([0.0; 3], grid);
        let mesh = MeshBuilder::new(TileConfig::default(), MeshMode::Independent)
            .build(&chunk, &mut rng)
            .unwrap();
        assert_eq!(meshes, vec![mesh]);
    }
}
