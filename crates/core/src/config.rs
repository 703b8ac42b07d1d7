mod seed;

pub use crate::config::seed::Seed;
use crate::mesh::MeshMode;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Configuration that defines a world gen process. Two worlds generated with
/// the same config will always be identical, down to the last vertex.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct WorldConfig {
    /// RNG seed to use for all randomized processes during world gen. Each
    /// chunk gets its own sub-seed derived from this, see
    /// [Seed::chunk_seed].
    pub seed: Seed,

    /// Which mesh building strategy to use. The two modes produce materially
    /// different meshes, see [MeshMode] for details.
    pub mesh_mode: MeshMode,

    /// Dimensions of a single tile, and the shape of its bevel.
    #[validate]
    pub tile: TileConfig,

    /// The chunks that make up this world. Each one is generated and meshed
    /// independently, in order. Each chunk is validated individually during
    /// world generation.
    pub chunks: Vec<ChunkConfig>,
}

/// Geometry constants for a single tile. These apply to every tile in every
/// chunk of a world.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TileConfig {
    /// Width of the whole tile, along the X axis.
    #[validate(custom = "validate_tile_size")]
    pub tile_width: f32,

    /// Height of the whole tile, along the Z axis. This is a 2D measurement,
    /// it has nothing to do with the vertical (Y) axis.
    #[validate(custom = "validate_tile_size")]
    pub tile_height: f32,

    /// How far the inner diamond of each tile is inset from the outer
    /// corners, as a fraction of half the tile's width/height. Must be
    /// strictly between 0 and 1, otherwise the inner corners would land on
    /// the outer square (or outside it).
    #[validate(custom = "validate_open_unit")]
    pub tile_ratio: f32,

    /// Maximum magnitude of the random height jitter applied to outer
    /// vertices in [MeshMode::Independent]. Offsets are drawn from
    /// `[-bump_range, bump_range / 2)`. Zero disables jitter.
    #[validate(custom = "validate_bump_range")]
    pub bump_range: f32,
}

/// Configuration for a single chunk of the world.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ChunkConfig {
    /// Where the chunk sits in 3D space. Mesh vertices are relative to this
    /// point, it's up to the consumer to translate them.
    pub anchor: [f32; 3],

    /// Number of tile columns in the chunk.
    #[validate(range(min = 1, max = 4096))]
    pub width: u16,

    /// Number of tile rows in the chunk.
    #[validate(range(min = 1, max = 4096))]
    pub height: u16,

    /// Number of cellular automata smoothing passes. Zero means the chunk
    /// keeps its raw noise.
    #[validate(range(max = 1000))]
    pub passes: u16,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            // Danger! This means the default will vary between calls!
            seed: Seed::Int(rand::random()),
            mesh_mode: MeshMode::default(),
            tile: TileConfig::default(),
            chunks: vec![ChunkConfig::default()],
        }
    }
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            tile_width: 1.5,
            tile_height: 1.5,
            tile_ratio: 0.4,
            bump_range: 0.3,
        }
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            anchor: [0.0, 0.0, 0.0],
            width: 20,
            height: 20,
            passes: 4,
        }
    }
}

/// Ensure a value is in the open range `(0, 1)`
fn validate_open_unit(value: f32) -> Result<(), ValidationError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ValidationError::new("open_unit"))
    }
}

/// Tile dimensions must be finite, and big enough to not collapse
fn validate_tile_size(value: f32) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.001 {
        Ok(())
    } else {
        Err(ValidationError::new("tile_size"))
    }
}

/// Jitter magnitude must be finite and non-negative
fn validate_bump_range(value: f32) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("bump_range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_ratio_bounds() {
        assert!(validate_open_unit(0.4).is_ok());
        assert!(validate_open_unit(0.0).is_err());
        assert!(validate_open_unit(1.0).is_err());
        assert!(validate_open_unit(f32::NAN).is_err());
    }

    #[test]
    fn test_tile_size_bounds() {
        assert!(validate_tile_size(1.5).is_ok());
        assert!(validate_tile_size(0.001).is_ok());
        assert!(validate_tile_size(0.0).is_err());
        assert!(validate_tile_size(f32::INFINITY).is_err());
        assert!(validate_tile_size(f32::NAN).is_err());
    }

    #[test]
    fn test_bump_range_bounds() {
        assert!(validate_bump_range(0.0).is_ok());
        assert!(validate_bump_range(0.3).is_ok());
        assert!(validate_bump_range(-0.1).is_err());
        assert!(validate_bump_range(f32::INFINITY).is_err());
        assert!(validate_bump_range(f32::NAN).is_err());
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = WorldConfig::default();
        assert!(config.validate().is_ok());
        for chunk in &config.chunks {
            assert!(chunk.validate().is_ok());
        }
    }
}
