use crate::{world::grid::OccupancyGrid, GenError};
use serde::{Deserialize, Serialize};

/// A rectangular section of the world: an occupancy grid pinned to a point in
/// space. This is just a container, the interesting stuff happens in
/// [GridGenerator](crate::GridGenerator) and
/// [MeshBuilder](crate::MeshBuilder).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkModel {
    anchor: [f32; 3],
    width: usize,
    height: usize,
    grid: OccupancyGrid,
}

impl ChunkModel {
    /// Bundle a grid into a chunk. The dimensions aren't checked here, a
    /// mismatch is caught when the chunk is meshed (see
    /// [Self::ensure_consistent]).
    pub fn new(
        anchor: [f32; 3],
        width: usize,
        height: usize,
        grid: OccupancyGrid,
    ) -> Self {
        Self {
            anchor,
            width,
            height,
            grid,
        }
    }

    /// Bundle a grid into a chunk, taking the dimensions from the grid
    pub fn from_grid(anchor: [f32; 3], grid: OccupancyGrid) -> Self {
        Self::new(anchor, grid.width(), grid.height(), grid)
    }

    /// The position of this chunk's origin corner in 3D space
    pub fn anchor(&self) -> [f32; 3] {
        self.anchor
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Get the owned grid for this chunk
    pub fn into_grid(self) -> OccupancyGrid {
        self.grid
    }

    /// Make sure the grid has the dimensions that this chunk claims to have,
    /// and actually holds that many cells.
    pub fn ensure_consistent(&self) -> Result<(), GenError> {
        self.grid.ensure_cell_count()?;
        if self.grid.width() == self.width && self.grid.height() == self.height
        {
            Ok(())
        } else {
            Err(GenError::InvalidState(format!(
                "chunk is {}x{} but its grid is {}x{}",
                self.width,
                self.height,
                self.grid.width(),
                self.grid.height()
            )))
        }
    }
}
