//! Top-down SVG rendering of occupancy grids. Only available with the "svg"
//! feature enabled.

use crate::{OccupancyGrid, TileConfig};
use svg::{
    node::{element::Rectangle, Comment},
    Document,
};

const SOLID_COLOR: &str = "#3b3026";
const EMPTY_COLOR: &str = "#e8dcc4";

/// Render a grid as a 2D SVG, looking down the Y axis. Each solid cell is a
/// dark square sized according to the tile config, on top of a light
/// background covering the whole grid. Row 0 is at the top, which matches
/// both SVG's coordinate system and the mesh's +Z direction.
pub fn grid_to_svg(grid: &OccupancyGrid, tile: &TileConfig) -> Document {
    let width = grid.width() as f32 * tile.tile_width;
    let height = grid.height() as f32 * tile.tile_height;

    let mut document = Document::new()
        .set("viewBox", (0.0, 0.0, width, height))
        .set("shape-rendering", "crispEdges")
        .add(Comment::new(format!(
            "{}x{} grid, {} solid cells",
            grid.width(),
            grid.height(),
            grid.solid_count()
        )))
        .add(
            Rectangle::new()
                .set("width", width)
                .set("height", height)
                .set("fill", EMPTY_COLOR),
        );

    for (x, y) in grid.solid_cells() {
        document = document.add(
            Rectangle::new()
                .set("x", x as f32 * tile.tile_width)
                .set("y", y as f32 * tile.tile_height)
                .set("width", tile.tile_width)
                .set("height", tile.tile_height)
                .set("fill", SOLID_COLOR),
        );
    }

    document
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_to_svg() {
        let grid = OccupancyGrid::from_ascii("# \n ##\n");
        let svg = grid_to_svg(&grid, &TileConfig::default()).to_string();
        assert!(svg.contains("viewBox=\"0 0 4.5 3\""), "{}", svg);
        // Background plus one per solid cell
        assert_eq!(svg.matches("<rect").count(), 4);
        assert_eq!(svg.matches(SOLID_COLOR).count(), 3);
    }
}
