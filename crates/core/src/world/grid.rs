//! Occupancy grids and the cellular automata that generates them.

use crate::GenError;
use log::trace;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use std::{
    convert::TryFrom,
    fmt::{self, Display},
};

/// The state of a single grid cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Empty,
    Solid,
}

impl Cell {
    /// Character used for this cell in the ASCII dump
    pub fn to_char(self) -> char {
        match self {
            Self::Empty => ' ',
            Self::Solid => '#',
        }
    }
}

/// A 2D map of which cells are occupied by terrain. Stored row-major, with
/// `height` rows of `width` cells. Dimensions are fixed at construction.
///
/// Coordinates are `(x, y)`, where `x` is the column and `y` is the row. Row
/// 0 is the "top" of the grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

/// Serialized form of [OccupancyGrid], before the cell count is checked
#[derive(Deserialize)]
#[serde(rename = "OccupancyGrid")]
struct RawGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl TryFrom<RawGrid> for OccupancyGrid {
    type Error = GenError;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        let grid = Self {
            width: raw.width,
            height: raw.height,
            cells: raw.cells,
        };
        grid.ensure_cell_count()?;
        Ok(grid)
    }
}

impl OccupancyGrid {
    /// Create a grid where every cell has the same state
    pub fn filled(width: usize, height: usize, cell: Cell) -> Self {
        Self {
            width,
            height,
            cells: vec![cell; width * height],
        }
    }

    /// Create a grid from a list of rows. Returns an error if the rows aren't
    /// all the same length.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, GenError> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = rows.iter().position(|row| row.len() != width) {
            return Err(GenError::InvalidState(format!(
                "row {} has {} cells, expected {}",
                bad,
                rows[bad].len(),
                width
            )));
        }
        Ok(Self {
            width,
            height,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Parse a grid from the same format that [Self::to_ascii] outputs: `#`
    /// for solid, anything else for empty, one line per row. Short lines are
    /// padded out with empty cells, so trailing spaces can be omitted.
    pub fn from_ascii(ascii: &str) -> Self {
        let lines: Vec<&str> = ascii.lines().collect();
        let width = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let mut grid = Self::filled(width, lines.len(), Cell::Empty);
        for (y, line) in lines.iter().enumerate() {
            for (x, c) in line.chars().enumerate() {
                if c == '#' {
                    grid.set(x, y, Cell::Solid);
                }
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Get the cell at the given position. Returns `None` if out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// Is the given position in bounds and solid?
    pub fn is_solid(&self, x: usize, y: usize) -> bool {
        self.get(x, y) == Some(Cell::Solid)
    }

    /// Total number of solid cells in the grid
    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell == Cell::Solid).count()
    }

    /// Iterate over each row of the grid, top to bottom. There are always
    /// `height` rows, even if the grid is zero cells wide.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        let width = self.width;
        (0..self.height)
            .map(move |y| &self.cells[y * width..(y + 1) * width])
    }

    /// Make sure the grid holds exactly `width * height` cells
    pub fn ensure_cell_count(&self) -> Result<(), GenError> {
        let expected = self.width * self.height;
        if self.cells.len() == expected {
            Ok(())
        } else {
            Err(GenError::InvalidState(format!(
                "grid is {}x{} but has {} cells, expected {}",
                self.width,
                self.height,
                self.cells.len(),
                expected
            )))
        }
    }

    /// Build a grid without checking the cell count, for testing the checks
    #[cfg(test)]
    pub(crate) fn from_raw_parts(
        width: usize,
        height: usize,
        cells: Vec<Cell>,
    ) -> Self {
        Self {
            width,
            height,
            cells,
        }
    }

    /// Iterate over the coordinates of every solid cell, in row-major order
    pub fn solid_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Solid)
            .map(move |(i, _)| (i % width, i / width))
    }

    /// Can this position be looked at during a neighbor scan? This is
    /// **stricter** than a normal bounds check: the first row and column are
    /// excluded, as are the positions past the last row and column. Negative
    /// positions are also excluded, hence the signed inputs.
    pub fn is_interior(&self, x: isize, y: isize) -> bool {
        x > 0 && y > 0 && x < self.width as isize && y < self.height as isize
    }

    /// Count the solid cells in the 3x3 block centered on `(x, y)`, including
    /// the cell itself. Only positions that pass [Self::is_interior] count.
    pub fn solid_neighbors(&self, x: usize, y: usize) -> usize {
        let (x, y) = (x as isize, y as isize);
        let mut count = 0;
        for yy in (y - 1)..=(y + 1) {
            for xx in (x - 1)..=(x + 1) {
                if self.is_interior(xx, yy)
                    && self.is_solid(xx as usize, yy as usize)
                {
                    count += 1;
                }
            }
        }
        count
    }

    /// Render the grid as text: `#` for solid, space for empty, one line per
    /// row. Every line (including the last) ends with a newline.
    pub fn to_ascii(&self) -> String {
        self.to_string()
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        self.cells[y * self.width + x] = cell;
    }
}

impl Display for OccupancyGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for cell in row {
                write!(f, "{}", cell.to_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Generates an [OccupancyGrid] from random noise, using the cellular
/// automata "4-5 rule". Each pass, a cell becomes solid if fewer than
/// [Self::SOLID_THRESHOLD] cells in its 3x3 neighborhood are solid, and
/// empty otherwise.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GridGenerator {
    width: usize,
    height: usize,
    passes: usize,
}

impl GridGenerator {
    /// A cell with fewer than this many solid cells in its neighborhood
    /// becomes solid on the next pass.
    pub const SOLID_THRESHOLD: usize = 5;

    /// Create a new generator. Returns an error if either dimension is zero.
    /// Zero passes is allowed, and leaves the raw noise as-is.
    pub fn new(
        width: usize,
        height: usize,
        passes: usize,
    ) -> Result<Self, GenError> {
        if width == 0 {
            return Err(GenError::invalid_argument(
                "width",
                "must be positive",
            ));
        }
        if height == 0 {
            return Err(GenError::invalid_argument(
                "height",
                "must be positive",
            ));
        }
        Ok(Self {
            width,
            height,
            passes,
        })
    }

    /// Generate a grid from scratch with a fresh RNG seeded from `seed`. The
    /// same arguments will always produce the same grid.
    pub fn generate_seeded(
        width: usize,
        height: usize,
        passes: usize,
        seed: u64,
    ) -> Result<OccupancyGrid, GenError> {
        let generator = Self::new(width, height, passes)?;
        Ok(generator.generate(&mut Pcg64::seed_from_u64(seed)))
    }

    /// Generate a grid, drawing noise from the given RNG. Consumes exactly
    /// one draw per cell, in row-major order, and nothing else.
    pub fn generate(&self, rng: &mut impl Rng) -> OccupancyGrid {
        let mut grid = self.noise(rng);
        for pass in 0..self.passes {
            grid = Self::smooth(&grid);
            trace!(
                "Automata pass {} left {} solid cells",
                pass,
                grid.solid_count()
            );
        }
        grid
    }

    /// Fill a grid with coin flips
    fn noise(&self, rng: &mut impl Rng) -> OccupancyGrid {
        let cells = (0..self.width * self.height)
            .map(|_| if rng.gen() { Cell::Solid } else { Cell::Empty })
            .collect();
        OccupancyGrid {
            width: self.width,
            height: self.height,
            cells,
        }
    }

    /// Run one automata pass. Every cell reads from the same snapshot, so
    /// the result is built into a new grid rather than mutated in place.
    fn smooth(grid: &OccupancyGrid) -> OccupancyGrid {
        let mut next = OccupancyGrid::filled(grid.width, grid.height, Cell::Empty);
        for y in 0..grid.height {
            for x in 0..grid.width {
                if grid.solid_neighbors(x, y) < Self::SOLID_THRESHOLD {
                    next.set(x, y, Cell::Solid);
                }
            }
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_test::{assert_de_tokens_error, assert_tokens, Token};

    #[test]
    fn test_invalid_dimensions() {
        assert_eq!(
            GridGenerator::new(0, 5, 1).unwrap_err(),
            GenError::invalid_argument("width", "must be positive")
        );
        assert_eq!(
            GridGenerator::new(5, 0, 1).unwrap_err(),
            GenError::invalid_argument("height", "must be positive")
        );
        assert!(GridGenerator::new(5, 5, 0).is_ok());
    }

    #[test]
    fn test_deterministic() {
        let a = GridGenerator::generate_seeded(20, 20, 3, 400).unwrap();
        let b = GridGenerator::generate_seeded(20, 20, 3, 400).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.width(), 20);
        assert_eq!(a.height(), 20);
    }

    /// With no passes, the grid is exactly the coin flips, one per cell
    #[test]
    fn test_zero_passes_is_raw_noise() {
        let grid = GridGenerator::generate_seeded(20, 20, 0, 400).unwrap();
        let mut rng = Pcg64::seed_from_u64(400);
        for y in 0..20 {
            for x in 0..20 {
                let expected: bool = rng.gen();
                assert_eq!(grid.is_solid(x, y), expected, "cell ({}, {})", x, y);
            }
        }
    }

    /// The neighbor scan skips row 0 and column 0, and counts the cell itself
    #[test]
    fn test_neighbor_count_boundary_policy() {
        let grid = OccupancyGrid::from_ascii("   \n # \n   \n");
        assert_eq!(grid.solid_neighbors(1, 1), 1);
        // The corner can still "see" the center
        assert_eq!(grid.solid_neighbors(0, 0), 1);
        assert_eq!(grid.solid_neighbors(2, 2), 1);

        // A fully solid 3x3 only ever counts the 2x2 interior block
        let full = OccupancyGrid::filled(3, 3, Cell::Solid);
        assert_eq!(full.solid_neighbors(1, 1), 4);
        assert_eq!(full.solid_neighbors(0, 0), 1);
        assert_eq!(full.solid_neighbors(2, 0), 2);
    }

    #[test]
    fn test_is_interior() {
        let grid = OccupancyGrid::filled(4, 3, Cell::Empty);
        assert!(!grid.is_interior(0, 1));
        assert!(!grid.is_interior(1, 0));
        assert!(!grid.is_interior(-1, 1));
        assert!(grid.is_interior(1, 1));
        assert!(grid.is_interior(3, 2));
        assert!(!grid.is_interior(4, 2));
        assert!(!grid.is_interior(3, 3));
    }

    #[test]
    fn test_smooth_rule() {
        // Nothing solid -> every count is 0, so everything becomes solid
        let empty = OccupancyGrid::filled(4, 4, Cell::Empty);
        let smoothed = GridGenerator::smooth(&empty);
        assert_eq!(smoothed.solid_count(), 16);

        // A solid 5x5 interior block has counts of 9 in the middle, which is
        // over the threshold, so the middle empties out
        let full = OccupancyGrid::filled(5, 5, Cell::Solid);
        let smoothed = GridGenerator::smooth(&full);
        assert_eq!(smoothed.get(2, 2), Some(Cell::Empty));
        // Corner (0,0) only sees (1,1)
        assert_eq!(smoothed.get(0, 0), Some(Cell::Solid));
    }

    #[test]
    fn test_ascii_dump() {
        let grid = OccupancyGrid::from_rows(vec![
            vec![Cell::Solid, Cell::Empty],
            vec![Cell::Empty, Cell::Solid],
        ])
        .unwrap();
        assert_eq!(grid.to_ascii(), "# \n #\n");
        assert_eq!(OccupancyGrid::from_ascii(&grid.to_ascii()), grid);
    }

    #[test]
    fn test_from_rows_ragged() {
        let err = OccupancyGrid::from_rows(vec![
            vec![Cell::Solid, Cell::Empty],
            vec![Cell::Empty],
        ])
        .unwrap_err();
        assert_eq!(
            err,
            GenError::InvalidState("row 1 has 1 cells, expected 2".into())
        );
    }

    #[test]
    fn test_zero_width_display() {
        let grid = OccupancyGrid::filled(0, 3, Cell::Empty);
        assert_eq!(grid.rows().count(), 3);
        assert_eq!(grid.to_ascii(), "\n\n\n");
    }

    #[test]
    fn test_deserialize_checks_cell_count() {
        let grid = OccupancyGrid::from_ascii("# \n #\n");
        assert_tokens(
            &grid,
            &[
                Token::Struct {
                    name: "OccupancyGrid",
                    len: 3,
                },
                Token::Str("width"),
                Token::U64(2),
                Token::Str("height"),
                Token::U64(2),
                Token::Str("cells"),
                Token::Seq { len: Some(4) },
                Token::UnitVariant {
                    name: "Cell",
                    variant: "solid",
                },
                Token::UnitVariant {
                    name: "Cell",
                    variant: "empty",
                },
                Token::UnitVariant {
                    name: "Cell",
                    variant: "empty",
                },
                Token::UnitVariant {
                    name: "Cell",
                    variant: "solid",
                },
                Token::SeqEnd,
                Token::StructEnd,
            ],
        );

        // Claims 3x3 but holds nothing
        assert_de_tokens_error::<OccupancyGrid>(
            &[
                Token::Struct {
                    name: "OccupancyGrid",
                    len: 3,
                },
                Token::Str("width"),
                Token::U64(3),
                Token::Str("height"),
                Token::U64(3),
                Token::Str("cells"),
                Token::Seq { len: Some(0) },
                Token::SeqEnd,
                Token::StructEnd,
            ],
            "invalid state: grid is 3x3 but has 0 cells, expected 9",
        );
    }

    #[test]
    fn test_ensure_cell_count() {
        assert!(OccupancyGrid::filled(3, 2, Cell::Solid)
            .ensure_cell_count()
            .is_ok());
        let grid = OccupancyGrid::from_raw_parts(2, 2, vec![Cell::Solid; 6]);
        assert_eq!(
            grid.ensure_cell_count().unwrap_err(),
            GenError::InvalidState(
                "grid is 2x2 but has 6 cells, expected 4".into()
            )
        );
    }

    #[test]
    fn test_solid_cells() {
        let grid = OccupancyGrid::from_ascii("#  \n  #\n");
        assert_eq!(grid.solid_cells().collect::<Vec<_>>(), vec![(0, 0), (2, 1)]);
        assert_eq!(grid.solid_count(), 2);
    }
}
