use strum_macros::Display;

/// A single square of the puzzle board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    pub letter: char,
}

/// One of the eight unit-step directions a word can run along.
/// `y` grows downward, matching row order on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum Orientation {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Orientation {
    pub const ALL: [Orientation; 8] = [
        Orientation::North,
        Orientation::South,
        Orientation::East,
        Orientation::West,
        Orientation::NorthEast,
        Orientation::NorthWest,
        Orientation::SouthEast,
        Orientation::SouthWest,
    ];

    /// Unit step vector (dx, dy) for this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Orientation::North => (0, -1),
            Orientation::South => (0, 1),
            Orientation::East => (1, 0),
            Orientation::West => (-1, 0),
            Orientation::NorthEast => (1, -1),
            Orientation::NorthWest => (-1, -1),
            Orientation::SouthEast => (1, 1),
            Orientation::SouthWest => (-1, 1),
        }
    }

    /// The direction `d` such that `(bx, by) = (ax, ay) + delta(d)`, if the
    /// two positions are exactly one unit step apart. Identical positions and
    /// anything further away have no orientation.
    pub fn between(ax: usize, ay: usize, bx: usize, by: usize) -> Option<Orientation> {
        let dx = bx as i32 - ax as i32;
        let dy = by as i32 - ay as i32;

        Orientation::ALL.into_iter().find(|o| o.delta() == (dx, dy))
    }

    /// Position reached by taking `n` steps from (x, y), or None if the walk
    /// leaves the top or left edge.
    pub fn walk(self, x: usize, y: usize, n: usize) -> Option<(usize, usize)> {
        let (dx, dy) = self.delta();
        let nx = x as i64 + dx as i64 * n as i64;
        let ny = y as i64 + dy as i64 * n as i64;

        if nx < 0 || ny < 0 {
            None
        } else {
            Some((nx as usize, ny as usize))
        }
    }
}

/// Immutable rectangular letter matrix. Built once by a puzzle provider and
/// only read afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<char>>,
    width: usize,
    height: usize,
}

impl Grid {
    /// Builds a grid from rows of letters. Returns None for an empty matrix
    /// or ragged rows.
    pub fn from_rows(rows: Vec<Vec<char>>) -> Option<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());

        if height == 0 || width == 0 || rows.iter().any(|r| r.len() != width) {
            return None;
        }

        Some(Self {
            rows,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn letter(&self, x: usize, y: usize) -> Option<char> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        self.letter(x, y).map(|letter| Cell { x, y, letter })
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(move |(x, &letter)| Cell { x, y, letter })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_3x2() -> Grid {
        Grid::from_rows(vec![vec!['c', 'a', 't'], vec!['d', 'o', 'g']]).unwrap()
    }

    #[test]
    fn test_from_rows_valid() {
        let grid = grid_3x2();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
    }

    #[test]
    fn test_from_rows_empty() {
        assert!(Grid::from_rows(vec![]).is_none());
        assert!(Grid::from_rows(vec![vec![]]).is_none());
    }

    #[test]
    fn test_from_rows_ragged() {
        assert!(Grid::from_rows(vec![vec!['a', 'b'], vec!['c']]).is_none());
    }

    #[test]
    fn test_letter_lookup() {
        let grid = grid_3x2();
        assert_eq!(grid.letter(0, 0), Some('c'));
        assert_eq!(grid.letter(2, 1), Some('g'));
        assert_eq!(grid.letter(3, 0), None);
        assert_eq!(grid.letter(0, 2), None);
    }

    #[test]
    fn test_cell_lookup() {
        let grid = grid_3x2();
        let cell = grid.cell(1, 1).unwrap();
        assert_eq!(cell.x, 1);
        assert_eq!(cell.y, 1);
        assert_eq!(cell.letter, 'o');
        assert!(grid.cell(9, 9).is_none());
    }

    #[test]
    fn test_cells_row_major() {
        let grid = grid_3x2();
        let letters: String = grid.cells().map(|c| c.letter).collect();
        assert_eq!(letters, "catdog");
    }

    #[test]
    fn test_orientation_between_all_unit_steps() {
        // every unit step from (5, 5) maps back to its direction
        for o in Orientation::ALL {
            let (dx, dy) = o.delta();
            let bx = (5 + dx) as usize;
            let by = (5 + dy) as usize;
            assert_eq!(Orientation::between(5, 5, bx, by), Some(o));
        }
    }

    #[test]
    fn test_orientation_between_same_cell() {
        assert_eq!(Orientation::between(4, 4, 4, 4), None);
    }

    #[test]
    fn test_orientation_between_non_adjacent() {
        assert_eq!(Orientation::between(0, 0, 2, 0), None);
        assert_eq!(Orientation::between(0, 0, 2, 2), None);
        assert_eq!(Orientation::between(3, 3, 5, 4), None);
    }

    #[test]
    fn test_orientation_between_exhaustive_neighborhood() {
        // scan a 5x5 neighborhood around (2, 2): exactly the 8 ring cells
        // have an orientation, everything else has none
        let mut defined = 0;
        for bx in 0..5 {
            for by in 0..5 {
                if Orientation::between(2, 2, bx, by).is_some() {
                    defined += 1;
                }
            }
        }
        assert_eq!(defined, 8);
    }

    #[test]
    fn test_walk_east() {
        assert_eq!(Orientation::East.walk(0, 0, 3), Some((3, 0)));
    }

    #[test]
    fn test_walk_off_edge() {
        assert_eq!(Orientation::North.walk(0, 0, 1), None);
        assert_eq!(Orientation::West.walk(1, 5, 2), None);
    }

    #[test]
    fn test_walk_zero_steps() {
        assert_eq!(Orientation::SouthWest.walk(2, 2, 0), Some((2, 2)));
    }

    #[test]
    fn test_orientation_display() {
        assert_eq!(Orientation::NorthEast.to_string(), "NorthEast");
        assert_eq!(Orientation::East.to_string(), "East");
    }
}
