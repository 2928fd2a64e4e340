//! Boundary classification of Numberlink cells

use std::fmt;

/// Which borders of the grid a cell touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellPattern {
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

/// An edge direction around a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    West,
    South,
    East,
}

impl Direction {
    /// Incident-edge order used by the degree clauses
    pub const ALL: [Direction; 4] = [Direction::North, Direction::West, Direction::South, Direction::East];

    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::West => "west",
            Direction::South => "south",
            Direction::East => "east",
        }
    }
}

impl CellPattern {
    /// Classify a cell of a `rows x cols` grid (both at least 2)
    pub fn classify(row: usize, col: usize, rows: usize, cols: usize) -> Self {
        let top = row == 0;
        let bottom = row + 1 == rows;
        let left = col == 0;
        let right = col + 1 == cols;

        match (top, bottom, left, right) {
            (true, _, true, _) => CellPattern::TopLeft,
            (true, _, _, true) => CellPattern::TopRight,
            (true, _, _, _) => CellPattern::Top,
            (_, true, true, _) => CellPattern::BottomLeft,
            (_, true, _, true) => CellPattern::BottomRight,
            (_, true, _, _) => CellPattern::Bottom,
            (_, _, true, _) => CellPattern::Left,
            (_, _, _, true) => CellPattern::Right,
            _ => CellPattern::Center,
        }
    }

    pub fn has_north(self) -> bool {
        !matches!(self, CellPattern::TopLeft | CellPattern::Top | CellPattern::TopRight)
    }

    pub fn has_south(self) -> bool {
        !matches!(
            self,
            CellPattern::BottomLeft | CellPattern::Bottom | CellPattern::BottomRight
        )
    }

    pub fn has_west(self) -> bool {
        !matches!(
            self,
            CellPattern::TopLeft | CellPattern::Left | CellPattern::BottomLeft
        )
    }

    pub fn has_east(self) -> bool {
        !matches!(
            self,
            CellPattern::TopRight | CellPattern::Right | CellPattern::BottomRight
        )
    }

    pub fn has(self, direction: Direction) -> bool {
        match direction {
            Direction::North => self.has_north(),
            Direction::West => self.has_west(),
            Direction::South => self.has_south(),
            Direction::East => self.has_east(),
        }
    }

    /// Directions with an edge, in north, west, south, east order
    pub fn directions(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |&d| self.has(d))
    }
}

impl fmt::Display for CellPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CellPattern::TopLeft => "top-left corner",
            CellPattern::Top => "top border",
            CellPattern::TopRight => "top-right corner",
            CellPattern::Left => "left border",
            CellPattern::Center => "interior",
            CellPattern::Right => "right border",
            CellPattern::BottomLeft => "bottom-left corner",
            CellPattern::Bottom => "bottom border",
            CellPattern::BottomRight => "bottom-right corner",
        };
        write!(f, "{}", name)
    }
}
