use serde::{Deserialize, Serialize};

use crate::{Direction, Position};

/// Represents errors in board geometry or wall placement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("Coordinates ({x}, {y}) are out of bounds for board size ({width}, {height})")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    #[error("Cells {a:?} and {b:?} are not adjacent")]
    NotAdjacent { a: Position, b: Position },
    #[error("Board must be at least 1x1")]
    ZeroSized,
}

/// The fixed rectangular extent of the world.
///
/// Cells are addressed by `(x, y)` with `0 <= x < width` and `0 <= y < height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    width: usize,
    height: usize,
}

impl Board {
    /// Creates a board with the given dimensions.
    ///
    /// Returns `Err(BoardError::ZeroSized)` if either dimension is zero.
    pub fn new(width: usize, height: usize) -> Result<Self, BoardError> {
        if width == 0 || height == 0 {
            return Err(BoardError::ZeroSized);
        }
        Ok(Board { width, height })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Checks if the given coordinates are within the board.
    #[inline]
    pub fn is_valid(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    pub fn contains(&self, position: Position) -> bool {
        self.is_valid(position.x, position.y)
    }

    /// Returns `Err(BoardError::OutOfBounds)` unless `position` lies on the board.
    pub fn check(&self, position: Position) -> Result<(), BoardError> {
        if self.contains(position) {
            Ok(())
        } else {
            Err(BoardError::OutOfBounds {
                x: position.x,
                y: position.y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// The cell one step from `position` in `direction`.
    ///
    /// Returns `None` when that step would leave the board on any edge.
    pub fn neighbor(&self, position: Position, direction: Direction) -> Option<Position> {
        let (dx, dy) = direction.offset();
        let x = position.x.checked_add_signed(dx)?;
        let y = position.y.checked_add_signed(dy)?;
        self.is_valid(x, y).then_some(Position { x, y })
    }
}

impl Default for Board {
    fn default() -> Self {
        Board {
            width: 10,
            height: 10,
        }
    }
}

/// An impassable boundary between two adjacent cells.
///
/// The pair is unordered: `Wall::new(a, b)` and `Wall::new(b, a)` are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wall {
    a: Position,
    b: Position,
}

impl Wall {
    /// Creates a wall between two orthogonally adjacent cells.
    pub fn new(a: Position, b: Position) -> Result<Self, BoardError> {
        if a.x.abs_diff(b.x) + a.y.abs_diff(b.y) != 1 {
            return Err(BoardError::NotAdjacent { a, b });
        }
        let (a, b) = if (a.y, a.x) <= (b.y, b.x) { (a, b) } else { (b, a) };
        Ok(Wall { a, b })
    }

    /// True iff this wall sits exactly between `p` and `q`, in either order.
    pub fn between(&self, p: Position, q: Position) -> bool {
        (self.a == p && self.b == q) || (self.a == q && self.b == p)
    }

    /// True when the separated cells are side by side, so the wall is drawn upright.
    pub fn is_vertical_boundary(&self) -> bool {
        self.a.y == self.b.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: usize, y: usize) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn zero_sized_board_is_rejected() {
        assert_eq!(Board::new(0, 5), Err(BoardError::ZeroSized));
        assert_eq!(Board::new(5, 0), Err(BoardError::ZeroSized));
    }

    #[test]
    fn neighbor_stays_on_board() {
        let board = Board::default();
        assert_eq!(board.neighbor(pos(0, 0), Direction::North), None);
        assert_eq!(board.neighbor(pos(0, 0), Direction::West), None);
        assert_eq!(board.neighbor(pos(9, 9), Direction::East), None);
        assert_eq!(board.neighbor(pos(9, 9), Direction::South), None);
        assert_eq!(board.neighbor(pos(0, 0), Direction::East), Some(pos(1, 0)));
        assert_eq!(board.neighbor(pos(0, 0), Direction::South), Some(pos(0, 1)));
        assert_eq!(board.neighbor(pos(5, 5), Direction::North), Some(pos(5, 4)));
        assert_eq!(board.neighbor(pos(5, 5), Direction::West), Some(pos(4, 5)));
    }

    #[test]
    fn check_reports_out_of_bounds() {
        let board = Board::default();
        assert!(board.check(pos(9, 0)).is_ok());
        assert_eq!(
            board.check(pos(10, 0)),
            Err(BoardError::OutOfBounds {
                x: 10,
                y: 0,
                width: 10,
                height: 10
            })
        );
    }

    #[test]
    fn wall_is_unordered() {
        let w1 = Wall::new(pos(1, 0), pos(1, 1)).unwrap();
        let w2 = Wall::new(pos(1, 1), pos(1, 0)).unwrap();
        assert_eq!(w1, w2);
        assert!(w1.between(pos(1, 1), pos(1, 0)));
        assert!(!w1.between(pos(1, 0), pos(2, 0)));
        assert!(!w1.is_vertical_boundary());
        assert!(Wall::new(pos(2, 2), pos(3, 2)).unwrap().is_vertical_boundary());
    }

    #[test]
    fn wall_requires_adjacent_cells() {
        assert!(Wall::new(pos(0, 0), pos(1, 1)).is_err());
        assert!(Wall::new(pos(0, 0), pos(2, 0)).is_err());
        assert!(Wall::new(pos(3, 3), pos(3, 3)).is_err());
    }
}
