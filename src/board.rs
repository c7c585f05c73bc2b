//! Board state, coordinates, and the placement/clearing transition.
//!
//! The board is an 11x11 toroidal grid: coordinate arithmetic wraps modulo
//! [`BOARD_N`] in both directions, so every cell has exactly four neighbors.
//! A [`Board`] is a fixed-size array of cells, which makes a snapshot clone
//! a flat 121-byte copy. Transitions never mutate the receiving board:
//! [`Board::apply`] returns a fresh board with the placement applied and any
//! full rows/columns cleared.

use std::fmt;

use crate::constants::{BOARD_CELLS, BOARD_N};
use crate::moves::Placement;

/// One of the two players. Red moves first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PlayerColor {
    Red,
    Blue,
}

impl PlayerColor {
    /// The other player.
    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            PlayerColor::Red => PlayerColor::Blue,
            PlayerColor::Blue => PlayerColor::Red,
        }
    }
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerColor::Red => write!(f, "RED"),
            PlayerColor::Blue => write!(f, "BLUE"),
        }
    }
}

/// The four orthogonal directions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
}

/// A cell coordinate, row and column both in `[0, BOARD_N)`.
///
/// Plain value type; ordering is row-major so placements can be stored in a
/// canonical sorted form.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub r: u8,
    pub c: u8,
}

impl Coord {
    pub fn new(r: u8, c: u8) -> Self {
        debug_assert!((r as usize) < BOARD_N && (c as usize) < BOARD_N);
        Self { r, c }
    }

    /// The neighboring coordinate in `dir`, wrapping at the board edges.
    pub fn shift(self, dir: Direction) -> Coord {
        let n = BOARD_N as u8;
        match dir {
            Direction::Up => Coord::new((self.r + n - 1) % n, self.c),
            Direction::Down => Coord::new((self.r + 1) % n, self.c),
            Direction::Left => Coord::new(self.r, (self.c + n - 1) % n),
            Direction::Right => Coord::new(self.r, (self.c + 1) % n),
        }
    }

    /// All four wraparound neighbors.
    pub fn neighbors(self) -> [Coord; 4] {
        [
            self.shift(Direction::Up),
            self.shift(Direction::Down),
            self.shift(Direction::Left),
            self.shift(Direction::Right),
        ]
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.r, self.c)
    }
}

/// The game board: a mapping from coordinate to occupying player.
///
/// Empty cells are `None`. Cloning is cheap; no board is mutated after it
/// has been handed to a search-tree node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: [Option<PlayerColor>; BOARD_CELLS],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_CELLS],
        }
    }

    #[inline]
    fn index(coord: Coord) -> usize {
        coord.r as usize * BOARD_N + coord.c as usize
    }

    /// The occupant of `coord`, if any.
    #[inline]
    pub fn get(&self, coord: Coord) -> Option<PlayerColor> {
        self.cells[Self::index(coord)]
    }

    #[inline]
    pub fn is_vacant(&self, coord: Coord) -> bool {
        self.get(coord).is_none()
    }

    /// Place or remove a single cell. Exposed for setting up positions;
    /// game flow goes through [`Board::apply`].
    pub fn set(&mut self, coord: Coord, occupant: Option<PlayerColor>) {
        self.cells[Self::index(coord)] = occupant;
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn empty_count(&self) -> usize {
        BOARD_CELLS - self.occupied_count()
    }

    /// Number of cells owned by `player`.
    pub fn count(&self, player: PlayerColor) -> usize {
        self.cells.iter().filter(|&&c| c == Some(player)).count()
    }

    /// Iterate over all occupied cells as `(coord, owner)` pairs.
    pub fn iter_occupied(&self) -> impl Iterator<Item = (Coord, PlayerColor)> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, cell)| {
            cell.map(|player| {
                (
                    Coord::new((i / BOARD_N) as u8, (i % BOARD_N) as u8),
                    player,
                )
            })
        })
    }

    /// Apply a placement for `player` and resolve line clearing.
    ///
    /// The four placement cells are set to `player`, then every row and
    /// every column that is fully occupied in the post-placement grid is
    /// cleared. Fullness is computed once, before any cell is removed, so
    /// clearing is a single atomic step: a cell goes away if its row is
    /// full *or* its column is full, regardless of owner.
    ///
    /// The input board is left untouched; callers assume placement cells
    /// are vacant (the referee validates external moves).
    pub fn apply(&self, placement: Placement, player: PlayerColor) -> Board {
        let mut next = self.clone();
        for &cell in placement.cells() {
            next.set(cell, Some(player));
        }

        let mut row_full = [true; BOARD_N];
        let mut col_full = [true; BOARD_N];
        for r in 0..BOARD_N {
            for c in 0..BOARD_N {
                if next.is_vacant(Coord::new(r as u8, c as u8)) {
                    row_full[r] = false;
                    col_full[c] = false;
                }
            }
        }

        for r in 0..BOARD_N {
            for c in 0..BOARD_N {
                if row_full[r] || col_full[c] {
                    next.set(Coord::new(r as u8, c as u8), None);
                }
            }
        }

        next
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..BOARD_N {
            for c in 0..BOARD_N {
                let ch = match self.get(Coord::new(r as u8, c as u8)) {
                    Some(PlayerColor::Red) => 'r',
                    Some(PlayerColor::Blue) => 'b',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(r: u8, c: u8) -> Coord {
        Coord::new(r, c)
    }

    #[test]
    fn test_shift_wraps_both_directions() {
        let n = BOARD_N as u8;
        assert_eq!(coord(0, 0).shift(Direction::Up), coord(n - 1, 0));
        assert_eq!(coord(n - 1, 0).shift(Direction::Down), coord(0, 0));
        assert_eq!(coord(0, 0).shift(Direction::Left), coord(0, n - 1));
        assert_eq!(coord(0, n - 1).shift(Direction::Right), coord(0, 0));
    }

    #[test]
    fn test_apply_sets_cells() {
        let board = Board::new();
        let placement =
            Placement::new([coord(3, 3), coord(3, 4), coord(4, 3), coord(4, 4)]);
        let next = board.apply(placement, PlayerColor::Red);

        for &cell in placement.cells() {
            assert_eq!(next.get(cell), Some(PlayerColor::Red));
        }
        assert_eq!(next.occupied_count(), 4);
        // Input board untouched.
        assert_eq!(board.occupied_count(), 0);
    }

    #[test]
    fn test_apply_clears_full_row() {
        // Row 0 filled except the last column; a vertical I-piece fills the
        // gap. Row 0 must vanish, the piece's other cells must stay.
        let mut board = Board::new();
        for c in 0..(BOARD_N - 1) as u8 {
            board.set(coord(0, c), Some(PlayerColor::Blue));
        }
        let last = (BOARD_N - 1) as u8;
        let placement =
            Placement::new([coord(0, last), coord(1, last), coord(2, last), coord(3, last)]);

        let next = board.apply(placement, PlayerColor::Red);

        for c in 0..BOARD_N as u8 {
            assert!(next.is_vacant(coord(0, c)), "row 0 should be cleared");
        }
        assert_eq!(next.get(coord(1, last)), Some(PlayerColor::Red));
        assert_eq!(next.get(coord(2, last)), Some(PlayerColor::Red));
        assert_eq!(next.get(coord(3, last)), Some(PlayerColor::Red));
        assert_eq!(next.occupied_count(), 3);
    }

    #[test]
    fn test_apply_clears_row_and_column_atomically() {
        // Fill row 5 except (5,0) and column 0 except (5,0) and (6..10, 0).
        // Completing both with one placement must clear the union of the
        // row and the column, computed on the pre-clear grid.
        let mut board = Board::new();
        for c in 1..BOARD_N as u8 {
            board.set(coord(5, c), Some(PlayerColor::Blue));
        }
        for r in 0..BOARD_N as u8 {
            if r != 5 && r != 6 && r != 7 && r != 8 {
                board.set(coord(r, 0), Some(PlayerColor::Blue));
            }
        }
        let placement =
            Placement::new([coord(5, 0), coord(6, 0), coord(7, 0), coord(8, 0)]);

        let next = board.apply(placement, PlayerColor::Red);

        for c in 0..BOARD_N as u8 {
            assert!(next.is_vacant(coord(5, c)));
        }
        for r in 0..BOARD_N as u8 {
            assert!(next.is_vacant(coord(r, 0)));
        }
        assert_eq!(next.occupied_count(), 0);
    }

    #[test]
    fn test_apply_is_deterministic() {
        let mut board = Board::new();
        board.set(coord(2, 2), Some(PlayerColor::Blue));
        let placement =
            Placement::new([coord(7, 7), coord(7, 8), coord(8, 7), coord(8, 8)]);

        let a = board.apply(placement, PlayerColor::Red);
        let b = board.apply(placement, PlayerColor::Red);
        assert!(a == b);
    }

    #[test]
    fn test_count_by_color() {
        let mut board = Board::new();
        board.set(coord(0, 0), Some(PlayerColor::Red));
        board.set(coord(0, 1), Some(PlayerColor::Red));
        board.set(coord(9, 9), Some(PlayerColor::Blue));
        assert_eq!(board.count(PlayerColor::Red), 2);
        assert_eq!(board.count(PlayerColor::Blue), 1);
        assert_eq!(board.empty_count(), BOARD_CELLS - 3);
    }
}
