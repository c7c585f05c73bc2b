//! Placement representation and legal-move generation.
//!
//! A move in Tetress places a tetromino: four connected cells, all vacant,
//! at least one of them wraparound-adjacent to a cell the placing player
//! already owns. Rather than stamping the canonical tetromino shapes at
//! every anchor, generation walks outward from each owned cell with a
//! backtracking depth-first search over vacant neighbors:
//!
//! - a plain walk of four vacant cells yields the path-shaped pieces
//!   (I, L, S and their rotations, including across board edges);
//! - at depth 1 the walk forks pairwise over the open neighbors of the
//!   first cell, catching pieces that branch immediately;
//! - a first cell with three open neighbors yields the T-piece centered
//!   on it;
//! - at depth 2 every pair of open neighbors of the second cell yields the
//!   pieces that branch there (the remaining T and S orientations).
//!
//! Duplicate discoveries across starting cells and walk orders collapse
//! through the canonical sorted form of [`Placement`]. Generation holds no
//! state across calls and is deterministic for a given board.

use std::collections::HashSet;
use std::fmt;

use crate::board::{Board, Coord, Direction, PlayerColor};

/// A tetromino placement: four distinct cells in canonical (sorted) order.
///
/// Two placements covering the same cells compare equal regardless of the
/// order they were discovered in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Placement([Coord; 4]);

impl Placement {
    /// Build a placement from four distinct cells, normalizing the order.
    pub fn new(mut cells: [Coord; 4]) -> Self {
        cells.sort_unstable();
        debug_assert!(
            cells[0] != cells[1] && cells[1] != cells[2] && cells[2] != cells[3],
            "placement cells must be distinct"
        );
        Self(cells)
    }

    pub fn cells(&self) -> &[Coord; 4] {
        &self.0
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.0.contains(&coord)
    }

    /// Whether the four cells form one connected region under wraparound
    /// orthogonal adjacency.
    pub fn is_connected(&self) -> bool {
        let mut reached = [false; 4];
        reached[0] = true;
        let mut frontier = vec![self.0[0]];
        while let Some(cell) = frontier.pop() {
            for neighbor in cell.neighbors() {
                if let Some(i) = self.0.iter().position(|&c| c == neighbor) {
                    if !reached[i] {
                        reached[i] = true;
                        frontier.push(self.0[i]);
                    }
                }
            }
        }
        reached.iter().all(|&r| r)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

/// Why a placement was rejected by [`validate_placement`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    /// A placement cell is already occupied.
    Occupied(Coord),
    /// The four cells do not form a connected tetromino.
    Disconnected,
    /// No placement cell touches a piece of the placing player.
    Detached,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::Occupied(coord) => {
                write!(f, "illegal placement: cell {coord} is occupied")
            }
            PlacementError::Disconnected => {
                write!(f, "illegal placement: cells do not form a tetromino")
            }
            PlacementError::Detached => {
                write!(f, "illegal placement: does not touch any owned cell")
            }
        }
    }
}

impl std::error::Error for PlacementError {}

/// Check a placement against the rules, for moves arriving from outside.
///
/// Players with no pieces on the board (their opening move) are exempt
/// from the adjacency requirement.
pub fn validate_placement(
    board: &Board,
    placement: Placement,
    player: PlayerColor,
) -> Result<(), PlacementError> {
    for &cell in placement.cells() {
        if !board.is_vacant(cell) {
            return Err(PlacementError::Occupied(cell));
        }
    }
    if !placement.is_connected() {
        return Err(PlacementError::Disconnected);
    }
    if board.count(player) > 0 {
        let touches = placement.cells().iter().any(|cell| {
            cell.neighbors()
                .iter()
                .any(|&n| board.get(n) == Some(player))
        });
        if !touches {
            return Err(PlacementError::Detached);
        }
    }
    Ok(())
}

/// Enumerate every legal placement for `player` on `board`.
///
/// Walks outward from each cell owned by `player`; see the module docs for
/// the branch structure. An empty result means the player has no legal
/// move, which upstream treats as a loss, never as an error. The returned
/// order is unspecified.
pub fn possible_moves(board: &Board, player: PlayerColor) -> Vec<Placement> {
    let mut found = HashSet::new();
    for (coord, owner) in board.iter_occupied() {
        if owner == player {
            moves_from(board, coord, &mut found);
        }
    }
    found.into_iter().collect()
}

/// Collect all placements reachable from one owned cell into `found`.
fn moves_from(board: &Board, origin: Coord, found: &mut HashSet<Placement>) {
    let mut path = vec![origin];
    for dir in Direction::ALL {
        walk(board, origin.shift(dir), 1, &mut path, found);
    }
    debug_assert_eq!(path.len(), 1);
}

/// Open (vacant, not yet walked) neighbors of `coord`.
fn open_neighbors(board: &Board, coord: Coord, path: &[Coord]) -> Vec<Coord> {
    coord
        .neighbors()
        .into_iter()
        .filter(|n| !path.contains(n) && board.is_vacant(*n))
        .collect()
}

/// One step of the backtracking walk. `path[0]` is the owned origin cell
/// and is never part of a placement; `depth` counts placed cells.
fn walk(
    board: &Board,
    coord: Coord,
    depth: u8,
    path: &mut Vec<Coord>,
    found: &mut HashSet<Placement>,
) {
    if path.contains(&coord) || !board.is_vacant(coord) {
        return;
    }
    path.push(coord);

    if depth == 1 {
        let open = open_neighbors(board, coord, path);

        // Fork at the first cell: fix one open neighbor and continue the
        // walk from each of the others, two cells deeper.
        for i in 0..open.len() {
            path.push(open[i]);
            for j in 0..open.len() {
                if i != j {
                    walk(board, open[j], depth + 2, path, found);
                }
            }
            path.pop();
        }

        // The origin occupies one neighbor, so three open ones mean this
        // cell is the centre of a T-piece.
        if open.len() == 3 {
            found.insert(Placement::new([coord, open[0], open[1], open[2]]));
        }
    }

    if depth == 2 {
        // Fork at the second cell: any pair of its open neighbors
        // completes a piece.
        let open = open_neighbors(board, coord, path);
        for i in 0..open.len() {
            for j in (i + 1)..open.len() {
                found.insert(Placement::new([path[1], path[2], open[i], open[j]]));
            }
        }
    }

    if depth == 4 {
        found.insert(Placement::new([path[1], path[2], path[3], path[4]]));
        path.pop();
        return;
    }

    for dir in Direction::ALL {
        walk(board, coord.shift(dir), depth + 1, path, found);
    }
    path.pop();
}
