//! Depth-limited minimax search.
//!
//! Red is the maximizing player and Blue the minimizing player. Recursion
//! stops at depth zero, at a position with no legal moves, or when the
//! branching factor exceeds the configured cutoff; in every cutoff case the
//! position is scored statically by the configured [`Evaluation`].
//!
//! Score convention: positive favors Red. The terminal classifier returns
//! +1 when Blue is to move with no legal placement (a Red win), -1 in the
//! mirrored case, and 0 otherwise.

use tracing::debug;

use crate::board::{Board, PlayerColor};
use crate::constants::{MINIMAX_DEPTH, MINIMAX_EXPANSION_CUTOFF};
use crate::moves::{possible_moves, Placement};

/// Static evaluation used at search cutoffs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Evaluation {
    /// Win/loss/unknown classifier: +1 / -1 when the player to move has no
    /// legal placement, 0 everywhere else. Exact at true terminals, a
    /// coarse approximation when the depth or branching cutoff hits first.
    TerminalClassifier,
    /// Reciprocal of the opponent's best-response mobility: rewards
    /// restricting how many placements the opponent can have after our
    /// strongest reply, with infinite endpoints for immediate win/loss.
    MobilityReciprocal,
}

impl Evaluation {
    /// Score `board` with `to_move` to play. `moves` is the precomputed
    /// legal-move list for `to_move` on this board.
    fn score(self, board: &Board, to_move: PlayerColor, moves: &[Placement]) -> f64 {
        match self {
            Evaluation::TerminalClassifier => {
                if moves.is_empty() {
                    match to_move {
                        PlayerColor::Red => -1.0,
                        PlayerColor::Blue => 1.0,
                    }
                } else {
                    0.0
                }
            }
            Evaluation::MobilityReciprocal => mobility_reciprocal(board, to_move, moves),
        }
    }

    /// The score proving an immediate win for `player`, used by the
    /// top-level move loop to stop scanning siblings.
    fn winning_score(self, player: PlayerColor) -> f64 {
        match (self, player) {
            (Evaluation::TerminalClassifier, PlayerColor::Red) => 1.0,
            (Evaluation::TerminalClassifier, PlayerColor::Blue) => -1.0,
            (Evaluation::MobilityReciprocal, PlayerColor::Red) => f64::INFINITY,
            (Evaluation::MobilityReciprocal, PlayerColor::Blue) => f64::NEG_INFINITY,
        }
    }
}

fn mobility_reciprocal(board: &Board, to_move: PlayerColor, moves: &[Placement]) -> f64 {
    if moves.is_empty() {
        // The player to move has already lost.
        return match to_move {
            PlayerColor::Red => f64::NEG_INFINITY,
            PlayerColor::Blue => f64::INFINITY,
        };
    }

    let opponent = to_move.opponent();
    let mut max_opponent_moves = 0usize;
    for &placement in moves {
        let next = board.apply(placement, to_move);
        max_opponent_moves = max_opponent_moves.max(possible_moves(&next, opponent).len());
    }

    if max_opponent_moves == 0 {
        // Every reply leaves the opponent without a move.
        return match to_move {
            PlayerColor::Red => f64::INFINITY,
            PlayerColor::Blue => f64::NEG_INFINITY,
        };
    }
    1.0 / max_opponent_moves as f64
}

/// Minimax search parameters.
#[derive(Clone, Debug)]
pub struct MinimaxConfig {
    pub depth: u32,
    pub expansion_cutoff: usize,
    pub evaluation: Evaluation,
}

impl Default for MinimaxConfig {
    fn default() -> Self {
        Self {
            depth: MINIMAX_DEPTH,
            expansion_cutoff: MINIMAX_EXPANSION_CUTOFF,
            evaluation: Evaluation::TerminalClassifier,
        }
    }
}

/// Score `board` with `to_move` to play, searching `depth` plies.
///
/// At `depth == 0` this is exactly the static evaluation; no recursion
/// happens. A position with no legal moves, or with more legal moves than
/// the branching cutoff, is also scored statically.
pub fn minimax(board: &Board, to_move: PlayerColor, depth: u32, config: &MinimaxConfig) -> f64 {
    let moves = possible_moves(board, to_move);

    if depth == 0 || moves.is_empty() || moves.len() > config.expansion_cutoff {
        return config.evaluation.score(board, to_move, &moves);
    }

    let opponent = to_move.opponent();
    match to_move {
        PlayerColor::Red => moves
            .iter()
            .map(|&m| minimax(&board.apply(m, to_move), opponent, depth - 1, config))
            .fold(f64::NEG_INFINITY, f64::max),
        PlayerColor::Blue => moves
            .iter()
            .map(|&m| minimax(&board.apply(m, to_move), opponent, depth - 1, config))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Pick the best placement for `player`, or `None` with no legal move.
///
/// Scans every legal placement, scoring the resulting position with a
/// full-depth search for the opponent. The scan stops early as soon as a
/// provably winning score shows up.
pub fn best_placement(
    board: &Board,
    player: PlayerColor,
    config: &MinimaxConfig,
) -> Option<Placement> {
    let moves = possible_moves(board, player);
    let opponent = player.opponent();
    let winning = config.evaluation.winning_score(player);

    let mut best: Option<(Placement, f64)> = None;
    for &placement in &moves {
        let next = board.apply(placement, player);
        let score = minimax(&next, opponent, config.depth, config);

        let better = match best {
            None => true,
            Some((_, best_score)) => match player {
                PlayerColor::Red => score > best_score,
                PlayerColor::Blue => score < best_score,
            },
        };
        if better {
            best = Some((placement, score));
        }
        if score == winning {
            break;
        }
    }

    if let Some((placement, score)) = best {
        debug!(%placement, score, candidates = moves.len(), "minimax selected a move");
    }
    best.map(|(placement, _)| placement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Coord;
    use crate::constants::BOARD_N;

    fn coord(r: u8, c: u8) -> Coord {
        Coord::new(r, c)
    }

    /// A board that is red everywhere except the listed vacancies and the
    /// listed blue cells.
    fn almost_full_board(vacant: &[(u8, u8)], blue: &[(u8, u8)]) -> Board {
        let mut board = Board::new();
        for r in 0..BOARD_N as u8 {
            for c in 0..BOARD_N as u8 {
                board.set(coord(r, c), Some(PlayerColor::Red));
            }
        }
        for &(r, c) in vacant {
            board.set(coord(r, c), None);
        }
        for &(r, c) in blue {
            board.set(coord(r, c), Some(PlayerColor::Blue));
        }
        board
    }

    /// Blue's lone piece at (5,5) with a single 4-cell escape pocket at
    /// (5,6)..(5,9). The scattered single vacancies keep every row and
    /// column from being full before the pocket is filled. Red's only
    /// legal move is filling the pocket, which seals Blue in.
    fn pocket_board() -> (Board, Placement) {
        let singles = [
            (0, 0),
            (1, 2),
            (2, 4),
            (3, 10),
            (4, 1),
            (6, 3),
            (7, 5),
            (8, 0),
            (9, 2),
            (10, 4),
        ];
        let mut vacant = vec![(5, 6), (5, 7), (5, 8), (5, 9)];
        vacant.extend_from_slice(&singles);
        let board = almost_full_board(&vacant, &[(5, 5)]);
        let pocket =
            Placement::new([coord(5, 6), coord(5, 7), coord(5, 8), coord(5, 9)]);
        (board, pocket)
    }

    #[test]
    fn test_depth_zero_is_static_evaluation() {
        let (board, _) = pocket_board();
        let config = MinimaxConfig::default();

        // Red has a legal move, so the classifier says "undecided".
        assert_eq!(minimax(&board, PlayerColor::Red, 0, &config), 0.0);
    }

    #[test]
    fn test_terminal_classifier_at_terminal_states() {
        let config = MinimaxConfig::default();
        let mut board = Board::new();
        board.set(coord(5, 5), Some(PlayerColor::Red));
        for n in coord(5, 5).neighbors() {
            board.set(n, Some(PlayerColor::Blue));
        }

        // Red to move with no placements: loss for Red, depth irrelevant.
        assert_eq!(minimax(&board, PlayerColor::Red, 0, &config), -1.0);
        assert_eq!(minimax(&board, PlayerColor::Red, 5, &config), -1.0);
    }

    #[test]
    fn test_mobility_reciprocal_extremes() {
        let mut board = Board::new();
        board.set(coord(5, 5), Some(PlayerColor::Red));
        for n in coord(5, 5).neighbors() {
            board.set(n, Some(PlayerColor::Blue));
        }
        let config = MinimaxConfig {
            evaluation: Evaluation::MobilityReciprocal,
            ..MinimaxConfig::default()
        };

        // Blocked Red to move: immediate loss.
        assert_eq!(
            minimax(&board, PlayerColor::Red, 0, &config),
            f64::NEG_INFINITY
        );

        // Lone Red piece with an absent opponent: every reply leaves Blue
        // without a move.
        let mut open = Board::new();
        open.set(coord(5, 5), Some(PlayerColor::Red));
        assert_eq!(minimax(&open, PlayerColor::Red, 0, &config), f64::INFINITY);
    }

    #[test]
    fn test_best_placement_none_without_moves() {
        let board = Board::new();
        let config = MinimaxConfig::default();
        assert!(best_placement(&board, PlayerColor::Red, &config).is_none());
    }

    #[test]
    fn test_best_placement_finds_the_sealing_move() {
        let (board, pocket) = pocket_board();
        let config = MinimaxConfig {
            depth: 1,
            ..MinimaxConfig::default()
        };

        // Filling the pocket completes row 5 and columns 6..9, clearing
        // Blue off the board entirely; Blue then has no move.
        let after = board.apply(pocket, PlayerColor::Red);
        assert_eq!(after.count(PlayerColor::Blue), 0);
        assert_eq!(minimax(&after, PlayerColor::Blue, 1, &config), 1.0);

        assert_eq!(
            best_placement(&board, PlayerColor::Red, &config),
            Some(pocket)
        );

        // The pocket is also Blue's only legal move.
        assert_eq!(
            best_placement(&board, PlayerColor::Blue, &config),
            Some(pocket)
        );
    }
}
