//! Constants for board geometry, the opening book, and search parameters.
//!
//! All tuning values live here so the two search strategies and the agent
//! controller share a single source of truth. The defaults are the values
//! the agent was tuned with for 180-second games.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN). Tetress is played on a fixed 11x11 toroidal grid.
pub const BOARD_N: usize = 11;

/// Total number of cells on the board.
pub const BOARD_CELLS: usize = BOARD_N * BOARD_N;

// =============================================================================
// Opening Book
// =============================================================================

/// Red's fixed opening placement: an O-piece near the centre.
pub const OPENING_RED: [(u8, u8); 4] = [(3, 3), (3, 4), (4, 3), (4, 4)];

/// Blue's fixed opening placement: an I-piece one row above Red's square.
pub const OPENING_BLUE: [(u8, u8); 4] = [(2, 3), (2, 4), (2, 5), (2, 6)];

// =============================================================================
// MCTS (Monte Carlo Tree Search) Parameters
// =============================================================================

/// UCB1 exploration coefficient.
pub const EXPLORATION_C: f64 = 2.0;

/// Maximum number of children expanded per node. A node counts as fully
/// expanded once it has `min(legal_moves, EXPANSION_FACTOR)` children.
pub const EXPANSION_FACTOR: usize = 6;

/// Rollout ply cap. Past this the winner is whoever owns more cells.
pub const MAX_ROLLOUT_TURNS: u32 = 150;

/// Total game clock per player, in seconds.
pub const TOTAL_TIME_SECS: u64 = 180;

/// Rough number of own moves in a full game, used to slice the clock.
pub const ESTIMATED_MOVES_PER_GAME: u32 = 70;

/// Per-move wall-clock budget for the MCTS loop, in milliseconds.
pub const MCTS_TIME_LIMIT_MS: u64 = TOTAL_TIME_SECS * 1000 / ESTIMATED_MOVES_PER_GAME as u64;

// =============================================================================
// Minimax Parameters
// =============================================================================

/// Recursion depth for the depth-limited minimax search.
pub const MINIMAX_DEPTH: u32 = 5;

/// Branching cutoff: positions with more legal moves than this are scored
/// statically instead of recursed into.
pub const MINIMAX_EXPANSION_CUTOFF: usize = 12;

// =============================================================================
// Agent Controller Parameters
// =============================================================================

/// Hybrid strategy threshold: with fewer empty cells than this the board is
/// sparse enough for minimax, otherwise MCTS runs.
pub const EMPTY_SQUARE_CUTOFF: usize = 40;

/// Warmup length the agent was tuned with: uniformly random moves played
/// after the opening before a real strategy engages. Off by default.
pub const N_RANDOM_MOVES: u32 = 6;

/// Game length cap in plies. A game reaching it is decided by cell count.
pub const MAX_GAME_TURNS: u32 = 150;
