//! The agent controller: strategy dispatch on top of the search engines.
//!
//! An [`Agent`] tracks the game from its own side: the controller feeds it
//! every committed placement through [`Agent::observe`] and asks for its
//! own moves through [`Agent::next_action`]. The first move always comes
//! from a fixed opening book; after an optional run of random warmup
//! moves the configured strategy takes over. `Hybrid` plays Monte Carlo
//! search while the board is open and switches to minimax once the number
//! of empty cells drops below a threshold, where exhaustive lookahead
//! beats sampling.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::board::{Board, Coord, PlayerColor};
use crate::constants::{EMPTY_SQUARE_CUTOFF, OPENING_BLUE, OPENING_RED};
use crate::mcts::{MctsConfig, SearchTree};
use crate::minimax::{self, MinimaxConfig};
use crate::moves::{possible_moves, Placement};

/// Which search engine picks moves after the opening.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Depth-limited minimax every turn.
    Minimax,
    /// Monte Carlo tree search every turn.
    MonteCarlo,
    /// MCTS while the board is open, minimax once it fills up.
    Hybrid,
}

/// Agent configuration. `Default` matches tournament settings with
/// warmup off.
#[derive(Clone, Debug)]
pub struct AgentConfig {
    pub strategy: Strategy,
    pub minimax: MinimaxConfig,
    pub mcts: MctsConfig,
    /// Random legal moves to play after the opening before the strategy
    /// engages.
    pub random_warmup: u32,
    /// Empty-cell count at which `Hybrid` switches to minimax.
    pub hybrid_cutoff: usize,
    /// RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Hybrid,
            minimax: MinimaxConfig::default(),
            mcts: MctsConfig::default(),
            random_warmup: 0,
            hybrid_cutoff: EMPTY_SQUARE_CUTOFF,
            seed: None,
        }
    }
}

/// The opening-book placement for `color`.
pub fn opening_placement(color: PlayerColor) -> Placement {
    let cells = match color {
        PlayerColor::Red => OPENING_RED,
        PlayerColor::Blue => OPENING_BLUE,
    };
    Placement::new(cells.map(|(r, c)| Coord::new(r, c)))
}

/// One side of a Tetress game.
pub struct Agent {
    color: PlayerColor,
    board: Board,
    to_move: PlayerColor,
    turn: u32,
    own_moves: u32,
    config: AgentConfig,
    tree: SearchTree,
    rng: fastrand::Rng,
}

impl Agent {
    pub fn new(color: PlayerColor, config: AgentConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let tree = SearchTree::new(
            Board::new(),
            PlayerColor::Red,
            0,
            config.mcts.clone(),
            rng.fork(),
        );
        Self {
            color,
            board: Board::new(),
            to_move: PlayerColor::Red,
            turn: 0,
            own_moves: 0,
            config,
            tree,
            rng,
        }
    }

    pub fn color(&self) -> PlayerColor {
        self.color
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Pick this agent's next placement. `None` means no legal move
    /// exists (the game is lost).
    ///
    /// `time_remaining` is this agent's whole remaining clock; the
    /// per-move MCTS budget is clamped to it when provided. The returned
    /// placement is not applied here: the controller commits it via
    /// [`Agent::observe`] on both agents.
    pub fn next_action(&mut self, time_remaining: Option<Duration>) -> Option<Placement> {
        assert_eq!(self.to_move, self.color, "next_action out of turn");

        if self.board.count(self.color) == 0 {
            let opening = opening_placement(self.color);
            if opening.cells().iter().all(|&c| self.board.is_vacant(c)) {
                debug!(player = %self.color, "opening book");
                return Some(opening);
            }
        }

        let legal = possible_moves(&self.board, self.color);
        if legal.is_empty() {
            return None;
        }

        if self.own_moves < self.config.random_warmup {
            let choice = legal[self.rng.usize(..legal.len())];
            debug!(player = %self.color, placement = %choice, "warmup move");
            return Some(choice);
        }

        let use_minimax = match self.config.strategy {
            Strategy::Minimax => true,
            Strategy::MonteCarlo => false,
            Strategy::Hybrid => self.board.empty_count() <= self.config.hybrid_cutoff,
        };

        if use_minimax {
            let choice = minimax::best_placement(&self.board, self.color, &self.config.minimax);
            debug!(player = %self.color, "minimax move");
            return choice;
        }

        let mut budget = self.config.mcts.time_limit;
        if let Some(remaining) = time_remaining {
            budget = budget.min(remaining);
        }

        self.tree
            .reroot(self.board.clone(), self.color, self.turn);
        let iterations = self.tree.run_until(Instant::now() + budget);
        debug!(
            player = %self.color,
            iterations,
            budget_ms = budget.as_millis() as u64,
            "mcts search"
        );

        // With a zero budget no child exists; fall back to a random
        // legal move rather than resigning a playable position.
        self.tree
            .best_placement(self.color)
            .or_else(|| Some(legal[self.rng.usize(..legal.len())]))
    }

    /// Record a committed placement, by either player.
    pub fn observe(&mut self, color: PlayerColor, placement: Placement) {
        assert_eq!(color, self.to_move, "observed a placement out of turn");
        self.board = self.board.apply(placement, color);
        self.to_move = color.opponent();
        self.turn += 1;
        if color == self.color {
            self.own_moves += 1;
        }
        self.tree
            .reroot(self.board.clone(), self.to_move, self.turn);
    }
}
