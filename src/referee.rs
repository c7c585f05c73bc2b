//! A local self-play referee.
//!
//! Drives two [`Agent`]s through a complete game: asks the player to move
//! for a placement, validates it against the rules, commits it on both
//! agents, and enforces the per-player clock and the game-length cap. The
//! same loop any external tournament host would run, kept here so the
//! crate plays end to end on its own.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::agent::{Agent, AgentConfig};
use crate::board::{Board, PlayerColor};
use crate::constants::MAX_GAME_TURNS;
use crate::moves::validate_placement;

/// Why a game ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EndReason {
    /// The player to move had no legal placement.
    NoLegalMoves,
    /// The player to move committed an illegal placement.
    IllegalPlacement,
    /// The player to move ran out of clock.
    Timeout,
    /// The game hit the ply cap and was decided by cell count.
    TurnLimit,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            EndReason::NoLegalMoves => "no legal moves",
            EndReason::IllegalPlacement => "illegal placement",
            EndReason::Timeout => "timeout",
            EndReason::TurnLimit => "turn limit",
        };
        f.write_str(text)
    }
}

/// Final result of a refereed game.
#[derive(Clone, Debug)]
pub struct GameOutcome {
    /// `None` is a tie (equal cell counts at the turn limit).
    pub winner: Option<PlayerColor>,
    pub reason: EndReason,
    /// Plies played before the game ended.
    pub turns: u32,
    pub final_board: Board,
}

/// Match settings for [`run_match`].
#[derive(Clone, Debug)]
pub struct MatchConfig {
    pub red: AgentConfig,
    pub blue: AgentConfig,
    /// Ply cap; reaching it triggers the cell-count tiebreak.
    pub max_turns: u32,
    /// Total thinking time per player, `None` for untimed play.
    pub clock: Option<Duration>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            red: AgentConfig::default(),
            blue: AgentConfig::default(),
            max_turns: MAX_GAME_TURNS,
            clock: None,
        }
    }
}

/// Play one game between two agents and return its outcome.
pub fn run_match(config: MatchConfig) -> GameOutcome {
    let mut red = Agent::new(PlayerColor::Red, config.red);
    let mut blue = Agent::new(PlayerColor::Blue, config.blue);

    let mut board = Board::new();
    let mut to_move = PlayerColor::Red;
    let mut turn = 0;
    let mut clocks = [config.clock, config.clock];

    loop {
        if turn >= config.max_turns {
            let outcome = GameOutcome {
                winner: cell_count_winner(&board),
                reason: EndReason::TurnLimit,
                turns: turn,
                final_board: board,
            };
            log_outcome(&outcome);
            return outcome;
        }

        let remaining = clocks[clock_index(to_move)];
        let mover = match to_move {
            PlayerColor::Red => &mut red,
            PlayerColor::Blue => &mut blue,
        };

        let started = Instant::now();
        let action = mover.next_action(remaining);
        let elapsed = started.elapsed();

        if let Some(remaining) = &mut clocks[clock_index(to_move)] {
            if elapsed > *remaining {
                let outcome = GameOutcome {
                    winner: Some(to_move.opponent()),
                    reason: EndReason::Timeout,
                    turns: turn,
                    final_board: board,
                };
                log_outcome(&outcome);
                return outcome;
            }
            *remaining -= elapsed;
        }

        let Some(placement) = action else {
            let outcome = GameOutcome {
                winner: Some(to_move.opponent()),
                reason: EndReason::NoLegalMoves,
                turns: turn,
                final_board: board,
            };
            log_outcome(&outcome);
            return outcome;
        };

        if let Err(err) = validate_placement(&board, placement, to_move) {
            info!(player = %to_move, %placement, %err, "illegal placement");
            let outcome = GameOutcome {
                winner: Some(to_move.opponent()),
                reason: EndReason::IllegalPlacement,
                turns: turn,
                final_board: board,
            };
            log_outcome(&outcome);
            return outcome;
        }

        board = board.apply(placement, to_move);
        red.observe(to_move, placement);
        blue.observe(to_move, placement);
        debug!(
            turn,
            player = %to_move,
            %placement,
            elapsed_ms = elapsed.as_millis() as u64,
            "placement committed"
        );

        to_move = to_move.opponent();
        turn += 1;
    }
}

fn clock_index(player: PlayerColor) -> usize {
    match player {
        PlayerColor::Red => 0,
        PlayerColor::Blue => 1,
    }
}

fn cell_count_winner(board: &Board) -> Option<PlayerColor> {
    let red = board.count(PlayerColor::Red);
    let blue = board.count(PlayerColor::Blue);
    if red > blue {
        Some(PlayerColor::Red)
    } else if blue > red {
        Some(PlayerColor::Blue)
    } else {
        None
    }
}

fn log_outcome(outcome: &GameOutcome) {
    match outcome.winner {
        Some(winner) => info!(
            %winner,
            reason = %outcome.reason,
            turns = outcome.turns,
            "game over"
        ),
        None => info!(reason = %outcome.reason, turns = outcome.turns, "game over: tie"),
    }
}
