//! Tetress: a game-playing agent for a tetromino-placement game.
//!
//! Two players alternately place tetromino-shaped 4-cell pieces on an
//! 11x11 toroidal grid; fully occupied rows and columns clear. This crate
//! provides the full game model plus two search engines (depth-limited
//! minimax and Monte Carlo tree search) behind an agent controller, and a
//! self-play referee to drive complete games.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, opening book, and search parameters
//! - [`board`] - Coordinates, colors, and the board state transition
//! - [`moves`] - Placement values, validation, and legal-move generation
//! - [`minimax`] - Depth-limited minimax with pluggable evaluation
//! - [`mcts`] - Arena-allocated Monte Carlo tree search with UCB1
//! - [`agent`] - The agent controller: opening book and strategy dispatch
//! - [`referee`] - Local self-play driver with clocks and validation
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//!
//! use tetress_agent::agent::{Agent, AgentConfig, Strategy};
//! use tetress_agent::board::PlayerColor;
//! use tetress_agent::mcts::MctsConfig;
//!
//! let config = AgentConfig {
//!     strategy: Strategy::MonteCarlo,
//!     mcts: MctsConfig {
//!         time_limit: Duration::from_millis(20),
//!         max_rollout_turns: 10,
//!         ..MctsConfig::default()
//!     },
//!     seed: Some(1),
//!     ..AgentConfig::default()
//! };
//!
//! let mut red = Agent::new(PlayerColor::Red, config.clone());
//! let mut blue = Agent::new(PlayerColor::Blue, config);
//!
//! // Both sides open from the book, then Red searches.
//! for turn in 0..3 {
//!     let mover = if turn % 2 == 0 { &mut red } else { &mut blue };
//!     let color = mover.color();
//!     let placement = mover.next_action(None).unwrap();
//!     red.observe(color, placement);
//!     blue.observe(color, placement);
//! }
//! assert_eq!(red.board(), blue.board());
//! ```

pub mod agent;
pub mod board;
pub mod constants;
pub mod mcts;
pub mod minimax;
pub mod moves;
pub mod referee;
