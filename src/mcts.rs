//! Monte Carlo Tree Search with UCB1 selection.
//!
//! The search keeps one tree per agent turn. Each iteration runs the four
//! classic phases:
//!
//! - **Selection**: from the root, descend fully-expanded nodes toward the
//!   child with the highest UCB1 score until reaching a leaf.
//! - **Expansion**: at a non-terminal leaf, try one random not-yet-tried
//!   legal placement and attach the resulting child. A node is fully
//!   expanded once it has `min(legal_moves, expansion_factor)` children.
//! - **Simulation**: from the new child (or a terminal leaf directly),
//!   play uniformly random placements on a detached board until a player
//!   has no legal move or the ply cap is reached, at which point the
//!   player owning more cells wins.
//! - **Backpropagation**: add the result to every node on the path back to
//!   the root and bump its visit count.
//!
//! Results use the convention 0 = Red win, 1 = Blue win, 0.5 = tie, so at
//! move-selection time Red prefers the root child with the *lowest* mean
//! score and Blue the highest.
//!
//! Nodes live in an arena (`Vec` indexed by [`NodeId`]): parent links are
//! plain indices, so the parent-owns-children / child-points-at-parent
//! shape needs no reference counting. Every new node is rolled out and
//! visited before it can be selected again, which keeps UCB1 away from
//! zero visit counts; a violation of that is a bug in the search itself
//! and asserts rather than recovers.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::board::{Board, PlayerColor};
use crate::constants::{EXPANSION_FACTOR, EXPLORATION_C, MAX_ROLLOUT_TURNS, MCTS_TIME_LIMIT_MS};
use crate::moves::{possible_moves, Placement};

/// MCTS tuning parameters.
#[derive(Clone, Debug)]
pub struct MctsConfig {
    /// UCB1 exploration coefficient.
    pub exploration: f64,
    /// Cap on children expanded per node.
    pub expansion_factor: usize,
    /// Rollout ply cap before falling back to the cell-count verdict.
    pub max_rollout_turns: u32,
    /// Wall-clock budget per move, checked between iterations.
    pub time_limit: Duration,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration: EXPLORATION_C,
            expansion_factor: EXPANSION_FACTOR,
            max_rollout_turns: MAX_ROLLOUT_TURNS,
            time_limit: Duration::from_millis(MCTS_TIME_LIMIT_MS),
        }
    }
}

/// Index into the node arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);
    const ROOT: NodeId = NodeId(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

/// A node in the search tree.
pub struct Node {
    /// Board state at this node.
    pub board: Board,
    /// Player to move in this state.
    pub to_move: PlayerColor,
    /// Ply index, counted from the start of the game.
    pub turn: u32,
    /// The placement that produced this state (`None` for the root).
    pub placement: Option<Placement>,
    /// Parent index (`NodeId::NONE` for the root).
    pub parent: NodeId,
    /// Expanded children, at most `expansion_factor` of them.
    pub children: Vec<NodeId>,
    /// Placements already expanded at this node; never retried.
    pub tried: HashSet<Placement>,
    /// Legal placements for `to_move`, computed once at creation.
    pub legal_moves: Vec<Placement>,
    /// Cumulative score backpropagated through this node.
    pub t: f64,
    /// Visit count.
    pub n: u32,
    /// Whether the expansion cap has been reached.
    pub expanded: bool,
}

impl Node {
    fn new(
        board: Board,
        to_move: PlayerColor,
        turn: u32,
        parent: NodeId,
        placement: Option<Placement>,
    ) -> Self {
        let legal_moves = possible_moves(&board, to_move);
        Self {
            board,
            to_move,
            turn,
            placement,
            parent,
            children: Vec::new(),
            tried: HashSet::new(),
            legal_moves,
            t: 0.0,
            n: 0,
            expanded: false,
        }
    }

    /// A terminal node: the player to move has no legal placement.
    pub fn is_terminal(&self) -> bool {
        self.legal_moves.is_empty()
    }

    /// Average backpropagated score.
    pub fn mean_score(&self) -> f64 {
        assert!(self.n > 0, "mean score of an unvisited node");
        self.t / self.n as f64
    }
}

/// The search tree for one agent turn.
///
/// The tree is rebuilt from scratch on every [`SearchTree::reroot`]; there
/// is no cross-turn reuse beyond the controller handing in the post-move
/// board state.
pub struct SearchTree {
    arena: Vec<Node>,
    config: MctsConfig,
    rng: fastrand::Rng,
}

impl SearchTree {
    pub fn new(
        board: Board,
        to_move: PlayerColor,
        turn: u32,
        config: MctsConfig,
        rng: fastrand::Rng,
    ) -> Self {
        let root = Node::new(board, to_move, turn, NodeId::NONE, None);
        Self {
            arena: vec![root],
            config,
            rng,
        }
    }

    /// Drop the whole tree and start over from `board`.
    pub fn reroot(&mut self, board: Board, to_move: PlayerColor, turn: u32) {
        self.arena.clear();
        self.arena
            .push(Node::new(board, to_move, turn, NodeId::NONE, None));
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.arena[id.0 as usize]
    }

    pub fn root(&self) -> &Node {
        self.node(NodeId::ROOT)
    }

    /// All nodes currently in the arena, root first.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.arena.iter()
    }

    /// Run iterations until `deadline`. The deadline is only checked
    /// between iterations; an iteration in progress always completes.
    /// Returns the number of iterations run.
    pub fn run_until(&mut self, deadline: Instant) -> u32 {
        let mut iterations = 0;
        while Instant::now() < deadline {
            self.iterate();
            iterations += 1;
        }
        iterations
    }

    /// Run a fixed number of iterations, ignoring the clock.
    pub fn run_iterations(&mut self, count: u32) {
        for _ in 0..count {
            self.iterate();
        }
    }

    fn iterate(&mut self) {
        let leaf = self.select();

        if self.node(leaf).is_terminal() {
            let result = self.rollout(leaf);
            self.backpropagate(leaf, result);
            return;
        }

        match self.expand(leaf) {
            Some(child) => {
                let result = self.rollout(child);
                self.backpropagate(child, result);
            }
            None => {
                let result = self.rollout(leaf);
                self.backpropagate(leaf, result);
            }
        }
    }

    /// Descend from the root through fully-expanded nodes, always taking
    /// the child with the highest UCB1 score.
    fn select(&self) -> NodeId {
        let mut current = NodeId::ROOT;
        while self.node(current).expanded {
            let mut best: Option<(NodeId, f64)> = None;
            for &child in &self.node(current).children {
                let score = self.ucb1(child);
                if best.is_none_or(|(_, s)| score > s) {
                    best = Some((child, score));
                }
            }
            match best {
                Some((child, _)) => current = child,
                None => break,
            }
        }
        current
    }

    fn ucb1(&self, id: NodeId) -> f64 {
        let node = self.node(id);
        assert!(!node.parent.is_none(), "UCB1 is undefined for the root");
        let parent = self.node(node.parent);
        assert!(
            node.n > 0 && parent.n > 0,
            "UCB1 selection reached an unvisited node"
        );

        let exploit = node.t / node.n as f64;
        let explore = ((parent.n as f64).ln() / node.n as f64).sqrt();
        exploit + self.config.exploration * explore
    }

    /// Attach one untried child to `leaf`, or `None` if the leaf is
    /// terminal.
    fn expand(&mut self, leaf: NodeId) -> Option<NodeId> {
        let placement = self.pick_untried(leaf)?;

        let (board, to_move, turn) = {
            let node = self.node(leaf);
            (
                node.board.apply(placement, node.to_move),
                node.to_move.opponent(),
                node.turn + 1,
            )
        };

        let child_id = NodeId(self.arena.len() as u32);
        self.arena
            .push(Node::new(board, to_move, turn, leaf, Some(placement)));

        let cap = self.config.expansion_factor;
        let node = &mut self.arena[leaf.0 as usize];
        assert!(
            !node.expanded && node.children.len() < cap,
            "expanding a fully-expanded node"
        );
        node.children.push(child_id);
        node.tried.insert(placement);
        if node.children.len() == node.legal_moves.len().min(cap) {
            node.expanded = true;
        }

        Some(child_id)
    }

    /// A uniformly random legal placement not yet expanded at `id`.
    fn pick_untried(&mut self, id: NodeId) -> Option<Placement> {
        let node = &self.arena[id.0 as usize];
        let untried: Vec<Placement> = node
            .legal_moves
            .iter()
            .copied()
            .filter(|m| !node.tried.contains(m))
            .collect();
        if untried.is_empty() {
            None
        } else {
            Some(untried[self.rng.usize(..untried.len())])
        }
    }

    /// Play a random game from `id` on a detached board copy.
    ///
    /// The first step skips placements already expanded as siblings at
    /// `id`, diversifying exploration; later steps draw from all legal
    /// moves. Returns 0 for a Red win, 1 for a Blue win, 0.5 for a tie.
    fn rollout(&mut self, id: NodeId) -> f64 {
        let (mut board, mut to_move, mut turn) = {
            let node = self.node(id);
            (node.board.clone(), node.to_move, node.turn)
        };
        let mut excluded = self.node(id).tried.clone();

        loop {
            if turn > self.config.max_rollout_turns {
                return cell_count_result(&board);
            }

            let candidates: Vec<Placement> = possible_moves(&board, to_move)
                .into_iter()
                .filter(|m| !excluded.contains(m))
                .collect();

            if candidates.is_empty() {
                // The player to move is stuck: the opponent wins.
                return match to_move {
                    PlayerColor::Blue => 0.0,
                    PlayerColor::Red => 1.0,
                };
            }

            let placement = candidates[self.rng.usize(..candidates.len())];
            board = board.apply(placement, to_move);
            to_move = to_move.opponent();
            turn += 1;
            excluded.clear();
        }
    }

    /// Propagate `result` from `id` through every ancestor to the root.
    fn backpropagate(&mut self, id: NodeId, result: f64) {
        let mut current = id;
        loop {
            let node = &mut self.arena[current.0 as usize];
            node.t += result;
            node.n += 1;
            if node.parent.is_none() {
                break;
            }
            current = node.parent;
        }
    }

    /// Pick the move to commit after searching.
    ///
    /// Under the 0 = Red win / 1 = Blue win convention, Red wants the
    /// root child with the lowest mean score and Blue the highest. `None`
    /// when the root has no children (no legal move, or no iteration ran).
    pub fn best_placement(&self, player: PlayerColor) -> Option<Placement> {
        let mut best: Option<(Placement, f64)> = None;
        for &child_id in &self.root().children {
            let child = self.node(child_id);
            let mean = child.mean_score();
            let placement = child
                .placement
                .expect("non-root node without an originating placement");

            let better = match best {
                None => true,
                Some((_, best_mean)) => match player {
                    PlayerColor::Red => mean < best_mean,
                    PlayerColor::Blue => mean > best_mean,
                },
            };
            if better {
                best = Some((placement, mean));
            }
        }
        best.map(|(placement, _)| placement)
    }
}

/// Verdict of a rollout that hit the ply cap: whoever owns more cells
/// wins, equal counts tie.
fn cell_count_result(board: &Board) -> f64 {
    let red = board.count(PlayerColor::Red);
    let blue = board.count(PlayerColor::Blue);
    if red > blue {
        0.0
    } else if red == blue {
        0.5
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Coord;
    use crate::constants::BOARD_N;

    fn coord(r: u8, c: u8) -> Coord {
        Coord::new(r, c)
    }

    fn small_config() -> MctsConfig {
        MctsConfig {
            max_rollout_turns: 12,
            ..MctsConfig::default()
        }
    }

    fn seeded_tree(board: Board, to_move: PlayerColor, turn: u32) -> SearchTree {
        SearchTree::new(
            board,
            to_move,
            turn,
            small_config(),
            fastrand::Rng::with_seed(7),
        )
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

    fn opening_board() -> Board {
        let mut board = Board::new();
        for &(r, c) in &[(3, 3), (3, 4), (4, 3), (4, 4)] {
            board.set(coord(r, c), Some(PlayerColor::Red));
        }
        for &(r, c) in &[(2, 3), (2, 4), (2, 5), (2, 6)] {
            board.set(coord(r, c), Some(PlayerColor::Blue));
        }
        board
    }

    #[test]
    fn test_visit_counts_after_iterations() {
        let mut tree = seeded_tree(opening_board(), PlayerColor::Red, 3);
        tree.run_iterations(40);

        // Each iteration backpropagates to the root exactly once.
        assert_eq!(tree.root().n, 40);

        // Visits never exceed the parent's visits.
        for node in tree.nodes() {
            if !node.parent.is_none() {
                assert!(tree.node(node.parent).n >= node.n);
            }
        }

        // Every expanded root child has been rolled out at least once.
        for &child in &tree.root().children {
            assert!(tree.node(child).n > 0);
        }
        assert!(tree.root().children.len() <= EXPANSION_FACTOR);
    }

    #[test]
    fn test_expansion_cap() {
        let mut tree = seeded_tree(opening_board(), PlayerColor::Red, 3);
        tree.run_iterations(100);

        for node in tree.nodes() {
            assert!(node.children.len() <= EXPANSION_FACTOR);
            if node.expanded {
                assert_eq!(
                    node.children.len(),
                    node.legal_moves.len().min(EXPANSION_FACTOR)
                );
            }
        }
    }

    #[test]
    fn test_terminal_root_resolves_immediately() {
        // Blue's lone piece is walled in: no legal placement, so every
        // rollout is an instant Red win.
        let mut blocked = Board::new();
        blocked.set(coord(0, 0), Some(PlayerColor::Blue));
        for n in coord(0, 0).neighbors() {
            blocked.set(n, Some(PlayerColor::Red));
        }

        let mut tree = seeded_tree(blocked, PlayerColor::Blue, 10);
        assert!(tree.root().is_terminal());

        tree.run_iterations(25);
        assert_eq!(tree.root().n, 25);
        assert_eq!(tree.root().t, 0.0);
        assert!(tree.best_placement(PlayerColor::Blue).is_none());
    }

    #[test]
    fn test_move_selection_polarity() {
        // Red to move on a nearly full board with exactly two legal
        // placements: sealing Blue's pocket (Blue is then stuck, every
        // rollout returns 0) or filling Red's private pocket (after which
        // Blue's forced reply leaves Red stuck, every rollout returns 1).
        let blue_pocket: [(u8, u8); 4] = [(5, 6), (5, 7), (5, 8), (5, 9)];
        let red_pocket: [(u8, u8); 4] = [(0, 1), (0, 2), (0, 3), (0, 4)];
        let singles = [
            (0, 10),
            (1, 7),
            (1, 9),
            (2, 1),
            (2, 3),
            (2, 10),
            (3, 0),
            (4, 10),
            (5, 0),
            (6, 0),
            (7, 10),
            (8, 0),
            (8, 2),
            (8, 4),
            (9, 5),
            (10, 6),
            (10, 8),
        ];
        let mut vacant = Vec::new();
        vacant.extend_from_slice(&blue_pocket);
        vacant.extend_from_slice(&red_pocket);
        vacant.extend_from_slice(&singles);
        let board = almost_full_board(&vacant, &[(5, 5)]);

        let seal = Placement::new(blue_pocket.map(|(r, c)| coord(r, c)));
        let fill_own = Placement::new(red_pocket.map(|(r, c)| coord(r, c)));

        // Default config: the rollout ply cap must not cut these lines
        // short before their forced endings.
        let mut tree = SearchTree::new(
            board,
            PlayerColor::Red,
            20,
            MctsConfig::default(),
            fastrand::Rng::with_seed(7),
        );
        assert_eq!(tree.root().legal_moves.len(), 2);

        tree.run_iterations(30);

        // Both children exist and carry the deterministic outcomes.
        for &child_id in &tree.root().children {
            let child = tree.node(child_id);
            match child.placement {
                Some(p) if p == seal => assert_eq!(child.mean_score(), 0.0),
                Some(p) if p == fill_own => assert_eq!(child.mean_score(), 1.0),
                other => panic!("unexpected child placement: {other:?}"),
            }
        }

        // Red minimizes the mean score and must pick the sealing move.
        assert_eq!(tree.best_placement(PlayerColor::Red), Some(seal));
    }

    #[test]
    fn test_reroot_discards_the_tree() {
        let mut tree = seeded_tree(opening_board(), PlayerColor::Red, 3);
        tree.run_iterations(20);
        assert!(tree.nodes().count() > 1);

        tree.reroot(opening_board(), PlayerColor::Blue, 4);
        assert_eq!(tree.nodes().count(), 1);
        assert_eq!(tree.root().n, 0);
        assert_eq!(tree.root().to_move, PlayerColor::Blue);
    }
}
